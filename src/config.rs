use serde::{Deserialize, Serialize};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::services::pipeline::DEFAULT_SUGGESTION_THRESHOLD;
use crate::services::translator::{TranslatorConfig, MAX_RETRIES};
use crate::services::vocabulary::matcher::DEFAULT_SIMILARITY_THRESHOLD;

pub const CONFIG_FILE: &str = "config.json";
pub const API_KEY_ENV: &str = "QUICKTRANSLATE_API_KEY";

fn default_provider() -> String {
    "google".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> usize {
    3
}

fn default_suggestion_threshold() -> f64 {
    DEFAULT_SUGGESTION_THRESHOLD
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_settings_file() -> String {
    "settings.json".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CoreConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Relative paths resolve against the data directory.
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            provider: default_provider(),
            api_key: String::new(),
            model: String::new(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            suggestion_threshold: default_suggestion_threshold(),
            similarity_threshold: default_similarity_threshold(),
            settings_file: default_settings_file(),
        }
    }
}

impl CoreConfig {
    /// Reads `config.json` from `dir`. A missing file means defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE);

        let mut cfg = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str::<CoreConfig>(&text)
                .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?
        } else {
            log::info!("no {} in {}, using defaults", CONFIG_FILE, dir.display());
            CoreConfig::default()
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            cfg.apply_api_key_override(&key);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_api_key_override(&mut self, key: &str) {
        if !key.trim().is_empty() {
            self.api_key = key.trim().to_string();
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        for (name, value) in [
            ("suggestion_threshold", self.suggestion_threshold),
            ("similarity_threshold", self.similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Config(format!(
                    "{name} must be within 0..=1, got {value}"
                )));
            }
        }

        if !(1..=MAX_RETRIES).contains(&self.max_retries) {
            return Err(CoreError::Config(format!(
                "max_retries must be within 1..={MAX_RETRIES}, got {}",
                self.max_retries
            )));
        }

        if self.settings_file.trim().is_empty() {
            return Err(CoreError::Config("settings_file is required".into()));
        }

        Ok(())
    }

    pub fn settings_path(&self, dir: &Path) -> PathBuf {
        let p = PathBuf::from(&self.settings_file);
        if p.is_absolute() {
            p
        } else {
            dir.join(p)
        }
    }

    pub fn translator_config(&self) -> CoreResult<TranslatorConfig> {
        let provider = self
            .provider
            .parse()
            .map_err(|e: crate::services::translator_types::TranslateError| {
                CoreError::Config(e.to_string())
            })?;

        Ok(TranslatorConfig {
            provider,
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        })
    }
}
