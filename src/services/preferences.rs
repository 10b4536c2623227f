use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::CoreResult;
use crate::services::languages::{LanguageTable, AUTO};
use crate::services::settings_store::SettingsStore;

const KEY_ENABLED: &str = "enabled_languages";
const KEY_DEFAULT_FROM: &str = "default_from";
const KEY_DEFAULT_TO: &str = "default_to";
const KEY_LAST_FROM: &str = "last_from_lang";
const KEY_LAST_TO: &str = "last_to_lang";
const KEY_RECENT: &str = "recent_languages";

const MAX_RECENT: usize = 5;

fn default_enabled() -> Vec<String> {
    vec!["en".to_string(), "he".to_string()]
}

/// Scalar language preferences kept next to the vocabulary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LanguagePreferences {
    pub enabled_languages: Vec<String>,
    pub default_from: String,
    pub default_to: String,
    pub last_from: Option<String>,
    pub last_to: Option<String>,
    pub recent_languages: Vec<String>,
}

impl Default for LanguagePreferences {
    fn default() -> Self {
        LanguagePreferences {
            enabled_languages: default_enabled(),
            default_from: AUTO.to_string(),
            default_to: "he".to_string(),
            last_from: None,
            last_to: None,
            recent_languages: Vec::new(),
        }
    }
}

impl LanguagePreferences {
    /// Reads every key, keeping the default for anything missing or of the
    /// wrong type.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let defaults = LanguagePreferences::default();

        LanguagePreferences {
            enabled_languages: string_list(store.get(KEY_ENABLED))
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.enabled_languages),
            default_from: string(store.get(KEY_DEFAULT_FROM)).unwrap_or(defaults.default_from),
            default_to: string(store.get(KEY_DEFAULT_TO)).unwrap_or(defaults.default_to),
            last_from: string(store.get(KEY_LAST_FROM)),
            last_to: string(store.get(KEY_LAST_TO)),
            recent_languages: string_list(store.get(KEY_RECENT)).unwrap_or_default(),
        }
    }

    pub fn save(&self, store: &mut dyn SettingsStore) -> CoreResult<()> {
        store.set_many(vec![
            (KEY_ENABLED, json!(self.enabled_languages)),
            (KEY_DEFAULT_FROM, json!(self.default_from)),
            (KEY_DEFAULT_TO, json!(self.default_to)),
            (KEY_LAST_FROM, opt(&self.last_from)),
            (KEY_LAST_TO, opt(&self.last_to)),
            (KEY_RECENT, json!(self.recent_languages)),
        ])
    }

    /// Pair to preselect: the last one used, else the configured default.
    pub fn current_pair(&self) -> (&str, &str) {
        (
            self.last_from.as_deref().unwrap_or(&self.default_from),
            self.last_to.as_deref().unwrap_or(&self.default_to),
        )
    }

    /// Remembers `from -> to` and moves `to` to the front of the recent list.
    /// Returns `false` when nothing changed.
    pub fn record_pair(&mut self, from: &str, to: &str) -> bool {
        let before = self.clone();

        self.last_from = Some(from.to_string());
        self.last_to = Some(to.to_string());

        self.recent_languages.retain(|c| c != to);
        self.recent_languages.insert(0, to.to_string());
        self.recent_languages.truncate(MAX_RECENT);

        *self != before
    }

    /// Keeps the known, non-`auto` codes from `codes`, in order and without
    /// repeats. An empty result falls back to the default set.
    pub fn set_enabled(&mut self, codes: &[String], table: &LanguageTable) {
        let mut enabled: Vec<String> = Vec::new();
        for code in codes {
            let code = code.trim().to_lowercase();
            if code == AUTO || !table.is_known(&code) || enabled.contains(&code) {
                continue;
            }
            enabled.push(code);
        }

        if enabled.is_empty() {
            log::warn!("no valid languages enabled, restoring defaults");
            enabled = default_enabled();
        }

        self.enabled_languages = enabled;
    }
}

fn string(v: Option<Value>) -> Option<String> {
    v.and_then(|v| v.as_str().map(str::to_string))
        .filter(|s| !s.trim().is_empty())
}

fn string_list(v: Option<Value>) -> Option<Vec<String>> {
    let items = v?.as_array()?.clone();
    Some(
        items
            .into_iter()
            .filter_map(|i| i.as_str().map(str::to_string))
            .collect(),
    )
}

fn opt(v: &Option<String>) -> Value {
    match v {
        Some(s) => json!(s),
        None => Value::Null,
    }
}
