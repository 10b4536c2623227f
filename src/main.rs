#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quicktranslate_core::config::CoreConfig;
use quicktranslate_core::error::{CoreError, CoreResult};
use quicktranslate_core::logging;
use quicktranslate_core::protocol::Session;
use quicktranslate_core::services::languages::LanguageTable;
use quicktranslate_core::services::settings_store::JsonFileStore;
use quicktranslate_core::services::translator::HttpTranslator;
use quicktranslate_core::services::vocabulary::ContextStore;

fn data_dir() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn open_session(dir: &Path) -> CoreResult<Session> {
    let cfg = CoreConfig::load(dir)?;

    let settings = JsonFileStore::open(cfg.settings_path(dir));
    let store = ContextStore::open(Box::new(settings))?;

    let translator = HttpTranslator::new(cfg.translator_config()?)
        .map_err(|e| CoreError::Config(e.to_string()))?;

    Ok(Session::new(
        store,
        Arc::new(translator),
        LanguageTable::builtin(),
        &cfg,
    ))
}

fn main() {
    logging::init();

    let dir = data_dir();
    let mut session = match open_session(&dir) {
        Ok(s) => s,
        Err(e) => {
            log::error!("cannot start in {}: {e}", dir.display());
            std::process::exit(1);
        }
    };
    log::info!("core ready, data directory {}", dir.display());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| session.handle(&line)));

        let lines = match result {
            Ok(lines) => lines,
            Err(_) => {
                log::error!("request handler panicked");
                vec![serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()]
            }
        };

        if lines.iter().any(|l| writeln!(stdout, "{l}").is_err()) {
            break;
        }

        let _ = stdout.flush();
    }
}
