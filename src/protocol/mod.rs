//! JSON-lines host protocol.
//!
//! One request per line: `{"id", "cmd", "payload"}`. Every request gets one
//! reply line, `{"id", "status": "ok", "payload"}` or
//! `{"id", "status": "error", "message"}`. Pipeline notifications raised while
//! handling a request are written before its reply as `{"event", "payload"}`.

use serde_json::{json, Value};

use std::sync::{
    mpsc::{self, Receiver},
    Arc, Mutex, MutexGuard, PoisonError,
};

use crate::config::CoreConfig;
use crate::model::translation::TranslationSuggestion;
use crate::services::languages::{LanguageTable, AUTO};
use crate::services::pipeline::{ChannelListener, PipelineEvent, TranslationOrchestrator};
use crate::services::preferences::LanguagePreferences;
use crate::services::suggestions;
use crate::services::translator_types::Translator;
use crate::services::vocabulary::ContextStore;

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn opt_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

fn req_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str, String> {
    opt_str(payload, key).ok_or_else(|| format!("payload.{key} is required"))
}

fn parse_indices(payload: &Value) -> Result<Vec<usize>, String> {
    let arr = payload
        .get("indices")
        .and_then(|v| v.as_array())
        .ok_or_else(|| "payload.indices is required".to_string())?;

    arr.iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| format!("invalid index at position {i}"))
        })
        .collect()
}

fn parse_suggestions(payload: &Value) -> Result<Vec<TranslationSuggestion>, String> {
    let arr = payload
        .get("suggestions")
        .and_then(|v| v.as_array())
        .ok_or_else(|| "payload.suggestions must be an array".to_string())?;

    let mut out = Vec::with_capacity(arr.len());
    for (i, v) in arr.iter().cloned().enumerate() {
        match serde_json::from_value::<TranslationSuggestion>(v) {
            Ok(s) => out.push(s),
            Err(e) => return Err(format!("invalid suggestion at index {i}: {e}")),
        }
    }
    Ok(out)
}

/// Everything one host connection works against.
pub struct Session {
    store: Arc<Mutex<ContextStore>>,
    orchestrator: TranslationOrchestrator,
    events: Receiver<PipelineEvent>,
    languages: LanguageTable,
    prefs: LanguagePreferences,
    similarity_threshold: f64,
}

impl Session {
    pub fn new(
        store: ContextStore,
        translator: Arc<dyn Translator>,
        languages: LanguageTable,
        cfg: &CoreConfig,
    ) -> Self {
        let prefs = LanguagePreferences::load(store.settings());
        let store = Arc::new(Mutex::new(store));

        let (tx, events) = mpsc::channel();
        let orchestrator = TranslationOrchestrator::new(
            store.clone(),
            translator,
            Arc::new(ChannelListener::new(tx)),
        )
        .with_suggestion_threshold(cfg.suggestion_threshold);

        Session {
            store,
            orchestrator,
            events,
            languages,
            prefs,
            similarity_threshold: cfg.similarity_threshold,
        }
    }

    /// Handles one input line and returns the lines to write, reply last.
    pub fn handle(&mut self, input: &str) -> Vec<String> {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return vec![json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string()];
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);

        let reply = match self.dispatch(Command::from(cmd_str), payload) {
            Ok(p) => ok(id, p),
            Err(e) => {
                log::debug!("{cmd_str:?} failed: {e}");
                err(id, e)
            }
        };

        let mut lines = self.drain_events();
        lines.push(reply);
        lines
    }

    fn drain_events(&self) -> Vec<String> {
        self.events
            .try_iter()
            .filter_map(|event| match serde_json::to_string(&event) {
                Ok(line) => Some(line),
                Err(e) => {
                    log::error!("could not serialize pipeline event: {e}");
                    None
                }
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, ContextStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Code for a translation target; `auto` is only valid as a source.
    fn target_code(&self, raw: &str) -> Result<String, String> {
        match self.languages.code_for(raw) {
            Some(code) if code != AUTO => Ok(code.to_string()),
            _ => Err(format!("unknown target language: {raw}")),
        }
    }

    fn save_prefs(&self) -> Result<(), String> {
        let mut store = self.lock();
        self.prefs
            .save(store.settings_mut())
            .map_err(|e| e.to_string())
    }

    fn dispatch(&mut self, cmd: Command, payload: &Value) -> Result<Value, String> {
        match cmd {
            Command::Ping => Ok(json!({ "message": "quicktranslate-core alive" })),

            Command::ContextList => {
                let store = self.lock();
                let contexts: Vec<Value> = store
                    .contexts()
                    .iter()
                    .map(|c| {
                        json!({
                            "name": c.name,
                            "keywords": c.keywords,
                            "translations": c.translations
                        })
                    })
                    .collect();
                Ok(json!({ "contexts": contexts }))
            }

            Command::ContextAdd => {
                let name = req_str(payload, "name")?;
                let added = self.lock().add_context(name).map_err(|e| e.to_string())?;
                Ok(json!({ "added": added }))
            }

            Command::ContextDelete => {
                let name = req_str(payload, "name")?;
                self.lock().delete_context(name).map_err(|e| e.to_string())?;
                Ok(json!({ "deleted": name }))
            }

            Command::ContextClassify => {
                let text = req_str(payload, "text")?;
                Ok(json!({ "context": self.lock().get_context_for_text(text) }))
            }

            Command::KeywordAdd | Command::KeywordRemove => {
                let context = req_str(payload, "context")?;
                let keyword = req_str(payload, "keyword")?;

                let mut store = self.lock();
                let outcome = if cmd == Command::KeywordAdd {
                    store.add_keyword(context, keyword)
                } else {
                    store.remove_keyword(context, keyword)
                };
                outcome.map_err(|e| e.to_string())?;

                Ok(json!({ "context": context, "keywords": store.keywords(context) }))
            }

            Command::TranslationAdd => {
                let context = req_str(payload, "context")?;
                let original = req_str(payload, "original")?;
                let translation = req_str(payload, "translation")?;

                let outcome = self
                    .lock()
                    .add_translation(context, original, translation)
                    .map_err(|e| e.to_string())?;
                Ok(json!({ "outcome": outcome }))
            }

            Command::DictionaryList => Ok(json!({ "entries": self.lock().entries() })),

            Command::DictionaryAdd => {
                let original = req_str(payload, "original")?;
                let translation = req_str(payload, "translation")?;
                let context = opt_str(payload, "context").unwrap_or("");

                let outcome = self
                    .lock()
                    .add_entry(original, translation, context)
                    .map_err(|e| e.to_string())?;
                Ok(json!({ "outcome": outcome }))
            }

            Command::DictionaryDelete => {
                let indices = parse_indices(payload)?;
                let removed = self
                    .lock()
                    .delete_entries(&indices)
                    .map_err(|e| e.to_string())?;
                Ok(json!({ "removed": removed }))
            }

            Command::DictionaryLookup => {
                let text = req_str(payload, "text")?;
                let threshold = payload
                    .get("threshold")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(self.similarity_threshold);

                let store = self.lock();
                let context = match opt_str(payload, "context") {
                    Some(c) => c.to_string(),
                    None => store.get_context_for_text(text),
                };
                let result = store.get_translation_result(text, &context, threshold);
                Ok(json!({ "context": context, "result": result }))
            }

            Command::DictionarySimilar => {
                let text = req_str(payload, "text")?;
                let threshold = payload
                    .get("threshold")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(self.similarity_threshold);
                Ok(json!({ "entries": self.lock().get_similar_entries(text, threshold) }))
            }

            Command::Translate => {
                let text = payload.get("text").and_then(|v| v.as_str()).unwrap_or("");

                let (default_from, default_to) = self.prefs.current_pair();
                let from = self
                    .languages
                    .resolve_code(opt_str(payload, "source_lang").unwrap_or(default_from));
                let to = self.target_code(opt_str(payload, "target_lang").unwrap_or(default_to))?;

                if !text.trim().is_empty() && self.prefs.record_pair(&from, &to) {
                    if let Err(e) = self.save_prefs() {
                        log::error!("could not persist language preferences: {e}");
                    }
                }

                let result = self.orchestrator.translate_text(text, &from, &to);
                serde_json::to_value(result).map_err(|e| e.to_string())
            }

            Command::SuggestionsApply => {
                let text = payload
                    .get("text")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "payload.text is required".to_string())?;
                let mut chosen = parse_suggestions(payload)?;

                let resolve = payload
                    .get("resolve_overlaps")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true);
                if resolve {
                    chosen = suggestions::resolve_overlaps(&chosen);
                }

                Ok(json!({
                    "text": suggestions::apply_suggestions(text, &chosen),
                    "applied": chosen.len()
                }))
            }

            Command::LanguagesList => Ok(json!({
                "source": self.languages.source_languages(),
                "target": self.languages.target_languages(),
                "enabled": self.prefs.enabled_languages
            })),

            Command::LanguagesResolve => {
                if let Some(name) = opt_str(payload, "name") {
                    return Ok(json!({ "code": self.languages.resolve_code(name) }));
                }
                let code = req_str(payload, "code")?;
                Ok(json!({ "name": self.languages.display_name(code) }))
            }

            Command::PrefsGet => {
                let (from, to) = self.prefs.current_pair();
                Ok(json!({
                    "prefs": self.prefs,
                    "current": { "from": from, "to": to }
                }))
            }

            Command::PrefsSetPair => {
                let from = self.languages.resolve_code(req_str(payload, "from")?);
                let to = self.target_code(req_str(payload, "to")?)?;

                if self.prefs.record_pair(&from, &to) {
                    self.save_prefs()?;
                }
                Ok(json!({ "prefs": self.prefs }))
            }

            Command::PrefsSetEnabled => {
                let codes: Vec<String> = payload
                    .get("languages")
                    .and_then(|v| v.as_array())
                    .ok_or_else(|| "payload.languages is required".to_string())?
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();

                self.prefs.set_enabled(&codes, &self.languages);
                self.save_prefs()?;
                Ok(json!({ "enabled": self.prefs.enabled_languages }))
            }

            Command::Unknown => Err("unknown command".to_string()),
        }
    }
}
