use quicktranslate_core::config::CoreConfig;
use quicktranslate_core::protocol::Session;
use quicktranslate_core::services::languages::LanguageTable;
use quicktranslate_core::services::settings_store::JsonFileStore;
use quicktranslate_core::services::translator_types::{RawTranslation, TranslateError, Translator};
use quicktranslate_core::services::vocabulary::ContextStore;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Echoes the input back and remembers the language pair it was asked for.
#[derive(Default)]
struct EchoTranslator {
    fail_with: Option<TranslateError>,
    last_pair: Mutex<Option<(String, String)>>,
}

impl Translator for EchoTranslator {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<RawTranslation, TranslateError> {
        *self.last_pair.lock().unwrap() = Some((source_lang.to_string(), target_lang.to_string()));
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        Ok(RawTranslation {
            translated_text: text.to_string(),
            detected_source_lang: "en".to_string(),
        })
    }
}

fn session_with(path: &Path, translator: Arc<EchoTranslator>) -> Session {
    let store = ContextStore::open(Box::new(JsonFileStore::open(path))).expect("open store");
    Session::new(
        store,
        translator,
        LanguageTable::builtin(),
        &CoreConfig::default(),
    )
}

fn call(session: &mut Session, cmd: &str, payload: Value) -> Vec<Value> {
    let line = json!({ "id": 7, "cmd": cmd, "payload": payload }).to_string();
    session
        .handle(&line)
        .iter()
        .map(|l| serde_json::from_str(l).expect("reply is JSON"))
        .collect()
}

fn reply(session: &mut Session, cmd: &str, payload: Value) -> Value {
    let mut lines = call(session, cmd, payload);
    let last = lines.pop().expect("a reply line");
    assert_eq!(last["id"], 7);
    last
}

#[test]
fn ping_and_bad_input() {
    let temp = tempdir().expect("tempdir");
    let mut session = session_with(&temp.path().join("settings.json"), Arc::default());

    let pong = reply(&mut session, "ping", Value::Null);
    assert_eq!(pong["status"], "ok");

    let bad: Value = serde_json::from_str(&session.handle("{nope")[0]).expect("json");
    assert_eq!(bad["message"], "invalid json");

    let unknown = reply(&mut session, "window.show", json!({}));
    assert_eq!(unknown["status"], "error");
    assert_eq!(unknown["message"], "unknown command");

    let missing = reply(&mut session, "context.add", json!({}));
    assert_eq!(missing["message"], "payload.name is required");
}

#[test]
fn translate_emits_events_before_reply_and_suggestions_apply() {
    let temp = tempdir().expect("tempdir");
    let translator = Arc::new(EchoTranslator::default());
    let mut session = session_with(&temp.path().join("settings.json"), translator.clone());

    let added = reply(
        &mut session,
        "dictionary.add",
        json!({ "original": "bank", "translation": "גדה" }),
    );
    assert_eq!(added["payload"]["outcome"], "added");

    let lines = call(
        &mut session,
        "translate",
        json!({ "text": "Meet me at the Bank", "source_lang": "English", "target_lang": "he" }),
    );
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["event"], "translation_ready");
    assert_eq!(lines[1]["event"], "suggestions_ready");
    assert_eq!(lines[2]["status"], "ok");

    let result = &lines[2]["payload"];
    assert_eq!(result["context"], "General");
    assert_eq!(result["detected_language"], "en");
    assert_eq!(result["status"]["state"], "translated");
    let suggestion = &result["suggestions"][0];
    assert_eq!(suggestion["start_pos"], 15);
    assert_eq!(suggestion["end_pos"], 19);
    assert_eq!(
        translator.last_pair.lock().unwrap().clone(),
        Some(("en".to_string(), "he".to_string()))
    );

    let applied = reply(
        &mut session,
        "suggestions.apply",
        json!({ "text": result["full_text"], "suggestions": result["suggestions"] }),
    );
    assert_eq!(applied["payload"]["text"], "Meet me at the גדה");
}

#[test]
fn translator_failure_is_a_result_not_an_error() {
    let temp = tempdir().expect("tempdir");
    let translator = Arc::new(EchoTranslator {
        fail_with: Some(TranslateError::Network("offline".into())),
        ..EchoTranslator::default()
    });
    let mut session = session_with(&temp.path().join("settings.json"), translator);

    let lines = call(&mut session, "translate", json!({ "text": "hello", "target_lang": "fr" }));
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "translation_ready");

    let result = &lines[1]["payload"];
    assert_eq!(lines[1]["status"], "ok");
    assert_eq!(result["status"]["state"], "failed");
    assert_eq!(result["full_text"], "Translation error: network error: offline");
}

#[test]
fn empty_text_is_answered_without_events() {
    let temp = tempdir().expect("tempdir");
    let mut session = session_with(&temp.path().join("settings.json"), Arc::default());

    let lines = call(&mut session, "translate", json!({ "text": "   " }));
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["payload"]["status"]["state"], "empty_input");
}

#[test]
fn unknown_target_language_is_rejected() {
    let temp = tempdir().expect("tempdir");
    let mut session = session_with(&temp.path().join("settings.json"), Arc::default());

    let r = reply(&mut session, "translate", json!({ "text": "hi", "target_lang": "auto" }));
    assert_eq!(r["status"], "error");
    assert_eq!(r["message"], "unknown target language: auto");
}

#[test]
fn context_and_keyword_commands() {
    let temp = tempdir().expect("tempdir");
    let mut session = session_with(&temp.path().join("settings.json"), Arc::default());

    for (ctx, kw) in [("Technical", "server"), ("Technical", "crashed"), ("Business", "client"), ("Business", "demo")] {
        let r = reply(&mut session, "keyword.add", json!({ "context": ctx, "keyword": kw }));
        assert_eq!(r["status"], "ok");
    }

    let classified = reply(
        &mut session,
        "context.classify",
        json!({ "text": "The server crashed during the client demo" }),
    );
    assert_eq!(classified["payload"]["context"], "Technical");

    let removed = reply(
        &mut session,
        "keyword.remove",
        json!({ "context": "Technical", "keyword": "Crashed" }),
    );
    assert_eq!(removed["payload"]["keywords"], json!(["server"]));

    let protected = reply(&mut session, "context.delete", json!({ "name": "General" }));
    assert_eq!(protected["status"], "error");
    assert_eq!(protected["message"], "cannot delete the General context");

    let listed = reply(&mut session, "context.list", Value::Null);
    let names: Vec<&str> = listed["payload"]["contexts"]
        .as_array()
        .expect("contexts")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["General", "Name", "Technical", "Business"]);
}

#[test]
fn dictionary_lookup_exact_then_similar() {
    let temp = tempdir().expect("tempdir");
    let mut session = session_with(&temp.path().join("settings.json"), Arc::default());

    reply(
        &mut session,
        "translation.add",
        json!({ "context": "General", "original": "hello", "translation": "שלום" }),
    );

    let exact = reply(&mut session, "dictionary.lookup", json!({ "text": "HELLO" }));
    assert_eq!(exact["payload"]["result"], json!({ "type": "exact", "translation": "שלום" }));

    let similar = reply(&mut session, "dictionary.lookup", json!({ "text": "helo" }));
    assert_eq!(similar["payload"]["result"]["type"], "similar");
    assert_eq!(similar["payload"]["result"]["entries"][0]["original"], "hello");

    let nothing = reply(&mut session, "dictionary.lookup", json!({ "text": "xyz" }));
    assert_eq!(nothing["payload"]["result"]["type"], "none");

    let bad = reply(&mut session, "dictionary.delete", json!({ "indices": [4] }));
    assert_eq!(bad["message"], "no dictionary entry at index 4");

    let deleted = reply(&mut session, "dictionary.delete", json!({ "indices": [0] }));
    assert_eq!(deleted["payload"]["removed"], 1);
}

#[test]
fn language_preferences_persist_across_sessions() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("settings.json");

    {
        let mut session = session_with(&path, Arc::default());
        let r = reply(&mut session, "prefs.set_pair", json!({ "from": "he", "to": "English" }));
        assert_eq!(r["payload"]["prefs"]["last_to"], "en");

        let r = reply(&mut session, "prefs.set_enabled", json!({ "languages": ["fr", "bogus", "he"] }));
        assert_eq!(r["payload"]["enabled"], json!(["fr", "he"]));
    }

    let translator = Arc::new(EchoTranslator::default());
    let mut session = session_with(&path, translator.clone());

    let prefs = reply(&mut session, "prefs.get", Value::Null);
    assert_eq!(prefs["payload"]["current"], json!({ "from": "he", "to": "en" }));

    reply(&mut session, "translate", json!({ "text": "שלום" }));
    assert_eq!(
        translator.last_pair.lock().unwrap().clone(),
        Some(("he".to_string(), "en".to_string()))
    );

    let resolved = reply(&mut session, "languages.resolve", json!({ "name": "Klingon" }));
    assert_eq!(resolved["payload"]["code"], "auto");

    let listed = reply(&mut session, "languages.list", Value::Null);
    assert_eq!(listed["payload"]["source"][0]["code"], "auto");
    assert_ne!(listed["payload"]["target"][0]["code"], "auto");
}

#[test]
fn auto_is_not_a_target_for_the_saved_pair() {
    let temp = tempdir().expect("tempdir");
    let translator = Arc::new(EchoTranslator::default());
    let mut session = session_with(&temp.path().join("settings.json"), translator.clone());

    let r = reply(&mut session, "prefs.set_pair", json!({ "from": "en", "to": "auto" }));
    assert_eq!(r["status"], "error");
    assert_eq!(r["message"], "unknown target language: auto");

    let prefs = reply(&mut session, "prefs.get", Value::Null);
    assert_eq!(prefs["payload"]["prefs"]["last_to"], Value::Null);
    assert_eq!(prefs["payload"]["prefs"]["recent_languages"], json!([]));

    let lines = call(&mut session, "translate", json!({ "text": "hello" }));
    assert_eq!(lines.last().expect("reply")["status"], "ok");
    assert_eq!(
        translator.last_pair.lock().unwrap().clone(),
        Some(("auto".to_string(), "he".to_string()))
    );
}

#[test]
fn repeated_pair_does_not_rewrite_settings() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("settings.json");
    let mut session = session_with(&path, Arc::default());

    reply(&mut session, "translate", json!({ "text": "one", "target_lang": "fr" }));
    assert!(path.exists());

    std::fs::remove_file(&path).expect("remove");
    reply(&mut session, "translate", json!({ "text": "two", "target_lang": "fr" }));
    assert!(!path.exists(), "same pair, nothing to persist");

    reply(&mut session, "translate", json!({ "text": "three", "target_lang": "de" }));
    assert!(path.exists());
}
