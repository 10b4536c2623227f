//! Coercion of persisted vocabulary state into the in-memory model.
//!
//! Anything malformed is repaired rather than reported: non-list keywords
//! become an empty set, non-mapping translations an empty map, unusable
//! dictionary rows are dropped. Each function also reports whether it had to
//! change anything so the caller can persist the repaired form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::context::{Context, DEFAULT_CONTEXTS, GENERAL};
use crate::model::entry::DictionaryEntry;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Trims and collapses inner whitespace runs to one space.
pub fn clean_term(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Trimmed and lower-cased. Inner whitespace is kept since keywords match
/// as raw substrings.
pub fn keyword(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn default_contexts() -> Vec<Context> {
    DEFAULT_CONTEXTS.iter().map(|n| Context::new(*n)).collect()
}

pub fn contexts_from_value(value: Option<&Value>) -> (Vec<Context>, bool) {
    let map = match value {
        Some(Value::Object(map)) if !map.is_empty() => map,
        None | Some(Value::Null) => return (default_contexts(), true),
        Some(Value::Object(_)) => return (default_contexts(), true),
        Some(other) => {
            log::warn!("stored contexts are {}, reseeding defaults", kind(other));
            return (default_contexts(), true);
        }
    };

    let mut repaired = false;
    let mut contexts = Vec::with_capacity(map.len() + 1);

    for (name, data) in map {
        let (ctx, fixed) = context_from_value(name, data);
        repaired |= fixed;
        contexts.push(ctx);
    }

    if !contexts.iter().any(|c| c.name == GENERAL) {
        contexts.insert(0, Context::new(GENERAL));
        repaired = true;
    }

    (contexts, repaired)
}

fn context_from_value(name: &str, data: &Value) -> (Context, bool) {
    let obj = match data {
        Value::Object(obj) => obj,
        other => {
            log::warn!("context {name:?} is {}, resetting it", kind(other));
            return (Context::new(name), true);
        }
    };

    let (keywords, kw_fixed) = keywords_from_value(name, obj.get("keywords"));
    let (translations, tr_fixed) = translations_from_value(name, obj.get("translations"));

    let ctx = Context {
        name: name.to_string(),
        keywords,
        translations,
    };

    (ctx, kw_fixed || tr_fixed)
}

fn keywords_from_value(context: &str, value: Option<&Value>) -> (BTreeSet<String>, bool) {
    let items = match value {
        Some(Value::Array(items)) => items,
        None => return (BTreeSet::new(), true),
        Some(other) => {
            log::warn!("keywords of {context:?} are {}, using an empty set", kind(other));
            return (BTreeSet::new(), true);
        }
    };

    let mut repaired = false;
    let mut set = BTreeSet::new();

    for item in items {
        match item.as_str() {
            Some(raw) => {
                let k = keyword(raw);
                if k.is_empty() || k != raw {
                    repaired = true;
                }
                if !k.is_empty() && !set.insert(k) {
                    repaired = true;
                }
            }
            None => repaired = true,
        }
    }

    (set, repaired)
}

fn translations_from_value(context: &str, value: Option<&Value>) -> (BTreeMap<String, String>, bool) {
    let obj = match value {
        Some(Value::Object(obj)) => obj,
        None => return (BTreeMap::new(), true),
        Some(other) => {
            log::warn!("translations of {context:?} are {}, using an empty map", kind(other));
            return (BTreeMap::new(), true);
        }
    };

    let mut repaired = false;
    let mut map = BTreeMap::new();

    for (original, translation) in obj {
        let Some(translation) = translation.as_str() else {
            repaired = true;
            continue;
        };

        let key = original.to_lowercase();
        if key != *original {
            repaired = true;
        }
        map.insert(key, translation.to_string());
    }

    (map, repaired)
}

pub fn entries_from_value(value: Option<&Value>) -> (Vec<DictionaryEntry>, bool) {
    let items = match value {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => return (Vec::new(), false),
        Some(other) => {
            log::warn!("stored dictionary is {}, dropping it", kind(other));
            return (Vec::new(), true);
        }
    };

    let mut repaired = false;
    let mut entries = Vec::with_capacity(items.len());

    for item in items {
        let Some(obj) = item.as_object() else {
            repaired = true;
            continue;
        };

        let original = str_field(obj, "original");
        if original.trim().is_empty() {
            repaired = true;
            continue;
        }

        let context = match str_field(obj, "context") {
            c if c.trim().is_empty() => {
                repaired = true;
                GENERAL.to_string()
            }
            c => c,
        };

        if !obj.get("translation").map_or(false, Value::is_string) {
            repaired = true;
        }

        entries.push(DictionaryEntry {
            original,
            translation: str_field(obj, "translation"),
            context,
        });
    }

    (entries, repaired)
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_term_collapses_whitespace() {
        assert_eq!(clean_term("  open \t source\n"), "open source");
    }

    #[test]
    fn keyword_keeps_inner_whitespace() {
        assert_eq!(keyword(" API  Gateway "), "api  gateway");
    }

    #[test]
    fn missing_storage_seeds_defaults() {
        let (contexts, repaired) = contexts_from_value(None);
        let names: Vec<&str> = contexts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["General", "Name", "Technical", "Business"]);
        assert!(repaired);
        assert!(contexts.iter().all(|c| c.keywords.is_empty() && c.translations.is_empty()));
    }

    #[test]
    fn malformed_collections_are_coerced() {
        let stored = json!({
            "General": {"keywords": [], "translations": {}},
            "Technical": {"keywords": "server", "translations": ["not", "a", "map"]},
            "Business": {"keywords": ["Client", 7, "client"], "translations": {"Invoice": "חשבונית", "bad": 3}}
        });

        let (contexts, repaired) = contexts_from_value(Some(&stored));
        assert!(repaired);

        let tech = &contexts[1];
        assert!(tech.keywords.is_empty());
        assert!(tech.translations.is_empty());

        let biz = &contexts[2];
        assert_eq!(biz.keywords.iter().collect::<Vec<_>>(), vec!["client"]);
        assert_eq!(biz.translations.get("invoice").map(String::as_str), Some("חשבונית"));
        assert!(!biz.translations.contains_key("bad"));
    }

    #[test]
    fn well_formed_contexts_need_no_repair() {
        let stored = json!({
            "General": {"keywords": ["hello"], "translations": {"hi": "שלום"}},
            "Name": {"keywords": [], "translations": {}}
        });
        let (contexts, repaired) = contexts_from_value(Some(&stored));
        assert!(!repaired);
        assert_eq!(contexts.len(), 2);
    }

    #[test]
    fn general_is_added_when_missing() {
        let stored = json!({"Legal": {"keywords": ["court"], "translations": {}}});
        let (contexts, repaired) = contexts_from_value(Some(&stored));
        assert!(repaired);
        assert_eq!(contexts[0].name, GENERAL);
        assert_eq!(contexts[1].name, "Legal");
    }

    #[test]
    fn unusable_dictionary_rows_are_dropped() {
        let stored = json!([
            {"original": "Server", "translation": "שרת", "context": "Technical"},
            {"original": "", "translation": "x"},
            "garbage",
            {"original": "meeting", "translation": "פגישה"}
        ]);

        let (entries, repaired) = entries_from_value(Some(&stored));
        assert!(repaired);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].context, GENERAL);
    }
}
