use serde_json::{Map, Value};

use super::model::{LookupResult, SimilarEntry};
use super::{classifier, matcher, normalize};
use crate::error::CoreResult;
use crate::model::context::Context;
use crate::model::entry::{DictionaryEntry, EntryUpsert};
use crate::services::settings_store::{SettingsStore, KEY_CONTEXTS, KEY_DICTIONARY};

/// Single source of truth for contexts and the personal dictionary.
///
/// Contexts keep insertion order. Every mutator persists before returning, so
/// a reader never sees state that is not also on disk.
pub struct ContextStore {
    settings: Box<dyn SettingsStore>,
    contexts: Vec<Context>,
    entries: Vec<DictionaryEntry>,
}

impl ContextStore {
    /// Loads the vocabulary from `settings`, persisting it once if loading had
    /// to repair or seed anything.
    pub fn open(settings: Box<dyn SettingsStore>) -> CoreResult<Self> {
        let mut store = ContextStore {
            settings,
            contexts: Vec::new(),
            entries: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Re-reads contexts and dictionary from the settings backend.
    pub fn load(&mut self) -> CoreResult<&[Context]> {
        let (contexts, ctx_repaired) =
            normalize::contexts_from_value(self.settings.get(KEY_CONTEXTS).as_ref());
        let (entries, entries_repaired) =
            normalize::entries_from_value(self.settings.get(KEY_DICTIONARY).as_ref());

        self.contexts = contexts;
        self.entries = entries;

        let synced = self.sync_entries();

        if ctx_repaired || entries_repaired || synced {
            log::debug!(
                "vocabulary repaired on load (contexts={ctx_repaired}, entries={entries_repaired}, synced={synced})"
            );
            self.save()?;
        }

        log::debug!(
            "loaded {} contexts, {} dictionary entries",
            self.contexts.len(),
            self.entries.len()
        );

        Ok(&self.contexts)
    }

    /// Makes every entry's context exist and carry the entry's translation.
    fn sync_entries(&mut self) -> bool {
        let mut changed = false;

        for i in 0..self.entries.len() {
            let key = self.entries[i].key();
            let context = self.entries[i].context.clone();
            let translation = self.entries[i].translation.clone();

            let ctx = self.context_or_insert(&context);
            if ctx.translations.get(&key) != Some(&translation) {
                ctx.translations.insert(key, translation);
                changed = true;
            }
        }

        changed
    }

    pub fn save(&mut self) -> CoreResult<()> {
        let contexts = self.contexts_value()?;
        let entries = serde_json::to_value(&self.entries)?;

        self.settings
            .set_many(vec![(KEY_CONTEXTS, contexts), (KEY_DICTIONARY, entries)])
    }

    /// Contexts as persisted: name -> {keywords: [sorted], translations: {..}}.
    pub fn contexts_value(&self) -> CoreResult<Value> {
        let mut map = Map::new();
        for ctx in &self.contexts {
            map.insert(ctx.name.clone(), serde_json::to_value(ctx)?);
        }
        Ok(Value::Object(map))
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn context_names(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.context(name).is_some()
    }

    /// Keywords of `context`, sorted. Empty when the context does not exist.
    pub fn keywords(&self, context: &str) -> Vec<String> {
        self.context(context)
            .map(|c| c.keywords.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        self.settings.as_mut()
    }

    pub(super) fn context_or_insert(&mut self, name: &str) -> &mut Context {
        let idx = match self.contexts.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                log::debug!("creating context {name:?}");
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[idx]
    }

    pub(super) fn context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    pub(super) fn contexts_mut(&mut self) -> &mut Vec<Context> {
        &mut self.contexts
    }

    pub(super) fn entries_mut(&mut self) -> &mut Vec<DictionaryEntry> {
        &mut self.entries
    }

    pub fn add_keyword(&mut self, context: &str, keyword: &str) -> CoreResult<()> {
        let keyword = normalize::keyword(keyword);
        let ctx = self.context_or_insert(context);
        if !keyword.is_empty() {
            ctx.keywords.insert(keyword);
        }
        self.save()
    }

    /// No-op when `context` does not exist.
    pub fn remove_keyword(&mut self, context: &str, keyword: &str) -> CoreResult<()> {
        let keyword = normalize::keyword(keyword);
        match self.context_mut(context) {
            Some(ctx) => {
                ctx.keywords.remove(&keyword);
                self.save()
            }
            None => Ok(()),
        }
    }

    /// Stores `original -> translation` in `context` (created if absent) and
    /// mirrors it into the dictionary list.
    pub fn add_translation(
        &mut self,
        context: &str,
        original: &str,
        translation: &str,
    ) -> CoreResult<EntryUpsert> {
        self.context_or_insert(context)
            .translations
            .insert(original.to_lowercase(), translation.to_string());

        let existing = self.entries.iter().position(|e| e.matches(original, context));
        let outcome = match existing {
            Some(idx) => {
                self.entries[idx].translation = translation.to_string();
                EntryUpsert::Updated
            }
            None => {
                self.entries
                    .push(DictionaryEntry::new(original, translation, context));
                EntryUpsert::Added
            }
        };

        self.save()?;
        Ok(outcome)
    }

    pub fn get_context_for_text(&self, text: &str) -> String {
        classifier::classify(&self.contexts, text).to_string()
    }

    /// Exact lookup in `context`, then in General.
    pub fn get_translation(&self, text: &str, context: &str) -> Option<String> {
        matcher::exact(&self.contexts, text, context).map(str::to_string)
    }

    pub fn get_similar_entries(&self, text: &str, threshold: f64) -> Vec<SimilarEntry> {
        matcher::similar(&self.entries, text, threshold)
    }

    pub fn get_translation_result(&self, text: &str, context: &str, threshold: f64) -> LookupResult {
        matcher::lookup(&self.contexts, &self.entries, text, context, threshold)
    }

    /// Owned copy of a context's translation map, empty for unknown names.
    pub fn translations_of(&self, name: &str) -> Vec<(String, String)> {
        self.context(name)
            .map(|c| {
                c.translations
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
