//! Dictionary editor operations.
//!
//! These are the destructive edits a dictionary UI performs. Unlike the
//! lookup paths they fail loudly: a UI is expected to show the error and ask
//! before retrying.

use std::collections::BTreeSet;

use super::normalize;
use super::store::ContextStore;
use crate::error::{CoreError, CoreResult};
use crate::model::context::{Context, GENERAL};
use crate::model::entry::{DictionaryEntry, EntryUpsert};

impl ContextStore {
    /// Adds `original -> translation`, or updates the translation when the
    /// same original already exists in that context.
    pub fn add_entry(
        &mut self,
        original: &str,
        translation: &str,
        context: &str,
    ) -> CoreResult<EntryUpsert> {
        let original = normalize::clean_term(original);
        let translation = translation.trim();
        let context = match context.trim() {
            "" => GENERAL,
            c => c,
        };

        if original.is_empty() {
            return Err(CoreError::EmptyField("original"));
        }
        if translation.is_empty() {
            return Err(CoreError::EmptyField("translation"));
        }

        let outcome = self.add_translation(context, &original, translation)?;
        log::debug!("dictionary entry {original:?} in {context:?}: {outcome:?}");
        Ok(outcome)
    }

    /// Removes the entries at `indices` (positions in [`ContextStore::entries`]).
    ///
    /// Nothing is removed if any index is out of range. A context keeps the
    /// translation key while another entry still maps it.
    pub fn delete_entries(&mut self, indices: &[usize]) -> CoreResult<usize> {
        let unique: BTreeSet<usize> = indices.iter().copied().collect();

        if let Some(&bad) = unique.iter().find(|&&i| i >= self.entries().len()) {
            return Err(CoreError::EntryIndex(bad));
        }
        if unique.is_empty() {
            return Ok(0);
        }

        let mut removed: Vec<DictionaryEntry> = Vec::with_capacity(unique.len());
        for &i in unique.iter().rev() {
            removed.push(self.entries_mut().remove(i));
        }

        for entry in &removed {
            let key = entry.key();
            let still_mapped = self
                .entries()
                .iter()
                .any(|e| e.context == entry.context && e.key() == key);
            if still_mapped {
                continue;
            }
            if let Some(ctx) = self.context_mut(&entry.context) {
                ctx.translations.remove(&key);
            }
        }

        self.save()?;
        log::debug!("deleted {} dictionary entries", removed.len());
        Ok(removed.len())
    }

    /// Returns `false` when the context already exists.
    pub fn add_context(&mut self, name: &str) -> CoreResult<bool> {
        let name = normalize::clean_term(name);
        if name.is_empty() {
            return Err(CoreError::EmptyField("context name"));
        }
        if self.has_context(&name) {
            return Ok(false);
        }

        self.contexts_mut().push(Context::new(name));
        self.save()?;
        Ok(true)
    }

    /// Deletes a context together with its keywords and dictionary entries.
    pub fn delete_context(&mut self, name: &str) -> CoreResult<()> {
        if name == GENERAL {
            return Err(CoreError::ProtectedContext(name.to_string()));
        }
        if !self.has_context(name) {
            return Err(CoreError::UnknownContext(name.to_string()));
        }

        self.contexts_mut().retain(|c| c.name != name);
        self.entries_mut().retain(|e| e.context != name);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::settings_store::MemoryStore;

    fn store() -> ContextStore {
        ContextStore::open(Box::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn add_entry_requires_both_fields() {
        let mut s = store();
        assert_eq!(
            s.add_entry("  ", "x", "General"),
            Err(CoreError::EmptyField("original"))
        );
        assert_eq!(
            s.add_entry("server", " ", "General"),
            Err(CoreError::EmptyField("translation"))
        );
        assert!(s.entries().is_empty());
    }

    #[test]
    fn add_entry_updates_duplicates_in_same_context() {
        let mut s = store();
        assert_eq!(s.add_entry("Server", "שרת", "Technical"), Ok(EntryUpsert::Added));
        assert_eq!(s.add_entry("server", "מגיש", "Technical"), Ok(EntryUpsert::Updated));
        assert_eq!(s.add_entry("server", "מלצר", "Business"), Ok(EntryUpsert::Added));

        assert_eq!(s.entries().len(), 2);
        assert_eq!(s.get_translation("server", "Technical").as_deref(), Some("מגיש"));
    }

    #[test]
    fn blank_context_means_general() {
        let mut s = store();
        s.add_entry("hello", "שלום", "").unwrap();
        assert_eq!(s.entries()[0].context, GENERAL);
    }

    #[test]
    fn delete_entries_drops_map_keys() {
        let mut s = store();
        s.add_entry("server", "שרת", "Technical").unwrap();
        s.add_entry("client", "לקוח", "Business").unwrap();
        s.add_entry("demo", "הדגמה", "Business").unwrap();

        assert_eq!(s.delete_entries(&[0, 2, 2]), Ok(2));
        assert_eq!(s.entries().len(), 1);
        assert_eq!(s.get_translation("server", "Technical"), None);
        assert_eq!(s.get_translation("demo", "Business"), None);
        assert_eq!(s.get_translation("client", "Business").as_deref(), Some("לקוח"));
    }

    #[test]
    fn delete_entries_out_of_range_removes_nothing() {
        let mut s = store();
        s.add_entry("server", "שרת", "Technical").unwrap();
        assert_eq!(s.delete_entries(&[0, 5]), Err(CoreError::EntryIndex(5)));
        assert_eq!(s.entries().len(), 1);
    }

    #[test]
    fn general_cannot_be_deleted() {
        let mut s = store();
        assert_eq!(
            s.delete_context("General"),
            Err(CoreError::ProtectedContext("General".to_string()))
        );
        assert_eq!(
            s.delete_context("Missing"),
            Err(CoreError::UnknownContext("Missing".to_string()))
        );
    }

    #[test]
    fn deleting_context_drops_its_entries() {
        let mut s = store();
        s.add_entry("client", "לקוח", "Business").unwrap();
        s.add_entry("hello", "שלום", "General").unwrap();

        s.delete_context("Business").unwrap();
        assert!(!s.has_context("Business"));
        assert_eq!(s.entries().len(), 1);
        assert_eq!(s.entries()[0].original, "hello");
    }

    #[test]
    fn add_context_is_idempotent() {
        let mut s = store();
        assert_eq!(s.add_context(" Legal "), Ok(true));
        assert_eq!(s.add_context("Legal"), Ok(false));
        assert_eq!(s.context_names().last(), Some(&"Legal"));
    }
}
