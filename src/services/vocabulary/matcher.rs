use super::model::{LookupResult, SimilarEntry};
use crate::model::context::{Context, GENERAL};
use crate::model::entry::DictionaryEntry;
use crate::services::similarity;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Exact, case-insensitive lookup in `context`, falling back to General.
pub fn exact<'a>(contexts: &'a [Context], text: &str, context: &str) -> Option<&'a str> {
    let find = |name: &str| {
        contexts
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.translation_for(text))
    };

    find(context).or_else(|| find(GENERAL))
}

/// Entries from every context whose original is at least `threshold` similar
/// to `text`, best first. Equal scores keep dictionary order.
pub fn similar(entries: &[DictionaryEntry], text: &str, threshold: f64) -> Vec<SimilarEntry> {
    let text_lower = text.to_lowercase();

    let mut found: Vec<SimilarEntry> = entries
        .iter()
        .filter_map(|e| {
            let score = similarity::ratio(&text_lower, &e.original.to_lowercase());
            (score >= threshold).then(|| SimilarEntry {
                original: e.original.clone(),
                translation: e.translation.clone(),
                context: e.context.clone(),
                similarity: score,
            })
        })
        .collect();

    // sort_by is stable
    found.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    found
}

pub fn lookup(
    contexts: &[Context],
    entries: &[DictionaryEntry],
    text: &str,
    context: &str,
    threshold: f64,
) -> LookupResult {
    if let Some(t) = exact(contexts, text, context) {
        return LookupResult::Exact {
            translation: t.to_string(),
        };
    }

    let entries = similar(entries, text, threshold);
    if entries.is_empty() {
        LookupResult::None
    } else {
        LookupResult::Similar { entries }
    }
}
