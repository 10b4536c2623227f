//! Applying accepted suggestions back into translated text.
//!
//! Offsets are `char` positions. `apply_suggestions` sorts by start and then
//! splices from the highest offset down, so every splice leaves the offsets of
//! the suggestions still waiting untouched. Overlapping spans are not handled
//! there; pass the list through [`resolve_overlaps`] first when that can
//! happen.

use std::cmp::Ordering;

use crate::model::translation::TranslationSuggestion;

/// Replaces `text[start_pos..end_pos]` with the suggested word.
///
/// Offsets past the end of `text` are clamped; an `end_pos` before
/// `start_pos` inserts without removing anything.
pub fn apply_suggestion(text: &str, suggestion: &TranslationSuggestion) -> String {
    let start = byte_offset(text, suggestion.start_pos);
    let end = byte_offset(text, suggestion.end_pos.max(suggestion.start_pos));

    let mut out = String::with_capacity(text.len() + suggestion.suggested_word.len());
    out.push_str(&text[..start]);
    out.push_str(&suggestion.suggested_word);
    out.push_str(&text[end..]);
    out
}

pub fn apply_suggestions(text: &str, suggestions: &[TranslationSuggestion]) -> String {
    let mut ordered: Vec<&TranslationSuggestion> = suggestions.iter().collect();
    ordered.sort_by_key(|s| s.start_pos);

    ordered
        .iter()
        .rev()
        .fold(text.to_string(), |acc, s| apply_suggestion(&acc, s))
}

/// Keeps a subset of `suggestions` with no two spans intersecting.
///
/// Candidates are taken by confidence (highest first), then span length
/// (longest first), then start position; a candidate that intersects one
/// already kept is dropped. The result is ordered by `start_pos`.
pub fn resolve_overlaps(suggestions: &[TranslationSuggestion]) -> Vec<TranslationSuggestion> {
    let mut ranked: Vec<&TranslationSuggestion> = suggestions.iter().collect();
    ranked.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| b.span_len().cmp(&a.span_len()))
            .then_with(|| a.start_pos.cmp(&b.start_pos))
    });

    let mut kept: Vec<TranslationSuggestion> = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        if kept.iter().any(|k| k.overlaps(candidate)) {
            log::debug!(
                "dropping overlapping suggestion {:?} at {}..{}",
                candidate.original_word,
                candidate.start_pos,
                candidate.end_pos
            );
            continue;
        }
        kept.push(candidate.clone());
    }

    kept.sort_by(|a, b| match a.start_pos.cmp(&b.start_pos) {
        Ordering::Equal => a.end_pos.cmp(&b.end_pos),
        other => other,
    });
    kept
}

fn byte_offset(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
