use crate::model::context::GENERAL;
use crate::model::translation::{TranslationResult, TranslationStatus, TranslationSuggestion};
use crate::services::{
    similarity,
    translator_types::Translator,
    vocabulary::ContextStore,
};

use serde::Serialize;
use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc::Sender,
    Arc, Mutex, MutexGuard, PoisonError,
};

pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.85;

/// Receives pipeline output. Both hooks default to doing nothing.
pub trait TranslationListener: Send + Sync {
    fn translation_ready(&self, _result: &TranslationResult) {}

    /// Only called with a non-empty list.
    fn suggestions_ready(&self, _suggestions: &[TranslationSuggestion]) {}
}

pub struct NoopListener;

impl TranslationListener for NoopListener {}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum PipelineEvent {
    TranslationReady(TranslationResult),
    SuggestionsReady(Vec<TranslationSuggestion>),
}

/// Forwards notifications into a channel; a closed receiver is ignored.
pub struct ChannelListener {
    tx: Mutex<Sender<PipelineEvent>>,
}

impl ChannelListener {
    pub fn new(tx: Sender<PipelineEvent>) -> Self {
        ChannelListener { tx: Mutex::new(tx) }
    }

    fn send(&self, event: PipelineEvent) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if tx.send(event).is_err() {
            log::debug!("event receiver dropped");
        }
    }
}

impl TranslationListener for ChannelListener {
    fn translation_ready(&self, result: &TranslationResult) {
        self.send(PipelineEvent::TranslationReady(result.clone()));
    }

    fn suggestions_ready(&self, suggestions: &[TranslationSuggestion]) {
        self.send(PipelineEvent::SuggestionsReady(suggestions.to_vec()));
    }
}

/// classify -> translate -> overlay scan -> emit.
pub struct TranslationOrchestrator {
    store: Arc<Mutex<ContextStore>>,
    translator: Arc<dyn Translator>,
    listener: Arc<dyn TranslationListener>,
    suggestion_threshold: f64,
    generation: AtomicU64,
}

impl TranslationOrchestrator {
    pub fn new(
        store: Arc<Mutex<ContextStore>>,
        translator: Arc<dyn Translator>,
        listener: Arc<dyn TranslationListener>,
    ) -> Self {
        TranslationOrchestrator {
            store,
            translator,
            listener,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_suggestion_threshold(mut self, threshold: f64) -> Self {
        self.suggestion_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn suggestion_threshold(&self) -> f64 {
        self.suggestion_threshold
    }

    /// Starts a new request and returns its ticket. Any older ticket still in
    /// flight is superseded from this point on.
    pub fn begin_request(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    pub fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResult {
        let ticket = self.begin_request();
        self.run(ticket, text, source_lang, target_lang)
    }

    /// Runs one request under an existing ticket.
    ///
    /// Translator failures come back as a `Failed` result; nothing here
    /// panics or propagates an error to the caller.
    pub fn run(&self, ticket: u64, text: &str, source_lang: &str, target_lang: &str) -> TranslationResult {
        if text.trim().is_empty() {
            return TranslationResult::empty_input();
        }

        let context = self.lock_store().get_context_for_text(text);
        log::debug!("request {ticket}: context {context:?}");

        // the store lock is not held across the translator call
        let raw = match self.translator.translate(text, source_lang, target_lang) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("request {ticket}: translation failed: {e}");
                let result = TranslationResult::failed(context, e.to_string());
                return self.emit(ticket, result);
            }
        };

        if !self.is_current(ticket) {
            log::debug!("request {ticket}: superseded before overlay scan");
            return TranslationResult::superseded(context);
        }

        let suggestions = {
            let store = self.lock_store();
            overlay_scan(&store, &raw.translated_text, &context, self.suggestion_threshold)
        };
        log::debug!("request {ticket}: {} suggestions", suggestions.len());

        let detected_language = if raw.detected_source_lang.trim().is_empty() {
            source_lang.to_string()
        } else {
            raw.detected_source_lang
        };

        let result = TranslationResult {
            full_text: raw.translated_text,
            detected_language,
            suggestions,
            context,
            status: TranslationStatus::Translated,
        };

        self.emit(ticket, result)
    }

    fn emit(&self, ticket: u64, result: TranslationResult) -> TranslationResult {
        if !self.is_current(ticket) {
            log::debug!("request {ticket}: superseded, dropping result");
            return TranslationResult::superseded(result.context);
        }

        self.listener.translation_ready(&result);
        if !result.suggestions.is_empty() {
            self.listener.suggestions_ready(&result.suggestions);
        }

        result
    }

    fn lock_store(&self) -> MutexGuard<'_, ContextStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Suggestions for every dictionary term of `context`, then of General,
/// found in `translated`. General terms already found under `context` are
/// skipped. Ordered by start position, `context` first on equal starts.
pub fn overlay_scan(
    store: &ContextStore,
    translated: &str,
    context: &str,
    threshold: f64,
) -> Vec<TranslationSuggestion> {
    let mut suggestions = Vec::new();
    let mut found: HashSet<String> = HashSet::new();

    for (original, translation) in store.translations_of(context) {
        let matches = scan_term(translated, &original, &translation, context, threshold);
        if !matches.is_empty() {
            found.insert(original);
            suggestions.extend(matches);
        }
    }

    if context != GENERAL {
        for (original, translation) in store.translations_of(GENERAL) {
            if found.contains(&original) {
                continue;
            }
            suggestions.extend(scan_term(translated, &original, &translation, GENERAL, threshold));
        }
    }

    suggestions.sort_by_key(|s| s.start_pos);
    suggestions
}

fn scan_term(
    translated: &str,
    original: &str,
    translation: &str,
    context: &str,
    threshold: f64,
) -> Vec<TranslationSuggestion> {
    let chars: Vec<char> = translated.chars().collect();

    find_term_positions(&chars, original)
        .into_iter()
        .filter_map(|(start, end)| {
            let window: String = chars[start..end].iter().collect();
            // the finder is exact, so this is 1.0 today; it gates fuzzier finders
            let confidence = similarity::ratio_ignore_case(&window, original);
            (confidence >= threshold).then(|| TranslationSuggestion {
                original_word: window,
                suggested_word: translation.to_string(),
                context: context.to_string(),
                confidence,
                start_pos: start,
                end_pos: end,
            })
        })
        .collect()
}

/// Every case-insensitive occurrence of `term` in `text`, as char ranges.
/// Occurrences may overlap ("aa" is found twice in "aaa").
///
/// Both sides are compared in lower-cased form. A char whose lower case is
/// longer than one char ('İ') still maps back to a single position, and a
/// match never starts or ends inside such an expansion.
pub fn find_term_positions(text: &[char], term: &str) -> Vec<(usize, usize)> {
    let term: Vec<char> = term.chars().flat_map(char::to_lowercase).collect();

    // (lower-cased char, index of the char in `text` it came from)
    let folded: Vec<(char, usize)> = text
        .iter()
        .enumerate()
        .flat_map(|(i, c)| c.to_lowercase().map(move |l| (l, i)))
        .collect();

    if term.is_empty() || term.len() > folded.len() {
        return Vec::new();
    }

    (0..=folded.len() - term.len())
        .filter_map(|start| {
            let end = start + term.len();
            let starts_on_char = start == 0 || folded[start - 1].1 != folded[start].1;
            let ends_on_char = end == folded.len() || folded[end].1 != folded[end - 1].1;
            let same = folded[start..end].iter().zip(&term).all(|(&(a, _), &b)| a == b);

            (starts_on_char && ends_on_char && same)
                .then(|| (folded[start].1, folded[end - 1].1 + 1))
        })
        .collect()
}
