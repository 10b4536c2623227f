#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    ContextList,
    ContextAdd,
    ContextDelete,
    ContextClassify,
    KeywordAdd,
    KeywordRemove,
    TranslationAdd,
    DictionaryList,
    DictionaryAdd,
    DictionaryDelete,
    DictionaryLookup,
    DictionarySimilar,
    Translate,
    SuggestionsApply,
    LanguagesList,
    LanguagesResolve,
    PrefsGet,
    PrefsSetPair,
    PrefsSetEnabled,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "context.list" => Command::ContextList,
            "context.add" => Command::ContextAdd,
            "context.delete" => Command::ContextDelete,
            "context.classify" => Command::ContextClassify,
            "keyword.add" => Command::KeywordAdd,
            "keyword.remove" => Command::KeywordRemove,
            "translation.add" => Command::TranslationAdd,
            "dictionary.list" => Command::DictionaryList,
            "dictionary.add" => Command::DictionaryAdd,
            "dictionary.delete" => Command::DictionaryDelete,
            "dictionary.lookup" => Command::DictionaryLookup,
            "dictionary.similar" => Command::DictionarySimilar,
            "translate" => Command::Translate,
            "suggestions.apply" => Command::SuggestionsApply,
            "languages.list" => Command::LanguagesList,
            "languages.resolve" => Command::LanguagesResolve,
            "prefs.get" => Command::PrefsGet,
            "prefs.set_pair" => Command::PrefsSetPair,
            "prefs.set_enabled" => Command::PrefsSetEnabled,
            _ => Command::Unknown,
        }
    }
}
