//! Language code <-> display name table.
//!
//! A value, not a global: build one with [`LanguageTable::builtin`] (or
//! [`LanguageTable::from_pairs`] for a fake in tests) and pass it to whoever
//! needs it.

use serde::Serialize;

pub const AUTO: &str = "auto";
const AUTO_NAME: &str = "Auto Detect";

const BUILTIN: &[(&str, &str)] = &[
    ("af", "afrikaans"),
    ("sq", "albanian"),
    ("am", "amharic"),
    ("ar", "arabic"),
    ("hy", "armenian"),
    ("az", "azerbaijani"),
    ("eu", "basque"),
    ("be", "belarusian"),
    ("bn", "bengali"),
    ("bs", "bosnian"),
    ("bg", "bulgarian"),
    ("ca", "catalan"),
    ("ceb", "cebuano"),
    ("ny", "chichewa"),
    ("zh-cn", "chinese (simplified)"),
    ("zh-tw", "chinese (traditional)"),
    ("co", "corsican"),
    ("hr", "croatian"),
    ("cs", "czech"),
    ("da", "danish"),
    ("nl", "dutch"),
    ("en", "english"),
    ("eo", "esperanto"),
    ("et", "estonian"),
    ("tl", "filipino"),
    ("fi", "finnish"),
    ("fr", "french"),
    ("fy", "frisian"),
    ("gl", "galician"),
    ("ka", "georgian"),
    ("de", "german"),
    ("el", "greek"),
    ("gu", "gujarati"),
    ("ht", "haitian creole"),
    ("ha", "hausa"),
    ("haw", "hawaiian"),
    ("he", "hebrew"),
    ("iw", "hebrew"),
    ("hi", "hindi"),
    ("hmn", "hmong"),
    ("hu", "hungarian"),
    ("is", "icelandic"),
    ("ig", "igbo"),
    ("id", "indonesian"),
    ("ga", "irish"),
    ("it", "italian"),
    ("ja", "japanese"),
    ("jw", "javanese"),
    ("kn", "kannada"),
    ("kk", "kazakh"),
    ("km", "khmer"),
    ("ko", "korean"),
    ("ku", "kurdish (kurmanji)"),
    ("ky", "kyrgyz"),
    ("lo", "lao"),
    ("la", "latin"),
    ("lv", "latvian"),
    ("lt", "lithuanian"),
    ("lb", "luxembourgish"),
    ("mk", "macedonian"),
    ("mg", "malagasy"),
    ("ms", "malay"),
    ("ml", "malayalam"),
    ("mt", "maltese"),
    ("mi", "maori"),
    ("mr", "marathi"),
    ("mn", "mongolian"),
    ("my", "myanmar (burmese)"),
    ("ne", "nepali"),
    ("no", "norwegian"),
    ("or", "odia"),
    ("ps", "pashto"),
    ("fa", "persian"),
    ("pl", "polish"),
    ("pt", "portuguese"),
    ("pa", "punjabi"),
    ("ro", "romanian"),
    ("ru", "russian"),
    ("sm", "samoan"),
    ("gd", "scots gaelic"),
    ("sr", "serbian"),
    ("st", "sesotho"),
    ("sn", "shona"),
    ("sd", "sindhi"),
    ("si", "sinhala"),
    ("sk", "slovak"),
    ("sl", "slovenian"),
    ("so", "somali"),
    ("es", "spanish"),
    ("su", "sundanese"),
    ("sw", "swahili"),
    ("sv", "swedish"),
    ("tg", "tajik"),
    ("ta", "tamil"),
    ("te", "telugu"),
    ("th", "thai"),
    ("tr", "turkish"),
    ("uk", "ukrainian"),
    ("ur", "urdu"),
    ("ug", "uyghur"),
    ("uz", "uzbek"),
    ("vi", "vietnamese"),
    ("cy", "welsh"),
    ("xh", "xhosa"),
    ("yi", "yiddish"),
    ("yo", "yoruba"),
    ("zu", "zulu"),
];

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct LanguageTable {
    // (code, display name); "auto" first
    entries: Vec<(String, String)>,
}

impl LanguageTable {
    /// The codes understood by the Google translate endpoint.
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN.iter().copied())
    }

    /// Builds a table from `(code, name)` pairs. Names are title-cased word by
    /// word; `auto` is always present.
    pub fn from_pairs<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: AsRef<str>,
        N: AsRef<str>,
    {
        let mut entries = vec![(AUTO.to_string(), AUTO_NAME.to_string())];

        for (code, name) in pairs {
            let code = code.as_ref().trim().to_lowercase();
            if code.is_empty() || code == AUTO {
                continue;
            }
            entries.push((code, proper_name(name.as_ref())));
        }

        LanguageTable { entries }
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        self.entries
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|(_, n)| n.as_str())
    }

    /// Code for a display name (case-insensitive). A string that already is a
    /// known code maps to itself. When two codes share a name the first one
    /// listed wins.
    pub fn code_for(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let lower = name.to_lowercase();
        self.entries
            .iter()
            .find(|(_, n)| n.to_lowercase() == lower)
            .or_else(|| self.entries.iter().find(|(c, _)| c.eq_ignore_ascii_case(name)))
            .map(|(c, _)| c.as_str())
    }

    /// Name for display; unknown codes come back capitalized, an empty code
    /// as "Unknown".
    pub fn display_name(&self, code: &str) -> String {
        if code.trim().is_empty() {
            return "Unknown".to_string();
        }
        match self.name_for(code) {
            Some(name) => name.to_string(),
            None => capitalize(code.trim()),
        }
    }

    /// Like [`code_for`](Self::code_for) but falls back to `auto`.
    pub fn resolve_code(&self, name: &str) -> String {
        self.code_for(name).unwrap_or(AUTO).to_string()
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.name_for(code).is_some()
    }

    pub fn source_languages(&self) -> Vec<LanguageInfo> {
        self.entries
            .iter()
            .map(|(code, name)| LanguageInfo {
                code: code.clone(),
                name: name.clone(),
            })
            .collect()
    }

    /// Everything except `auto`.
    pub fn target_languages(&self) -> Vec<LanguageInfo> {
        self.source_languages()
            .into_iter()
            .filter(|l| l.code != AUTO)
            .collect()
    }
}

fn proper_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| capitalize(&w.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_are_title_cased() {
        let table = LanguageTable::builtin();
        assert_eq!(table.name_for("en"), Some("English"));
        assert_eq!(table.name_for("ZH-CN"), Some("Chinese (simplified)"));
        assert_eq!(table.name_for("ht"), Some("Haitian Creole"));
        assert_eq!(table.name_for("auto"), Some("Auto Detect"));
    }

    #[test]
    fn code_lookup_accepts_names_and_codes() {
        let table = LanguageTable::builtin();
        assert_eq!(table.code_for("hebrew"), Some("he"));
        assert_eq!(table.code_for("Auto Detect"), Some("auto"));
        assert_eq!(table.code_for("FR"), Some("fr"));
        assert_eq!(table.code_for("Klingon"), None);
        assert_eq!(table.code_for(""), None);
    }

    #[test]
    fn fallbacks_are_explicit() {
        let table = LanguageTable::builtin();
        assert_eq!(table.resolve_code("Klingon"), "auto");
        assert_eq!(table.display_name("tlh"), "Tlh");
        assert_eq!(table.display_name(""), "Unknown");
    }

    #[test]
    fn fake_table_for_tests() {
        let table = LanguageTable::from_pairs([("xx", "test tongue"), ("auto", "ignored")]);
        assert_eq!(table.name_for("xx"), Some("Test Tongue"));
        assert_eq!(table.source_languages().len(), 2);
        assert_eq!(table.target_languages(), vec![LanguageInfo {
            code: "xx".into(),
            name: "Test Tongue".into(),
        }]);
    }
}
