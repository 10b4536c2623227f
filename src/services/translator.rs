use crate::services::translator_types::{RawTranslation, TranslateError, Translator};

use rand::{thread_rng, Rng};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::{json, Value};

use std::{str::FromStr, thread, time::Duration};

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const BASE_DELAY_MS: u64 = 300;
const MAX_DELAY_MS: u64 = 8_000;
pub const MAX_RETRIES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Public `translate_a/single` endpoint, no key.
    Google,
    OpenAi,
    DeepSeek,
}

impl Provider {
    fn default_endpoint(self) -> &'static str {
        match self {
            Provider::Google => GOOGLE_ENDPOINT,
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions",
            Provider::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
        }
    }

    fn needs_key(self) -> bool {
        !matches!(self, Provider::Google)
    }
}

impl FromStr for Provider {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" | "" => Ok(Provider::Google),
            "openai" => Ok(Provider::OpenAi),
            "deepseek" => Ok(Provider::DeepSeek),
            other => Err(TranslateError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

/// Blocking HTTP translator with retry on transient failures.
pub struct HttpTranslator {
    client: Client,
    cfg: TranslatorConfig,
    endpoint: String,
}

impl HttpTranslator {
    pub fn new(cfg: TranslatorConfig) -> Result<Self, TranslateError> {
        if cfg.provider.needs_key() && cfg.api_key.trim().is_empty() {
            return Err(TranslateError::MissingApiKey(format!("{:?}", cfg.provider)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        let endpoint = cfg
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| cfg.provider.default_endpoint().to_string());

        Ok(HttpTranslator {
            client,
            cfg,
            endpoint,
        })
    }

    fn send_with_retry<F>(&self, build: F) -> Result<String, TranslateError>
    where
        F: Fn() -> RequestBuilder,
    {
        let attempts = self.cfg.max_retries.clamp(1, MAX_RETRIES);
        let mut last_err = TranslateError::Network("no attempt made".into());

        for attempt in 0..attempts {
            let more = attempt + 1 < attempts;

            match build().send() {
                Ok(resp) => {
                    let status = resp.status();

                    // read as text first so an error body is not lost when it isn't JSON
                    let text = match resp.text() {
                        Ok(t) => t,
                        Err(err) => {
                            last_err = TranslateError::Network(err.to_string());
                            if more {
                                thread::sleep(backoff(attempt));
                                continue;
                            }
                            break;
                        }
                    };

                    if status.is_success() {
                        return Ok(text);
                    }

                    last_err = TranslateError::Http {
                        status: status.as_u16(),
                        message: extract_error_message(&text),
                    };
                    if should_retry_http(status) && more {
                        log::debug!("translator returned {status}, retrying");
                        thread::sleep(backoff(attempt));
                        continue;
                    }
                    break;
                }
                Err(err) => {
                    last_err = TranslateError::Network(err.to_string());
                    if more {
                        log::debug!("translator request failed ({err}), retrying");
                        thread::sleep(backoff(attempt));
                        continue;
                    }
                }
            }
        }

        Err(last_err)
    }

    fn translate_google(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<RawTranslation, TranslateError> {
        let body = self.send_with_retry(|| {
            self.client.get(&self.endpoint).query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
        })?;

        parse_google_response(&body, source_lang)
    }

    fn translate_chat(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<RawTranslation, TranslateError> {
        let body = json!({
            "model": self.cfg.model,
            "messages": [
                { "role": "system", "content": "You are a translation engine. Reply with the translation only." },
                { "role": "user", "content": build_prompt(text, source_lang, target_lang) }
            ],
            "temperature": 0.2
        });

        let response = self.send_with_retry(|| {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.cfg.api_key)
                .json(&body)
        })?;

        parse_chat_response(&response, source_lang)
    }
}

impl Translator for HttpTranslator {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<RawTranslation, TranslateError> {
        match self.cfg.provider {
            Provider::Google => self.translate_google(text, source_lang, target_lang),
            Provider::OpenAi | Provider::DeepSeek => {
                self.translate_chat(text, source_lang, target_lang)
            }
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..100);
    let exp = u32::try_from(attempt).unwrap_or(u32::MAX);
    let ms = BASE_DELAY_MS
        .saturating_mul(2_u64.saturating_pow(exp))
        .min(MAX_DELAY_MS);
    Duration::from_millis(ms + jitter)
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx are usually temporary
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(body_text: &str) -> String {
    // { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body_text.trim();
    match trimmed.char_indices().nth(400) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn build_prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
    let mut p = String::new();

    if source_lang.is_empty() || source_lang == "auto" {
        p.push_str(&format!("Translate to {target_lang}.\n"));
    } else {
        p.push_str(&format!("Translate from {source_lang} to {target_lang}.\n"));
    }

    p.push_str("Text:\n");
    p.push_str(text);
    p
}

/// `[[["translated","original",..],..], null, "detected", ..]`
fn parse_google_response(body: &str, source_lang: &str) -> Result<RawTranslation, TranslateError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| TranslateError::InvalidResponse(format!("not JSON: {e}")))?;

    let segments = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::InvalidResponse("missing translation segments".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|v| v.as_str()))
        .collect();

    let detected = json
        .get(2)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(source_lang);

    Ok(RawTranslation {
        translated_text: translated,
        detected_source_lang: detected.to_string(),
    })
}

fn parse_chat_response(body: &str, source_lang: &str) -> Result<RawTranslation, TranslateError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| TranslateError::InvalidResponse(format!("not JSON: {e}")))?;

    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            TranslateError::InvalidResponse("missing choices[0].message.content".into())
        })?;

    Ok(RawTranslation {
        translated_text: content.trim().to_string(),
        detected_source_lang: source_lang.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names() {
        assert_eq!("Google".parse::<Provider>(), Ok(Provider::Google));
        assert_eq!("".parse::<Provider>(), Ok(Provider::Google));
        assert_eq!("deepseek".parse::<Provider>(), Ok(Provider::DeepSeek));
        assert_eq!(
            "babelfish".parse::<Provider>(),
            Err(TranslateError::UnsupportedProvider("babelfish".into()))
        );
    }

    #[test]
    fn google_segments_are_joined() {
        let body = r#"[[["Hello ","שלום ",null,null,10],["world","עולם",null,null,10]],null,"iw",null]"#;
        let raw = parse_google_response(body, "auto").unwrap();
        assert_eq!(raw.translated_text, "Hello world");
        assert_eq!(raw.detected_source_lang, "iw");
    }

    #[test]
    fn google_without_detection_keeps_requested_source() {
        let raw = parse_google_response(r#"[[["Hi","היי"]]]"#, "he").unwrap();
        assert_eq!(raw.detected_source_lang, "he");
    }

    #[test]
    fn google_garbage_is_invalid() {
        assert!(matches!(
            parse_google_response("<html>", "auto"),
            Err(TranslateError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_google_response(r#"{"oops":1}"#, "auto"),
            Err(TranslateError::InvalidResponse(_))
        ));
    }

    #[test]
    fn chat_content_is_trimmed() {
        let body = r#"{"choices":[{"message":{"content":"  Bonjour\n"}}]}"#;
        let raw = parse_chat_response(body, "en").unwrap();
        assert_eq!(raw.translated_text, "Bonjour");
        assert_eq!(raw.detected_source_lang, "en");
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"quota exceeded"}}"#),
            "quota exceeded"
        );
        assert_eq!(extract_error_message(r#"{"message":"nope"}"#), "nope");
        assert_eq!(extract_error_message("  plain text "), "plain text");
    }

    #[test]
    fn retry_policy() {
        assert!(should_retry_http(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_http(StatusCode::BAD_GATEWAY));
        assert!(!should_retry_http(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn backoff_grows_then_caps() {
        assert!(backoff(0) < Duration::from_millis(BASE_DELAY_MS + 100));
        assert!(backoff(2) >= Duration::from_millis(BASE_DELAY_MS * 4));
        for attempt in [10, 40, 64, usize::MAX] {
            assert!(backoff(attempt) < Duration::from_millis(MAX_DELAY_MS + 100));
        }
    }

    #[test]
    fn prompt_omits_auto_source() {
        assert!(build_prompt("hi", "auto", "he").starts_with("Translate to he."));
        assert!(build_prompt("hi", "en", "he").starts_with("Translate from en to he."));
    }

    #[test]
    fn keyed_provider_without_key_is_rejected() {
        let cfg = TranslatorConfig {
            provider: Provider::OpenAi,
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            endpoint: None,
            timeout_secs: 5,
            max_retries: 1,
        };
        assert!(matches!(
            HttpTranslator::new(cfg),
            Err(TranslateError::MissingApiKey(_))
        ));
    }
}
