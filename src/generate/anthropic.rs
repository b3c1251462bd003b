//! Anthropic API content generator
//!
//! Implements `ContentGenerator` over the Anthropic Messages API. Each call is
//! a single user message asking for JSON; the reply text is parsed into
//! card or sentence content.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{FiszkiError, Result};
use crate::generate::ContentGenerator;
use crate::store::{NewCard, NewSentence};

/// Anthropic API base URL
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model to use
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default max tokens for a card
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Max tokens for a single repaired sentence
const REPAIR_MAX_TOKENS: u32 = 256;

/// Environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Configuration for the Anthropic generator
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RepairedSentence {
    sentence_pl: String,
    sentence_en: String,
}

/// Anthropic-backed generator
pub struct AnthropicGenerator {
    client: Client,
    api_key: String,
    config: AnthropicConfig,
}

impl AnthropicGenerator {
    /// Create a generator reading the API key from `api_key_env`
    pub fn from_env(api_key_env: &str, config: AnthropicConfig) -> Result<Self> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| FiszkiError::Generation(format!("{} not set", api_key_env)))?;

        Self::with_api_key(api_key, config)
    }

    /// Create a generator with an explicit API key
    pub fn with_api_key(api_key: String, config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FiszkiError::Generation(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, prompt: &str, max_tokens: u32) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }]
        })
    }

    async fn send_request(&self, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| FiszkiError::Generation(format!("Request failed: {}", e)))?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FiszkiError::Generation(format!(
                "Rate limited, retry after {} seconds",
                retry_after
            )));
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FiszkiError::Generation(format!("API error {}: {}", status, error_body)));
        }

        response
            .json()
            .await
            .map_err(|e| FiszkiError::Generation(format!("Failed to parse response: {}", e)))
    }

    async fn ask<T: DeserializeOwned>(&self, prompt: &str, max_tokens: u32) -> Result<T> {
        let body = self.build_request(prompt, max_tokens);
        let response = self.send_request(body).await?;
        let text = response_text(&response);
        debug!("Model reply: {}", text);
        parse_json_reply(&text)
    }
}

/// Concatenate the text blocks of a Messages API response.
fn response_text(body: &Value) -> String {
    let mut content = String::new();
    if let Some(blocks) = body["content"].as_array() {
        for block in blocks {
            if block["type"].as_str() == Some("text")
                && let Some(text) = block["text"].as_str()
            {
                if !content.is_empty() {
                    content.push('\n');
                }
                content.push_str(text);
            }
        }
    }
    content
}

/// Parse a JSON reply, tolerating a surrounding markdown code fence.
fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim())
        .map_err(|e| FiszkiError::Generation(format!("Unparseable model output: {}", e)))
}

fn card_prompt(polish_word: &str) -> String {
    format!(
        r#"Create a Polish flashcard for the word "{w}" for an English speaker.
Reply with JSON only, no markdown fences, in this shape:
{{
  "polish_word": "{w}",
  "english_word": "English translation(s)",
  "pronunciation": "English phonetic approximation, e.g. \"tahk\" for \"tak\"",
  "notes": "Short grammar or usage notes",
  "sentences": [
    {{ "difficulty": "easy", "sentence_pl": "...", "sentence_en": "..." }},
    {{ "difficulty": "medium", "sentence_pl": "...", "sentence_en": "..." }},
    {{ "difficulty": "hard", "sentence_pl": "...", "sentence_en": "..." }}
  ]
}}
Every sentence_pl must be grammatical Polish and contain "{w}" in exactly that form."#,
        w = polish_word
    )
}

fn repair_prompt(polish_word: &str, sentence: &NewSentence) -> String {
    format!(
        r#"The Polish sentence "{s}" should contain the exact word "{w}" but does not.
Write a new {d} Polish sentence that contains "{w}" in exactly that form, with its English translation.
Reply with JSON only, no markdown fences: {{ "sentence_pl": "...", "sentence_en": "..." }}"#,
        s = sentence.sentence_pl,
        w = polish_word,
        d = sentence.difficulty
    )
}

#[async_trait]
impl ContentGenerator for AnthropicGenerator {
    async fn generate_card(&self, polish_word: &str) -> Result<NewCard> {
        self.ask(&card_prompt(polish_word), self.config.max_tokens).await
    }

    async fn repair_sentence(&self, polish_word: &str, sentence: &NewSentence) -> Result<NewSentence> {
        let fixed: RepairedSentence = self
            .ask(&repair_prompt(polish_word, sentence), REPAIR_MAX_TOKENS)
            .await?;
        Ok(NewSentence {
            difficulty: sentence.difficulty,
            sentence_pl: fixed.sentence_pl,
            sentence_en: fixed.sentence_en,
        })
    }
}

impl std::fmt::Debug for AnthropicGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicGenerator")
            .field("model", &self.config.model)
            .field("max_tokens", &self.config.max_tokens)
            .finish()
    }
}
