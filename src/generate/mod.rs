//! Card content generation.
//!
//! This module provides:
//! - The `ContentGenerator` trait for language-model backends
//! - The Anthropic adapter
//! - Queue-driven batch generation with sentence repair
//! - A scripted generator for tests and offline runs

pub mod anthropic;
pub mod mock;
pub mod pipeline;

use async_trait::async_trait;

use crate::error::Result;
use crate::store::{NewCard, NewSentence};

pub use anthropic::{AnthropicConfig, AnthropicGenerator};
pub use mock::MockGenerator;
pub use pipeline::{GenerationOptions, GenerationReport, NO_QUEUED_WORDS, generate_cards};

/// Produces card content for a Polish word.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Translation, pronunciation, notes and one sentence per difficulty.
    async fn generate_card(&self, polish_word: &str) -> Result<NewCard>;

    /// A replacement for a sentence that does not contain `polish_word`.
    /// The difficulty of the original sentence is kept by the caller.
    async fn repair_sentence(&self, polish_word: &str, sentence: &NewSentence) -> Result<NewSentence>;
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// True if `word` occurs in `sentence` as a whole word in that exact form,
/// ignoring case. Word boundaries are Unicode-aware, so "się" does not
/// match inside "sięgać".
pub fn sentence_contains_word(sentence: &str, word: &str) -> bool {
    let needle = words(word);
    if needle.is_empty() {
        return false;
    }
    words(sentence).windows(needle.len()).any(|w| w == needle.as_slice())
}
