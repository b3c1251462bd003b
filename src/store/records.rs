//! Record types persisted in the SQLite store.
//!
//! Vocabulary cards carry three example sentences (easy, medium, hard).
//! Minimal-pair words belong to a pair of contrasting sounds and record
//! which of the two they contain.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::id::ItemId;
use crate::store::Reviewable;

/// A vocabulary card. `polish_word` is unique and acts as the fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: ItemId,
    pub polish_word: String,
    pub english_word: String,
    pub pronunciation: String,
    pub notes: Option<String>,
    pub audio_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Reviewable for Card {
    fn item_id(&self) -> ItemId {
        self.id
    }
}

/// A card together with its sentences, easiest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    #[serde(flatten)]
    pub card: Card,
    pub sentences: Vec<Sentence>,
}

/// Sentence difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Difficulty {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Difficulty {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Difficulty::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown difficulty: {s}").into()))
    }
}

/// An example sentence attached to a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: i64,
    pub difficulty: Difficulty,
    pub sentence_pl: String,
    pub sentence_en: String,
    pub audio_path: Option<String>,
}

/// Sentence content for a card that is about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSentence {
    pub difficulty: Difficulty,
    pub sentence_pl: String,
    pub sentence_en: String,
}

/// Card content that is about to be inserted (seed file or generator output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub polish_word: String,
    pub english_word: String,
    pub pronunciation: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sentences: Vec<NewSentence>,
}

/// Which side of a minimal pair a word contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectSound {
    A,
    B,
}

impl CorrectSound {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectSound::A => "a",
            CorrectSound::B => "b",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "a" => Some(CorrectSound::A),
            "b" => Some(CorrectSound::B),
            _ => None,
        }
    }
}

impl ToSql for CorrectSound {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CorrectSound {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        CorrectSound::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown sound: {s}").into()))
    }
}

/// Two contrasting Polish sounds (e.g. "sz" vs "ś").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalPair {
    pub id: i64,
    pub sound_a: String,
    pub sound_b: String,
    pub description: Option<String>,
}

/// A minimal-pair drill word, joined with its pair's sounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairWord {
    pub id: ItemId,
    pub pair_id: i64,
    pub polish_word: String,
    pub english_word: String,
    pub correct_sound: CorrectSound,
    pub audio_path: Option<String>,
    pub sound_a: String,
    pub sound_b: String,
}

impl PairWord {
    /// The sound this word actually contains.
    pub fn answer(&self) -> &str {
        match self.correct_sound {
            CorrectSound::A => &self.sound_a,
            CorrectSound::B => &self.sound_b,
        }
    }
}

impl Reviewable for PairWord {
    fn item_id(&self) -> ItemId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPairWord {
    pub polish_word: String,
    pub english_word: String,
    pub correct_sound: CorrectSound,
}

/// A minimal pair with its words, as found in the seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPair {
    pub sound_a: String,
    pub sound_b: String,
    #[serde(default)]
    pub description: Option<String>,
    pub words: Vec<NewPairWord>,
}

/// A word waiting for card generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedWord {
    pub id: i64,
    pub frequency_rank: i64,
    pub polish_word: String,
}

/// Word queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total: usize,
    pub queued: usize,
    pub generated: usize,
    pub total_cards: usize,
}

/// One row of the generation log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationBatch {
    pub batch_number: i64,
    pub total_generated: i64,
    pub created_at: DateTime<Utc>,
}
