//! Storage layer for Fiszki.
//!
//! The review core only talks to the [`ReviewStore`] trait. Two
//! implementations are provided:
//! - **SQLite** ([`Database`]): cards, sentences, minimal pairs, the word
//!   queue and both review tables, exposed per deck as [`CardDeck`] and
//!   [`PairDeck`]
//! - **Memory** ([`MemoryStore`]): a mutex-guarded map, used in tests and
//!   as a reference for the trait contract
//!
//! # Example
//!
//! ```ignore
//! use fiszki::store::{Database, ReviewStore};
//!
//! let db = Database::open("fiszki.db")?;
//! let due = db.cards().find_due(chrono::Utc::now())?;
//! ```

mod cards;
mod memory;
mod pairs;
mod queue;
mod records;
mod sqlite;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::id::ItemId;
use crate::review::{ReviewEntry, ReviewState};

pub use cards::CardDeck;
pub use memory::MemoryStore;
pub use pairs::PairDeck;
pub use records::{
    Card, CardView, CorrectSound, Difficulty, GenerationBatch, MinimalPair, NewCard, NewPair, NewPairWord,
    NewSentence, PairWord, QueueStats, QueuedWord, Sentence,
};
pub use sqlite::Database;

/// Anything the store can hand to the review core.
pub trait Reviewable {
    fn item_id(&self) -> ItemId;
}

impl Reviewable for ItemId {
    fn item_id(&self) -> ItemId {
        *self
    }
}

/// How much of a deck has been reviewed at least once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub reviewed: usize,
    pub total: usize,
}

impl Progress {
    /// Fraction reviewed, capped at 1.0; zero for an empty deck.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.reviewed as f64 / self.total as f64).min(1.0)
    }
}

/// Persistence consumed by the review session.
///
/// Every item has exactly one review state; implementations create both
/// together. `update_state` must be an atomic read-modify-write.
pub trait ReviewStore {
    /// The reviewable item type
    type Item: Reviewable + Clone;

    /// What the presentation layer needs to show an item
    type Content;

    /// Items whose review is due at `now`.
    fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<ReviewEntry<Self::Item>>>;

    /// Every item in the deck.
    fn find_all(&self) -> Result<Vec<ReviewEntry<Self::Item>>>;

    /// Review state for an item, `None` if the id is unknown.
    fn load_state(&self, id: ItemId) -> Result<Option<ReviewState>>;

    /// Overwrite the review state for an item.
    fn save_state(&self, id: ItemId, state: &ReviewState) -> Result<()>;

    /// Load, transform and save a review state without interleaving
    /// another writer. Returns the saved state, `None` if the id is unknown.
    fn update_state(
        &self,
        id: ItemId,
        update: &mut dyn FnMut(&ReviewState) -> ReviewState,
    ) -> Result<Option<ReviewState>>;

    /// Presentable content for an item.
    fn content(&self, item: &Self::Item) -> Result<Self::Content>;

    /// Reviewed-at-least-once counts for the deck.
    fn progress(&self) -> Result<Progress>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::default().ratio(), 0.0);
        assert_eq!(Progress { reviewed: 5, total: 20 }.ratio(), 0.25);
        assert_eq!(Progress { reviewed: 30, total: 20 }.ratio(), 1.0);
    }
}
