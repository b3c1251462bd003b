//! Per-item scheduling parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ease factor given to a newly created item
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Ease factor floor enforced on every update
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Scheduling state of one reviewable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Growth rate of the interval, never below `MIN_EASE_FACTOR`
    pub ease_factor: f64,

    /// Days until the next review
    pub interval: u32,

    /// Consecutive correct recalls since the last lapse
    pub repetitions: u32,

    /// The item is due once now reaches this instant
    pub next_review: DateTime<Utc>,

    /// Absent until the first rating
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl ReviewState {
    /// State for an item created at `now`; it is due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            next_review: now,
            last_reviewed: None,
        }
    }

    /// Check whether the item is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    /// Check whether the item has ever been rated.
    pub fn is_reviewed(&self) -> bool {
        self.last_reviewed.is_some()
    }
}

/// An item paired with its review state, as returned by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry<T> {
    pub item: T,
    pub state: ReviewState,
}

impl<T> ReviewEntry<T> {
    pub fn new(item: T, state: ReviewState) -> Self {
        Self { item, state }
    }
}
