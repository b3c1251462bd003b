//! Spaced-repetition core.
//!
//! This module provides:
//! - Review state per item
//! - SM-2 scheduling
//! - Due-item selection with randomized tie-break
//! - The review session controller
//! - Rating validation and due labels

pub mod label;
pub mod quality;
pub mod select;
pub mod session;
pub mod sm2;
pub mod state;

pub use label::due_label;
pub use quality::{Quality, QualityPolicy, Rating};
pub use select::select;
pub use session::{NextItem, ReviewSession, Tally};
pub use sm2::{PASSING_QUALITY, Scheduled, schedule};
pub use state::{DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR, ReviewEntry, ReviewState};
