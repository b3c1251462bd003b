//! Fiszki - spaced-repetition Polish flashcards
//!
//! Vocabulary cards and minimal-pair listening drills, scheduled with SM-2.
//! The review core (scheduler, due-item selector, session controller) works
//! against the `ReviewStore` trait; the SQLite store, seed loaders and the
//! card generator sit around it.

pub mod error;
pub mod generate;
pub mod id;
pub mod review;
pub mod seed;
pub mod store;

pub use error::{FiszkiError, Result};
