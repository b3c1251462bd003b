//! Review session controller.
//!
//! One reveal/rate cycle: `get_next` picks an item through the selector and
//! loads its presentable content; `submit_rating` runs the scheduler inside
//! the store's atomic read-modify-write and stamps `last_reviewed`.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::Rng;
use rand::rngs::ThreadRng;
use serde::Serialize;

use crate::error::{FiszkiError, Result};
use crate::id::ItemId;
use crate::review::label::due_label;
use crate::review::quality::{Quality, QualityPolicy};
use crate::review::state::ReviewState;
use crate::review::select;
use crate::review::sm2;
use crate::store::{Progress, ReviewStore, Reviewable};

/// The item chosen for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextItem<C> {
    #[serde(skip)]
    pub item_id: ItemId,
    pub item: C,
    pub next_review: DateTime<Utc>,
    pub due_label: String,
    #[serde(skip)]
    pub state: ReviewState,
}

/// Ratings submitted during this session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub ratings: usize,
    pub passes: usize,
}

impl Tally {
    fn record(&mut self, quality: Quality) {
        self.ratings += 1;
        if quality.is_pass() {
            self.passes += 1;
        }
    }

    /// Percentage of passing ratings, rounded. Zero before the first rating.
    pub fn accuracy(&self) -> u32 {
        if self.ratings == 0 {
            return 0;
        }
        (self.passes as f64 * 100.0 / self.ratings as f64).round() as u32
    }
}

/// Orchestrates selector, scheduler and store for one deck.
pub struct ReviewSession<S, R> {
    store: S,
    rng: R,
    policy: QualityPolicy,
    tally: Tally,
}

impl<S: ReviewStore> ReviewSession<S, ThreadRng> {
    /// Create a session using the thread-local random source.
    pub fn with_thread_rng(store: S) -> Self {
        Self::new(store, rand::rng())
    }
}

impl<S: ReviewStore, R: Rng> ReviewSession<S, R> {
    pub fn new(store: S, rng: R) -> Self {
        Self {
            store,
            rng,
            policy: QualityPolicy::default(),
            tally: Tally::default(),
        }
    }

    /// Set which raw ratings `submit_raw` accepts.
    pub fn with_policy(mut self, policy: QualityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Reviewed/total counts for the deck.
    pub fn progress(&self) -> Result<Progress> {
        self.store.progress()
    }

    /// Choose the next item to present, `None` if the deck is empty.
    ///
    /// Due items come first; when nothing is due a random item is served
    /// so the learner can always keep practicing.
    pub fn get_next(&mut self, now: DateTime<Utc>) -> Result<Option<NextItem<S::Content>>> {
        let due = self.store.find_due(now)?;
        let chosen = match select::select_due(&due, now, &mut self.rng) {
            Some(entry) => Some(entry.clone()),
            None => {
                let all = self.store.find_all()?;
                let picked = select::select_any(&all, &mut self.rng).cloned();
                if picked.is_some() {
                    debug!("Nothing due among {} item(s), reviewing ahead", all.len());
                }
                picked
            }
        };

        let Some(entry) = chosen else {
            debug!("Deck is empty");
            return Ok(None);
        };

        let content = self.store.content(&entry.item)?;
        Ok(Some(NextItem {
            item_id: entry.item.item_id(),
            item: content,
            next_review: entry.state.next_review,
            due_label: due_label(entry.state.next_review, now),
            state: entry.state,
        }))
    }

    /// Record a review of `item_id` and return when it is next due.
    ///
    /// Every call is a new review event; repeating it advances the state
    /// again.
    pub fn submit_rating(&mut self, item_id: ItemId, quality: Quality, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let saved = self
            .store
            .update_state(item_id, &mut |state| {
                let mut next = sm2::schedule(state, quality.value(), now).state;
                next.last_reviewed = Some(now);
                next
            })?
            .ok_or(FiszkiError::NotFound(item_id))?;

        self.tally.record(quality);
        info!(
            "Rated item {} quality {}: interval={}d repetitions={} ease={:.2}",
            item_id,
            quality.value(),
            saved.interval,
            saved.repetitions,
            saved.ease_factor
        );
        Ok(saved.next_review)
    }

    /// Validate a raw rating with the session policy, then submit it.
    pub fn submit_raw(&mut self, item_id: ItemId, raw: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let quality = Quality::parse(raw, self.policy)?;
        self.submit_rating(item_id, quality, now)
    }
}
