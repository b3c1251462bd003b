//! In-memory review store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::error::{FiszkiError, Result};
use crate::id::ItemId;
use crate::review::{ReviewEntry, ReviewState};
use crate::store::{Progress, ReviewStore, Reviewable};

/// A deck held in a mutex-guarded map, keyed by item id.
#[derive(Debug)]
pub struct MemoryStore<T> {
    entries: Mutex<BTreeMap<ItemId, ReviewEntry<T>>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T: Reviewable + Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item with a fresh review state. Returns false if an item
    /// with the same id is already present.
    pub fn insert(&self, item: T, now: DateTime<Utc>) -> Result<bool> {
        self.insert_with_state(item, ReviewState::new(now))
    }

    /// Add an item with an explicit review state.
    pub fn insert_with_state(&self, item: T, state: ReviewState) -> Result<bool> {
        let mut entries = self.lock()?;
        let id = item.item_id();
        if entries.contains_key(&id) {
            return Ok(false);
        }
        entries.insert(id, ReviewEntry::new(item, state));
        Ok(true)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<ItemId, ReviewEntry<T>>>> {
        self.entries.lock().map_err(|e| FiszkiError::Storage(e.to_string()))
    }
}

impl<T: Reviewable + Clone> ReviewStore for MemoryStore<T> {
    type Item = T;
    type Content = T;

    fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<ReviewEntry<T>>> {
        let mut due: Vec<ReviewEntry<T>> = self
            .lock()?
            .values()
            .filter(|e| e.state.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|e| e.state.next_review);
        Ok(due)
    }

    fn find_all(&self) -> Result<Vec<ReviewEntry<T>>> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn load_state(&self, id: ItemId) -> Result<Option<ReviewState>> {
        Ok(self.lock()?.get(&id).map(|e| e.state.clone()))
    }

    fn save_state(&self, id: ItemId, state: &ReviewState) -> Result<()> {
        let mut entries = self.lock()?;
        let entry = entries.get_mut(&id).ok_or(FiszkiError::NotFound(id))?;
        entry.state = state.clone();
        Ok(())
    }

    fn update_state(
        &self,
        id: ItemId,
        update: &mut dyn FnMut(&ReviewState) -> ReviewState,
    ) -> Result<Option<ReviewState>> {
        let mut entries = self.lock()?;
        let Some(entry) = entries.get_mut(&id) else {
            return Ok(None);
        };
        entry.state = update(&entry.state);
        Ok(Some(entry.state.clone()))
    }

    fn content(&self, item: &T) -> Result<T> {
        Ok(item.clone())
    }

    fn progress(&self) -> Result<Progress> {
        let entries = self.lock()?;
        Ok(Progress {
            reviewed: entries.values().filter(|e| e.state.is_reviewed()).count(),
            total: entries.len(),
        })
    }
}
