//! Due-item selection.
//!
//! Chooses which item to present next:
//! - Earliest `next_review` among due items, ties broken at random
//! - Otherwise a random item from the whole collection (review-ahead)
//! - Nothing when the collection is empty

use chrono::{DateTime, Utc};
use rand::Rng;

use super::state::ReviewEntry;

/// Pick the next item to present from `entries`.
pub fn select<'a, T, R>(entries: &'a [ReviewEntry<T>], now: DateTime<Utc>, rng: &mut R) -> Option<&'a ReviewEntry<T>>
where
    R: Rng + ?Sized,
{
    select_due(entries, now, rng).or_else(|| select_any(entries, rng))
}

/// Pick the most overdue item, or `None` if nothing is due.
pub fn select_due<'a, T, R>(
    entries: &'a [ReviewEntry<T>],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<&'a ReviewEntry<T>>
where
    R: Rng + ?Sized,
{
    let earliest = entries
        .iter()
        .filter(|e| e.state.is_due(now))
        .map(|e| e.state.next_review)
        .min()?;

    let tied: Vec<&ReviewEntry<T>> = entries.iter().filter(|e| e.state.next_review == earliest).collect();
    log::debug!("{} item(s) tied for earliest due at {}", tied.len(), earliest);

    Some(tied[rng.random_range(0..tied.len())])
}

/// Pick uniformly from the whole collection.
pub fn select_any<'a, T, R>(entries: &'a [ReviewEntry<T>], rng: &mut R) -> Option<&'a ReviewEntry<T>>
where
    R: Rng + ?Sized,
{
    if entries.is_empty() {
        return None;
    }
    Some(&entries[rng.random_range(0..entries.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::state::ReviewState;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 20, 18, 0, 0).unwrap()
    }

    fn entry(id: i64, due_in_hours: i64) -> ReviewEntry<i64> {
        let mut state = ReviewState::new(now());
        state.next_review = now() + Duration::hours(due_in_hours);
        ReviewEntry::new(id, state)
    }

    #[test]
    fn test_empty_collection_returns_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let entries: Vec<ReviewEntry<i64>> = vec![];
        assert!(select(&entries, now(), &mut rng).is_none());
    }

    #[test]
    fn test_single_overdue_item_always_chosen() {
        let entries = vec![entry(1, 5), entry(2, -3), entry(3, 48)];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(select(&entries, now(), &mut rng).unwrap().item, 2);
        }
    }

    #[test]
    fn test_earliest_due_wins() {
        let entries = vec![entry(1, -1), entry(2, -10), entry(3, -2), entry(4, 0)];
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(select(&entries, now(), &mut rng).unwrap().item, 2);
    }

    #[test]
    fn test_due_exactly_now_counts_as_due() {
        let entries = vec![entry(1, 0), entry(2, 1)];
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(select_due(&entries, now(), &mut rng).unwrap().item, 1);
    }

    #[test]
    fn test_ties_are_broken_from_tied_set() {
        let entries = vec![entry(1, -4), entry(2, -4), entry(3, -4), entry(4, -1)];
        let mut seen = HashSet::new();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select(&entries, now(), &mut rng).unwrap().item;
            assert!([1, 2, 3].contains(&picked), "picked non-tied item {picked}");
            seen.insert(picked);
        }
        assert_eq!(seen.len(), 3, "tie-break never varied: {seen:?}");
    }

    #[test]
    fn test_nothing_due_falls_back_to_any_item() {
        let entries = vec![entry(1, 2), entry(2, 30), entry(3, 700)];
        let mut rng = StdRng::seed_from_u64(5);
        assert!(select_due(&entries, now(), &mut rng).is_none());

        let mut seen = HashSet::new();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            seen.insert(select(&entries, now(), &mut rng).unwrap().item);
        }
        assert_eq!(seen, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_select_any_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let entries: Vec<ReviewEntry<i64>> = vec![];
        assert!(select_any(&entries, &mut rng).is_none());
    }
}
