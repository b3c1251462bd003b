//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 algorithm for calculating review
//! intervals from the learner's recall quality.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! The review buttons only ever send 0, 3 and 5.

use chrono::{DateTime, Duration, Utc};

use super::quality::Rating;
use super::state::{MIN_EASE_FACTOR, ReviewState};

/// Lowest quality counted as a successful recall
pub const PASSING_QUALITY: i32 = 3;

/// Result of scheduling one review
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub state: ReviewState,
    pub next_review: DateTime<Utc>,
}

/// Calculate the next state for a review rated `quality` at `now`.
///
/// Total over any integer quality; validation belongs to the caller.
/// `last_reviewed` is carried over unchanged.
pub fn schedule(state: &ReviewState, quality: i32, now: DateTime<Utc>) -> Scheduled {
    let (interval, repetitions) = if quality >= PASSING_QUALITY {
        let interval = match state.repetitions {
            0 => 1,
            1 => 6,
            // Uses the ease factor from before this review
            _ => (f64::from(state.interval) * state.ease_factor).round() as u32,
        };
        (interval, state.repetitions + 1)
    } else {
        (1, 0)
    };

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let miss = 5.0 - f64::from(quality);
    let ease_factor = (state.ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

    let next_review = now + Duration::days(i64::from(interval));

    Scheduled {
        state: ReviewState {
            ease_factor,
            interval,
            repetitions,
            next_review,
            last_reviewed: state.last_reviewed,
        },
        next_review,
    }
}

/// Interval in days each review button would give, in button order.
pub fn preview(state: &ReviewState, now: DateTime<Utc>) -> [(Rating, u32); 3] {
    Rating::ALL.map(|rating| (rating, schedule(state, rating.quality(), now).state.interval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 14, 30, 0).unwrap()
    }

    fn state(ease_factor: f64, interval: u32, repetitions: u32) -> ReviewState {
        ReviewState {
            ease_factor,
            interval,
            repetitions,
            ..ReviewState::new(now())
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_first_review_easy() {
        let result = schedule(&state(2.5, 0, 0), 5, now());
        assert_close(result.state.ease_factor, 2.6);
        assert_eq!(result.state.interval, 1);
        assert_eq!(result.state.repetitions, 1);
    }

    #[test]
    fn test_first_review_fail() {
        // 2.5 + 0.1 - 5 * (0.08 + 5 * 0.02)
        let result = schedule(&state(2.5, 0, 0), 0, now());
        assert_close(result.state.ease_factor, 1.7);
        assert_eq!(result.state.interval, 1);
        assert_eq!(result.state.repetitions, 0);
    }

    #[test]
    fn test_third_review_medium_uses_prior_ease() {
        let result = schedule(&state(2.5, 6, 2), 3, now());
        assert_eq!(result.state.interval, 15);
        assert_eq!(result.state.repetitions, 3);
        assert_close(result.state.ease_factor, 2.36);
        assert!(result.state.ease_factor >= MIN_EASE_FACTOR);
    }

    #[test]
    fn test_second_review_is_six_days() {
        let result = schedule(&state(2.6, 1, 1), 5, now());
        assert_eq!(result.state.interval, 6);
        assert_eq!(result.state.repetitions, 2);
    }

    #[test]
    fn test_lapse_resets_regardless_of_history() {
        for (interval, repetitions) in [(0, 0), (6, 2), (120, 9), (400, 30)] {
            let result = schedule(&state(2.8, interval, repetitions), 0, now());
            assert_eq!(result.state.interval, 1);
            assert_eq!(result.state.repetitions, 0);
        }
    }

    #[test]
    fn test_repetitions_follow_quality() {
        for quality in 0..=5 {
            let result = schedule(&state(2.5, 10, 4), quality, now());
            if quality >= PASSING_QUALITY {
                assert_eq!(result.state.repetitions, 5);
            } else {
                assert_eq!(result.state.repetitions, 0);
            }
        }
    }

    #[test]
    fn test_ease_factor_never_below_floor() {
        for quality in 0..=5 {
            for ef in [1.3, 1.35, 1.5, 2.0, 2.5, 3.1] {
                let result = schedule(&state(ef, 3, 2), quality, now());
                assert!(result.state.ease_factor >= MIN_EASE_FACTOR, "q={quality} ef={ef}");
            }
        }
    }

    #[test]
    fn test_repeated_lapses_saturate_at_floor() {
        let mut current = state(2.5, 30, 5);
        for _ in 0..10 {
            current = schedule(&current, 0, now()).state;
        }
        assert_close(current.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_easy_streak_intervals_non_decreasing() {
        let mut current = ReviewState::new(now());
        let mut intervals = Vec::new();
        for _ in 0..8 {
            current = schedule(&current, 5, now()).state;
            intervals.push(current.interval);
        }
        assert_eq!(&intervals[..3], &[1, 6, 16]);
        assert!(intervals.windows(2).all(|w| w[0] <= w[1]), "{intervals:?}");
    }

    #[test]
    fn test_next_review_is_now_plus_interval_days() {
        let result = schedule(&state(2.5, 6, 2), 5, now());
        assert_eq!(result.next_review, now() + Duration::days(15));
        assert_eq!(result.state.next_review, result.next_review);
    }

    #[test]
    fn test_time_of_day_carried_from_now() {
        let result = schedule(&state(2.5, 0, 0), 3, now());
        assert_eq!(result.next_review, Utc.with_ymd_and_hms(2026, 1, 11, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_last_reviewed_untouched() {
        let mut input = state(2.5, 0, 0);
        input.last_reviewed = Some(now() - Duration::days(3));
        let result = schedule(&input, 5, now());
        assert_eq!(result.state.last_reviewed, input.last_reviewed);
    }

    #[test]
    fn test_out_of_range_quality_is_total() {
        let high = schedule(&state(2.5, 6, 2), 9, now());
        assert_eq!(high.state.repetitions, 3);
        let low = schedule(&state(2.5, 6, 2), -4, now());
        assert_eq!(low.state.repetitions, 0);
        assert_close(low.state.ease_factor, MIN_EASE_FACTOR);

        let min = schedule(&state(2.5, 6, 2), i32::MIN, now());
        assert_eq!((min.state.interval, min.state.repetitions), (1, 0));
        assert_close(min.state.ease_factor, MIN_EASE_FACTOR);
        let max = schedule(&state(2.5, 6, 2), i32::MAX, now());
        assert_eq!(max.state.repetitions, 3);
        assert_close(max.state.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_preview_intervals() {
        let preview = preview(&state(2.5, 6, 2), now());
        assert_eq!(preview, [(Rating::Easy, 15), (Rating::Medium, 15), (Rating::Fail, 1)]);
    }
}
