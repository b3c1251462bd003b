//! Recall ratings and boundary validation.
//!
//! The scheduler accepts any integer; this module decides which values a
//! caller may actually submit.

use serde::{Deserialize, Serialize};

use crate::error::{FiszkiError, Result};

/// The three review buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Recalled without effort
    Easy,
    /// Recalled with hesitation
    Medium,
    /// Didn't get it
    Fail,
}

impl Rating {
    /// Button order as presented to the learner
    pub const ALL: [Rating; 3] = [Rating::Easy, Rating::Medium, Rating::Fail];

    /// SM-2 quality sent for this button.
    pub fn quality(&self) -> i32 {
        match self {
            Rating::Easy => 5,
            Rating::Medium => 3,
            Rating::Fail => 0,
        }
    }

    /// Map a keypress (1 easy, 2 medium, 3 fail) to a rating.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "1" => Some(Rating::Easy),
            "2" => Some(Rating::Medium),
            "3" => Some(Rating::Fail),
            _ => None,
        }
    }

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Easy => "Easy",
            Rating::Medium => "Medium",
            Rating::Fail => "Didn't get it",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Which raw quality values the boundary accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPolicy {
    /// Only the values the review buttons send: 0, 3, 5
    #[default]
    Strict,
    /// Anything in 0..=5
    FullRange,
}

impl QualityPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            QualityPolicy::Strict
        } else {
            QualityPolicy::FullRange
        }
    }
}

/// A validated SM-2 quality in 0..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quality(u8);

impl Quality {
    /// Validate a raw rating against `policy`.
    pub fn parse(raw: i64, policy: QualityPolicy) -> Result<Self> {
        let accepted = match policy {
            QualityPolicy::Strict => matches!(raw, 0 | 3 | 5),
            QualityPolicy::FullRange => (0..=5).contains(&raw),
        };
        if !accepted {
            return Err(FiszkiError::InvalidQuality(raw));
        }
        Ok(Self(raw as u8))
    }

    pub fn value(&self) -> i32 {
        i32::from(self.0)
    }

    pub fn is_pass(&self) -> bool {
        self.value() >= super::sm2::PASSING_QUALITY
    }
}

impl From<Rating> for Quality {
    fn from(rating: Rating) -> Self {
        Self(rating.quality() as u8)
    }
}

impl TryFrom<i64> for Quality {
    type Error = FiszkiError;

    fn try_from(raw: i64) -> Result<Self> {
        Self::parse(raw, QualityPolicy::FullRange)
    }
}

impl From<Quality> for i64 {
    fn from(quality: Quality) -> Self {
        i64::from(quality.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_qualities() {
        assert_eq!(Rating::Easy.quality(), 5);
        assert_eq!(Rating::Medium.quality(), 3);
        assert_eq!(Rating::Fail.quality(), 0);
    }

    #[test]
    fn test_rating_from_key() {
        assert_eq!(Rating::from_key("1"), Some(Rating::Easy));
        assert_eq!(Rating::from_key(" 2\n"), Some(Rating::Medium));
        assert_eq!(Rating::from_key("3"), Some(Rating::Fail));
        assert_eq!(Rating::from_key("4"), None);
        assert_eq!(Rating::from_key(""), None);
    }

    #[test]
    fn test_strict_policy_accepts_button_values_only() {
        for raw in [0, 3, 5] {
            assert!(Quality::parse(raw, QualityPolicy::Strict).is_ok());
        }
        for raw in [1, 2, 4] {
            let err = Quality::parse(raw, QualityPolicy::Strict).unwrap_err();
            assert!(matches!(err, FiszkiError::InvalidQuality(r) if r == raw));
        }
    }

    #[test]
    fn test_full_range_policy() {
        for raw in 0..=5 {
            assert_eq!(Quality::parse(raw, QualityPolicy::FullRange).unwrap().value(), raw as i32);
        }
    }

    #[test]
    fn test_out_of_range_rejected_by_every_policy() {
        for policy in [QualityPolicy::Strict, QualityPolicy::FullRange] {
            assert!(Quality::parse(-1, policy).is_err());
            assert!(Quality::parse(6, policy).is_err());
            assert!(Quality::parse(i64::MAX, policy).is_err());
        }
    }

    #[test]
    fn test_is_pass() {
        assert!(Quality::from(Rating::Easy).is_pass());
        assert!(Quality::from(Rating::Medium).is_pass());
        assert!(!Quality::from(Rating::Fail).is_pass());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Quality>("4").is_ok());
        assert!(serde_json::from_str::<Quality>("6").is_err());
    }

    #[test]
    fn test_policy_from_strict() {
        assert_eq!(QualityPolicy::from_strict(true), QualityPolicy::Strict);
        assert_eq!(QualityPolicy::from_strict(false), QualityPolicy::FullRange);
    }
}
