//! Seed data loading.
//!
//! Three JSON inputs:
//! - seed cards: a list of cards with sentences, inserted with fresh state
//! - minimal pairs: a list of pairs with their drill words
//! - a frequency list of `{ "rank": n, "word": "..." }` entries feeding the
//!   generation queue
//!
//! Each seed is skipped when its target already holds data, so re-running
//! a seed is harmless.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FiszkiError, Result};
use crate::store::{Database, NewCard, NewPair};

/// One entry of the word-frequency list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub rank: i64,
    pub word: String,
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub total: usize,
}

/// Read and parse a JSON seed file.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| FiszkiError::Seed(format!("{}: {}", path.display(), e)))
}

fn validate_card(card: &NewCard) -> Result<()> {
    if card.polish_word.trim().is_empty() {
        return Err(FiszkiError::Seed("card with empty polish_word".to_string()));
    }
    if card.english_word.trim().is_empty() {
        return Err(FiszkiError::Seed(format!("card '{}' has no translation", card.polish_word)));
    }
    Ok(())
}

fn validate_pair(pair: &NewPair) -> Result<()> {
    if pair.sound_a == pair.sound_b {
        return Err(FiszkiError::Seed(format!("pair contrasts '{}' with itself", pair.sound_a)));
    }
    Ok(())
}

/// Insert seed cards unless the deck already holds at least as many.
///
/// Logs the run as a generation batch whose total is the deck size.
pub fn seed_cards(db: &Database, cards: &[NewCard], now: DateTime<Utc>) -> Result<SeedReport> {
    let existing = db.count_cards()?;
    if existing >= cards.len() {
        info!("Card deck already has {} card(s), skipping seed", existing);
        return Ok(SeedReport {
            inserted: 0,
            total: existing,
        });
    }

    for card in cards {
        validate_card(card)?;
    }

    let batch_number = db.next_batch_number()?;
    let mut inserted = 0;
    for card in cards {
        if db.insert_card(card, now)?.is_some() {
            inserted += 1;
        }
    }

    let total = db.count_cards()?;
    db.log_batch(batch_number, total, now)?;
    info!("Seeded {} card(s), deck now has {}", inserted, total);

    Ok(SeedReport { inserted, total })
}

/// Insert minimal pairs unless any drill words already exist.
pub fn seed_pairs(db: &Database, pairs: &[NewPair], now: DateTime<Utc>) -> Result<SeedReport> {
    let existing = db.count_pair_words()?;
    if existing > 0 {
        info!("Minimal-pair deck already has {} word(s), skipping seed", existing);
        return Ok(SeedReport {
            inserted: 0,
            total: existing,
        });
    }

    for pair in pairs {
        validate_pair(pair)?;
    }
    let inserted = db.insert_pairs(pairs, now)?;

    let total = db.count_pair_words()?;
    info!("Seeded {} minimal-pair word(s)", inserted);
    Ok(SeedReport { inserted, total })
}

/// Fill the generation queue from a frequency list unless it is already
/// populated. Words that already have a card are left out.
pub fn seed_queue(db: &Database, entries: &[FrequencyEntry]) -> Result<SeedReport> {
    let existing = db.queue_len()?;
    if existing > 0 {
        info!("Word queue already has {} entries, skipping seed", existing);
        return Ok(SeedReport {
            inserted: 0,
            total: existing,
        });
    }

    let known = db.known_words()?;
    let inserted = db.enqueue_words(
        entries
            .iter()
            .filter(|e| !known.contains(&e.word))
            .map(|e| (e.rank, e.word.as_str())),
    )?;

    let total = db.queue_len()?;
    info!("Seeded {} word(s) into the queue", inserted);
    Ok(SeedReport { inserted, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CorrectSound, NewPairWord, ReviewStore};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap()
    }

    fn card(word: &str) -> NewCard {
        NewCard {
            polish_word: word.to_string(),
            english_word: "translation".to_string(),
            pronunciation: word.to_string(),
            notes: None,
            sentences: vec![],
        }
    }

    #[test]
    fn test_seed_cards_inserts_and_logs_batch() {
        let db = Database::open_in_memory().unwrap();
        let report = seed_cards(&db, &[card("dom"), card("kot")], now()).unwrap();
        assert_eq!(report, SeedReport { inserted: 2, total: 2 });
        assert_eq!(db.cards().find_due(now()).unwrap().len(), 2);

        let log = db.generation_log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].batch_number, 1);
        assert_eq!(log[0].total_generated, 2);
    }

    #[test]
    fn test_seed_cards_skips_when_deck_is_full() {
        let db = Database::open_in_memory().unwrap();
        seed_cards(&db, &[card("dom"), card("kot")], now()).unwrap();
        let report = seed_cards(&db, &[card("pies")], now()).unwrap();
        assert_eq!(report, SeedReport { inserted: 0, total: 2 });
    }

    #[test]
    fn test_seed_cards_rejects_empty_word() {
        let db = Database::open_in_memory().unwrap();
        let err = seed_cards(&db, &[card(" ")], now()).unwrap_err();
        assert!(matches!(err, FiszkiError::Seed(_)));
        assert_eq!(db.count_cards().unwrap(), 0);
    }

    #[test]
    fn test_seed_pairs_once() {
        let db = Database::open_in_memory().unwrap();
        let pairs = vec![NewPair {
            sound_a: "cz".to_string(),
            sound_b: "ć".to_string(),
            description: None,
            words: vec![NewPairWord {
                polish_word: "czas".to_string(),
                english_word: "time".to_string(),
                correct_sound: CorrectSound::A,
            }],
        }];
        assert_eq!(seed_pairs(&db, &pairs, now()).unwrap(), SeedReport { inserted: 1, total: 1 });
        assert_eq!(seed_pairs(&db, &pairs, now()).unwrap(), SeedReport { inserted: 0, total: 1 });
    }

    fn pair(sound_a: &str, sound_b: &str, word: &str) -> NewPair {
        NewPair {
            sound_a: sound_a.to_string(),
            sound_b: sound_b.to_string(),
            description: None,
            words: vec![NewPairWord {
                polish_word: word.to_string(),
                english_word: word.to_string(),
                correct_sound: CorrectSound::A,
            }],
        }
    }

    #[test]
    fn test_seed_pairs_bad_entry_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let broken = vec![pair("cz", "ć", "czas"), pair("sz", "sz", "szum"), pair("rz", "ż", "rzeka")];

        let err = seed_pairs(&db, &broken, now()).unwrap_err();
        assert!(matches!(err, FiszkiError::Seed(ref msg) if msg.contains("'sz'")));
        assert_eq!(db.count_pair_words().unwrap(), 0);

        let fixed = vec![pair("cz", "ć", "czas"), pair("sz", "ś", "szum"), pair("rz", "ż", "rzeka")];
        assert_eq!(seed_pairs(&db, &fixed, now()).unwrap(), SeedReport { inserted: 3, total: 3 });
    }

    #[test]
    fn test_seed_queue_skips_known_words() {
        let db = Database::open_in_memory().unwrap();
        db.insert_card(&card("nie"), now()).unwrap();
        let entries = vec![
            FrequencyEntry { rank: 1, word: "nie".to_string() },
            FrequencyEntry { rank: 2, word: "się".to_string() },
            FrequencyEntry { rank: 3, word: "w".to_string() },
        ];

        let report = seed_queue(&db, &entries).unwrap();
        assert_eq!(report, SeedReport { inserted: 2, total: 2 });
        assert_eq!(db.queued_words(10).unwrap()[0].polish_word, "się");

        assert_eq!(seed_queue(&db, &entries).unwrap().inserted, 0);
    }

    #[test]
    fn test_load_json_reports_path_on_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("seed.json");
        fs::write(&path, "[{\"rank\": \"one\"}]").unwrap();

        let err = load_json::<Vec<FrequencyEntry>>(&path).unwrap_err();
        assert!(matches!(err, FiszkiError::Seed(ref msg) if msg.contains("seed.json")));
    }

    #[test]
    fn test_load_json_frequency_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("freq.json");
        fs::write(&path, r#"[{"rank": 1, "word": "nie"}, {"rank": 2, "word": "się"}]"#).unwrap();

        let entries: Vec<FrequencyEntry> = load_json(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].word, "się");
    }
}
