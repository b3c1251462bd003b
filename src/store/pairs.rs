//! Minimal-pair drill deck.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::Result;
use crate::id::{ItemId, to_ms};
use crate::review::{ReviewEntry, ReviewState};
use crate::store::records::{MinimalPair, NewPair, PairWord};
use crate::store::sqlite::{Database, PAIR_REVIEWS, state_from_row};
use crate::store::{Progress, ReviewStore};

const WORD_WITH_STATE: &str = r#"
    SELECT w.id AS id, w.pair_id AS pair_id, w.polish_word AS polish_word,
           w.english_word AS english_word, w.correct_sound AS correct_sound,
           w.audio_path AS audio_path, p.sound_a AS sound_a, p.sound_b AS sound_b,
           r.ease_factor AS ease_factor, r.interval AS interval, r.repetitions AS repetitions,
           r.next_review AS next_review, r.last_reviewed AS last_reviewed
    FROM minimal_pair_words w
    JOIN minimal_pairs p ON p.id = w.pair_id
    JOIN minimal_pair_reviews r ON r.word_id = w.id
"#;

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewEntry<PairWord>> {
    let word = PairWord {
        id: row.get("id")?,
        pair_id: row.get("pair_id")?,
        polish_word: row.get("polish_word")?,
        english_word: row.get("english_word")?,
        correct_sound: row.get("correct_sound")?,
        audio_path: row.get("audio_path")?,
        sound_a: row.get("sound_a")?,
        sound_b: row.get("sound_b")?,
    };
    Ok(ReviewEntry::new(word, state_from_row(row)?))
}

impl Database {
    /// Insert a minimal pair (or reuse an existing one with the same
    /// sounds) and its words, each with a fresh review state.
    ///
    /// Returns the number of words inserted.
    pub fn insert_pair(&self, pair: &NewPair, now: DateTime<Utc>) -> Result<usize> {
        self.insert_pairs(std::slice::from_ref(pair), now)
    }

    /// Insert several pairs in one transaction; either all of them are
    /// written or none are.
    pub fn insert_pairs(&self, pairs: &[NewPair], now: DateTime<Utc>) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for pair in pairs {
            inserted += Self::insert_pair_in(&tx, pair, now)?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn insert_pair_in(conn: &Connection, pair: &NewPair, now: DateTime<Utc>) -> Result<usize> {
        conn.execute(
            "INSERT OR IGNORE INTO minimal_pairs (sound_a, sound_b, description) VALUES (?1, ?2, ?3)",
            params![pair.sound_a, pair.sound_b, pair.description],
        )?;
        let pair_id: i64 = conn.query_row(
            "SELECT id FROM minimal_pairs WHERE sound_a = ?1 AND sound_b = ?2",
            params![pair.sound_a, pair.sound_b],
            |row| row.get(0),
        )?;

        let fresh = ReviewState::new(now);
        for word in &pair.words {
            conn.execute(
                "INSERT INTO minimal_pair_words (pair_id, polish_word, english_word, correct_sound)
                 VALUES (?1, ?2, ?3, ?4)",
                params![pair_id, word.polish_word, word.english_word, word.correct_sound],
            )?;
            let word_id = conn.last_insert_rowid();
            Self::insert_state(conn, PAIR_REVIEWS, word_id, &fresh)?;
        }

        log::debug!(
            "Inserted {} word(s) for pair {} / {}",
            pair.words.len(),
            pair.sound_a,
            pair.sound_b
        );
        Ok(pair.words.len())
    }

    /// Look a pair up by its two sounds.
    pub fn pair_by_sounds(&self, sound_a: &str, sound_b: &str) -> Result<Option<MinimalPair>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, sound_a, sound_b, description FROM minimal_pairs WHERE sound_a = ?1 AND sound_b = ?2",
                params![sound_a, sound_b],
                |row| {
                    Ok(MinimalPair {
                        id: row.get(0)?,
                        sound_a: row.get(1)?,
                        sound_b: row.get(2)?,
                        description: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }

    /// Number of minimal-pair words.
    pub fn count_pair_words(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM minimal_pair_words", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn pair_entries(&self, due_at: Option<DateTime<Utc>>) -> Result<Vec<ReviewEntry<PairWord>>> {
        let conn = self.conn()?;
        let entries = match due_at {
            Some(now) => {
                let sql = format!("{WORD_WITH_STATE} WHERE r.next_review <= ?1 ORDER BY r.next_review ASC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([to_ms(now)], entry_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let sql = format!("{WORD_WITH_STATE} ORDER BY w.id");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], entry_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(entries)
    }
}

/// The minimal-pair deck viewed as a [`ReviewStore`].
#[derive(Debug, Clone, Copy)]
pub struct PairDeck<'a> {
    db: &'a Database,
}

impl<'a> PairDeck<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl ReviewStore for PairDeck<'_> {
    type Item = PairWord;
    type Content = PairWord;

    fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<ReviewEntry<PairWord>>> {
        self.db.pair_entries(Some(now))
    }

    fn find_all(&self) -> Result<Vec<ReviewEntry<PairWord>>> {
        self.db.pair_entries(None)
    }

    fn load_state(&self, id: ItemId) -> Result<Option<ReviewState>> {
        self.db.load_state(PAIR_REVIEWS, id)
    }

    fn save_state(&self, id: ItemId, state: &ReviewState) -> Result<()> {
        self.db.save_state(PAIR_REVIEWS, id, state)
    }

    fn update_state(
        &self,
        id: ItemId,
        update: &mut dyn FnMut(&ReviewState) -> ReviewState,
    ) -> Result<Option<ReviewState>> {
        self.db.update_state(PAIR_REVIEWS, id, update)
    }

    fn content(&self, item: &PairWord) -> Result<PairWord> {
        Ok(item.clone())
    }

    fn progress(&self) -> Result<Progress> {
        self.db.progress(PAIR_REVIEWS)
    }
}
