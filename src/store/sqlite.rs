//! SQLite-backed store.
//!
//! One database file holds both decks, the word queue and the generation
//! log. Timestamps are stored as Unix milliseconds. Each reviewable item
//! has exactly one row in its deck's review table, inserted in the same
//! transaction as the item itself.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use crate::error::{FiszkiError, Result};
use crate::id::{ItemId, from_ms, to_ms};
use crate::review::ReviewState;
use crate::store::{CardDeck, PairDeck, Progress};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS cards (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        polish_word TEXT UNIQUE NOT NULL,
        english_word TEXT NOT NULL,
        pronunciation TEXT NOT NULL,
        notes TEXT,
        audio_path TEXT,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS card_sentences (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        card_id INTEGER NOT NULL,
        difficulty TEXT NOT NULL CHECK(difficulty IN ('easy', 'medium', 'hard')),
        sentence_pl TEXT NOT NULL,
        sentence_en TEXT NOT NULL,
        audio_path TEXT,
        FOREIGN KEY (card_id) REFERENCES cards(id)
    );

    CREATE TABLE IF NOT EXISTS reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        card_id INTEGER NOT NULL UNIQUE,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        interval INTEGER NOT NULL DEFAULT 0,
        repetitions INTEGER NOT NULL DEFAULT 0,
        next_review INTEGER NOT NULL,
        last_reviewed INTEGER,
        FOREIGN KEY (card_id) REFERENCES cards(id)
    );

    CREATE TABLE IF NOT EXISTS generation_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        batch_number INTEGER NOT NULL,
        total_generated INTEGER NOT NULL,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS minimal_pairs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sound_a TEXT NOT NULL,
        sound_b TEXT NOT NULL,
        description TEXT,
        UNIQUE(sound_a, sound_b)
    );

    CREATE TABLE IF NOT EXISTS minimal_pair_words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pair_id INTEGER NOT NULL,
        polish_word TEXT NOT NULL,
        english_word TEXT NOT NULL,
        correct_sound TEXT NOT NULL CHECK(correct_sound IN ('a', 'b')),
        audio_path TEXT,
        FOREIGN KEY (pair_id) REFERENCES minimal_pairs(id)
    );

    CREATE TABLE IF NOT EXISTS minimal_pair_reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word_id INTEGER NOT NULL UNIQUE,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        interval INTEGER NOT NULL DEFAULT 0,
        repetitions INTEGER NOT NULL DEFAULT 0,
        next_review INTEGER NOT NULL,
        last_reviewed INTEGER,
        FOREIGN KEY (word_id) REFERENCES minimal_pair_words(id)
    );

    CREATE TABLE IF NOT EXISTS word_queue (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        frequency_rank INTEGER NOT NULL UNIQUE,
        polish_word TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL DEFAULT 'queued' CHECK(status IN ('queued', 'generated')),
        generated_at INTEGER,
        card_id INTEGER,
        FOREIGN KEY (card_id) REFERENCES cards(id)
    );

    CREATE INDEX IF NOT EXISTS idx_word_queue_status ON word_queue(status, frequency_rank);
    CREATE INDEX IF NOT EXISTS idx_reviews_next ON reviews(next_review);
    CREATE INDEX IF NOT EXISTS idx_pair_reviews_next ON minimal_pair_reviews(next_review);
    CREATE INDEX IF NOT EXISTS idx_sentences_card ON card_sentences(card_id);
"#;

/// A deck's review table and the column linking it to the item table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReviewTable {
    pub table: &'static str,
    pub key: &'static str,
}

pub(crate) const CARD_REVIEWS: ReviewTable = ReviewTable {
    table: "reviews",
    key: "card_id",
};

pub(crate) const PAIR_REVIEWS: ReviewTable = ReviewTable {
    table: "minimal_pair_reviews",
    key: "word_id",
};

/// Wrapper around a SQLite connection providing interior mutability.
///
/// `rusqlite::Connection` isn't `Sync`, so it lives behind a `Mutex`.
/// Holding the lock for a whole read-modify-write makes rating updates
/// atomic within the process; the IMMEDIATE transaction covers other
/// processes sharing the file.
pub struct Database {
    inner: Mutex<Connection>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        log::debug!("Opened {} (journal_mode={})", path.display(), mode);
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            inner: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.inner.lock().map_err(|e| FiszkiError::Storage(e.to_string()))
    }

    /// The vocabulary-card deck.
    pub fn cards(&self) -> CardDeck<'_> {
        CardDeck::new(self)
    }

    /// The minimal-pair drill deck.
    pub fn pairs(&self) -> PairDeck<'_> {
        PairDeck::new(self)
    }

    pub(crate) fn insert_state(conn: &Connection, table: ReviewTable, id: ItemId, state: &ReviewState) -> Result<()> {
        let sql = format!(
            "INSERT OR IGNORE INTO {} ({}, ease_factor, interval, repetitions, next_review, last_reviewed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            table.table, table.key
        );
        conn.execute(
            &sql,
            params![
                id,
                state.ease_factor,
                state.interval,
                state.repetitions,
                to_ms(state.next_review),
                state.last_reviewed.map(to_ms),
            ],
        )?;
        Ok(())
    }

    pub(crate) fn load_state(&self, table: ReviewTable, id: ItemId) -> Result<Option<ReviewState>> {
        let conn = self.conn()?;
        Self::select_state(&conn, table, id)
    }

    fn select_state(conn: &Connection, table: ReviewTable, id: ItemId) -> Result<Option<ReviewState>> {
        let sql = format!(
            "SELECT ease_factor, interval, repetitions, next_review, last_reviewed FROM {} WHERE {} = ?1",
            table.table, table.key
        );
        Ok(conn.query_row(&sql, [id], state_from_row).optional()?)
    }

    fn write_state(conn: &Connection, table: ReviewTable, id: ItemId, state: &ReviewState) -> Result<usize> {
        let sql = format!(
            "UPDATE {} SET ease_factor = ?1, interval = ?2, repetitions = ?3, next_review = ?4, last_reviewed = ?5
             WHERE {} = ?6",
            table.table, table.key
        );
        Ok(conn.execute(
            &sql,
            params![
                state.ease_factor,
                state.interval,
                state.repetitions,
                to_ms(state.next_review),
                state.last_reviewed.map(to_ms),
                id,
            ],
        )?)
    }

    pub(crate) fn save_state(&self, table: ReviewTable, id: ItemId, state: &ReviewState) -> Result<()> {
        let conn = self.conn()?;
        if Self::write_state(&conn, table, id, state)? == 0 {
            return Err(FiszkiError::NotFound(id));
        }
        Ok(())
    }

    pub(crate) fn update_state(
        &self,
        table: ReviewTable,
        id: ItemId,
        update: &mut dyn FnMut(&ReviewState) -> ReviewState,
    ) -> Result<Option<ReviewState>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(current) = Self::select_state(&tx, table, id)? else {
            return Ok(None);
        };
        let next = update(&current);
        Self::write_state(&tx, table, id, &next)?;
        tx.commit()?;

        Ok(Some(next))
    }

    pub(crate) fn progress(&self, table: ReviewTable) -> Result<Progress> {
        let conn = self.conn()?;
        let sql = format!("SELECT COUNT(*), COUNT(last_reviewed) FROM {}", table.table);
        let (total, reviewed): (i64, i64) = conn.query_row(&sql, [], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(Progress {
            reviewed: reviewed as usize,
            total: total as usize,
        })
    }
}

/// Read review-state columns by name from a row.
pub(crate) fn state_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewState> {
    Ok(ReviewState {
        ease_factor: row.get("ease_factor")?,
        interval: row.get("interval")?,
        repetitions: row.get("repetitions")?,
        next_review: from_ms(row.get("next_review")?),
        last_reviewed: row.get::<_, Option<i64>>("last_reviewed")?.map(from_ms),
    })
}
