//! Word queue and generation log.
//!
//! The queue holds frequency-ranked Polish words waiting for card
//! generation; the log records one row per generation or seed batch.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::error::Result;
use crate::id::{ItemId, from_ms, to_ms};
use crate::store::records::{GenerationBatch, QueueStats, QueuedWord};
use crate::store::sqlite::Database;

impl Database {
    /// Queue a word. Returns false if its rank or word is already queued.
    pub fn enqueue_word(&self, frequency_rank: i64, polish_word: &str) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO word_queue (frequency_rank, polish_word) VALUES (?1, ?2)",
            params![frequency_rank, polish_word],
        )?;
        Ok(inserted > 0)
    }

    /// Queue many words in one transaction. Returns how many were new.
    pub fn enqueue_words<'w>(&self, words: impl IntoIterator<Item = (i64, &'w str)>) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO word_queue (frequency_rank, polish_word) VALUES (?1, ?2)")?;
            for (rank, word) in words {
                count += stmt.execute(params![rank, word])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    /// The next `limit` queued words, most frequent first.
    pub fn queued_words(&self, limit: usize) -> Result<Vec<QueuedWord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, frequency_rank, polish_word FROM word_queue
             WHERE status = 'queued' ORDER BY frequency_rank ASC LIMIT ?1",
        )?;
        let words = stmt
            .query_map([limit as i64], |row| {
                Ok(QueuedWord {
                    id: row.get(0)?,
                    frequency_rank: row.get(1)?,
                    polish_word: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(words)
    }

    /// Mark a queue entry generated. `card_id` is `None` when the card
    /// already existed before generation.
    pub fn mark_generated(&self, queue_id: i64, card_id: Option<ItemId>, now: DateTime<Utc>) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE word_queue SET status = 'generated', generated_at = ?1, card_id = ?2 WHERE id = ?3",
            params![to_ms(now), card_id, queue_id],
        )?;
        Ok(())
    }

    /// Every Polish word that already has a card.
    pub fn known_words(&self) -> Result<HashSet<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT polish_word FROM cards")?;
        let words = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(words)
    }

    /// Number of entries in the queue, any status.
    pub fn queue_len(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM word_queue", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Queue and card counters.
    pub fn queue_stats(&self) -> Result<QueueStats> {
        let conn = self.conn()?;
        let (total, queued, generated): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(status = 'queued'), 0),
                    COALESCE(SUM(status = 'generated'), 0)
             FROM word_queue",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let total_cards: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        Ok(QueueStats {
            total: total as usize,
            queued: queued as usize,
            generated: generated as usize,
            total_cards: total_cards as usize,
        })
    }

    /// One past the highest logged batch number.
    pub fn next_batch_number(&self) -> Result<i64> {
        let conn = self.conn()?;
        let last: Option<i64> = conn.query_row("SELECT MAX(batch_number) FROM generation_log", [], |row| row.get(0))?;
        Ok(last.unwrap_or(0) + 1)
    }

    /// Record a finished batch.
    pub fn log_batch(&self, batch_number: i64, total_generated: usize, now: DateTime<Utc>) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO generation_log (batch_number, total_generated, created_at) VALUES (?1, ?2, ?3)",
            params![batch_number, total_generated as i64, to_ms(now)],
        )?;
        Ok(())
    }

    /// Logged batches, oldest first.
    pub fn generation_log(&self) -> Result<Vec<GenerationBatch>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT batch_number, total_generated, created_at FROM generation_log ORDER BY id")?;
        let batches = stmt
            .query_map([], |row| {
                Ok(GenerationBatch {
                    batch_number: row.get(0)?,
                    total_generated: row.get(1)?,
                    created_at: from_ms(row.get(2)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(batches)
    }
}
