//! Vocabulary-card deck.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::Result;
use crate::id::{ItemId, from_ms, to_ms};
use crate::review::{ReviewEntry, ReviewState};
use crate::store::records::{Card, CardView, NewCard, Sentence};
use crate::store::sqlite::{CARD_REVIEWS, Database, state_from_row};
use crate::store::{Progress, ReviewStore};

const CARD_WITH_STATE: &str = r#"
    SELECT c.id AS id, c.polish_word AS polish_word, c.english_word AS english_word,
           c.pronunciation AS pronunciation, c.notes AS notes, c.audio_path AS audio_path,
           c.created_at AS created_at,
           r.ease_factor AS ease_factor, r.interval AS interval, r.repetitions AS repetitions,
           r.next_review AS next_review, r.last_reviewed AS last_reviewed
    FROM cards c
    JOIN reviews r ON r.card_id = c.id
"#;

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get("id")?,
        polish_word: row.get("polish_word")?,
        english_word: row.get("english_word")?,
        pronunciation: row.get("pronunciation")?,
        notes: row.get("notes")?,
        audio_path: row.get("audio_path")?,
        created_at: from_ms(row.get("created_at")?),
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewEntry<Card>> {
    Ok(ReviewEntry::new(card_from_row(row)?, state_from_row(row)?))
}

impl Database {
    /// Insert a card with its sentences and a fresh review state.
    ///
    /// Returns `None` when a card with the same `polish_word` already
    /// exists; nothing is written in that case.
    pub fn insert_card(&self, card: &NewCard, now: DateTime<Utc>) -> Result<Option<ItemId>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = Self::insert_card_in(&tx, card, now)?;
        tx.commit()?;
        Ok(id)
    }

    pub(crate) fn insert_card_in(conn: &Connection, card: &NewCard, now: DateTime<Utc>) -> Result<Option<ItemId>> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO cards (polish_word, english_word, pronunciation, notes, audio_path, created_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            params![
                card.polish_word,
                card.english_word,
                card.pronunciation,
                card.notes,
                to_ms(now)
            ],
        )?;
        if inserted == 0 {
            return Ok(None);
        }

        let id = conn.last_insert_rowid();
        for s in &card.sentences {
            conn.execute(
                "INSERT INTO card_sentences (card_id, difficulty, sentence_pl, sentence_en) VALUES (?1, ?2, ?3, ?4)",
                params![id, s.difficulty, s.sentence_pl, s.sentence_en],
            )?;
        }
        Self::insert_state(conn, CARD_REVIEWS, id, &ReviewState::new(now))?;

        log::debug!("Inserted card {} ({})", id, card.polish_word);
        Ok(Some(id))
    }

    /// Look a card up by its Polish word.
    pub fn card_by_word(&self, polish_word: &str) -> Result<Option<Card>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, polish_word, english_word, pronunciation, notes, audio_path, created_at
                 FROM cards WHERE polish_word = ?1",
                [polish_word],
                card_from_row,
            )
            .optional()?)
    }

    /// All cards in insertion order.
    pub fn list_cards(&self) -> Result<Vec<Card>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, polish_word, english_word, pronunciation, notes, audio_path, created_at
             FROM cards ORDER BY id",
        )?;
        let cards = stmt.query_map([], card_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    /// Number of cards.
    pub fn count_cards(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Sentences for a card, easy first.
    pub fn sentences_for(&self, card_id: ItemId) -> Result<Vec<Sentence>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, difficulty, sentence_pl, sentence_en, audio_path FROM card_sentences
             WHERE card_id = ?1
             ORDER BY CASE difficulty WHEN 'easy' THEN 1 WHEN 'medium' THEN 2 WHEN 'hard' THEN 3 END, id",
        )?;
        let sentences = stmt
            .query_map([card_id], |row| {
                Ok(Sentence {
                    id: row.get(0)?,
                    difficulty: row.get(1)?,
                    sentence_pl: row.get(2)?,
                    sentence_en: row.get(3)?,
                    audio_path: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sentences)
    }

    fn card_entries(&self, due_at: Option<DateTime<Utc>>) -> Result<Vec<ReviewEntry<Card>>> {
        let conn = self.conn()?;
        let entries = match due_at {
            Some(now) => {
                let sql = format!("{CARD_WITH_STATE} WHERE r.next_review <= ?1 ORDER BY r.next_review ASC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([to_ms(now)], entry_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let sql = format!("{CARD_WITH_STATE} ORDER BY c.id");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], entry_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(entries)
    }
}

/// The card deck viewed as a [`ReviewStore`].
#[derive(Debug, Clone, Copy)]
pub struct CardDeck<'a> {
    db: &'a Database,
}

impl<'a> CardDeck<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl ReviewStore for CardDeck<'_> {
    type Item = Card;
    type Content = CardView;

    fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<ReviewEntry<Card>>> {
        self.db.card_entries(Some(now))
    }

    fn find_all(&self) -> Result<Vec<ReviewEntry<Card>>> {
        self.db.card_entries(None)
    }

    fn load_state(&self, id: ItemId) -> Result<Option<ReviewState>> {
        self.db.load_state(CARD_REVIEWS, id)
    }

    fn save_state(&self, id: ItemId, state: &ReviewState) -> Result<()> {
        self.db.save_state(CARD_REVIEWS, id, state)
    }

    fn update_state(
        &self,
        id: ItemId,
        update: &mut dyn FnMut(&ReviewState) -> ReviewState,
    ) -> Result<Option<ReviewState>> {
        self.db.update_state(CARD_REVIEWS, id, update)
    }

    fn content(&self, item: &Card) -> Result<CardView> {
        Ok(CardView {
            card: item.clone(),
            sentences: self.db.sentences_for(item.id)?,
        })
    }

    fn progress(&self) -> Result<Progress> {
        self.db.progress(CARD_REVIEWS)
    }
}
