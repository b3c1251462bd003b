//! Queue-driven batch generation.
//!
//! Words are taken from the head of the word queue in frequency-rank order.
//! For each word the generator produces a card, every sentence that lacks
//! the exact word is sent back for repair a bounded number of times, and
//! the card is inserted with a fresh review state. A failure on one word is
//! recorded in the report and the batch moves on.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::generate::{ContentGenerator, sentence_contains_word};
use crate::store::{Database, NewCard, NewSentence, QueuedWord};

/// Reported when a batch is requested but nothing is queued.
pub const NO_QUEUED_WORDS: &str = "No queued words available";

/// Batch limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    pub max_batch: usize,
    pub max_repairs: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_batch: 100,
            max_repairs: 2,
        }
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Queue entries completed, including words whose card already existed.
    pub generated: usize,
    /// One `"<word>: <error>"` line per failed word.
    pub errors: Vec<String>,
}

/// Generate cards for up to `count` queued words (clamped to
/// `1..=max_batch`) and log the batch.
pub async fn generate_cards<G>(
    db: &Database,
    generator: &G,
    count: usize,
    options: GenerationOptions,
    now: DateTime<Utc>,
) -> Result<GenerationReport>
where
    G: ContentGenerator + ?Sized,
{
    let limit = count.clamp(1, options.max_batch.max(1));
    let queued = db.queued_words(limit)?;
    if queued.is_empty() {
        return Ok(GenerationReport {
            generated: 0,
            errors: vec![NO_QUEUED_WORDS.to_string()],
        });
    }

    let batch_number = db.next_batch_number()?;
    info!("Generation batch {} started for {} word(s)", batch_number, queued.len());

    let mut report = GenerationReport::default();
    for word in &queued {
        match generate_one(db, generator, word, options.max_repairs, now).await {
            Ok(()) => report.generated += 1,
            Err(e) => {
                warn!("Generation failed for '{}': {}", word.polish_word, e);
                report.errors.push(format!("{}: {}", word.polish_word, e));
            }
        }
    }

    db.log_batch(batch_number, report.generated, now)?;
    info!(
        "Generation batch {} finished: {} generated, {} failed",
        batch_number,
        report.generated,
        report.errors.len()
    );
    Ok(report)
}

async fn generate_one<G>(
    db: &Database,
    generator: &G,
    word: &QueuedWord,
    max_repairs: u32,
    now: DateTime<Utc>,
) -> Result<()>
where
    G: ContentGenerator + ?Sized,
{
    let generated = generator.generate_card(&word.polish_word).await?;
    let sentences = repair_sentences(generator, &word.polish_word, generated.sentences, max_repairs).await?;
    let card = NewCard {
        polish_word: word.polish_word.clone(),
        sentences,
        ..generated
    };

    let card_id = db.insert_card(&card, now)?;
    if card_id.is_none() {
        debug!("Card for '{}' already exists", word.polish_word);
    }
    db.mark_generated(word.id, card_id, now)
}

async fn repair_sentences<G>(
    generator: &G,
    polish_word: &str,
    sentences: Vec<NewSentence>,
    max_repairs: u32,
) -> Result<Vec<NewSentence>>
where
    G: ContentGenerator + ?Sized,
{
    let mut repaired = Vec::with_capacity(sentences.len());
    for mut sentence in sentences {
        let mut attempts = 0;
        while !sentence_contains_word(&sentence.sentence_pl, polish_word) && attempts < max_repairs {
            attempts += 1;
            debug!(
                "Repairing {} sentence for '{}' (attempt {})",
                sentence.difficulty, polish_word, attempts
            );
            let fixed = generator.repair_sentence(polish_word, &sentence).await?;
            sentence = NewSentence {
                difficulty: sentence.difficulty,
                ..fixed
            };
        }
        if !sentence_contains_word(&sentence.sentence_pl, polish_word) {
            warn!(
                "Keeping {} sentence for '{}' without the exact word: {}",
                sentence.difficulty, polish_word, sentence.sentence_pl
            );
        }
        repaired.push(sentence);
    }
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::MockGenerator;
    use crate::store::{Difficulty, QueueStats, ReviewStore};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap()
    }

    fn sentence(difficulty: Difficulty, pl: &str) -> NewSentence {
        NewSentence {
            difficulty,
            sentence_pl: pl.to_string(),
            sentence_en: "translation".to_string(),
        }
    }

    fn card_with(word: &str, sentences: Vec<NewSentence>) -> NewCard {
        NewCard {
            polish_word: word.to_string(),
            english_word: "translation".to_string(),
            pronunciation: word.to_string(),
            notes: Some("notes".to_string()),
            sentences,
        }
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let db = Database::open_in_memory().unwrap();
        let report = generate_cards(&db, &MockGenerator::new(), 5, GenerationOptions::default(), now())
            .await
            .unwrap();
        assert_eq!(report.generated, 0);
        assert_eq!(report.errors, vec![NO_QUEUED_WORDS.to_string()]);
        assert!(db.generation_log().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generates_in_rank_order_up_to_count() {
        let db = Database::open_in_memory().unwrap();
        db.enqueue_words([(3, "kot"), (1, "nie"), (2, "tak")]).unwrap();

        let report = generate_cards(&db, &MockGenerator::new(), 2, GenerationOptions::default(), now())
            .await
            .unwrap();
        assert_eq!(report, GenerationReport { generated: 2, errors: vec![] });

        let words: Vec<String> = db.list_cards().unwrap().into_iter().map(|c| c.polish_word).collect();
        assert!(words.contains(&"nie".to_string()));
        assert!(words.contains(&"tak".to_string()));
        assert_eq!(db.queued_words(10).unwrap()[0].polish_word, "kot");
        assert_eq!(db.cards().find_due(now()).unwrap().len(), 2);

        let log = db.generation_log().unwrap();
        assert_eq!((log[0].batch_number, log[0].total_generated), (1, 2));
    }

    #[tokio::test]
    async fn test_count_is_clamped() {
        let db = Database::open_in_memory().unwrap();
        db.enqueue_words([(1, "a"), (2, "b"), (3, "c")]).unwrap();
        let options = GenerationOptions {
            max_batch: 2,
            max_repairs: 0,
        };

        let report = generate_cards(&db, &MockGenerator::new(), 50, options, now()).await.unwrap();
        assert_eq!(report.generated, 2);

        let report = generate_cards(&db, &MockGenerator::new(), 0, options, now()).await.unwrap();
        assert_eq!(report.generated, 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let db = Database::open_in_memory().unwrap();
        db.enqueue_words([(1, "nie"), (2, "tak")]).unwrap();
        let generator = MockGenerator::new().with_failure("nie");

        let report = generate_cards(&db, &generator, 10, GenerationOptions::default(), now())
            .await
            .unwrap();
        assert_eq!(report.generated, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("nie: "));

        let stats = db.queue_stats().unwrap();
        assert_eq!(
            stats,
            QueueStats {
                total: 2,
                queued: 1,
                generated: 1,
                total_cards: 1
            }
        );
    }

    #[tokio::test]
    async fn test_existing_card_marks_queue_entry() {
        let db = Database::open_in_memory().unwrap();
        db.insert_card(&card_with("dom", vec![]), now()).unwrap();
        db.enqueue_word(1, "dom").unwrap();

        let report = generate_cards(&db, &MockGenerator::new(), 1, GenerationOptions::default(), now())
            .await
            .unwrap();
        assert_eq!(report.generated, 1);
        assert_eq!(db.count_cards().unwrap(), 1);
        assert_eq!(db.queue_stats().unwrap().queued, 0);
    }

    #[tokio::test]
    async fn test_sentence_repaired_and_difficulty_kept() {
        let db = Database::open_in_memory().unwrap();
        db.enqueue_word(1, "kot").unwrap();
        let generator = MockGenerator::new()
            .with_card(card_with(
                "kot",
                vec![sentence(Difficulty::Easy, "Mam kota."), sentence(Difficulty::Hard, "Ten kot śpi.")],
            ))
            .with_repair(sentence(Difficulty::Medium, "To jest kot."));

        generate_cards(&db, &generator, 1, GenerationOptions::default(), now())
            .await
            .unwrap();
        assert_eq!(generator.repair_calls(), 1);

        let card = db.card_by_word("kot").unwrap().unwrap();
        let sentences = db.sentences_for(card.id).unwrap();
        assert_eq!(sentences[0].difficulty, Difficulty::Easy);
        assert_eq!(sentences[0].sentence_pl, "To jest kot.");
    }

    #[tokio::test]
    async fn test_repairs_are_bounded() {
        let db = Database::open_in_memory().unwrap();
        db.enqueue_word(1, "kot").unwrap();
        let generator =
            MockGenerator::new().with_card(card_with("kot", vec![sentence(Difficulty::Easy, "Mam kota.")]));

        let report = generate_cards(&db, &generator, 1, GenerationOptions::default(), now())
            .await
            .unwrap();
        assert_eq!(report.generated, 1);
        assert_eq!(generator.repair_calls(), 2);

        let card = db.card_by_word("kot").unwrap().unwrap();
        assert_eq!(db.sentences_for(card.id).unwrap()[0].sentence_pl, "Mam kota.");
    }
}
