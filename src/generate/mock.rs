//! Scripted content generator.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{FiszkiError, Result};
use crate::generate::ContentGenerator;
use crate::store::{Difficulty, NewCard, NewSentence};

/// A generator that answers from canned data.
///
/// Words without a scripted card get a placeholder card whose sentences
/// all contain the word. Repairs are served from a queue; once it is empty
/// the sentence is handed back unchanged.
#[derive(Debug, Default)]
pub struct MockGenerator {
    cards: HashMap<String, NewCard>,
    failures: HashSet<String>,
    repairs: Mutex<VecDeque<NewSentence>>,
    generate_calls: AtomicUsize,
    repair_calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `card` for its `polish_word`.
    pub fn with_card(mut self, card: NewCard) -> Self {
        self.cards.insert(card.polish_word.clone(), card);
        self
    }

    /// Fail every request for `word`.
    pub fn with_failure(mut self, word: impl Into<String>) -> Self {
        self.failures.insert(word.into());
        self
    }

    /// Queue a sentence to hand out on the next repair request.
    pub fn with_repair(self, sentence: NewSentence) -> Self {
        if let Ok(mut repairs) = self.repairs.lock() {
            repairs.push_back(sentence);
        }
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn repair_calls(&self) -> usize {
        self.repair_calls.load(Ordering::SeqCst)
    }

    fn placeholder(polish_word: &str) -> NewCard {
        let sentence = |difficulty, pl: String| NewSentence {
            difficulty,
            sentence_pl: pl,
            sentence_en: format!("A sentence with '{polish_word}'."),
        };
        NewCard {
            polish_word: polish_word.to_string(),
            english_word: format!("({polish_word})"),
            pronunciation: polish_word.to_string(),
            notes: None,
            sentences: vec![
                sentence(Difficulty::Easy, format!("To {polish_word}.")),
                sentence(Difficulty::Medium, format!("Mówię {polish_word} codziennie.")),
                sentence(Difficulty::Hard, format!("Wczoraj znowu słyszałem {polish_word} w pracy.")),
            ],
        }
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate_card(&self, polish_word: &str) -> Result<NewCard> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.contains(polish_word) {
            return Err(FiszkiError::Generation(format!("scripted failure for '{polish_word}'")));
        }
        Ok(self
            .cards
            .get(polish_word)
            .cloned()
            .unwrap_or_else(|| Self::placeholder(polish_word)))
    }

    async fn repair_sentence(&self, _polish_word: &str, sentence: &NewSentence) -> Result<NewSentence> {
        self.repair_calls.fetch_add(1, Ordering::SeqCst);
        let mut repairs = self
            .repairs
            .lock()
            .map_err(|e| FiszkiError::Generation(e.to_string()))?;
        Ok(repairs.pop_front().unwrap_or_else(|| sentence.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::sentence_contains_word;

    #[tokio::test]
    async fn test_placeholder_sentences_contain_word() {
        let generator = MockGenerator::new();
        let card = generator.generate_card("kot").await.unwrap();
        assert_eq!(card.sentences.len(), 3);
        assert!(card.sentences.iter().all(|s| sentence_contains_word(&s.sentence_pl, "kot")));
        assert_eq!(generator.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let generator = MockGenerator::new().with_failure("pies");
        let err = generator.generate_card("pies").await.unwrap_err();
        assert!(matches!(err, FiszkiError::Generation(_)));
    }

    #[tokio::test]
    async fn test_repairs_drain_then_echo() {
        let fixed = NewSentence {
            difficulty: Difficulty::Easy,
            sentence_pl: "Mam kota.".to_string(),
            sentence_en: "I have a cat.".to_string(),
        };
        let generator = MockGenerator::new().with_repair(fixed.clone());
        let broken = NewSentence {
            sentence_pl: "Nic.".to_string(),
            ..fixed.clone()
        };

        assert_eq!(generator.repair_sentence("kota", &broken).await.unwrap(), fixed);
        assert_eq!(generator.repair_sentence("kota", &broken).await.unwrap(), broken);
        assert_eq!(generator.repair_calls(), 2);
    }
}
