//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - next/rate: one step of the review API, JSON output
//! - review: interactive reveal-and-rate loop
//! - seed: load cards, minimal pairs or the word queue from JSON
//! - generate: create cards for queued words
//! - stats/cards: inspect the store

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fiszki - spaced-repetition Polish flashcards
#[derive(Parser, Debug)]
#[command(name = "fiszki")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (default: review the card deck)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Which deck to review
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deck {
    /// Vocabulary cards
    #[default]
    Cards,
    /// Minimal-pair listening drills
    Pairs,
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the next item to review as JSON
    Next {
        #[arg(short, long, value_enum, default_value_t = Deck::Cards)]
        deck: Deck,
    },

    /// Rate an item and print its next review time as JSON
    Rate {
        /// Item ID
        id: i64,

        /// Quality rating (0, 3 or 5; 0-5 when strict ratings are off)
        #[arg(allow_negative_numbers = true)]
        quality: i64,

        #[arg(short, long, value_enum, default_value_t = Deck::Cards)]
        deck: Deck,
    },

    /// Review interactively
    Review {
        #[arg(short, long, value_enum, default_value_t = Deck::Cards)]
        deck: Deck,
    },

    /// Load seed data from a JSON file
    Seed {
        #[command(subcommand)]
        command: SeedCommands,
    },

    /// Generate cards for the next queued words
    Generate {
        /// Number of words to generate
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// Show queue and review progress
    Stats,

    /// List all cards
    Cards,
}

/// Seed subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SeedCommands {
    /// Vocabulary cards with sentences
    Cards { file: PathBuf },

    /// Minimal pairs with their words
    Pairs { file: PathBuf },

    /// Word-frequency list for the generation queue
    Queue { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["fiszki"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_verbose_and_config() {
        let cli = Cli::try_parse_from(["fiszki", "-v", "-c", "/path/to/fiszki.yml"]).unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/fiszki.yml")));
    }

    #[test]
    fn test_next_defaults_to_cards() {
        let cli = Cli::try_parse_from(["fiszki", "next"]).unwrap();
        match cli.command {
            Some(Commands::Next { deck }) => assert_eq!(deck, Deck::Cards),
            _ => panic!("Expected next command"),
        }
    }

    #[test]
    fn test_next_pairs_deck() {
        let cli = Cli::try_parse_from(["fiszki", "next", "--deck", "pairs"]).unwrap();
        match cli.command {
            Some(Commands::Next { deck }) => assert_eq!(deck, Deck::Pairs),
            _ => panic!("Expected next command"),
        }
    }

    #[test]
    fn test_rate_command() {
        let cli = Cli::try_parse_from(["fiszki", "rate", "12", "5", "-d", "pairs"]).unwrap();
        match cli.command {
            Some(Commands::Rate { id, quality, deck }) => {
                assert_eq!(id, 12);
                assert_eq!(quality, 5);
                assert_eq!(deck, Deck::Pairs);
            }
            _ => panic!("Expected rate command"),
        }
    }

    #[test]
    fn test_rate_accepts_negative_quality() {
        // Rejected later by the quality policy, not by the parser
        let cli = Cli::try_parse_from(["fiszki", "rate", "1", "-1"]).unwrap();
        match cli.command {
            Some(Commands::Rate { quality, .. }) => assert_eq!(quality, -1),
            _ => panic!("Expected rate command"),
        }
    }

    #[test]
    fn test_rate_requires_quality() {
        assert!(Cli::try_parse_from(["fiszki", "rate", "1"]).is_err());
    }

    #[test]
    fn test_seed_commands() {
        let cli = Cli::try_parse_from(["fiszki", "seed", "queue", "freq.json"]).unwrap();
        match cli.command {
            Some(Commands::Seed {
                command: SeedCommands::Queue { file },
            }) => assert_eq!(file, PathBuf::from("freq.json")),
            _ => panic!("Expected seed queue command"),
        }
        assert!(Cli::try_parse_from(["fiszki", "seed", "decks", "x.json"]).is_err());
    }

    #[test]
    fn test_generate_count() {
        let cli = Cli::try_parse_from(["fiszki", "generate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Generate { count: 10 })));

        let cli = Cli::try_parse_from(["fiszki", "generate", "-n", "25"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Generate { count: 25 })));
    }

    #[test]
    fn test_stats_and_cards() {
        assert!(matches!(
            Cli::try_parse_from(["fiszki", "stats"]).unwrap().command,
            Some(Commands::Stats)
        ));
        assert!(matches!(
            Cli::try_parse_from(["fiszki", "cards"]).unwrap().command,
            Some(Commands::Cards)
        ));
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }
}
