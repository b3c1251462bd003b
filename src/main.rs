use chrono::Utc;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use fiszki::generate::{AnthropicGenerator, generate_cards};
use fiszki::review::ReviewSession;
use fiszki::seed::{self, FrequencyEntry};
use fiszki::store::{Database, NewCard, NewPair, ReviewStore};
use log::info;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, Deck, SeedCommands};
use cli::review::{Present, run_review};
use config::Config;

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fiszki")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("fiszki.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn open_database(config: &Config) -> Result<Database> {
    let path = &config.storage.db_path;
    Database::open(path).context(format!("Failed to open database at {}", path.display()))
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
        println!("Database: {}", config.storage.db_path.display());
    }

    let db = open_database(config)?;

    match &cli.command {
        None => handle_review_command(&db, Deck::Cards, config),
        Some(Commands::Next { deck }) => handle_next_command(&db, *deck),
        Some(Commands::Rate { id, quality, deck }) => handle_rate_command(&db, *id, *quality, *deck, config),
        Some(Commands::Review { deck }) => handle_review_command(&db, *deck, config),
        Some(Commands::Seed { command }) => handle_seed_command(&db, command),
        Some(Commands::Generate { count }) => handle_generate_command(&db, *count, config),
        Some(Commands::Stats) => handle_stats_command(&db),
        Some(Commands::Cards) => handle_cards_command(&db),
    }
}

fn print_next<S>(store: S) -> Result<()>
where
    S: ReviewStore,
    S::Content: Serialize,
{
    let mut session = ReviewSession::with_thread_rng(store);
    let next = session.get_next(Utc::now()).context("Failed to select next item")?;
    println!("{}", serde_json::to_string_pretty(&next)?);
    Ok(())
}

fn handle_next_command(db: &Database, deck: Deck) -> Result<()> {
    info!("Selecting next item from {:?} deck", deck);
    match deck {
        Deck::Cards => print_next(db.cards()),
        Deck::Pairs => print_next(db.pairs()),
    }
}

fn rate<S: ReviewStore>(store: S, id: i64, quality: i64, config: &Config) -> Result<()> {
    let mut session = ReviewSession::with_thread_rng(store).with_policy(config.review.policy());
    let next_review = session
        .submit_raw(id, quality, Utc::now())
        .context(format!("Failed to rate item {}", id))?;
    println!("{}", serde_json::to_string_pretty(&json!({ "nextReview": next_review }))?);
    Ok(())
}

fn handle_rate_command(db: &Database, id: i64, quality: i64, deck: Deck, config: &Config) -> Result<()> {
    info!("Rating item {} in {:?} deck with quality {}", id, deck, quality);
    match deck {
        Deck::Cards => rate(db.cards(), id, quality, config),
        Deck::Pairs => rate(db.pairs(), id, quality, config),
    }
}

fn review<S>(store: S, config: &Config) -> Result<()>
where
    S: ReviewStore,
    S::Content: Present,
{
    let mut session = ReviewSession::with_thread_rng(store).with_policy(config.review.policy());
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let tally = run_review(&mut session, &mut stdin.lock(), &mut stdout, Utc::now)?;
    info!("Review session ended after {} rating(s)", tally.ratings);
    Ok(())
}

fn handle_review_command(db: &Database, deck: Deck, config: &Config) -> Result<()> {
    info!("Starting interactive review of {:?} deck", deck);
    match deck {
        Deck::Cards => review(db.cards(), config),
        Deck::Pairs => review(db.pairs(), config),
    }
}

fn handle_seed_command(db: &Database, command: &SeedCommands) -> Result<()> {
    info!("Handling seed command: {:?}", command);
    let now = Utc::now();
    let (what, file, report) = match command {
        SeedCommands::Cards { file } => {
            let cards: Vec<NewCard> = load_seed(file)?;
            ("cards", file, seed::seed_cards(db, &cards, now)?)
        }
        SeedCommands::Pairs { file } => {
            let pairs: Vec<NewPair> = load_seed(file)?;
            ("minimal-pair words", file, seed::seed_pairs(db, &pairs, now)?)
        }
        SeedCommands::Queue { file } => {
            let entries: Vec<FrequencyEntry> = load_seed(file)?;
            ("queued words", file, seed::seed_queue(db, &entries)?)
        }
    };

    if report.inserted == 0 {
        println!("{} {} already seeded ({} total)", "Skipped:".yellow(), what, report.total);
    } else {
        println!(
            "{} {} {} from {} ({} total)",
            "Seeded:".green(),
            report.inserted,
            what,
            file.display(),
            report.total
        );
    }
    Ok(())
}

fn load_seed<T: serde::de::DeserializeOwned>(file: &Path) -> Result<T> {
    seed::load_json(file).context(format!("Failed to load seed file {}", file.display()))
}

fn handle_generate_command(db: &Database, count: usize, config: &Config) -> Result<()> {
    info!("Generating up to {} card(s)", count);
    let generator = AnthropicGenerator::from_env(&config.llm.api_key_env, config.llm.anthropic())
        .context("Failed to create content generator")?;
    info!("Using model {}", generator.model());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let report = runtime
        .block_on(generate_cards(db, &generator, count, config.generation.options(), Utc::now()))
        .context("Generation failed")?;

    println!("{} {} card(s)", "Generated:".green(), report.generated);
    for error in &report.errors {
        println!("  {} {}", "Error:".red(), error);
    }
    Ok(())
}

fn handle_stats_command(db: &Database) -> Result<()> {
    let stats = db.queue_stats()?;
    let cards = db.cards().progress()?;
    let pairs = db.pairs().progress()?;

    println!("{}", "Word queue".cyan());
    println!("  total:     {}", stats.total);
    println!("  queued:    {}", stats.queued);
    println!("  generated: {}", stats.generated);
    println!("{}", "Decks".cyan());
    println!(
        "  cards:     {}/{} reviewed ({:.0}%)",
        cards.reviewed,
        cards.total,
        cards.ratio() * 100.0
    );
    println!(
        "  pairs:     {}/{} reviewed ({:.0}%)",
        pairs.reviewed,
        pairs.total,
        pairs.ratio() * 100.0
    );
    Ok(())
}

fn handle_cards_command(db: &Database) -> Result<()> {
    let cards = db.list_cards()?;
    if cards.is_empty() {
        println!("{}", "No cards yet. Try `fiszki seed cards <FILE>`.".yellow());
        return Ok(());
    }
    for card in cards {
        println!(
            "{:>5}  {:<20} {}",
            card.id.to_string().dimmed(),
            card.polish_word.bold(),
            card.english_word
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
