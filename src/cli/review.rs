//! Interactive review loop.
//!
//! Shows the prompt side of an item, waits for Enter, reveals the answer,
//! then reads a rating key and submits it.

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use colored::*;
use eyre::{Context, Result};
use fiszki::review::sm2::preview;
use fiszki::review::{Rating, ReviewSession, Tally, due_label};
use fiszki::store::{CardView, PairWord, ReviewStore};
use rand::Rng;

/// How an item is shown in the terminal.
pub trait Present {
    /// Lines shown before the reveal.
    fn front(&self) -> Vec<String>;

    /// Lines shown after the reveal.
    fn back(&self) -> Vec<String>;
}

impl Present for CardView {
    fn front(&self) -> Vec<String> {
        vec![
            self.card.polish_word.bold().to_string(),
            format!("[{}]", self.card.pronunciation).dimmed().to_string(),
        ]
    }

    fn back(&self) -> Vec<String> {
        let mut lines = vec![self.card.english_word.green().to_string()];
        if let Some(notes) = &self.card.notes {
            lines.push(notes.italic().to_string());
        }
        for sentence in &self.sentences {
            lines.push(format!("  ({}) {}", sentence.difficulty, sentence.sentence_pl));
            lines.push(format!("        {}", sentence.sentence_en.dimmed()));
        }
        lines
    }
}

impl Present for PairWord {
    fn front(&self) -> Vec<String> {
        vec![
            self.polish_word.bold().to_string(),
            format!("Which sound: {} or {}?", self.sound_a, self.sound_b),
        ]
    }

    fn back(&self) -> Vec<String> {
        vec![format!("{} ({})", self.answer().green(), self.english_word)]
    }
}

enum Reply {
    Line(String),
    Quit,
}

fn read_reply(input: &mut impl BufRead) -> Result<Reply> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    let line = line.trim();
    if read == 0 || line.eq_ignore_ascii_case("q") {
        return Ok(Reply::Quit);
    }
    Ok(Reply::Line(line.to_string()))
}

fn show(out: &mut impl Write, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(out, "  {}", line)?;
    }
    Ok(())
}

/// Run the loop until the user quits, input ends or the deck is empty.
///
/// `clock` is read once per item and once per submitted rating.
pub fn run_review<S, R>(
    session: &mut ReviewSession<S, R>,
    input: &mut impl BufRead,
    out: &mut impl Write,
    clock: impl Fn() -> DateTime<Utc>,
) -> Result<Tally>
where
    S: ReviewStore,
    S::Content: Present,
    R: Rng,
{
    'items: loop {
        let now = clock();
        let Some(next) = session.get_next(now).context("Failed to select next item")? else {
            writeln!(out, "{}", "Nothing to review yet.".yellow())?;
            break;
        };

        let progress = session.progress()?;
        let tally = session.tally();
        writeln!(out)?;
        writeln!(
            out,
            "{} reviewed {}/{}, accuracy {}%  {}",
            "Progress:".cyan(),
            progress.reviewed,
            progress.total,
            tally.accuracy(),
            next.due_label.dimmed()
        )?;
        show(out, &next.item.front())?;
        writeln!(out, "{}", "Press Enter to reveal (q to quit)".dimmed())?;
        out.flush()?;
        if let Reply::Quit = read_reply(input)? {
            break;
        }

        show(out, &next.item.back())?;
        let choices = preview(&next.state, now)
            .iter()
            .enumerate()
            .map(|(i, (rating, days))| format!("{}) {} ({}d)", i + 1, rating.label(), days))
            .collect::<Vec<_>>()
            .join("  ");
        let rating = loop {
            write!(out, "{} {} ", choices.cyan(), "q) quit:".cyan())?;
            out.flush()?;
            match read_reply(input)? {
                Reply::Quit => break 'items,
                Reply::Line(key) => match Rating::from_key(&key) {
                    Some(rating) => break rating,
                    None => writeln!(out, "{} {}", "Unknown choice:".red(), key)?,
                },
            }
        };

        let rated_at = clock();
        let next_review = session
            .submit_rating(next.item_id, rating.into(), rated_at)
            .context("Failed to save rating")?;
        writeln!(
            out,
            "{} {}, next review: {}",
            "Rated".green(),
            rating.label(),
            due_label(next_review, rated_at)
        )?;
    }

    let tally = session.tally();
    writeln!(out, "Session: {} rated, accuracy {}%", tally.ratings, tally.accuracy())?;
    Ok(tally)
}
