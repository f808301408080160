// SPDX-License-Identifier: GPL-3.0-or-later

//! Decision points of the tagging pipeline.
//!
//! The pipeline never talks to a terminal directly. Each point where a human
//! may need to step in (picking a candidate, revising a search term that found
//! nothing, supplying a genre) goes through one of the traits below, so the
//! same code drives an interactive session, an automated run, or a scripted
//! test.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::{info, warn};
use tunetag_domain::{split_comma_list, TrackCandidate};

/// One answer to "which candidate?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Ordinal(u32),
    /// Input that is not a number at all.
    Unparsed(String),
    Quit,
}

/// Picks one candidate out of a listing.
#[async_trait]
pub trait DecisionProvider: Send {
    /// `rejected` carries the previous answer when it did not name a listed
    /// candidate; it is `None` on the first request for a listing.
    async fn choose(&mut self, candidates: &[TrackCandidate], rejected: Option<&Choice>) -> Choice;
}

/// Supplies a new search term after a search came back empty.
#[async_trait]
pub trait TermReviser: Send {
    /// `None` abandons the file.
    async fn revise_term(&mut self, failed_term: &str) -> Option<String>;
}

/// Supplies genres when neither the catalog nor the run options have any.
#[async_trait]
pub trait GenreSource: Send {
    async fn ask_genres(&mut self) -> Vec<String>;
}

/// Everything the pipeline may ask of whoever is driving it.
pub trait Operator: DecisionProvider + TermReviser + GenreSource {}

impl<T: DecisionProvider + TermReviser + GenreSource> Operator for T {}

fn is_quit(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("q")
}

// ============================================================================
// Terminal
// ============================================================================

/// Line-oriented prompt over an async reader/writer pair.
///
/// End of input counts as quitting, so a closed stdin never spins the
/// selection loop.
pub struct TerminalPrompt<R, W> {
    reader: R,
    writer: W,
}

impl TerminalPrompt<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> TerminalPrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    async fn say(&mut self, text: &str) {
        if let Err(error) = self.writer.write_all(text.as_bytes()).await {
            warn!(target: "prompt", %error, "failed to write prompt");
            return;
        }
        if let Err(error) = self.writer.flush().await {
            warn!(target: "prompt", %error, "failed to flush prompt");
        }
    }

    /// Read one trimmed line; `None` at end of input.
    async fn read_answer(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(error) => {
                warn!(target: "prompt", %error, "failed to read answer");
                None
            }
        }
    }
}

#[async_trait]
impl<R, W> DecisionProvider for TerminalPrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn choose(&mut self, candidates: &[TrackCandidate], rejected: Option<&Choice>) -> Choice {
        if rejected.is_some() {
            self.say("Not a choice\n").await;
        } else {
            for candidate in candidates {
                self.say(&format!("{}\n\n", candidate)).await;
            }
        }

        self.say(&format!("Choose 1 - {} (or continue 'q'): ", candidates.len()))
            .await;

        match self.read_answer().await {
            None => Choice::Quit,
            Some(answer) if is_quit(&answer) => Choice::Quit,
            Some(answer) => match answer.parse::<u32>() {
                Ok(ordinal) => Choice::Ordinal(ordinal),
                Err(_) => Choice::Unparsed(answer),
            },
        }
    }
}

#[async_trait]
impl<R, W> TermReviser for TerminalPrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn revise_term(&mut self, failed_term: &str) -> Option<String> {
        loop {
            self.say(&format!(
                "No results for '{}', enter new term (or continue 'q'): ",
                failed_term
            ))
            .await;

            match self.read_answer().await {
                None => return None,
                Some(answer) if is_quit(&answer) => return None,
                Some(answer) if answer.is_empty() => continue,
                Some(answer) => return Some(answer),
            }
        }
    }
}

#[async_trait]
impl<R, W> GenreSource for TerminalPrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn ask_genres(&mut self) -> Vec<String> {
        self.say("Enter Genre(s): ").await;
        self.read_answer()
            .await
            .map(|answer| split_comma_list(&answer))
            .unwrap_or_default()
    }
}

// ============================================================================
// Automatic
// ============================================================================

/// Unattended operator: always takes the first candidate, never revises a
/// term and never invents a genre.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoSelect;

#[async_trait]
impl DecisionProvider for AutoSelect {
    async fn choose(&mut self, candidates: &[TrackCandidate], rejected: Option<&Choice>) -> Choice {
        if rejected.is_some() {
            return Choice::Quit;
        }
        match candidates.first() {
            Some(first) => {
                info!(
                    target: "selector",
                    ordinal = first.ordinal,
                    title = %first.track_title,
                    artists = %first.joined_artists(),
                    "auto-selected first candidate"
                );
                Choice::Ordinal(first.ordinal)
            }
            None => Choice::Quit,
        }
    }
}

#[async_trait]
impl TermReviser for AutoSelect {
    async fn revise_term(&mut self, failed_term: &str) -> Option<String> {
        info!(target: "resolver", term = %failed_term, "no results, skipping file");
        None
    }
}

#[async_trait]
impl GenreSource for AutoSelect {
    async fn ask_genres(&mut self) -> Vec<String> {
        Vec::new()
    }
}

// ============================================================================
// Scripted
// ============================================================================

/// Operator that replays prepared answers; once a script runs dry it quits.
#[derive(Debug, Default, Clone)]
pub struct ScriptedOperator {
    choices: VecDeque<Choice>,
    terms: VecDeque<Option<String>>,
    genres: VecDeque<Vec<String>>,
    /// Every answer the selector rejected, in order.
    pub rejected: Vec<Choice>,
    /// Number of fresh listings presented.
    pub listings_seen: usize,
    /// Terms for which a revision was requested.
    pub failed_terms: Vec<String>,
    pub genre_requests: usize,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, choice: Choice) -> Self {
        self.choices.push_back(choice);
        self
    }

    pub fn pick(self, ordinal: u32) -> Self {
        self.answer(Choice::Ordinal(ordinal))
    }

    pub fn revise(mut self, term: Option<&str>) -> Self {
        self.terms.push_back(term.map(str::to_string));
        self
    }

    pub fn genres(mut self, genres: &[&str]) -> Self {
        self.genres
            .push_back(genres.iter().map(|g| g.to_string()).collect());
        self
    }
}

#[async_trait]
impl DecisionProvider for ScriptedOperator {
    async fn choose(&mut self, _candidates: &[TrackCandidate], rejected: Option<&Choice>) -> Choice {
        match rejected {
            Some(choice) => self.rejected.push(choice.clone()),
            None => self.listings_seen += 1,
        }
        self.choices.pop_front().unwrap_or(Choice::Quit)
    }
}

#[async_trait]
impl TermReviser for ScriptedOperator {
    async fn revise_term(&mut self, failed_term: &str) -> Option<String> {
        self.failed_terms.push(failed_term.to_string());
        self.terms.pop_front().flatten()
    }
}

#[async_trait]
impl GenreSource for ScriptedOperator {
    async fn ask_genres(&mut self) -> Vec<String> {
        self.genre_requests += 1;
        self.genres.pop_front().unwrap_or_default()
    }
}
