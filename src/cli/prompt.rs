//! Stdin-backed prompts for the interview loop
//!
//! One reader thread owns stdin for the whole run and feeds lines into
//! a channel. The recording loop (Enter to stop) and the prompts pull
//! from the same stream, so they never compete for the handle.

use std::io::BufRead;
use std::sync::Arc;

use async_trait::async_trait;
use colored::*;
use tokio::sync::{mpsc, Mutex};

use crate::application::ports::{
    AnswerReviewer, ContactDecision, ContactPrompt, PromptError, ReviewAction,
};
use crate::domain::session::ContactInfo;

/// Stdin lines, shared between the recording loop and the prompts
pub type LineSource = Arc<Mutex<mpsc::Receiver<String>>>;

/// What the user picked from the review menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Keep,
    Edit,
    Retake,
    Quit,
}

fn parse_choice(input: &str) -> Option<MenuChoice> {
    match input.trim().to_lowercase().as_str() {
        "" | "k" => Some(MenuChoice::Keep),
        "e" => Some(MenuChoice::Edit),
        "r" => Some(MenuChoice::Retake),
        "q" => Some(MenuChoice::Quit),
        _ => None,
    }
}

/// Stdin-backed prompt implementation
pub struct StdinPrompt {
    lines: LineSource,
}

impl StdinPrompt {
    /// Spawn the stdin reader thread and wrap its line stream
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(8);
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let mut handle = stdin.lock();
            loop {
                let mut line = String::new();
                match handle.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Self {
            lines: Arc::new(Mutex::new(rx)),
        }
    }

    /// Share the line stream (the recording loop selects on it)
    pub fn lines(&self) -> LineSource {
        Arc::clone(&self.lines)
    }

    /// Read the next line without the trailing newline
    async fn next_line(&self) -> Result<String, PromptError> {
        let mut rx = self.lines.lock().await;
        let line = rx.recv().await.ok_or(PromptError::Closed)?;
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    /// Print an inline prompt on stderr and read the answer
    async fn ask(&self, prompt: &str) -> Result<String, PromptError> {
        eprint!("{}", prompt);
        self.next_line().await
    }

    /// Ask whether to retry a failed step. Enter retries, q gives up.
    pub async fn retry(&self, what: &str) -> Result<bool, PromptError> {
        let input = self
            .ask(&format!("{} [Enter] retry · [q] quit: ", what))
            .await?;
        Ok(!input.trim().eq_ignore_ascii_case("q"))
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerReviewer for StdinPrompt {
    async fn review(
        &self,
        _question: &str,
        draft: &str,
        low_confidence: bool,
    ) -> Result<ReviewAction, PromptError> {
        eprintln!();
        eprintln!("{}", "Your answer:".dimmed());
        eprintln!("  {}", draft);
        if low_confidence {
            eprintln!(
                "{} Low transcription confidence, double-check this take",
                "⚠".yellow()
            );
        }

        loop {
            let input = self
                .ask(&format!(
                    "{} ",
                    "[Enter] keep · [e] edit · [r] retake · [q] quit:".dimmed()
                ))
                .await?;

            match parse_choice(&input) {
                Some(MenuChoice::Keep) => return Ok(ReviewAction::Confirm(draft.to_string())),
                Some(MenuChoice::Edit) => {
                    let edited = self.ask("Corrected answer: ").await?;
                    let edited = edited.trim();
                    if edited.is_empty() {
                        return Ok(ReviewAction::Confirm(draft.to_string()));
                    }
                    return Ok(ReviewAction::Confirm(edited.to_string()));
                }
                Some(MenuChoice::Retake) => return Ok(ReviewAction::ReRecord),
                Some(MenuChoice::Quit) => return Ok(ReviewAction::Quit),
                None => eprintln!("{} Unrecognized choice", "⚠".yellow()),
            }
        }
    }
}

#[async_trait]
impl ContactPrompt for StdinPrompt {
    async fn collect(&self) -> Result<ContactDecision, PromptError> {
        eprintln!();
        eprintln!(
            "{} Contact details for the report handoff (Enter to skip)",
            "ℹ".cyan()
        );

        let name = self.ask("Name: ").await?;
        if name.trim().is_empty() {
            return Ok(ContactDecision::Skip);
        }
        let email = self.ask("Email (optional): ").await?;
        let phone = self.ask("Phone (optional): ").await?;

        match ContactInfo::new(&name, Some(&email), Some(&phone)) {
            Ok(contact) => Ok(ContactDecision::Submit(contact)),
            Err(_) => Ok(ContactDecision::Skip),
        }
    }
}
