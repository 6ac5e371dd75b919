//! Interactive prompt port interfaces
//!
//! The interview loop asks its questions through these traits so the
//! loop itself stays testable without a terminal.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::session::ContactInfo;

/// Prompt errors
#[derive(Debug, Clone, Error)]
pub enum PromptError {
    #[error("Input stream closed")]
    Closed,

    #[error("Failed to read input: {0}")]
    ReadFailed(String),
}

/// The user's verdict on a transcribed draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// Accept the transcript, possibly after editing it
    Confirm(String),
    /// Discard the draft and record another take
    ReRecord,
    /// Leave the interview (the session stays resumable)
    Quit,
}

/// The user's decision at the contact step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactDecision {
    Submit(ContactInfo),
    Skip,
}

/// Port for reviewing a transcribed draft answer
#[async_trait]
pub trait AnswerReviewer: Send + Sync {
    /// Present a draft transcript and collect the user's verdict.
    ///
    /// # Arguments
    /// * `question` - The question text the draft answers
    /// * `draft` - The transcript to review
    /// * `low_confidence` - Whether the recognizer flagged the draft
    async fn review(
        &self,
        question: &str,
        draft: &str,
        low_confidence: bool,
    ) -> Result<ReviewAction, PromptError>;
}

/// Port for collecting contact details before finalizing
#[async_trait]
pub trait ContactPrompt: Send + Sync {
    /// Ask for contact details, or an explicit skip
    async fn collect(&self) -> Result<ContactDecision, PromptError>;
}
