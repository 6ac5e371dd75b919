//! Questions, answer lifecycle, and the per-round board

use serde::{Deserialize, Serialize};

/// A question issued by the interview service. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub round_hint: Option<u32>,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            round_hint: None,
        }
    }
}

/// A confirmed transcript paired with its question, as submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question_id: String,
    pub text: String,
}

/// Lifecycle of one question's answer within the current round.
///
/// A draft exists between transcription and the user's verdict; it is
/// never submitted. Only confirmed transcripts leave the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnswerState {
    #[default]
    Unanswered,
    Draft { transcript: String },
    Confirmed { transcript: String },
}

impl AnswerState {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn is_unanswered(&self) -> bool {
        matches!(self, Self::Unanswered)
    }

    /// The transcript held by a draft or confirmed answer
    pub fn transcript(&self) -> Option<&str> {
        match self {
            Self::Unanswered => None,
            Self::Draft { transcript } | Self::Confirmed { transcript } => Some(transcript),
        }
    }
}

/// One question on the board together with its answer state and the
/// localized rendition of its text (when one has been fetched).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionState {
    question: Question,
    localized_text: Option<String>,
    answer: AnswerState,
}

impl QuestionState {
    pub fn new(question: Question) -> Self {
        Self {
            question,
            localized_text: None,
            answer: AnswerState::Unanswered,
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn answer(&self) -> &AnswerState {
        &self.answer
    }

    /// Text to show the user: the localized rendition when available,
    /// the original otherwise
    pub fn display_text(&self) -> &str {
        self.localized_text.as_deref().unwrap_or(&self.question.text)
    }
}

/// The set of questions making up the current round.
///
/// Replaced wholesale when a new round begins. Exactly one question is
/// current at any time (tracked by the cursor); submission requires
/// every answer to be confirmed.
#[derive(Debug, Clone)]
pub struct RoundBoard {
    round: u32,
    generation: u64,
    questions: Vec<QuestionState>,
    cursor: usize,
}

impl RoundBoard {
    /// Build the board for a round. The generation tags this board so
    /// results of work issued against an older board can be discarded.
    pub fn new(round: u32, generation: u64, questions: Vec<Question>) -> Self {
        Self {
            round,
            generation,
            questions: questions.into_iter().map(QuestionState::new).collect(),
            cursor: 0,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[QuestionState] {
        &self.questions
    }

    /// The question the cursor points at
    pub fn current(&self) -> Option<&QuestionState> {
        self.questions.get(self.cursor)
    }

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to a specific question (re-record affordance)
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.questions.len() {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    /// Hold a freshly transcribed draft on the current question
    pub fn stage_draft(&mut self, transcript: String) {
        if let Some(q) = self.questions.get_mut(self.cursor) {
            q.answer = AnswerState::Draft { transcript };
        }
    }

    /// Discard the current question's draft (re-record)
    pub fn clear_current(&mut self) {
        if let Some(q) = self.questions.get_mut(self.cursor) {
            q.answer = AnswerState::Unanswered;
        }
    }

    /// Confirm the current question with its reviewed transcript and
    /// advance the cursor to the next unconfirmed question, if any
    pub fn confirm_current(&mut self, transcript: String) {
        if let Some(q) = self.questions.get_mut(self.cursor) {
            q.answer = AnswerState::Confirmed { transcript };
        }
        self.advance_to_unconfirmed();
    }

    /// Move the cursor forward to the next unconfirmed question,
    /// wrapping around; stays put when everything is confirmed
    pub fn advance_to_unconfirmed(&mut self) {
        let n = self.questions.len();
        for offset in 1..=n {
            let idx = (self.cursor + offset) % n;
            if let Some(q) = self.questions.get(idx) {
                if !q.answer.is_confirmed() {
                    self.cursor = idx;
                    return;
                }
            }
        }
    }

    pub fn all_confirmed(&self) -> bool {
        self.questions.iter().all(|q| q.answer.is_confirmed())
    }

    /// Number of confirmed answers on the board
    pub fn confirmed_count(&self) -> u32 {
        self.questions
            .iter()
            .filter(|q| q.answer.is_confirmed())
            .count() as u32
    }

    /// Confirmed transcripts in board order, ready for submission
    pub fn confirmed_entries(&self) -> Vec<TranscriptEntry> {
        self.questions
            .iter()
            .filter_map(|q| match &q.answer {
                AnswerState::Confirmed { transcript } => Some(TranscriptEntry {
                    question_id: q.question.id.clone(),
                    text: transcript.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Attach a localized text to one question. Ignored when the
    /// generation does not match this board (stale fetch).
    pub fn apply_localization(&mut self, generation: u64, index: usize, text: String) {
        if generation != self.generation {
            return;
        }
        if let Some(q) = self.questions.get_mut(index) {
            q.localized_text = Some(text);
        }
    }
}
