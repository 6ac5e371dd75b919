//! Interview service port interface
//!
//! Response types mirror the service's wire shapes; adapters
//! deserialize straight into them and unknown fields are dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::app_config::DEFAULT_LANGUAGE;
use crate::domain::recording::AudioClip;
use crate::domain::session::{
    ContactInfo, InterviewMode, Question, RiskFlag, SessionId, SlotStatus, SlotValue,
    TranscriptEntry,
};

/// Request layer errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The service answered with an error status. The message carries
    /// the body's detail field when one was decodable.
    #[error("Service returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Missing admin key. Set INTERVOX_ADMIN_KEY or configure via 'intervox config set admin_key <key>'")]
    MissingAdminKey,
}

impl ApiError {
    /// HTTP status carried by this error, when there is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a request error the service blamed on us (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }
}

/// Response to starting a session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub round: u32,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub interview_mode: InterviewMode,
}

/// The replayable state blob inside a session snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionStateBlob {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub interview_mode: InterviewMode,
    #[serde(default)]
    pub next_questions: Vec<Question>,
    #[serde(default)]
    pub round_summary: Option<String>,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Full session snapshot, used to resume an interview
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub round: u32,
    pub state: SessionStateBlob,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub interview_mode: InterviewMode,
    #[serde(default)]
    pub slot_status: Vec<SlotStatus>,
    #[serde(default)]
    pub progress_percent: Option<u8>,
}

impl SessionSnapshot {
    /// Whether the interview behind this snapshot already finished
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Response to transcribing an answer clip
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transcript {
    pub transcript: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl Transcript {
    /// Whether the recognizer flagged this transcript as shaky
    pub fn is_low_confidence(&self) -> bool {
        matches!(self.confidence, Some(c) if c < 0.5)
    }
}

/// Response to submitting confirmed answers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerOutcome {
    pub session_id: SessionId,
    pub round: u32,
    #[serde(default)]
    pub slots_updated: Vec<String>,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default)]
    pub round_summary: Option<String>,
    #[serde(default)]
    pub next_questions: Vec<Question>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub clarification_question: Option<String>,
    #[serde(default)]
    pub slot_status: Option<Vec<SlotStatus>>,
    #[serde(default)]
    pub progress_percent: Option<u8>,
}

/// Response to finalizing a session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FinalReport {
    pub session_id: SessionId,
    pub final_markdown: String,
    #[serde(default)]
    pub slots: HashMap<String, SlotValue>,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default)]
    pub email_sent: bool,
}

/// Results of a completed session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionResults {
    pub session_id: SessionId,
    pub final_markdown: String,
    #[serde(default)]
    pub slots: HashMap<String, SlotValue>,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub email_sent: bool,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// Port for the interview service
#[async_trait]
pub trait InterviewApi: Send + Sync {
    /// Start a fresh interview session
    async fn start_session(
        &self,
        language: &str,
        mode: InterviewMode,
    ) -> Result<StartedSession, ApiError>;

    /// Fetch the current snapshot of an existing session
    async fn session_state(&self, session: &SessionId) -> Result<SessionSnapshot, ApiError>;

    /// Upload one answer clip for transcription. Exactly one attempt:
    /// a duplicate upload would re-run recognition on the whole clip.
    async fn transcribe(
        &self,
        session: &SessionId,
        clip: &AudioClip,
        language: &str,
    ) -> Result<Transcript, ApiError>;

    /// Submit confirmed transcripts for the current round
    async fn submit_answers(
        &self,
        session: &SessionId,
        transcripts: &[TranscriptEntry],
    ) -> Result<AnswerOutcome, ApiError>;

    /// Finalize the session, optionally attaching contact details
    async fn finalize(
        &self,
        session: &SessionId,
        contact: Option<&ContactInfo>,
    ) -> Result<FinalReport, ApiError>;

    /// Fetch the results of a completed session
    async fn results(&self, session: &SessionId) -> Result<SessionResults, ApiError>;

    /// Download the final report as raw bytes
    async fn download_report(&self, session: &SessionId) -> Result<Vec<u8>, ApiError>;

    /// Probe the privileged config endpoint with the stored admin key
    async fn verify_admin_key(&self) -> Result<(), ApiError>;
}

/// Port for text localization
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a text into the target language
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ApiError>;
}
