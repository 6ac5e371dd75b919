//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod error;
pub mod recording;
pub mod session;

// Re-export common types
pub use capture::{CapturePhase, CaptureSession, InvalidPhaseTransition};
pub use config::AppConfig;
pub use error::*;
pub use recording::{AudioClip, Duration};
pub use session::{
    AnswerState, ContactInfo, InterviewMode, Question, RiskFlag, RoundBoard, SessionId,
    SlotStatus, TranscriptEntry,
};
