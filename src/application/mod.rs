//! Application layer - Use cases and port interfaces
//!
//! Contains the core interview operations and trait definitions
//! for external system interactions.

pub mod capture;
pub mod interview;
pub mod ports;
pub mod translation;

// Re-export use cases
pub use capture::{CaptureController, CaptureError};
pub use interview::{FlowError, FlowPhase, InterviewFlow, SubmitOutcome};
pub use translation::{TranslationCache, SOURCE_LANGUAGE};
