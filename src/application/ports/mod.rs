//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod api;
pub mod audio_cue;
pub mod clipboard;
pub mod config;
pub mod prompt;
pub mod recorder;

// Re-export common types
pub use api::{
    AnswerOutcome, ApiError, FinalReport, InterviewApi, SessionResults, SessionSnapshot,
    SessionStateBlob, StartedSession, Transcript, Translator,
};
pub use audio_cue::{AudioCue, AudioCueError, AudioCueType};
pub use clipboard::{Clipboard, ClipboardError};
pub use config::ConfigStore;
pub use prompt::{AnswerReviewer, ContactDecision, ContactPrompt, PromptError, ReviewAction};
pub use recorder::{RecordingError, VoiceRecorder};
