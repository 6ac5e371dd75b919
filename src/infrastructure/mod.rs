//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the interview service, audio devices, the
//! clipboard, and the filesystem.

pub mod audio_cue;
pub mod clipboard;
pub mod config;
pub mod http;
pub mod recording;

// Re-export adapters
pub use audio_cue::{create_audio_cue, NoOpAudioCue, RodioAudioCue};
pub use clipboard::{create_clipboard, ArboardClipboard};
pub use config::XdgConfigStore;
pub use http::{HttpApiClient, RetryPolicy};
pub use recording::{create_recorder, CpalRecorder};
