//! Recording port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::AudioClip;

/// Recording errors
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Failed to encode audio: {0}")]
    EncodeFailed(String),

    #[error("Recording was cancelled")]
    Cancelled,
}

/// Port for push-to-stop voice recording.
///
/// One recording at a time: `start` grabs the microphone, `stop`
/// releases it and yields the encoded clip, `cancel` releases it and
/// discards the samples. Implementations must release the device on
/// every path out of a recording, including a failed `stop`.
#[async_trait]
pub trait VoiceRecorder: Send + Sync {
    /// Start recording from the default input device
    async fn start(&self) -> Result<(), RecordingError>;

    /// Stop recording and return the encoded clip
    async fn stop(&self) -> Result<AudioClip, RecordingError>;

    /// Stop recording and discard the samples
    async fn cancel(&self) -> Result<(), RecordingError>;

    /// Check if currently recording
    fn is_recording(&self) -> bool;

    /// Get elapsed recording time in milliseconds
    fn elapsed_ms(&self) -> u64;
}
