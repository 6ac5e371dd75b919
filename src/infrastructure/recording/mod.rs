//! Recording infrastructure module
//!
//! Provides cross-platform voice capture using cpal, with answer clips
//! encoded to FLAC for lossless transcription uploads.

mod cpal_recorder;
mod flac_encoder;

pub use cpal_recorder::CpalRecorder;
pub use flac_encoder::{encode_to_flac, TARGET_SAMPLE_RATE};

/// Create the default recorder for the current platform
pub fn create_recorder() -> CpalRecorder {
    CpalRecorder::new()
}
