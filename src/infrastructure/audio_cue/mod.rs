//! Audio cue infrastructure adapters
//!
//! Audible feedback when an answer recording starts, stops, or is
//! thrown away.

mod noop;
mod rodio;

pub use noop::NoOpAudioCue;
pub use rodio::RodioAudioCue;

use crate::application::ports::AudioCue;

/// Create an audio cue adapter based on whether cues are enabled
pub fn create_audio_cue(enabled: bool) -> Box<dyn AudioCue> {
    if enabled {
        Box::new(RodioAudioCue::new())
    } else {
        Box::new(NoOpAudioCue::new())
    }
}
