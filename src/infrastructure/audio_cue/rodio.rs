//! Rodio-based audio cue adapter
//!
//! Generates and plays synthesized tones for recording feedback.

use std::time::Duration;

use async_trait::async_trait;
use rodio::source::{SineWave, Source};
use rodio::{OutputStream, Sink};

use crate::application::ports::{AudioCue, AudioCueError, AudioCueType};

/// Audio cue implementation using rodio
pub struct RodioAudioCue;

impl RodioAudioCue {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RodioAudioCue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioCue for RodioAudioCue {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError> {
        // Playback blocks until the tone finishes, so it runs off the
        // async runtime
        tokio::task::spawn_blocking(move || play_cue_sync(cue_type))
            .await
            .map_err(|e| AudioCueError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}

/// A tone with a short fade-in so it does not click
fn gentle_tone(freq: f32, duration_ms: u64, amplitude: f32) -> impl Source<Item = f32> + Send {
    let fade_ms = (duration_ms / 5).min(30);
    SineWave::new(freq)
        .take_duration(Duration::from_millis(duration_ms))
        .fade_in(Duration::from_millis(fade_ms))
        .amplify(amplitude)
}

/// Play a cue synchronously (called from spawn_blocking)
fn play_cue_sync(cue_type: AudioCueType) -> Result<(), AudioCueError> {
    let (_stream, stream_handle) = OutputStream::try_default()
        .map_err(|e| AudioCueError::DeviceNotAvailable(e.to_string()))?;

    let sink =
        Sink::try_new(&stream_handle).map_err(|e| AudioCueError::PlaybackFailed(e.to_string()))?;

    const AMP: f32 = 0.3;

    match cue_type {
        AudioCueType::RecordingStart => {
            // High beep: the microphone is live
            sink.append(gentle_tone(880.0, 150, AMP));
        }
        AudioCueType::RecordingStop => {
            // Low beep: the take is captured
            sink.append(gentle_tone(440.0, 150, AMP));
        }
        AudioCueType::RecordingCancel => {
            // Double-tap: the take was thrown away
            let silence =
                rodio::source::Zero::<f32>::new(1, 44100).take_duration(Duration::from_millis(50));
            sink.append(gentle_tone(330.0, 75, AMP * 0.8));
            sink.append(silence);
            sink.append(gentle_tone(330.0, 75, AMP * 0.8));
        }
    }

    sink.sleep_until_end();

    Ok(())
}
