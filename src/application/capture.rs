//! Answer capture use case

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration as StdDuration;

use thiserror::Error;

use crate::domain::capture::{CapturePhase, CaptureSession, InvalidPhaseTransition};
use crate::domain::recording::{AudioClip, Duration};

use super::ports::{RecordingError, VoiceRecorder};

/// Tick interval for the recording watch loop
const TICK_MS: u64 = 100;

/// Errors from the capture use case
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Recording failed: {0}")]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Phase(#[from] InvalidPhaseTransition),
}

/// Drives one answer recording over a [`VoiceRecorder`].
///
/// Wraps the capture phase machine around the recorder so the
/// microphone is released on every path out of a recording: stop,
/// cancel, ceiling auto-stop, and encode failure.
pub struct CaptureController<R: VoiceRecorder> {
    recorder: R,
    session: CaptureSession,
    max_duration: Duration,
}

impl<R: VoiceRecorder> CaptureController<R> {
    pub fn new(recorder: R, max_duration: Duration) -> Self {
        Self {
            recorder,
            session: CaptureSession::new(),
            max_duration,
        }
    }

    /// Current capture phase
    pub fn phase(&self) -> CapturePhase {
        self.session.phase()
    }

    /// Cause of the last failure, when in the error phase
    pub fn failure(&self) -> Option<&str> {
        self.session.failure()
    }

    /// Elapsed recording time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.recorder.elapsed_ms()
    }

    /// The configured answer ceiling
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// Grab the microphone and start recording
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        self.session.begin_recording()?;
        if let Err(e) = self.recorder.start().await {
            // The grab never took; park the machine in the error phase
            // with the cause so the caller can offer another take.
            self.session.cancel()?;
            self.session.fail(e.to_string())?;
            return Err(e.into());
        }
        Ok(())
    }

    /// Watch the recording until the stop flag is set or the ceiling
    /// elapses, then stop and return the encoded clip.
    ///
    /// `on_tick` runs roughly every 100ms with (elapsed_ms, ceiling_ms).
    pub async fn run(
        &mut self,
        stop: &AtomicBool,
        mut on_tick: impl FnMut(u64, u64) + Send,
    ) -> Result<AudioClip, CaptureError> {
        let ceiling = self.max_duration.as_millis();
        let mut ticker = tokio::time::interval(StdDuration::from_millis(TICK_MS));

        while self.session.is_recording() {
            ticker.tick().await;
            let elapsed = self.recorder.elapsed_ms();
            on_tick(elapsed, ceiling);
            if stop.load(Ordering::SeqCst) || elapsed >= ceiling {
                break;
            }
        }

        self.stop().await
    }

    /// Stop recording and encode the clip
    pub async fn stop(&mut self) -> Result<AudioClip, CaptureError> {
        self.session.begin_processing()?;
        match self.recorder.stop().await {
            Ok(clip) => {
                self.session.complete()?;
                Ok(clip)
            }
            Err(e) => {
                // The recorder has already released the device; this
                // take is lost and the caller offers a re-record.
                self.session.fail(e.to_string())?;
                Err(e.into())
            }
        }
    }

    /// Abandon the current recording without producing a clip
    pub async fn cancel(&mut self) -> Result<(), CaptureError> {
        self.session.cancel()?;
        self.recorder.cancel().await?;
        Ok(())
    }

    /// Return to idle after a finished or failed take
    pub fn reset(&mut self) -> Result<(), CaptureError> {
        self.session.reset()?;
        Ok(())
    }
}
