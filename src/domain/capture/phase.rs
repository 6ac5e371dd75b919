//! Audio capture state machine

use std::fmt;
use thiserror::Error;

/// Capture phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    Recording,
    Processing,
    Done,
    Error,
}

impl CapturePhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid phase transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid capture transition: cannot {action} while in {current_phase} phase")]
pub struct InvalidPhaseTransition {
    pub current_phase: CapturePhase,
    pub action: String,
}

/// Capture session entity.
/// Tracks one answer recording from microphone grab to encoded clip.
///
/// Phase machine:
///   IDLE -> RECORDING (begin_recording)
///   IDLE -> ERROR (fail: device grab refused)
///   RECORDING -> PROCESSING (begin_processing)
///   RECORDING -> IDLE (cancel)
///   PROCESSING -> DONE (complete)
///   PROCESSING -> ERROR (fail: encode failed)
///   DONE | ERROR -> IDLE (reset, re-record affordance)
#[derive(Debug, Default)]
pub struct CaptureSession {
    phase: CapturePhase,
    failure: Option<String>,
}

impl CaptureSession {
    /// Create a new capture session in idle phase
    pub fn new() -> Self {
        Self {
            phase: CapturePhase::Idle,
            failure: None,
        }
    }

    /// Get the current phase
    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// Cause of the last failure, when in the error phase
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == CapturePhase::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.phase == CapturePhase::Recording
    }

    pub fn is_done(&self) -> bool {
        self.phase == CapturePhase::Done
    }

    /// Transition from IDLE to RECORDING
    pub fn begin_recording(&mut self) -> Result<(), InvalidPhaseTransition> {
        if self.phase != CapturePhase::Idle {
            return Err(self.refuse("begin recording"));
        }
        self.phase = CapturePhase::Recording;
        self.failure = None;
        Ok(())
    }

    /// Transition from RECORDING to PROCESSING
    pub fn begin_processing(&mut self) -> Result<(), InvalidPhaseTransition> {
        if self.phase != CapturePhase::Recording {
            return Err(self.refuse("begin processing"));
        }
        self.phase = CapturePhase::Processing;
        Ok(())
    }

    /// Transition from RECORDING to IDLE without producing a clip
    pub fn cancel(&mut self) -> Result<(), InvalidPhaseTransition> {
        if self.phase != CapturePhase::Recording {
            return Err(self.refuse("cancel"));
        }
        self.phase = CapturePhase::Idle;
        Ok(())
    }

    /// Transition from PROCESSING to DONE
    pub fn complete(&mut self) -> Result<(), InvalidPhaseTransition> {
        if self.phase != CapturePhase::Processing {
            return Err(self.refuse("complete"));
        }
        self.phase = CapturePhase::Done;
        Ok(())
    }

    /// Record a failure. Legal from IDLE (the device grab was refused)
    /// and from PROCESSING (the clip could not be encoded).
    pub fn fail(&mut self, cause: impl Into<String>) -> Result<(), InvalidPhaseTransition> {
        match self.phase {
            CapturePhase::Idle | CapturePhase::Processing => {
                self.phase = CapturePhase::Error;
                self.failure = Some(cause.into());
                Ok(())
            }
            _ => Err(self.refuse("record failure")),
        }
    }

    /// Transition from DONE or ERROR back to IDLE for another take
    pub fn reset(&mut self) -> Result<(), InvalidPhaseTransition> {
        match self.phase {
            CapturePhase::Done | CapturePhase::Error => {
                self.phase = CapturePhase::Idle;
                self.failure = None;
                Ok(())
            }
            _ => Err(self.refuse("reset")),
        }
    }

    fn refuse(&self, action: &str) -> InvalidPhaseTransition {
        InvalidPhaseTransition {
            current_phase: self.phase,
            action: action.to_string(),
        }
    }
}
