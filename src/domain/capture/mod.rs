//! Capture domain: the answer-recording phase machine

pub mod phase;

pub use phase::{CapturePhase, CaptureSession, InvalidPhaseTransition};
