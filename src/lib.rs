//! Intervox - voice interview client
//!
//! This crate drives a voice-based interview against a remote service:
//! record an answer from the microphone, upload it for transcription,
//! confirm or re-record the draft, submit confirmed answers round by
//! round, and finalize into a report.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the capture and interview state machines,
//!   progress math, and domain errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (HTTP service client,
//!   cpal recorder, FLAC encoder, clipboard, config store)
//! - **CLI**: Command-line interface, argument parsing, the interactive
//!   interview loop, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
