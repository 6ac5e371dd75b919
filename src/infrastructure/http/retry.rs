//! Retry policy for service requests

use std::time::Duration;

use crate::application::ports::ApiError;

/// How many times a transient failure is attempted before giving up
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay before the first retry; each further retry doubles it
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Exponential backoff schedule for idempotent service calls.
///
/// Client errors (4xx) are never retried: the request will not get
/// better by repeating it. Server errors, network failures, and
/// undecodable bodies are treated as transient.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// A policy that gives every request exactly one attempt.
    /// Transcription uploads use this: re-sending a clip would run
    /// recognition twice over the same audio.
    pub fn one_shot() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the retry following attempt `attempt_index`
    /// (zero-based): base, 2x base, 4x base, ...
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt_index)
    }

    /// Whether this error class is worth another attempt
    pub fn should_retry(&self, error: &ApiError) -> bool {
        match error {
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Network(_) | ApiError::Malformed(_) => true,
            ApiError::MissingAdminKey => false,
        }
    }
}
