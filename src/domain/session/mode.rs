//! Interview mode value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidModeError;

/// How the interview advances.
///
/// Quick mode collects a whole round of answers and submits them as a
/// batch. Precise mode submits each answer as it is confirmed and may
/// interleave clarification questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewMode {
    #[default]
    Quick,
    Precise,
}

impl InterviewMode {
    /// Get the string representation used on the wire
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Precise => "precise",
        }
    }
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InterviewMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "precise" => Ok(Self::Precise),
            _ => Err(InvalidModeError {
                input: s.to_string(),
            }),
        }
    }
}
