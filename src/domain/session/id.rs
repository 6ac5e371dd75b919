//! Session identifier value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::SessionIdError;

/// Hyphen positions in the canonical 8-4-4-4-12 form
const HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// Length of the canonical hyphenated form
const CANONICAL_LEN: usize = 36;

/// Value object wrapping a session identifier.
///
/// Accepts only the canonical hyphenated UUID form, case-insensitive.
/// Braced, urn-prefixed, and hyphenless renditions are rejected even
/// though generic UUID parsers take them: the service emits canonical
/// ids and nothing else, so anything looser is a typo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Parse a canonical session identifier
    pub fn parse(input: &str) -> Result<Self, SessionIdError> {
        let err = || SessionIdError {
            input: input.to_string(),
        };

        if input.len() != CANONICAL_LEN {
            return Err(err());
        }
        for (i, ch) in input.char_indices() {
            if HYPHENS.contains(&i) {
                if ch != '-' {
                    return Err(err());
                }
            } else if !ch.is_ascii_hexdigit() {
                return Err(err());
            }
        }

        let uuid = Uuid::try_parse(input).map_err(|_| err())?;
        Ok(Self(uuid))
    }

    /// Check whether a string is a valid canonical session identifier
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    /// First 8 hex digits, used in generated report file names
    pub fn short(&self) -> String {
        self.to_string().chars().take(8).collect()
    }
}

impl FromStr for SessionId {
    type Err = SessionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}
