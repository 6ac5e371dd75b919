//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 90s, 2m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a session identifier is not a canonical UUID
#[derive(Debug, Clone, Error)]
#[error("Invalid session id: \"{input}\". Expected the hyphenated form, e.g. 123e4567-e89b-42d3-a456-426614174000")]
pub struct SessionIdError {
    pub input: String,
}

/// Error when an interview mode string is not recognized
#[derive(Debug, Clone, Error)]
#[error("Invalid interview mode: \"{input}\". Valid modes are: quick, precise")]
pub struct InvalidModeError {
    pub input: String,
}

/// Error when contact details fail validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Contact name must not be empty")]
    EmptyName,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
