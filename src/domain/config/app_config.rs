//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;
use crate::domain::session::InterviewMode;

/// Default interview service URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Language the service authors its texts in
pub const DEFAULT_LANGUAGE: &str = "lt";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: Option<String>,
    pub language: Option<String>,
    pub mode: Option<String>,
    pub max_answer: Option<String>,
    pub admin_key: Option<String>,
    pub cues: Option<bool>,
    pub copy: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            language: Some(DEFAULT_LANGUAGE.to_string()),
            mode: Some("quick".to_string()),
            max_answer: Some("2m".to_string()),
            admin_key: None,
            cues: Some(false),
            copy: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            server_url: other.server_url.or(self.server_url),
            language: other.language.or(self.language),
            mode: other.mode.or(self.mode),
            max_answer: other.max_answer.or(self.max_answer),
            admin_key: other.admin_key.or(self.admin_key),
            cues: other.cues.or(self.cues),
            copy: other.copy.or(self.copy),
        }
    }

    /// Get the service URL, or the default when not set.
    /// A trailing slash is stripped so paths can be appended directly.
    pub fn server_url_or_default(&self) -> String {
        let url = self
            .server_url
            .as_deref()
            .unwrap_or(DEFAULT_SERVER_URL)
            .trim();
        url.trim_end_matches('/').to_string()
    }

    /// Get the interview language, or the default when not set
    pub fn language_or_default(&self) -> String {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string()
    }

    /// Get mode as parsed InterviewMode, or quick if not set/invalid
    pub fn mode_or_default(&self) -> InterviewMode {
        self.mode
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get max_answer as parsed Duration, or the ceiling default
    pub fn max_answer_or_default(&self) -> Duration {
        self.max_answer
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_answer)
    }

    /// Get the stored admin key, if any
    pub fn admin_key(&self) -> Option<&str> {
        self.admin_key.as_deref()
    }

    /// Get cue playback setting, or false if not set
    pub fn cues_or_default(&self) -> bool {
        self.cues.unwrap_or(false)
    }

    /// Get clipboard-copy setting, or false if not set
    pub fn copy_or_default(&self) -> bool {
        self.copy.unwrap_or(false)
    }
}
