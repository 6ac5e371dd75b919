//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::recording::Duration;
use crate::domain::session::InterviewMode;

/// Intervox - voice interview client
#[derive(Parser, Debug)]
#[command(name = "intervox")]
#[command(version = "0.3.0")]
#[command(about = "Record, confirm and submit interview answers by voice")]
#[command(long_about = None)]
pub struct Cli {
    /// Language to display questions in (e.g. lt, en, ru)
    #[arg(short = 'l', long, value_name = "LANG")]
    pub language: Option<String>,

    /// Interview mode
    #[arg(short = 'm', long, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Interview service URL
    #[arg(short = 's', long, value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Max recording length per answer (e.g. 45s, 2m)
    #[arg(long, value_name = "TIME", global = true)]
    pub max_answer: Option<String>,

    /// Play start/stop tones around each recording
    #[arg(long, global = true)]
    pub cues: bool,

    /// Copy the final report to the clipboard
    #[arg(short = 'c', long, global = true)]
    pub copy: bool,

    /// Save the final report to a markdown file
    #[arg(long, global = true)]
    pub save: bool,

    /// Verbose diagnostics on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick up an interview where it left off
    Resume {
        /// Session id printed by a previous run
        id: String,
    },
    /// Show the report of a completed session
    Results {
        /// Session id printed by a previous run
        id: String,
    },
    /// Download the report file for a session
    Download {
        /// Session id printed by a previous run
        id: String,
        /// Destination file (defaults to <short-id>.md)
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Privileged service checks
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Admin actions
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum AdminAction {
    /// Check the configured admin key against the service
    Verify,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Interview mode argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Quick,
    Precise,
}

impl From<ModeArg> for InterviewMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Quick => InterviewMode::Quick,
            ModeArg::Precise => InterviewMode::Precise,
        }
    }
}

impl From<InterviewMode> for ModeArg {
    fn from(mode: InterviewMode) -> Self {
        match mode {
            InterviewMode::Quick => ModeArg::Quick,
            InterviewMode::Precise => ModeArg::Precise,
        }
    }
}

/// Resolved options for an interview run (new session or resume)
#[derive(Debug, Clone)]
pub struct InterviewOptions {
    pub language: String,
    pub mode: InterviewMode,
    pub max_answer: Duration,
    pub cues: bool,
    pub copy: bool,
    pub save: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "server_url",
    "language",
    "mode",
    "max_answer",
    "admin_key",
    "cues",
    "copy",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["intervox"]);
        assert!(cli.language.is_none());
        assert!(cli.mode.is_none());
        assert!(cli.server.is_none());
        assert!(cli.max_answer.is_none());
        assert!(!cli.cues);
        assert!(!cli.copy);
        assert!(!cli.save);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_language() {
        let cli = Cli::parse_from(["intervox", "-l", "en"]);
        assert_eq!(cli.language, Some("en".to_string()));
    }

    #[test]
    fn cli_parses_mode() {
        let cli = Cli::parse_from(["intervox", "-m", "precise"]);
        assert_eq!(cli.mode, Some(ModeArg::Precise));
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from(["intervox", "-c", "--cues", "--save"]);
        assert!(cli.copy);
        assert!(cli.cues);
        assert!(cli.save);
    }

    #[test]
    fn cli_parses_max_answer() {
        let cli = Cli::parse_from(["intervox", "--max-answer", "45s"]);
        assert_eq!(cli.max_answer, Some("45s".to_string()));
    }

    #[test]
    fn server_flag_works_after_subcommand() {
        let cli = Cli::parse_from([
            "intervox",
            "resume",
            "123e4567-e89b-42d3-a456-426614174000",
            "-s",
            "http://other:9000",
        ]);
        assert_eq!(cli.server, Some("http://other:9000".to_string()));
    }

    #[test]
    fn cli_parses_resume() {
        let cli = Cli::parse_from(["intervox", "resume", "abc"]);
        if let Some(Commands::Resume { id }) = cli.command {
            assert_eq!(id, "abc");
        } else {
            panic!("Expected Resume command");
        }
    }

    #[test]
    fn cli_parses_download_with_output() {
        let cli = Cli::parse_from(["intervox", "download", "abc", "-o", "report.md"]);
        if let Some(Commands::Download { id, output }) = cli.command {
            assert_eq!(id, "abc");
            assert_eq!(output, Some(PathBuf::from("report.md")));
        } else {
            panic!("Expected Download command");
        }
    }

    #[test]
    fn cli_parses_admin_verify() {
        let cli = Cli::parse_from(["intervox", "admin", "verify"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Admin {
                action: AdminAction::Verify
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["intervox", "config", "set", "mode", "precise"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "mode");
            assert_eq!(value, "precise");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn mode_arg_converts_to_interview_mode() {
        assert_eq!(InterviewMode::from(ModeArg::Quick), InterviewMode::Quick);
        assert_eq!(
            InterviewMode::from(ModeArg::Precise),
            InterviewMode::Precise
        );
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("server_url"));
        assert!(is_valid_config_key("admin_key"));
        assert!(is_valid_config_key("copy"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }
}
