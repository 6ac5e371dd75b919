//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, the interactive
//! prompts, signal handling, and the main application runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;
pub mod prompt;
pub mod signals;

// Re-export commonly used types
pub use app::{
    load_merged_config, run_admin_verify, run_download, run_interview, run_results, run_resume,
    EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR,
};
pub use args::{AdminAction, Cli, Commands, ConfigAction, InterviewOptions};
pub use presenter::Presenter;
pub use prompt::StdinPrompt;
pub use signals::ShutdownSignal;
