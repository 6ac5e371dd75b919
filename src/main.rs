//! Intervox CLI entry point

use std::process::ExitCode;

use clap::Parser;

use intervox::cli::{
    app::{
        load_merged_config, run_admin_verify, run_download, run_interview, run_results,
        run_resume, EXIT_ERROR, EXIT_USAGE_ERROR,
    },
    args::{AdminAction, Cli, Commands, InterviewOptions},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use intervox::domain::config::AppConfig;
use intervox::domain::recording::Duration;
use intervox::domain::session::InterviewMode;
use intervox::infrastructure::XdgConfigStore;

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_directive = if verbose { "intervox=debug" } else { "intervox=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    // Config commands touch only the local file; no merged config needed
    let command = match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        other => other,
    };

    // Build CLI config from args
    let cli_config = AppConfig {
        server_url: cli.server.clone(),
        language: cli.language.clone(),
        mode: cli.mode.map(|m| InterviewMode::from(m).to_string()),
        max_answer: cli.max_answer.clone(),
        admin_key: None, // admin key comes from env/file only
        cues: if cli.cues { Some(true) } else { None },
        copy: if cli.copy { Some(true) } else { None },
    };

    // Merge: defaults < file < env < cli
    let config = load_merged_config(cli_config).await;

    // Parse the answer ceiling before anything network-facing runs
    let max_answer = match config.max_answer.as_ref() {
        Some(s) => match s.parse::<Duration>() {
            Ok(d) => d,
            Err(e) => {
                presenter.error(&format!("Invalid max-answer: {}", e));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => Duration::default_max_answer(),
    };

    let options = InterviewOptions {
        language: config.language_or_default(),
        mode: config.mode_or_default(),
        max_answer,
        cues: config.cues_or_default(),
        copy: config.copy_or_default(),
        save: cli.save,
    };

    match command {
        Some(Commands::Resume { ref id }) => run_resume(config, options, id).await,
        Some(Commands::Results { ref id }) => {
            run_results(config, id, options.copy, options.save).await
        }
        Some(Commands::Download { ref id, output }) => run_download(config, id, output).await,
        Some(Commands::Admin {
            action: AdminAction::Verify,
        }) => run_admin_verify(config).await,
        Some(Commands::Config { .. }) => unreachable!("handled above"),
        None => run_interview(config, options).await,
    }
}
