//! Interview runners: wiring the adapters to the flow

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::ports::{
    AnswerReviewer, ApiError, AudioCue, AudioCueType, Clipboard, ConfigStore, ContactDecision,
    ContactPrompt, InterviewApi, ReviewAction,
};
use crate::application::{CaptureController, FlowPhase, InterviewFlow, SubmitOutcome, TranslationCache};
use crate::domain::config::AppConfig;
use crate::domain::recording::AudioClip;
use crate::domain::session::{InterviewMode, RiskFlag, SessionId};
use crate::infrastructure::{
    create_audio_cue, create_clipboard, create_recorder, CpalRecorder, HttpApiClient,
    XdgConfigStore,
};

use super::args::InterviewOptions;
use super::presenter::Presenter;
use super::prompt::StdinPrompt;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Run a fresh interview session
pub async fn run_interview(config: AppConfig, options: InterviewOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let api = match build_client(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup().await {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let cache = Arc::new(TranslationCache::new());
    let mut flow = InterviewFlow::new(
        Arc::clone(&api),
        cache,
        options.language.clone(),
        options.mode,
    );

    presenter.start_spinner("Starting interview session...");
    match flow.begin().await {
        Ok(()) => {
            let id = flow
                .session_id()
                .map(|s| s.to_string())
                .unwrap_or_default();
            presenter.spinner_success(&format!("Session {} started", id));
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    }

    drive_interview(api, flow, &options, &mut presenter, &shutdown).await
}

/// Resume a stored session where it left off
pub async fn run_resume(config: AppConfig, options: InterviewOptions, id: &str) -> ExitCode {
    let mut presenter = Presenter::new();
    let session = match parse_session_id(id, &presenter) {
        Some(s) => s,
        None => return ExitCode::from(EXIT_USAGE_ERROR),
    };

    let api = match build_client(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup().await {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let cache = Arc::new(TranslationCache::new());
    let mut flow = InterviewFlow::new(
        Arc::clone(&api),
        cache,
        options.language.clone(),
        options.mode,
    );

    presenter.start_spinner("Resuming session...");
    match flow.resume(session).await {
        Ok(()) => presenter.spinner_success(&format!("Session {} resumed", session.short())),
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    }

    drive_interview(api, flow, &options, &mut presenter, &shutdown).await
}

/// Show the stored report of a completed session
pub async fn run_results(config: AppConfig, id: &str, copy: bool, save: bool) -> ExitCode {
    let mut presenter = Presenter::new();
    let session = match parse_session_id(id, &presenter) {
        Some(s) => s,
        None => return ExitCode::from(EXIT_USAGE_ERROR),
    };

    let api = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.start_spinner("Fetching results...");
    match api.results(&session).await {
        Ok(results) => {
            presenter.spinner_success("Results fetched");
            let note = email_note(results.email_sent, results.contact_email.as_deref());
            deliver_report(
                results.session_id,
                &results.final_markdown,
                &results.risk_flags,
                note.as_deref(),
                copy,
                save,
                &mut presenter,
            )
            .await
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Download the report file for a session
pub async fn run_download(config: AppConfig, id: &str, output: Option<PathBuf>) -> ExitCode {
    let mut presenter = Presenter::new();
    let session = match parse_session_id(id, &presenter) {
        Some(s) => s,
        None => return ExitCode::from(EXIT_USAGE_ERROR),
    };

    let api = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.md", session.short())));

    presenter.start_spinner("Downloading report...");
    match api.download_report(&session).await {
        Ok(bytes) => {
            if let Err(e) = tokio::fs::write(&path, &bytes).await {
                presenter.spinner_fail(&format!("Failed to write {}: {}", path.display(), e));
                return ExitCode::from(EXIT_ERROR);
            }
            presenter.spinner_success(&format!("Report saved to {}", path.display()));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Check the configured admin key against the service
pub async fn run_admin_verify(config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let api = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.start_spinner("Checking admin key...");
    match api.verify_admin_key().await {
        Ok(()) => {
            presenter.spinner_success("Admin key accepted");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e @ ApiError::MissingAdminKey) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_USAGE_ERROR)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Build env config
    let env_config = AppConfig {
        server_url: env_value("INTERVOX_SERVER_URL"),
        language: env_value("INTERVOX_LANGUAGE"),
        mode: env_value("INTERVOX_MODE"),
        max_answer: env_value("INTERVOX_MAX_ANSWER"),
        admin_key: env_value("INTERVOX_ADMIN_KEY"),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

fn build_client(config: &AppConfig) -> Result<HttpApiClient, ApiError> {
    Ok(HttpApiClient::new(config.server_url_or_default())?
        .with_admin_key(config.admin_key().map(String::from)))
}

fn parse_session_id(input: &str, presenter: &Presenter) -> Option<SessionId> {
    match SessionId::parse(input) {
        Ok(id) => Some(id),
        Err(e) => {
            presenter.error(&e.to_string());
            None
        }
    }
}

/// One recorded take's outcome
enum TakeOutcome {
    Clip(AudioClip),
    Retry,
    Interrupted,
    DeviceFailed(String),
}

/// The interactive loop: show the question, record, review, submit,
/// collect contact details, and hand over the report.
async fn drive_interview(
    api: Arc<HttpApiClient>,
    mut flow: InterviewFlow<HttpApiClient>,
    options: &InterviewOptions,
    presenter: &mut Presenter,
    shutdown: &ShutdownSignal,
) -> ExitCode {
    let prompt = StdinPrompt::new();
    let cue = create_audio_cue(options.cues);
    let mut controller = CaptureController::new(create_recorder(), options.max_answer);
    let mut seen_board: Option<u64> = None;

    loop {
        if shutdown.is_shutdown() {
            return leave_resumable(&flow, presenter, EXIT_SUCCESS);
        }

        match flow.phase() {
            FlowPhase::Active => {
                let (round, position, total, generation) = match flow.board() {
                    Some(board) => (
                        board.round(),
                        board.current_index() + 1,
                        board.len(),
                        board.generation(),
                    ),
                    None => {
                        presenter.error("No active question board");
                        return ExitCode::from(EXIT_ERROR);
                    }
                };

                // Announce a fresh board: summary, risks, progress
                if seen_board != Some(generation) {
                    if let Some(summary) = flow.round_summary() {
                        presenter.summary(summary);
                    }
                    show_risk_flags(flow.risk_flags(), presenter);
                    presenter.interview_progress(flow.progress());
                    seen_board = Some(generation);
                }

                if flow.awaiting_clarification() {
                    presenter.info("The interviewer wants to clear something up first");
                }

                let question_text = match flow.current_question() {
                    Some(q) => q.display_text().to_string(),
                    None => {
                        presenter.error("No question is awaiting an answer");
                        return ExitCode::from(EXIT_ERROR);
                    }
                };
                presenter.question(round, position, total, &question_text);

                let clip =
                    match record_take(&mut controller, &prompt, &cue, presenter, shutdown).await {
                        TakeOutcome::Clip(clip) => clip,
                        TakeOutcome::Retry => continue,
                        TakeOutcome::Interrupted => {
                            return leave_resumable(&flow, presenter, EXIT_SUCCESS)
                        }
                        TakeOutcome::DeviceFailed(msg) => {
                            presenter.error(&msg);
                            return leave_resumable(&flow, presenter, EXIT_ERROR);
                        }
                    };

                presenter.start_spinner("Transcribing...");
                let transcript = match flow.transcribe_clip(&clip).await {
                    Ok(t) => {
                        presenter.spinner_success("Transcribed");
                        t
                    }
                    Err(e) => {
                        presenter.spinner_fail(&e.to_string());
                        match prompt.retry("Transcription failed.").await {
                            Ok(true) => continue,
                            _ => return leave_resumable(&flow, presenter, EXIT_ERROR),
                        }
                    }
                };

                let action = match prompt
                    .review(
                        &question_text,
                        &transcript.transcript,
                        transcript.is_low_confidence(),
                    )
                    .await
                {
                    Ok(a) => a,
                    Err(e) => {
                        presenter.error(&e.to_string());
                        return leave_resumable(&flow, presenter, EXIT_ERROR);
                    }
                };

                match action {
                    ReviewAction::Confirm(text) => {
                        if let Err(e) = flow.confirm_answer(text) {
                            presenter.error(&e.to_string());
                            return ExitCode::from(EXIT_ERROR);
                        }
                    }
                    ReviewAction::ReRecord => {
                        if let Err(e) = flow.discard_draft() {
                            presenter.error(&e.to_string());
                            return ExitCode::from(EXIT_ERROR);
                        }
                        continue;
                    }
                    ReviewAction::Quit => {
                        return leave_resumable(&flow, presenter, EXIT_SUCCESS)
                    }
                }

                // Submit once the board is fully confirmed. Quick mode
                // sends the round as a batch, precise sends the answer.
                while flow.ready_to_submit() {
                    presenter.start_spinner("Submitting answers...");
                    let result = match flow.mode() {
                        InterviewMode::Quick => flow.submit_round().await,
                        InterviewMode::Precise => flow.submit_current().await,
                    };
                    match result {
                        Ok(SubmitOutcome::Continue) => {
                            presenter.spinner_success("Answers submitted");
                            break;
                        }
                        Ok(SubmitOutcome::Complete) => {
                            presenter.spinner_success("All interview rounds complete");
                            break;
                        }
                        Err(e) => {
                            presenter.spinner_fail(&e.to_string());
                            match prompt.retry("Submission failed.").await {
                                Ok(true) => continue,
                                _ => return leave_resumable(&flow, presenter, EXIT_SUCCESS),
                            }
                        }
                    }
                }
            }

            FlowPhase::CollectingContact => {
                let decision = match prompt.collect().await {
                    Ok(d) => d,
                    Err(e) => {
                        presenter.error(&e.to_string());
                        return leave_resumable(&flow, presenter, EXIT_ERROR);
                    }
                };
                let contact = match decision {
                    ContactDecision::Submit(c) => Some(c),
                    ContactDecision::Skip => None,
                };

                presenter.start_spinner("Generating the final report...");
                match flow.finalize(contact).await {
                    Ok(_) => presenter.spinner_success("Report ready"),
                    Err(e) => {
                        presenter.spinner_fail(&e.to_string());
                        match prompt.retry("Finalize failed.").await {
                            Ok(true) => continue,
                            _ => return leave_resumable(&flow, presenter, EXIT_SUCCESS),
                        }
                    }
                }
            }

            FlowPhase::Complete => {
                return present_completion(&api, &flow, options, presenter).await;
            }

            FlowPhase::Failed => {
                presenter.error("The session hit an unrecoverable error");
                return ExitCode::from(EXIT_ERROR);
            }

            phase => {
                // Submitting, transitioning, and finalizing never rest
                // between calls; landing here is a bug.
                presenter.error(&format!("Unexpected interview phase: {}", phase));
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }
}

/// Record one take: Enter stops it, the ceiling stops it, Ctrl-C
/// abandons it.
async fn record_take(
    controller: &mut CaptureController<CpalRecorder>,
    prompt: &StdinPrompt,
    cue: &Box<dyn AudioCue>,
    presenter: &mut Presenter,
    shutdown: &ShutdownSignal,
) -> TakeOutcome {
    presenter.info("Press Enter to stop the take, Ctrl-C to pause the interview");

    if let Err(e) = controller.start().await {
        let msg = e.to_string();
        let _ = controller.reset();
        return TakeOutcome::DeviceFailed(msg);
    }
    if let Err(e) = cue.play(AudioCueType::RecordingStart).await {
        tracing::debug!(error = %e, "start cue failed");
    }

    presenter.show_recording_progress("Recording...");

    let stop = Arc::new(AtomicBool::new(false));
    let lines = prompt.lines();
    let enter_stop = Arc::clone(&stop);
    let waiter = tokio::spawn(async move {
        if lines.lock().await.recv().await.is_some() {
            enter_stop.store(true, Ordering::SeqCst);
        }
    });

    let shutdown_flag = shutdown.flag();
    let tick_stop = Arc::clone(&stop);
    let outcome = controller
        .run(&stop, |elapsed, ceiling| {
            presenter.update_recording_progress(elapsed, ceiling);
            if shutdown_flag.load(Ordering::SeqCst) {
                tick_stop.store(true, Ordering::SeqCst);
            }
        })
        .await;
    waiter.abort();

    if shutdown.is_shutdown() {
        if let Err(e) = cue.play(AudioCueType::RecordingCancel).await {
            tracing::debug!(error = %e, "cancel cue failed");
        }
        presenter.stop_spinner();
        // The take is dropped; the question stays unanswered.
        let _ = controller.reset();
        return TakeOutcome::Interrupted;
    }

    match outcome {
        Ok(clip) => {
            if let Err(e) = cue.play(AudioCueType::RecordingStop).await {
                tracing::debug!(error = %e, "stop cue failed");
            }
            presenter.spinner_success(&format!(
                "Recorded {}s ({})",
                clip.duration_ms() / 1000,
                clip.human_readable_size()
            ));
            let _ = controller.reset();
            TakeOutcome::Clip(clip)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            let _ = controller.reset();
            TakeOutcome::Retry
        }
    }
}

/// Print the final report and carry out the copy/save options
async fn deliver_report(
    session: SessionId,
    markdown: &str,
    risks: &[RiskFlag],
    email_note: Option<&str>,
    copy: bool,
    save: bool,
    presenter: &mut Presenter,
) -> ExitCode {
    presenter.output(markdown);
    show_risk_flags(risks, presenter);
    if let Some(note) = email_note {
        presenter.info(note);
    }

    if copy {
        let clipboard = create_clipboard();
        match clipboard.copy(markdown).await {
            Ok(()) => presenter.info("Copied to clipboard"),
            Err(e) => presenter.warn(&e.to_string()),
        }
    }

    if save {
        let path = PathBuf::from(format!("{}.md", session.short()));
        match tokio::fs::write(&path, markdown).await {
            Ok(()) => presenter.success(&format!("Report saved to {}", path.display())),
            Err(e) => {
                presenter.error(&format!("Failed to save report: {}", e));
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Hand over the report after the flow completed. A session resumed
/// past its finish has no in-memory report, so the stored results are
/// fetched instead.
async fn present_completion(
    api: &HttpApiClient,
    flow: &InterviewFlow<HttpApiClient>,
    options: &InterviewOptions,
    presenter: &mut Presenter,
) -> ExitCode {
    if let Some(report) = flow.report() {
        let note = email_note(report.email_sent, None);
        return deliver_report(
            report.session_id,
            &report.final_markdown,
            &report.risk_flags,
            note.as_deref(),
            options.copy,
            options.save,
            presenter,
        )
        .await;
    }

    let session = match flow.session_id() {
        Some(s) => s,
        None => {
            presenter.error("No session to fetch results for");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.info("This session already finished");
    presenter.start_spinner("Fetching results...");
    match api.results(&session).await {
        Ok(results) => {
            presenter.spinner_success("Results fetched");
            let note = email_note(results.email_sent, results.contact_email.as_deref());
            deliver_report(
                results.session_id,
                &results.final_markdown,
                &results.risk_flags,
                note.as_deref(),
                options.copy,
                options.save,
                presenter,
            )
            .await
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn email_note(email_sent: bool, contact_email: Option<&str>) -> Option<String> {
    if !email_sent {
        return None;
    }
    Some(match contact_email {
        Some(address) => format!("The report was emailed to {}", address),
        None => "The report was emailed to the contact".to_string(),
    })
}

fn show_risk_flags(flags: &[RiskFlag], presenter: &Presenter) {
    for flag in flags {
        let note = flag.note.as_deref().unwrap_or("flagged for review");
        presenter.warn(&format!("[{}] {}: {}", flag.severity, flag.code, note));
    }
}

/// Print the resume hint and leave with the given exit code
fn leave_resumable(
    flow: &InterviewFlow<HttpApiClient>,
    presenter: &Presenter,
    code: u8,
) -> ExitCode {
    if let Some(id) = flow.session_id() {
        presenter.resume_hint(&id.to_string());
    }
    ExitCode::from(code)
}
