//! Interview orchestration use case

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::session::progress::{
    round_progress, slot_progress, DEFAULT_QUESTIONS_PER_ROUND, DEFAULT_TOTAL_ROUNDS,
};
use crate::domain::session::{
    ContactInfo, InterviewMode, Question, QuestionState, RiskFlag, RoundBoard, SessionId,
    SlotStatus,
};

use super::ports::{
    AnswerOutcome, ApiError, FinalReport, InterviewApi, Transcript, Translator,
};
use super::translation::TranslationCache;
use crate::domain::recording::AudioClip;

/// Interview progression phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowPhase {
    #[default]
    Loading,
    Active,
    Submitting,
    Transitioning,
    CollectingContact,
    Finalizing,
    Complete,
    Failed,
}

impl FlowPhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Submitting => "submitting",
            Self::Transitioning => "transitioning",
            Self::CollectingContact => "collecting-contact",
            Self::Finalizing => "finalizing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from the interview flow
#[derive(Debug, Error)]
pub enum FlowError {
    /// The session could not be started or resumed; the flow is dead.
    #[error("Failed to load session: {0}")]
    LoadFailed(#[source] ApiError),

    /// The clip could not be transcribed; the caller offers a retake.
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(#[source] ApiError),

    /// Submission failed; confirmations survive for a retry.
    #[error("Failed to submit answers: {0}")]
    SubmitFailed(#[source] ApiError),

    /// Finalize failed; the contact step is offered again.
    #[error("Failed to finalize session: {0}")]
    FinalizeFailed(#[source] ApiError),

    #[error("Not every answer in this round is confirmed yet")]
    RoundIncomplete,

    #[error("The current answer is not confirmed yet")]
    AnswerUnconfirmed,

    #[error("No question is awaiting an answer")]
    NoCurrentQuestion,

    #[error("Invalid interview transition: cannot {action} while {phase}")]
    Phase { phase: FlowPhase, action: String },
}

/// What a successful submission leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new board is active: the next round, the next question, or a
    /// clarification that jumped the queue
    Continue,
    /// The interview material is exhausted; contact collection is next
    Complete,
}

/// Question id prefix for service clarifications, which arrive as bare
/// text and are assigned ids client-side
const CLARIFY_PREFIX: &str = "CLARIFY_";

/// Drives one interview session against the service.
///
/// Holds the phase machine, the current round board, and the derived
/// display state (slots, risks, summary, progress). All terminal
/// interaction stays outside; this type never prints.
pub struct InterviewFlow<A: InterviewApi + Translator> {
    api: Arc<A>,
    cache: Arc<TranslationCache>,
    phase: FlowPhase,
    mode: InterviewMode,
    language: String,
    session_id: Option<SessionId>,
    board: Option<RoundBoard>,
    generation: u64,
    pending: VecDeque<Question>,
    slot_status: Vec<SlotStatus>,
    risk_flags: Vec<RiskFlag>,
    round_summary: Option<String>,
    progress_percent: Option<u8>,
    clarifications: u32,
    report: Option<FinalReport>,
}

impl<A: InterviewApi + Translator> InterviewFlow<A> {
    pub fn new(
        api: Arc<A>,
        cache: Arc<TranslationCache>,
        language: impl Into<String>,
        mode: InterviewMode,
    ) -> Self {
        Self {
            api,
            cache,
            phase: FlowPhase::Loading,
            mode,
            language: language.into(),
            session_id: None,
            board: None,
            generation: 0,
            pending: VecDeque::new(),
            slot_status: Vec::new(),
            risk_flags: Vec::new(),
            round_summary: None,
            progress_percent: None,
            clarifications: 0,
            report: None,
        }
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn mode(&self) -> InterviewMode {
        self.mode
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn board(&self) -> Option<&RoundBoard> {
        self.board.as_ref()
    }

    /// The question the interview is waiting on
    pub fn current_question(&self) -> Option<&QuestionState> {
        self.board.as_ref().and_then(|b| b.current())
    }

    pub fn slot_status(&self) -> &[SlotStatus] {
        &self.slot_status
    }

    pub fn risk_flags(&self) -> &[RiskFlag] {
        &self.risk_flags
    }

    /// Localized summary of the last submitted round
    pub fn round_summary(&self) -> Option<&str> {
        self.round_summary.as_deref()
    }

    /// The final report, once the session completed
    pub fn report(&self) -> Option<&FinalReport> {
        self.report.as_ref()
    }

    /// Whether the current board's question is a clarification
    pub fn awaiting_clarification(&self) -> bool {
        self.current_question()
            .map(|q| q.question().id.starts_with(CLARIFY_PREFIX))
            .unwrap_or(false)
    }

    /// Completion percent to display. The service's figure wins when it
    /// sent one; otherwise it is derived from slots, then from round
    /// position.
    pub fn progress(&self) -> u8 {
        if let Some(pct) = self.progress_percent {
            return pct.min(100);
        }
        if !self.slot_status.is_empty() {
            return slot_progress(&self.slot_status);
        }
        if self.phase == FlowPhase::Complete {
            return 100;
        }
        match &self.board {
            Some(board) => round_progress(
                board.round(),
                board.confirmed_count(),
                DEFAULT_QUESTIONS_PER_ROUND,
                DEFAULT_TOTAL_ROUNDS,
            ),
            None => 0,
        }
    }

    /// Start a fresh session
    pub async fn begin(&mut self) -> Result<(), FlowError> {
        self.require_phase(FlowPhase::Loading, "begin")?;
        let started = match self.api.start_session(&self.language, self.mode).await {
            Ok(s) => s,
            Err(e) => {
                self.phase = FlowPhase::Failed;
                return Err(FlowError::LoadFailed(e));
            }
        };
        tracing::info!(session = %started.session_id, mode = %started.interview_mode, "session started");

        self.session_id = Some(started.session_id);
        self.mode = started.interview_mode;
        self.serve_questions(started.round, started.questions).await;
        Ok(())
    }

    /// Rebuild flow state from a stored session. A session that already
    /// finished lands directly in the complete phase so the caller can
    /// hand off to the results view.
    pub async fn resume(&mut self, session: SessionId) -> Result<(), FlowError> {
        self.require_phase(FlowPhase::Loading, "resume")?;
        let snapshot = match self.api.session_state(&session).await {
            Ok(s) => s,
            Err(e) => {
                self.phase = FlowPhase::Failed;
                return Err(FlowError::LoadFailed(e));
            }
        };
        tracing::info!(session = %session, round = snapshot.round, "session resumed");

        let completed = snapshot.is_completed();
        self.session_id = Some(session);
        self.mode = snapshot.interview_mode;
        self.language = snapshot.state.language.clone();
        self.slot_status = snapshot.slot_status;
        self.risk_flags = snapshot.state.risk_flags;
        self.progress_percent = snapshot.progress_percent;

        if completed {
            self.phase = FlowPhase::Complete;
            return Ok(());
        }

        if let Some(summary) = snapshot.state.round_summary {
            self.round_summary = Some(self.localize(&summary).await);
        }
        if snapshot.state.next_questions.is_empty() {
            // All rounds answered but never finalized. Pick up at the
            // contact step instead of serving an empty board.
            self.phase = FlowPhase::CollectingContact;
            return Ok(());
        }
        self.serve_questions(snapshot.round, snapshot.state.next_questions)
            .await;
        Ok(())
    }

    /// Send one answer clip for transcription and hold the draft on the
    /// current question. One attempt only; a failure leaves the flow
    /// active so the caller can offer a retake.
    pub async fn transcribe_clip(&mut self, clip: &AudioClip) -> Result<Transcript, FlowError> {
        self.require_phase(FlowPhase::Active, "transcribe")?;
        let session = self.session("transcribe")?;
        if self.current_question().is_none() {
            return Err(FlowError::NoCurrentQuestion);
        }

        let transcript = self
            .api
            .transcribe(&session, clip, &self.language)
            .await
            .map_err(FlowError::TranscriptionFailed)?;

        if let Some(board) = self.board.as_mut() {
            board.stage_draft(transcript.transcript.clone());
        }
        Ok(transcript)
    }

    /// Throw away the current question's draft for another take
    pub fn discard_draft(&mut self) -> Result<(), FlowError> {
        self.require_phase(FlowPhase::Active, "discard a draft")?;
        if let Some(board) = self.board.as_mut() {
            board.clear_current();
        }
        Ok(())
    }

    /// Confirm the current question with its reviewed transcript
    pub fn confirm_answer(&mut self, transcript: String) -> Result<(), FlowError> {
        self.require_phase(FlowPhase::Active, "confirm an answer")?;
        let board = self.board.as_mut().ok_or(FlowError::NoCurrentQuestion)?;
        if board.current().is_none() {
            return Err(FlowError::NoCurrentQuestion);
        }
        board.confirm_current(transcript);
        Ok(())
    }

    /// Move the cursor to another question on the board (quick mode
    /// lets the user revisit before submitting)
    pub fn select_question(&mut self, index: usize) -> Result<(), FlowError> {
        self.require_phase(FlowPhase::Active, "select a question")?;
        let board = self.board.as_mut().ok_or(FlowError::NoCurrentQuestion)?;
        if !board.select(index) {
            return Err(FlowError::NoCurrentQuestion);
        }
        Ok(())
    }

    /// Whether the round is fully confirmed and can be submitted
    pub fn ready_to_submit(&self) -> bool {
        self.phase == FlowPhase::Active
            && self
                .board
                .as_ref()
                .map(|b| !b.is_empty() && b.all_confirmed())
                .unwrap_or(false)
    }

    /// Submit the whole confirmed round (quick mode)
    pub async fn submit_round(&mut self) -> Result<SubmitOutcome, FlowError> {
        self.require_phase(FlowPhase::Active, "submit the round")?;
        let board = self.board.as_ref().ok_or(FlowError::NoCurrentQuestion)?;
        if board.is_empty() || !board.all_confirmed() {
            return Err(FlowError::RoundIncomplete);
        }
        let entries = board.confirmed_entries();
        self.push_answers(entries).await
    }

    /// Submit only the current confirmed answer (precise mode)
    pub async fn submit_current(&mut self) -> Result<SubmitOutcome, FlowError> {
        self.require_phase(FlowPhase::Active, "submit the answer")?;
        let board = self.board.as_ref().ok_or(FlowError::NoCurrentQuestion)?;
        let current = board.current().ok_or(FlowError::NoCurrentQuestion)?;
        let transcript = match current.answer().transcript() {
            Some(t) if current.answer().is_confirmed() => t.to_string(),
            _ => return Err(FlowError::AnswerUnconfirmed),
        };
        let entry = crate::domain::session::TranscriptEntry {
            question_id: current.question().id.clone(),
            text: transcript,
        };
        self.push_answers(vec![entry]).await
    }

    /// Finalize with contact details or an explicit skip
    pub async fn finalize(&mut self, contact: Option<ContactInfo>) -> Result<FinalReport, FlowError> {
        self.require_phase(FlowPhase::CollectingContact, "finalize")?;
        let session = self.session("finalize")?;

        self.phase = FlowPhase::Finalizing;
        match self.api.finalize(&session, contact.as_ref()).await {
            Ok(report) => {
                tracing::info!(session = %session, email_sent = report.email_sent, "session finalized");
                self.phase = FlowPhase::Complete;
                self.report = Some(report.clone());
                Ok(report)
            }
            Err(e) => {
                // Not terminal: the user retries without losing context.
                self.phase = FlowPhase::CollectingContact;
                Err(FlowError::FinalizeFailed(e))
            }
        }
    }

    async fn push_answers(
        &mut self,
        entries: Vec<crate::domain::session::TranscriptEntry>,
    ) -> Result<SubmitOutcome, FlowError> {
        let session = self.session("submit")?;
        self.phase = FlowPhase::Submitting;

        let outcome = match self.api.submit_answers(&session, &entries).await {
            Ok(o) => o,
            Err(e) => {
                // Confirmations survive so the round can be resent.
                self.phase = FlowPhase::Active;
                return Err(FlowError::SubmitFailed(e));
            }
        };
        Ok(self.absorb_outcome(outcome).await)
    }

    /// Fold a submit response into flow state. Slot status and risk
    /// flags are replaced wholesale, never merged.
    async fn absorb_outcome(&mut self, outcome: AnswerOutcome) -> SubmitOutcome {
        let AnswerOutcome {
            round,
            risk_flags,
            round_summary,
            next_questions,
            is_complete,
            clarification_question,
            slot_status,
            progress_percent,
            ..
        } = outcome;

        if let Some(slots) = slot_status {
            self.slot_status = slots;
        }
        self.risk_flags = risk_flags;
        self.progress_percent = progress_percent;
        self.round_summary = match round_summary {
            Some(summary) => Some(self.localize(&summary).await),
            None => None,
        };

        if is_complete {
            self.board = None;
            self.phase = FlowPhase::CollectingContact;
            return SubmitOutcome::Complete;
        }

        // The localization fetch for upcoming texts hides behind the
        // transitioning phase.
        self.phase = FlowPhase::Transitioning;

        let served = if let Some(text) = clarification_question {
            // A clarification jumps the queue; scheduled questions wait.
            self.pending.extend(next_questions);
            self.clarifications += 1;
            vec![Question {
                id: format!("{}{}", CLARIFY_PREFIX, self.clarifications),
                text,
                round_hint: None,
            }]
        } else if self.mode == InterviewMode::Precise {
            self.pending.extend(next_questions);
            self.pending.pop_front().map(|q| vec![q]).unwrap_or_default()
        } else {
            next_questions
        };

        if served.is_empty() {
            self.board = None;
            self.phase = FlowPhase::CollectingContact;
            return SubmitOutcome::Complete;
        }

        self.serve_questions(round, served).await;
        SubmitOutcome::Continue
    }

    /// Replace the board with a fresh one and localize its texts
    async fn serve_questions(&mut self, round: u32, questions: Vec<Question>) {
        self.generation += 1;
        let mut board = RoundBoard::new(round, self.generation, questions);

        let texts: Vec<String> = board
            .questions()
            .iter()
            .map(|q| q.question().text.clone())
            .collect();
        if !texts.is_empty() {
            let localized = self
                .cache
                .localize_all(self.api.as_ref(), &texts, &self.language)
                .await;
            let generation = board.generation();
            for (index, text) in localized.into_iter().enumerate() {
                board.apply_localization(generation, index, text);
            }
        }

        self.board = Some(board);
        self.phase = FlowPhase::Active;
    }

    async fn localize(&self, text: &str) -> String {
        self.cache
            .localize(self.api.as_ref(), text, &self.language)
            .await
    }

    fn session(&self, action: &str) -> Result<SessionId, FlowError> {
        self.session_id.ok_or_else(|| FlowError::Phase {
            phase: self.phase,
            action: action.to_string(),
        })
    }

    fn require_phase(&self, want: FlowPhase, action: &str) -> Result<(), FlowError> {
        if self.phase != want {
            return Err(FlowError::Phase {
                phase: self.phase,
                action: action.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        SessionSnapshot, SessionStateBlob, StartedSession, Transcript,
    };
    use crate::domain::session::{SlotFill, TranscriptEntry};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const SESSION: &str = "123e4567-e89b-42d3-a456-426614174000";

    fn sid() -> SessionId {
        SessionId::parse(SESSION).unwrap()
    }

    fn question(id: &str, text: &str) -> Question {
        Question::new(id, text)
    }

    fn outcome(round: u32) -> AnswerOutcome {
        AnswerOutcome {
            session_id: sid(),
            round,
            slots_updated: Vec::new(),
            risk_flags: Vec::new(),
            round_summary: None,
            next_questions: Vec::new(),
            is_complete: false,
            clarification_question: None,
            slot_status: None,
            progress_percent: None,
        }
    }

    fn slot(key: &str, status: SlotFill) -> SlotStatus {
        SlotStatus {
            slot_key: key.to_string(),
            label: key.to_string(),
            status,
            confidence: 0.8,
        }
    }

    /// Scripted service double. Submit responses pop from the front of
    /// the queue; other endpoints are fixed or fail on demand.
    #[derive(Default)]
    struct MockApi {
        start_questions: Mutex<Vec<Question>>,
        start_mode: Mutex<Option<InterviewMode>>,
        snapshot: Mutex<Option<SessionSnapshot>>,
        submit_queue: Mutex<Vec<Result<AnswerOutcome, ApiError>>>,
        submitted: Mutex<Vec<Vec<TranscriptEntry>>>,
        finalize_result: Mutex<Option<Result<FinalReport, ApiError>>>,
        transcribe_result: Mutex<Option<Result<Transcript, ApiError>>>,
        fail_start: Mutex<bool>,
        translate_calls: AtomicUsize,
    }

    impl MockApi {
        fn with_questions(questions: Vec<Question>) -> Self {
            let api = Self::default();
            *api.start_questions.lock().unwrap() = questions;
            api
        }

        fn queue_submit(&self, result: Result<AnswerOutcome, ApiError>) {
            self.submit_queue.lock().unwrap().push(result);
        }
    }

    #[async_trait]
    impl InterviewApi for MockApi {
        async fn start_session(
            &self,
            _language: &str,
            mode: InterviewMode,
        ) -> Result<StartedSession, ApiError> {
            if *self.fail_start.lock().unwrap() {
                return Err(ApiError::Network("refused".to_string()));
            }
            Ok(StartedSession {
                session_id: sid(),
                round: 1,
                questions: self.start_questions.lock().unwrap().clone(),
                interview_mode: self.start_mode.lock().unwrap().unwrap_or(mode),
            })
        }

        async fn session_state(&self, _session: &SessionId) -> Result<SessionSnapshot, ApiError> {
            self.snapshot
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ApiError::Status {
                    status: 404,
                    message: "Session not found".to_string(),
                    details: None,
                })
        }

        async fn transcribe(
            &self,
            _session: &SessionId,
            _clip: &AudioClip,
            _language: &str,
        ) -> Result<Transcript, ApiError> {
            self.transcribe_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| {
                    Ok(Transcript {
                        transcript: "spoken answer".to_string(),
                        language: None,
                        confidence: Some(0.9),
                    })
                })
        }

        async fn submit_answers(
            &self,
            _session: &SessionId,
            transcripts: &[TranscriptEntry],
        ) -> Result<AnswerOutcome, ApiError> {
            self.submitted.lock().unwrap().push(transcripts.to_vec());
            let mut queue = self.submit_queue.lock().unwrap();
            if queue.is_empty() {
                return Ok(outcome(1));
            }
            queue.remove(0)
        }

        async fn finalize(
            &self,
            _session: &SessionId,
            _contact: Option<&ContactInfo>,
        ) -> Result<FinalReport, ApiError> {
            self.finalize_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| {
                    Ok(FinalReport {
                        session_id: sid(),
                        final_markdown: "# Report".to_string(),
                        slots: HashMap::new(),
                        risk_flags: Vec::new(),
                        email_sent: false,
                    })
                })
        }

        async fn results(
            &self,
            _session: &SessionId,
        ) -> Result<crate::application::ports::SessionResults, ApiError> {
            Err(ApiError::Status {
                status: 400,
                message: "Session not yet completed".to_string(),
                details: None,
            })
        }

        async fn download_report(&self, _session: &SessionId) -> Result<Vec<u8>, ApiError> {
            Ok(b"# Report".to_vec())
        }

        async fn verify_admin_key(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Translator for MockApi {
        async fn translate(&self, text: &str, target: &str) -> Result<String, ApiError> {
            self.translate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}] {}", target, text))
        }
    }

    fn flow_with(api: MockApi, language: &str, mode: InterviewMode) -> InterviewFlow<MockApi> {
        InterviewFlow::new(
            Arc::new(api),
            Arc::new(TranslationCache::new()),
            language,
            mode,
        )
    }

    fn three_questions() -> Vec<Question> {
        vec![
            question("Q1", "Kur statysite pirtį?"),
            question("Q2", "Kiek žmonių naudosis?"),
            question("Q3", "Koks biudžetas?"),
        ]
    }

    #[tokio::test]
    async fn begin_builds_localized_board() {
        let api = MockApi::with_questions(three_questions());
        let mut flow = flow_with(api, "en", InterviewMode::Quick);

        flow.begin().await.unwrap();

        assert_eq!(flow.phase(), FlowPhase::Active);
        assert_eq!(flow.session_id(), Some(sid()));
        let board = flow.board().unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board.current().unwrap().display_text(), "[en] Kur statysite pirtį?");
    }

    #[tokio::test]
    async fn begin_in_source_language_skips_translation() {
        let api = MockApi::with_questions(three_questions());
        let mut flow = flow_with(api, "lt", InterviewMode::Quick);

        flow.begin().await.unwrap();

        assert_eq!(flow.api.translate_calls.load(Ordering::SeqCst), 0);
        let board = flow.board().unwrap();
        assert_eq!(board.current().unwrap().display_text(), "Kur statysite pirtį?");
    }

    #[tokio::test]
    async fn begin_failure_is_terminal() {
        let api = MockApi::with_questions(three_questions());
        *api.fail_start.lock().unwrap() = true;
        let mut flow = flow_with(api, "lt", InterviewMode::Quick);

        let err = flow.begin().await.unwrap_err();
        assert!(matches!(err, FlowError::LoadFailed(_)));
        assert_eq!(flow.phase(), FlowPhase::Failed);
    }

    #[tokio::test]
    async fn submit_refused_until_round_confirmed() {
        let api = MockApi::with_questions(three_questions());
        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();

        flow.confirm_answer("pirmas".to_string()).unwrap();
        assert!(!flow.ready_to_submit());
        let err = flow.submit_round().await.unwrap_err();
        assert!(matches!(err, FlowError::RoundIncomplete));

        flow.confirm_answer("antras".to_string()).unwrap();
        flow.confirm_answer("trečias".to_string()).unwrap();
        assert!(flow.ready_to_submit());
    }

    #[tokio::test]
    async fn submit_round_advances_and_replaces_state() {
        let api = MockApi::with_questions(three_questions());
        let mut next = outcome(2);
        next.next_questions = vec![question("Q4", "Kokios medžiagos?")];
        next.slot_status = Some(vec![slot("location", SlotFill::Filled)]);
        next.risk_flags = vec![RiskFlag {
            code: "budget_conflict".to_string(),
            severity: crate::domain::session::Severity::Medium,
            note: None,
            evidence: Vec::new(),
        }];
        next.round_summary = Some("Apibendrinimas".to_string());
        api.queue_submit(Ok(next));

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();
        for text in ["a", "b", "c"] {
            flow.confirm_answer(text.to_string()).unwrap();
        }

        let outcome = flow.submit_round().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Continue);
        assert_eq!(flow.phase(), FlowPhase::Active);

        let board = flow.board().unwrap();
        assert_eq!(board.round(), 2);
        assert_eq!(board.len(), 1);
        assert_eq!(flow.slot_status().len(), 1);
        assert_eq!(flow.risk_flags().len(), 1);
        assert_eq!(flow.round_summary(), Some("Apibendrinimas"));

        // The submitted batch carried all three confirmations
        let submitted = flow.api.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].len(), 3);
    }

    #[tokio::test]
    async fn submit_failure_reverts_to_active_with_confirmations() {
        let api = MockApi::with_questions(three_questions());
        api.queue_submit(Err(ApiError::Network("down".to_string())));
        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();
        for text in ["a", "b", "c"] {
            flow.confirm_answer(text.to_string()).unwrap();
        }

        let err = flow.submit_round().await.unwrap_err();
        assert!(matches!(err, FlowError::SubmitFailed(_)));
        assert_eq!(flow.phase(), FlowPhase::Active);
        assert!(flow.ready_to_submit());

        // A retry resubmits the same confirmations
        flow.api.queue_submit(Ok(outcome(2)));
        flow.submit_round().await.unwrap();
        let submitted = flow.api.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0], submitted[1]);
    }

    #[tokio::test]
    async fn final_round_routes_to_contact_collection() {
        let api = MockApi::with_questions(three_questions());
        let mut last = outcome(3);
        last.is_complete = true;
        api.queue_submit(Ok(last));

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();
        for text in ["a", "b", "c"] {
            flow.confirm_answer(text.to_string()).unwrap();
        }

        let outcome = flow.submit_round().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Complete);
        assert_eq!(flow.phase(), FlowPhase::CollectingContact);
        assert!(flow.board().is_none());
    }

    #[tokio::test]
    async fn finalize_failure_returns_to_contact_step() {
        let api = MockApi::with_questions(three_questions());
        let mut last = outcome(1);
        last.is_complete = true;
        api.queue_submit(Ok(last));
        *api.finalize_result.lock().unwrap() =
            Some(Err(ApiError::Status {
                status: 500,
                message: "LLM unavailable".to_string(),
                details: None,
            }));

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();
        for text in ["a", "b", "c"] {
            flow.confirm_answer(text.to_string()).unwrap();
        }
        flow.submit_round().await.unwrap();

        let err = flow.finalize(None).await.unwrap_err();
        assert!(matches!(err, FlowError::FinalizeFailed(_)));
        assert_eq!(flow.phase(), FlowPhase::CollectingContact);

        // The retry succeeds and completes the flow
        *flow.api.finalize_result.lock().unwrap() = None;
        let report = flow.finalize(None).await.unwrap();
        assert_eq!(report.final_markdown, "# Report");
        assert_eq!(flow.phase(), FlowPhase::Complete);
        assert!(flow.report().is_some());
    }

    #[tokio::test]
    async fn resume_completed_session_skips_to_complete() {
        let api = MockApi::default();
        *api.snapshot.lock().unwrap() = Some(SessionSnapshot {
            session_id: sid(),
            round: 3,
            state: SessionStateBlob {
                language: "lt".to_string(),
                interview_mode: InterviewMode::Quick,
                next_questions: Vec::new(),
                round_summary: None,
                risk_flags: Vec::new(),
            },
            completed_at: Some("2026-01-10T12:00:00".to_string()),
            interview_mode: InterviewMode::Quick,
            slot_status: Vec::new(),
            progress_percent: Some(100),
        });

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.resume(sid()).await.unwrap();
        assert_eq!(flow.phase(), FlowPhase::Complete);
        assert_eq!(flow.progress(), 100);
    }

    #[tokio::test]
    async fn resume_active_session_rebuilds_board() {
        let api = MockApi::default();
        *api.snapshot.lock().unwrap() = Some(SessionSnapshot {
            session_id: sid(),
            round: 2,
            state: SessionStateBlob {
                language: "en".to_string(),
                interview_mode: InterviewMode::Quick,
                next_questions: vec![question("Q4", "Kokios medžiagos?")],
                round_summary: Some("Santrauka".to_string()),
                risk_flags: Vec::new(),
            },
            completed_at: None,
            interview_mode: InterviewMode::Quick,
            slot_status: vec![slot("location", SlotFill::Filled)],
            progress_percent: None,
        });

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.resume(sid()).await.unwrap();

        assert_eq!(flow.phase(), FlowPhase::Active);
        assert_eq!(flow.language(), "en");
        let board = flow.board().unwrap();
        assert_eq!(board.round(), 2);
        assert_eq!(board.current().unwrap().display_text(), "[en] Kokios medžiagos?");
        assert_eq!(flow.round_summary(), Some("[en] Santrauka"));
    }

    #[tokio::test]
    async fn resume_with_no_questions_goes_to_contact() {
        let api = MockApi::default();
        *api.snapshot.lock().unwrap() = Some(SessionSnapshot {
            session_id: sid(),
            round: 3,
            state: SessionStateBlob {
                language: "lt".to_string(),
                interview_mode: InterviewMode::Quick,
                next_questions: Vec::new(),
                round_summary: None,
                risk_flags: Vec::new(),
            },
            completed_at: None,
            interview_mode: InterviewMode::Quick,
            slot_status: Vec::new(),
            progress_percent: None,
        });

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.resume(sid()).await.unwrap();
        assert_eq!(flow.phase(), FlowPhase::CollectingContact);
    }

    #[tokio::test]
    async fn precise_clarification_jumps_the_queue() {
        let api = MockApi::with_questions(vec![question("Q1", "Kur statysite?")]);
        *api.start_mode.lock().unwrap() = Some(InterviewMode::Precise);

        let mut clarify = outcome(1);
        clarify.clarification_question = Some("Ar lauke, ar viduje?".to_string());
        clarify.next_questions = vec![question("Q2", "Kiek žmonių?")];
        api.queue_submit(Ok(clarify));

        let mut flow = flow_with(api, "lt", InterviewMode::Precise);
        flow.begin().await.unwrap();

        flow.confirm_answer("prie ežero".to_string()).unwrap();
        flow.submit_current().await.unwrap();

        assert!(flow.awaiting_clarification());
        let board = flow.board().unwrap();
        assert_eq!(board.current().unwrap().question().id, "CLARIFY_1");
        assert_eq!(board.current().unwrap().display_text(), "Ar lauke, ar viduje?");

        // After the clarification, the deferred question is served
        flow.api.queue_submit(Ok(outcome(2)));
        flow.confirm_answer("lauke".to_string()).unwrap();
        flow.submit_current().await.unwrap();

        assert!(!flow.awaiting_clarification());
        assert_eq!(
            flow.board().unwrap().current().unwrap().question().id,
            "Q2"
        );
    }

    #[tokio::test]
    async fn precise_serves_one_question_at_a_time() {
        let api = MockApi::with_questions(vec![question("Q1", "Kur statysite?")]);
        *api.start_mode.lock().unwrap() = Some(InterviewMode::Precise);

        let mut next = outcome(2);
        next.next_questions = vec![
            question("Q2", "Kiek žmonių?"),
            question("Q3", "Koks biudžetas?"),
        ];
        api.queue_submit(Ok(next));

        let mut flow = flow_with(api, "lt", InterviewMode::Precise);
        flow.begin().await.unwrap();
        flow.confirm_answer("atsakymas".to_string()).unwrap();
        flow.submit_current().await.unwrap();

        let board = flow.board().unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board.current().unwrap().question().id, "Q2");

        // The spare question waits in the queue
        flow.api.queue_submit(Ok(outcome(2)));
        flow.confirm_answer("du".to_string()).unwrap();
        flow.submit_current().await.unwrap();
        assert_eq!(
            flow.board().unwrap().current().unwrap().question().id,
            "Q3"
        );
    }

    #[tokio::test]
    async fn precise_submit_requires_confirmation() {
        let api = MockApi::with_questions(vec![question("Q1", "Kur statysite?")]);
        *api.start_mode.lock().unwrap() = Some(InterviewMode::Precise);

        let mut flow = flow_with(api, "lt", InterviewMode::Precise);
        flow.begin().await.unwrap();

        let err = flow.submit_current().await.unwrap_err();
        assert!(matches!(err, FlowError::AnswerUnconfirmed));
    }

    #[tokio::test]
    async fn transcribe_failure_keeps_flow_active() {
        let api = MockApi::with_questions(three_questions());
        *api.transcribe_result.lock().unwrap() =
            Some(Err(ApiError::Status {
                status: 500,
                message: "Transcription failed".to_string(),
                details: None,
            }));

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();

        let clip = AudioClip::new(vec![0u8; 16], 1200);
        let err = flow.transcribe_clip(&clip).await.unwrap_err();
        assert!(matches!(err, FlowError::TranscriptionFailed(_)));
        assert_eq!(flow.phase(), FlowPhase::Active);
        assert!(flow.current_question().unwrap().answer().is_unanswered());
    }

    #[tokio::test]
    async fn transcribe_stages_a_draft() {
        let api = MockApi::with_questions(three_questions());
        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();

        let clip = AudioClip::new(vec![0u8; 16], 1200);
        let transcript = flow.transcribe_clip(&clip).await.unwrap();
        assert_eq!(transcript.transcript, "spoken answer");
        assert_eq!(
            flow.current_question().unwrap().answer().transcript(),
            Some("spoken answer")
        );
        assert!(!flow.current_question().unwrap().answer().is_confirmed());
    }

    #[tokio::test]
    async fn phase_guard_refuses_misordered_calls() {
        let api = MockApi::with_questions(three_questions());
        let mut flow = flow_with(api, "lt", InterviewMode::Quick);

        // Still loading: nothing but begin/resume is legal
        let err = flow.confirm_answer("early".to_string()).unwrap_err();
        assert!(matches!(err, FlowError::Phase { .. }));
        let err = flow.submit_round().await.unwrap_err();
        assert!(matches!(err, FlowError::Phase { .. }));
        let err = flow.finalize(None).await.unwrap_err();
        assert!(matches!(err, FlowError::Phase { .. }));
    }

    #[tokio::test]
    async fn progress_prefers_service_figure() {
        let api = MockApi::with_questions(three_questions());
        let mut next = outcome(2);
        next.slot_status = Some(vec![
            slot("a", SlotFill::Filled),
            slot("b", SlotFill::Empty),
        ]);
        next.progress_percent = Some(72);
        next.next_questions = vec![question("Q4", "Dar vienas?")];
        api.queue_submit(Ok(next));

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();
        for text in ["a", "b", "c"] {
            flow.confirm_answer(text.to_string()).unwrap();
        }
        flow.submit_round().await.unwrap();

        // 72 from the service, not 50 from the slots
        assert_eq!(flow.progress(), 72);
    }

    #[tokio::test]
    async fn progress_derives_from_slots_when_service_is_silent() {
        let api = MockApi::with_questions(three_questions());
        let mut next = outcome(2);
        next.slot_status = Some(vec![
            slot("a", SlotFill::Filled),
            slot("b", SlotFill::Partial),
        ]);
        next.next_questions = vec![question("Q4", "Dar vienas?")];
        api.queue_submit(Ok(next));

        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();
        for text in ["a", "b", "c"] {
            flow.confirm_answer(text.to_string()).unwrap();
        }
        flow.submit_round().await.unwrap();

        assert_eq!(flow.progress(), 75);
    }

    #[tokio::test]
    async fn progress_falls_back_to_round_position() {
        let api = MockApi::with_questions(three_questions());
        let mut flow = flow_with(api, "lt", InterviewMode::Quick);
        flow.begin().await.unwrap();

        assert_eq!(flow.progress(), 0);
        flow.confirm_answer("a".to_string()).unwrap();
        flow.confirm_answer("b".to_string()).unwrap();
        // Round 1, 2 of 3 answered over 3 rounds: 22%
        assert_eq!(flow.progress(), 22);
    }

    #[tokio::test]
    async fn repeated_question_texts_hit_translation_cache() {
        let api = MockApi::with_questions(vec![
            question("Q1", "Kiek vietos?"),
            question("Q2", "Kiek vietos?"),
        ]);
        let mut flow = flow_with(api, "en", InterviewMode::Quick);
        flow.begin().await.unwrap();

        // Both boards' texts are identical; at most one fetch can win
        // per text, and a second identical round is all hits.
        let calls_after_begin = flow.api.translate_calls.load(Ordering::SeqCst);
        let mut next = outcome(2);
        next.next_questions = vec![question("Q3", "Kiek vietos?")];
        flow.api.queue_submit(Ok(next));
        for text in ["a", "b"] {
            flow.confirm_answer(text.to_string()).unwrap();
        }
        flow.submit_round().await.unwrap();

        assert_eq!(
            flow.api.translate_calls.load(Ordering::SeqCst),
            calls_after_begin
        );
    }
}
