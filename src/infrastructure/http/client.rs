//! Interview service HTTP adapter

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    AnswerOutcome, ApiError, FinalReport, InterviewApi, SessionResults, SessionSnapshot,
    StartedSession, Transcript, Translator,
};
use crate::domain::recording::{AudioClip, CLIP_FILE_NAME, CLIP_MIME};
use crate::domain::session::{ContactInfo, InterviewMode, SessionId, TranscriptEntry};

use super::retry::RetryPolicy;

/// Total time allowed per request. Finalization runs report generation
/// on the service side and can take tens of seconds.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Header carrying the admin key for privileged endpoints
const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

// Request types for the interview service

#[derive(Debug, Serialize)]
struct StartSessionRequest<'a> {
    language: &'a str,
    interview_mode: InterviewMode,
}

#[derive(Debug, Serialize)]
struct SubmitAnswersRequest<'a> {
    transcripts: &'a [TranscriptEntry],
}

#[derive(Debug, Serialize)]
struct FinalizeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_info: Option<&'a ContactInfo>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target_language: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

/// Error body shape used by the service: detail is a plain string for
/// handler errors and a structured list for validation errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// HTTP client for the interview service
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    admin_key: Option<String>,
    policy: RetryPolicy,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_key: None,
            policy: RetryPolicy::default(),
        })
    }

    /// Attach the admin key used for privileged endpoints
    pub fn with_admin_key(mut self, admin_key: Option<String>) -> Self {
        self.admin_key = admin_key;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Admin key with control characters and non-ASCII stripped, since
    /// those cannot travel in a header. Empty after cleanup counts as
    /// missing.
    fn sanitized_admin_key(&self) -> Result<String, ApiError> {
        let raw = self.admin_key.as_deref().unwrap_or_default();
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(ApiError::MissingAdminKey);
        }
        Ok(cleaned.to_string())
    }

    /// Run one request under a retry policy. The builder closure is
    /// invoked once per attempt so each retry carries a fresh body.
    async fn request_json<T, F>(
        &self,
        name: &str,
        policy: RetryPolicy,
        build: F,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match Self::attempt_json::<T>(build()).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    attempt += 1;
                    if attempt >= policy.max_attempts() || !policy.should_retry(&error) {
                        return Err(error);
                    }
                    let delay = policy.delay_for(attempt - 1);
                    tracing::debug!(
                        request = name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying service request"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn attempt_json<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn attempt_bytes(request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::status_error(status, &body))
    }

    fn status_error(status: reqwest::StatusCode, body: &str) -> ApiError {
        let code = status.as_u16();
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(message),
            }) => ApiError::Status {
                status: code,
                message,
                details: None,
            },
            Ok(ErrorBody { detail }) => ApiError::Status {
                status: code,
                message: detail.to_string(),
                details: Some(detail),
            },
            Err(_) => {
                let trimmed = body.trim();
                let message = if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    trimmed.chars().take(200).collect()
                };
                ApiError::Status {
                    status: code,
                    message,
                    details: None,
                }
            }
        }
    }
}

#[async_trait]
impl InterviewApi for HttpApiClient {
    async fn start_session(
        &self,
        language: &str,
        mode: InterviewMode,
    ) -> Result<StartedSession, ApiError> {
        let url = self.url("/session/start");
        let body = StartSessionRequest {
            language,
            interview_mode: mode,
        };
        self.request_json("start_session", self.policy, || {
            self.client.post(&url).json(&body)
        })
        .await
    }

    async fn session_state(&self, session: &SessionId) -> Result<SessionSnapshot, ApiError> {
        let url = self.url(&format!("/session/{}/state", session));
        self.request_json("session_state", self.policy, || self.client.get(&url))
            .await
    }

    async fn transcribe(
        &self,
        session: &SessionId,
        clip: &AudioClip,
        language: &str,
    ) -> Result<Transcript, ApiError> {
        let url = self.url(&format!("/session/{}/transcribe", session));

        let part = multipart::Part::bytes(clip.data().to_vec())
            .file_name(CLIP_FILE_NAME)
            .mime_str(CLIP_MIME)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let form = multipart::Form::new()
            .part("audio", part)
            .text("language", language.to_string());

        // One attempt only: the upload is large and recognition is not
        // idempotent on the service side.
        Self::attempt_json(self.client.post(&url).multipart(form)).await
    }

    async fn submit_answers(
        &self,
        session: &SessionId,
        transcripts: &[TranscriptEntry],
    ) -> Result<AnswerOutcome, ApiError> {
        let url = self.url(&format!("/session/{}/answer", session));
        let body = SubmitAnswersRequest { transcripts };
        self.request_json("submit_answers", self.policy, || {
            self.client.post(&url).json(&body)
        })
        .await
    }

    async fn finalize(
        &self,
        session: &SessionId,
        contact: Option<&ContactInfo>,
    ) -> Result<FinalReport, ApiError> {
        let url = self.url(&format!("/session/{}/finalize", session));
        let body = FinalizeRequest {
            contact_info: contact,
        };
        self.request_json("finalize", self.policy, || {
            self.client.post(&url).json(&body)
        })
        .await
    }

    async fn results(&self, session: &SessionId) -> Result<SessionResults, ApiError> {
        let url = self.url(&format!("/session/{}/results", session));
        self.request_json("results", self.policy, || self.client.get(&url))
            .await
    }

    async fn download_report(&self, session: &SessionId) -> Result<Vec<u8>, ApiError> {
        let url = self.url(&format!("/session/{}/download", session));
        let mut attempt = 0;
        loop {
            match Self::attempt_bytes(self.client.get(&url)).await {
                Ok(bytes) => return Ok(bytes),
                Err(error) => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts() || !self.policy.should_retry(&error) {
                        return Err(error);
                    }
                    let delay = self.policy.delay_for(attempt - 1);
                    tracing::debug!(
                        request = "download_report",
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying service request"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn verify_admin_key(&self) -> Result<(), ApiError> {
        let key = self.sanitized_admin_key()?;
        let url = self.url("/brain/config/verify");
        let _: serde_json::Value = self
            .request_json("verify_admin_key", self.policy, || {
                self.client.get(&url).header(ADMIN_KEY_HEADER, &key)
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Translator for HttpApiClient {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ApiError> {
        let url = self.url("/translate");
        let body = TranslateRequest {
            text,
            target_language,
        };

        // Localization is best-effort; callers fall back to the source
        // text instead of waiting out a backoff schedule.
        let response: TranslateResponse =
            Self::attempt_json(self.client.post(&url).json(&body)).await?;
        Ok(response.translated_text)
    }
}
