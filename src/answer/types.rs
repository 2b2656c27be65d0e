//! Result and error types for answering a question.

use serde::Serialize;
use thiserror::Error;

use crate::gemini::GeminiError;

/// Answer text used when the provider replied successfully but without text.
pub const NO_ANSWER_PLACEHOLDER: &str = "No answer generated.";

/// `raw_response` value when no exchange with the provider took place.
pub const NO_RAW_RESPONSE: &str = "N/A";

/// Outcome of one answer request.
///
/// Built once per request and never mutated. `raw_response` keeps whatever the
/// provider (or the failing layer) produced so the UI can show it for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    error: bool,
    answer: String,
    raw_response: String,
}

impl AnswerResult {
    /// Creates a successful result.
    pub fn success(answer: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            error: false,
            answer: answer.into(),
            raw_response: raw_response.into(),
        }
    }

    /// Creates a failed result.
    pub fn failure(message: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            error: true,
            answer: message.into(),
            raw_response: raw_response.into(),
        }
    }

    /// True if any stage of answering failed.
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// The answer text, or a human-readable failure message.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Raw provider body or error detail.
    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }
}

/// Everything that can keep a question from being answered.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// No API key was configured; nothing was sent.
    #[error(
        "GEMINI_API_KEY not configured on the server. Please check your .env file or environment variables."
    )]
    MissingApiKey,

    /// The provider answered with a non-success status.
    #[error("API Error: Status {status}. Response: {body}")]
    Upstream { status: u16, body: String },

    /// The exchange with the provider could not be completed.
    #[error("Connection Error: Could not reach the API endpoint. {0}")]
    Transport(#[source] GeminiError),

    /// Anything else: request construction, unparsable bodies, worker panics.
    #[error("An unexpected server error occurred: {0}")]
    Unexpected(String),
}

impl AnswerError {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnswerError::MissingApiKey => "missing_api_key",
            AnswerError::Upstream { .. } => "upstream_status",
            AnswerError::Transport(_) => "transport",
            AnswerError::Unexpected(_) => "unexpected",
        }
    }

    fn raw_response(&self) -> String {
        match self {
            AnswerError::MissingApiKey => NO_RAW_RESPONSE.to_string(),
            AnswerError::Upstream { body, .. } => body.clone(),
            AnswerError::Transport(e) => e.to_string(),
            AnswerError::Unexpected(detail) => detail.clone(),
        }
    }
}

impl From<GeminiError> for AnswerError {
    fn from(error: GeminiError) -> Self {
        if error.is_transport() {
            AnswerError::Transport(error)
        } else {
            AnswerError::Unexpected(error.to_string())
        }
    }
}

impl From<AnswerError> for AnswerResult {
    fn from(error: AnswerError) -> Self {
        AnswerResult::failure(error.to_string(), error.raw_response())
    }
}
