//! Answer service: one question in, one `AnswerResult` out.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::GeminiConfig;
use crate::gemini::{
    GeminiClientBuilder, GeminiError, GeminiTransport, GenerateContentRequest,
    GenerateContentResponse,
};
use crate::preprocess::ProcessedQuery;

use super::types::{AnswerError, AnswerResult, NO_ANSWER_PLACEHOLDER};

/// System instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a friendly, web-based Question-Answering assistant. Provide a clear and helpful answer.";

/// Answers processed queries through the Gemini API.
///
/// Holds only read-only state, so a single instance can serve any number of
/// concurrent requests.
pub struct AnswerService {
    config: GeminiConfig,
    transport: Arc<dyn GeminiTransport>,
}

impl AnswerService {
    /// Creates a service that sends requests through `transport`.
    #[must_use]
    pub fn new(config: GeminiConfig, transport: Arc<dyn GeminiTransport>) -> Self {
        Self { config, transport }
    }

    /// Creates a service backed by a real `GeminiClient` built from `config`.
    pub fn from_config(config: GeminiConfig) -> Result<Self, GeminiError> {
        let client = GeminiClientBuilder::new()
            .base_url(config.base_url())
            .timeout(config.timeout())
            .build()?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Returns the configuration this service was built with.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Answers `query`. Never fails: every failure, including a panicking
    /// transport, is folded into the result.
    pub fn answer(&self, query: &ProcessedQuery) -> AnswerResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_answer(query)))
            .unwrap_or_else(|payload| Err(AnswerError::Unexpected(panic_message(&*payload))));

        match outcome {
            Ok(result) => {
                info!(model = self.config.model(), "answer generated");
                result
            }
            Err(error) => {
                warn!(kind = error.kind(), error = %error, "answer failed");
                error.into()
            }
        }
    }

    fn try_answer(&self, query: &ProcessedQuery) -> Result<AnswerResult, AnswerError> {
        let api_key = self.config.api_key().ok_or(AnswerError::MissingApiKey)?;

        let request = build_request(query);
        let reply = self
            .transport
            .generate_content(self.config.model(), api_key, &request)?;

        if !reply.is_success() {
            return Err(AnswerError::Upstream {
                status: reply.status,
                body: reply.body,
            });
        }

        let answer = extract_answer(&reply.body)?;
        Ok(AnswerResult::success(answer, reply.body))
    }
}

/// Builds the single-turn request for `query`.
pub fn build_request(query: &ProcessedQuery) -> GenerateContentRequest {
    GenerateContentRequest::single_turn(query.as_str())
        .with_system_instruction(SYSTEM_INSTRUCTION)
        .with_google_search()
}

/// Pulls the answer text out of a successful body.
///
/// Missing levels fall back to the placeholder; a body that is not a JSON
/// object of the expected shape is an error.
fn extract_answer(body: &str) -> Result<String, AnswerError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AnswerError::from(GeminiError::Serialization(e)))?;
    // serde also accepts a sequence for a struct, so arrays are rejected here
    if !value.is_object() {
        return Err(AnswerError::Unexpected(format!(
            "expected a JSON object in the response body, got: {body}"
        )));
    }
    let response: GenerateContentResponse = serde_json::from_value(value)
        .map_err(|e| AnswerError::from(GeminiError::Serialization(e)))?;

    Ok(response
        .first_text()
        .unwrap_or(NO_ANSWER_PLACEHOLDER)
        .to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "answer worker panicked".to_string())
}
