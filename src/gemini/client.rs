//! Gemini HTTP client implementation.
//!
//! This module provides `GeminiClient` for making synchronous HTTP requests to the
//! Gemini `generateContent` endpoint, along with its error type and builder.
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use super::types::{GenerateContentRequest, ProviderReply};

/// Default public endpoint, without the `/models/...` suffix.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upper bound for a whole request, including reading the body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when talking to the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Network-related errors (connection failures, DNS resolution, resets)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The outbound request could not be constructed
    #[error("Invalid request: {0}")]
    Request(#[source] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Invalid base URL configuration
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl GeminiError {
    /// True when the exchange with the provider could not be completed.
    pub fn is_transport(&self) -> bool {
        matches!(self, GeminiError::Network(_) | GeminiError::Timeout(_))
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GeminiError::Timeout(error)
        } else if error.is_builder() {
            GeminiError::Request(error)
        } else {
            GeminiError::Network(error)
        }
    }
}

/// Trait for the single outbound call to the provider.
///
/// Implementations report whether an exchange completed and what came back;
/// interpreting the status code is left to the caller. This keeps the answer
/// path testable without a network.
pub trait GeminiTransport: Send + Sync {
    /// Sends one `generateContent` request for `model`, authenticated with `api_key`.
    fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<ProviderReply, GeminiError>;
}

/// Builder for constructing `GeminiClient` instances.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use webqa::gemini::GeminiClientBuilder;
///
/// let client = GeminiClientBuilder::new()
///     .base_url("http://localhost:8080/v1beta")
///     .timeout(Duration::from_secs(10))
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "http://localhost:8080/v1beta");
/// ```
#[derive(Debug, Default)]
pub struct GeminiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClientBuilder {
    /// Creates a new `GeminiClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL (e.g. "https://generativelanguage.googleapis.com/v1beta").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the overall request timeout. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `GeminiClient`.
    ///
    /// Returns `Err(GeminiError::InvalidUrl)` if the base URL does not parse.
    pub fn build(self) -> Result<GeminiClient, GeminiError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        reqwest::Url::parse(&base_url)
            .map_err(|e| GeminiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(GeminiError::Network)?;

        Ok(GeminiClient {
            client,
            base_url,
            timeout,
        })
    }
}

/// Synchronous HTTP client for the Gemini API.
///
/// Makes exactly one attempt per call. Construct it with `GeminiClientBuilder`.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout configured for this client.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Endpoint for `model`, without the credential.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

impl GeminiTransport for GeminiClient {
    fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<ProviderReply, GeminiError> {
        let body = serde_json::to_vec(request).map_err(GeminiError::Serialization)?;

        let response = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", api_key)])
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(GeminiError::from_reqwest)?;

        let status = response.status().as_u16();
        // Reading the body consumes the response and hands the connection back.
        let body = response.text().map_err(GeminiError::from_reqwest)?;

        Ok(ProviderReply { status, body })
    }
}
