/// Gemini API client module.
///
/// This module provides a blocking HTTP client for the Gemini `generateContent`
/// endpoint, the transport trait it implements, and the request/response wire types.
mod client;
mod types;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, GeminiClient, GeminiClientBuilder, GeminiError,
    GeminiTransport,
};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GoogleSearch, Part,
    ProviderReply, Tool,
};
