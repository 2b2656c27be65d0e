//! Question answering through the Gemini API.
//!
//! `AnswerService` sends a processed query to the provider and turns every
//! outcome, including failures, into an `AnswerResult`.

mod service;
mod types;

pub use service::{AnswerService, SYSTEM_INSTRUCTION, build_request};
pub use types::{AnswerError, AnswerResult, NO_ANSWER_PLACEHOLDER, NO_RAW_RESPONSE};
