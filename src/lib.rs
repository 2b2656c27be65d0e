pub mod answer;
pub mod config;
pub mod gemini;
pub mod preprocess;
pub mod server;

pub use answer::{AnswerError, AnswerResult, AnswerService};
pub use config::{ConfigError, GeminiConfig, load_env_file};
pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiError, GeminiTransport};
pub use preprocess::{ProcessedQuery, QueryPreprocessor};
