//! Process configuration.
//!
//! Settings are resolved once at startup from the environment (optionally
//! seeded from a `.env` file) and then passed around as an immutable value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "GEMINI_TIMEOUT_SECS";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested env file could not be read or parsed
    #[error("Failed to load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// A variable is set but its value is unusable
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Loads variables from a `.env` file into the process environment.
///
/// With an explicit `path`, failure to read it is an error. Without one, a
/// `.env` in the current directory (or a parent) is used if present. Variables
/// already set in the environment win. Returns the file that was loaded.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Some(path.to_path_buf()))
        }
        None => Ok(dotenvy::dotenv().ok()),
    }
}

/// Settings for talking to the Gemini API.
///
/// A missing API key is not an error here: the service still starts and
/// reports the problem on every answer request.
#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    /// Resolves the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolves the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup(API_KEY_VAR).and_then(non_blank);
        let model = lookup(MODEL_VAR)
            .and_then(non_blank)
            .unwrap_or(defaults.model);
        let base_url = lookup(BASE_URL_VAR)
            .and_then(non_blank)
            .unwrap_or(defaults.base_url);
        let timeout = match lookup(TIMEOUT_VAR).and_then(non_blank) {
            Some(value) => parse_timeout(&value)?,
            None => defaults.timeout,
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
        })
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_blank(api_key.into());
        self
    }

    #[must_use]
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        var: TIMEOUT_VAR,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let secs: u64 = value
        .parse()
        .map_err(|_| invalid("expected a whole number of seconds"))?;
    if secs == 0 {
        return Err(invalid("timeout must be at least one second"));
    }
    Ok(Duration::from_secs(secs))
}
