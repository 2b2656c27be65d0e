//! Question preprocessing.
//!
//! Turns the raw text a user typed into the canonical query string that is
//! shown back in the UI and forwarded to the provider.

use std::fmt;

use serde::Serialize;

/// Canonical form of a user question.
///
/// Only lowercase word characters (letters, digits, underscore) separated by
/// single spaces, with no leading or trailing whitespace. Can only be produced
/// by [`QueryPreprocessor::process`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProcessedQuery(String);

impl ProcessedQuery {
    /// Returns the query text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if preprocessing left nothing behind.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the query and returns the owned text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProcessedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProcessedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes free-text questions.
pub struct QueryPreprocessor;

impl QueryPreprocessor {
    /// Normalizes a question into a [`ProcessedQuery`].
    ///
    /// # Normalization rules
    ///
    /// - Converts to lowercase and trims surrounding whitespace
    /// - Removes every character that is neither a word character
    ///   (alphanumeric or `_`) nor whitespace
    /// - Collapses whitespace runs into a single space
    ///
    /// Total on every input; the empty string maps to the empty query.
    ///
    /// # Examples
    ///
    /// ```
    /// use webqa::QueryPreprocessor;
    ///
    /// assert_eq!(QueryPreprocessor::process("  Hello, World!!  ").as_str(), "hello world");
    /// assert_eq!(
    ///     QueryPreprocessor::process("What's the Capital of France?").as_str(),
    ///     "whats the capital of france"
    /// );
    /// assert!(QueryPreprocessor::process("").is_empty());
    /// ```
    #[must_use]
    pub fn process(question: &str) -> ProcessedQuery {
        let lowered = question.to_lowercase();

        let stripped: String = lowered
            .trim()
            .chars()
            .filter(|c| is_word_char(*c) || c.is_whitespace())
            .collect();

        ProcessedQuery(stripped.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
