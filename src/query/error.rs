//! Validation errors raised while building PUG requests.

use thiserror::Error;

/// Errors that can occur while validating query parameters.
///
/// Every variant is raised before any network traffic happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// An enumerated parameter was given a token the service does not accept.
    #[error("invalid {kind} '{value}'\n  Suggestion: use one of {expected}")]
    InvalidToken {
        /// Parameter name (e.g. "download format").
        kind: &'static str,
        /// The rejected token.
        value: String,
        /// Comma-separated list of accepted tokens.
        expected: String,
    },

    /// An identifier list that must carry at least one entry was empty.
    #[error("{kind} list is empty")]
    EmptyIds {
        /// Which list was empty (e.g. "record ID").
        kind: &'static str,
    },

    /// A 3-D download was requested with zero conformers.
    #[error("conformer count must be at least 1")]
    InvalidConformers,

    /// The identifier-exchange input contained the same source ID twice.
    #[error("source IDs must be unique: '{id}' appears more than once")]
    DuplicateSourceId {
        /// The repeated identifier.
        id: String,
    },

    /// No source was given and none could be inferred from the identifiers.
    #[error("cannot guess identifier source for '{id}'\n  Suggestion: pass the source explicitly")]
    UnknownSource {
        /// The identifier inference was attempted on.
        id: String,
    },
}

impl QueryError {
    /// Creates an `InvalidToken` error listing the accepted tokens.
    #[must_use]
    pub fn invalid_token(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self::InvalidToken {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}
