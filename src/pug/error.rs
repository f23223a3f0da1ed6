//! Error types for PUG job submission, polling and payload retrieval.

use std::path::PathBuf;

use thiserror::Error;

use crate::query::{Compression, QueryError};

/// Number of request lines kept in a [`PugError::Protocol`] report.
pub const MAX_REQUEST_LINES: usize = 100;

/// Errors that can occur while running a PUG query or a REST lookup.
#[derive(Debug, Error)]
pub enum PugError {
    /// Request parameters failed validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] QueryError),

    /// The service answered with a status outside {success, queued, running, stopped}.
    #[error("PUG returned status '{status}'\nQuery:\n------\n{request}\nResponse:\n---------\n{response}")]
    Protocol {
        /// Status value found in the response (`<missing>` when absent).
        status: String,
        /// The outbound request, truncated to [`MAX_REQUEST_LINES`] lines.
        request: String,
        /// The full response body.
        response: String,
    },

    /// A pending response carried neither a download URL nor a ticket.
    #[error("PUG response carried neither a download URL nor a request ticket\nResponse:\n---------\n{response}")]
    MissingTicket {
        /// The full response body.
        response: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing a fetched payload.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A status check was requested before the service issued a ticket.
    #[error("no request ticket: the query has not been accepted by PUG")]
    NoTicket,

    /// A fetch was requested but the query never produced a download URL.
    #[error("no download URL")]
    NoDownloadUrl,

    /// The server-issued download URL could not be parsed.
    #[error("invalid download URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// In-memory decompression was requested for a scheme that is not implemented.
    #[error("decompressing {compression} payloads is not supported\n  Suggestion: fetch to a file instead")]
    UnsupportedCompression {
        /// The requested scheme.
        compression: Compression,
    },

    /// The payload claimed to be gzip but could not be decoded.
    #[error("failed to decompress gzip payload: {source}")]
    Decompress {
        /// The underlying decoder error.
        #[source]
        source: std::io::Error,
    },

    /// The identifier exchange reported two different results for one source ID.
    #[error("nonidentical duplicate mapping for '{source_id}': '{first}' vs '{second}'")]
    ConflictingMapping {
        /// The source identifier.
        source_id: String,
        /// The destination seen first.
        first: String,
        /// The conflicting destination.
        second: String,
    },

    /// A row of an ID list or response table did not have the expected shape.
    #[error("malformed row: '{row}'")]
    MalformedRow {
        /// The offending row.
        row: String,
    },
}

impl PugError {
    /// Creates a protocol error, truncating the request for readability.
    pub fn protocol(
        status: impl Into<String>,
        request: &str,
        response: impl Into<String>,
    ) -> Self {
        Self::Protocol {
            status: status.into(),
            request: truncate_lines(request, MAX_REQUEST_LINES),
            response: response.into(),
        }
    }

    /// Creates a network error from a reqwest error, mapping timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a malformed-row error.
    pub fn malformed_row(row: impl Into<String>) -> Self {
        Self::MalformedRow { row: row.into() }
    }

    /// Returns true for transport failures worth another attempt.
    ///
    /// Connection errors, timeouts, 408, 429 and 5xx responses are transient.
    /// Everything else, including protocol errors, is permanent.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network { source, .. } => !is_tls_error(source),
            Self::HttpStatus { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

fn truncate_lines(text: &str, max_lines: usize) -> String {
    text.lines().take(max_lines).collect::<Vec<_>>().join("\n")
}

/// Checks if a reqwest error is a TLS/certificate error.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let error_string = error.to_string().to_lowercase();
    error_string.contains("certificate")
        || error_string.contains("tls")
        || error_string.contains("ssl")
        || error_string.contains("handshake")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_embeds_request_and_response() {
        let err = PugError::protocol(
            "input-error",
            "<PCT-Data>bad</PCT-Data>",
            r#"<PCT-Status value="input-error"/>"#,
        );
        let msg = err.to_string();
        assert!(msg.contains("input-error"), "status in: {msg}");
        assert!(msg.contains("Query:"), "query header in: {msg}");
        assert!(msg.contains("<PCT-Data>bad</PCT-Data>"), "request in: {msg}");
        assert!(msg.contains("Response:"), "response header in: {msg}");
    }

    #[test]
    fn test_protocol_error_truncates_request() {
        let request: String = (0..250).map(|i| format!("line {i}\n")).collect();
        let err = PugError::protocol("server-error", &request, "body");
        match err {
            PugError::Protocol { request, .. } => {
                assert_eq!(request.lines().count(), MAX_REQUEST_LINES);
                assert!(request.ends_with("line 99"));
            }
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[test]
    fn test_http_status_transience() {
        assert!(PugError::http_status("u", 500).is_transient());
        assert!(PugError::http_status("u", 503).is_transient());
        assert!(PugError::http_status("u", 429).is_transient());
        assert!(PugError::http_status("u", 408).is_transient());
        assert!(!PugError::http_status("u", 400).is_transient());
        assert!(!PugError::http_status("u", 404).is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        let err = PugError::Timeout {
            url: "https://pubchem.ncbi.nlm.nih.gov/pug/pug.cgi".to_string(),
        };
        assert!(err.is_transient());
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_protocol_and_state_errors_are_permanent() {
        assert!(!PugError::protocol("input-error", "q", "r").is_transient());
        assert!(!PugError::NoDownloadUrl.is_transient());
        assert!(!PugError::NoTicket.is_transient());
    }

    #[test]
    fn test_unsupported_compression_names_scheme() {
        let err = PugError::UnsupportedCompression {
            compression: Compression::Bzip2,
        };
        assert!(err.to_string().contains("bzip2"));
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err: PugError = QueryError::InvalidConformers.into();
        assert_eq!(err.to_string(), QueryError::InvalidConformers.to_string());
    }

    #[test]
    fn test_conflicting_mapping_display() {
        let err = PugError::ConflictingMapping {
            source_id: "CHEMBL25".to_string(),
            first: "2244".to_string(),
            second: "2245".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("CHEMBL25"));
        assert!(msg.contains("2244"));
        assert!(msg.contains("2245"));
    }
}
