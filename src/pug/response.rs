//! Field extraction from PUG response documents.
//!
//! PUG responses are `PCT-Data` XML documents, but the client only ever needs
//! three fields from them: the status value, an optional download URL and an
//! optional request ticket. Each is pulled out with a narrow pattern instead of
//! parsing the (much broader) schema.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"<PCT-Status\s+value="([^"]*)"\s*/>"#));
static DOWNLOAD_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"(?s)<PCT-Download-URL_url>\s*(.*?)\s*</PCT-Download-URL_url>")
});
static TICKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"(?s)<PCT-Waiting_reqid>\s*(.*?)\s*</PCT-Waiting_reqid>")
});

/// Server-assigned identifier of a submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket(String);

impl Ticket {
    /// Wraps a ticket string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the ticket as sent in status/cancel requests.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported in a `PCT-Status` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PugStatus {
    /// The job finished.
    Success,
    /// The job is waiting to run.
    Queued,
    /// The job is running.
    Running,
    /// The job was stopped (e.g. by a cancel request).
    Stopped,
    /// Any other value (`input-error`, `server-error`, ...).
    Other(String),
}

impl PugStatus {
    /// Maps a status token onto a variant.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "success" => Self::Success,
            "queued" => Self::Queued,
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the status token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Other(token) => token,
        }
    }

    /// Returns true for statuses that let the job lifecycle continue.
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for PugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of a PUG response the client acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PugResponse {
    /// Status value, `None` when the document has no `PCT-Status` element.
    pub status: Option<PugStatus>,
    /// Download URL, present once the job has finished.
    pub download_url: Option<String>,
    /// Request ticket, present while the job is waiting.
    pub ticket: Option<Ticket>,
}

impl PugResponse {
    /// Extracts the status, download URL and ticket from a response body.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let capture = |re: &Regex| {
            re.captures(body)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            status: STATUS_RE
                .captures(body)
                .and_then(|caps| caps.get(1))
                .map(|m| PugStatus::from_token(m.as_str())),
            download_url: capture(&DOWNLOAD_URL_RE),
            ticket: capture(&TICKET_RE).map(Ticket::new),
        }
    }
}
