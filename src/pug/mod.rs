//! PUG job lifecycle: submission, status polling, cancellation and fetch.
//!
//! A [`PugQuery`] owns one request document and drives it through the
//! [`QueryState`] machine:
//!
//! ```text
//! NotSubmitted ──submit──▶ Pending ──status poll──▶ Ready ──fetch──▶ payload
//!      │                     │  ╲
//!      └──(URL in reply)─────┼───▶ Ready
//!                            ├──cancel──▶ Cancelled
//!                            └──bad status──▶ Failed
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pubchem_pug::pug::{PugConfig, PugQuery};
//! use pubchem_pug::query::{Compression, DownloadFormat, RecordsQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let xml = RecordsQuery::new([2244])
//!     .format(DownloadFormat::Smiles)
//!     .to_xml()?;
//! let mut query = PugQuery::new(xml, &PugConfig::default());
//! let smiles = query.fetch_bytes(Compression::Gzip).await?;
//! println!("{}", String::from_utf8_lossy(&smiles));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

mod error;
mod http;
mod response;
mod retry;
mod runner;
mod sleep;

pub use error::{MAX_REQUEST_LINES, PugError};
pub use http::{CONNECT_TIMEOUT_SECS, HttpClient, READ_TIMEOUT_SECS};
pub use response::{PugResponse, PugStatus, Ticket};
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryDecision, RetryPolicy};
pub use runner::{Payload, PugQuery, QueryState, decompress};
pub use sleep::{Sleeper, TokioSleeper};

pub(crate) use response::compile_static_regex;

/// PUG job submission endpoint.
pub const DEFAULT_PUG_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/pug/pug.cgi";

/// PUG REST base URL.
pub const DEFAULT_REST_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// Default delay between status checks (10 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Service endpoints; overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// URL that accepts PUG XML documents.
    pub pug_url: String,
    /// Base URL of the REST interface (no trailing slash).
    pub rest_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            pug_url: DEFAULT_PUG_URL.to_string(),
            rest_url: DEFAULT_REST_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Creates endpoints from explicit URLs.
    pub fn new(pug_url: impl Into<String>, rest_url: impl Into<String>) -> Self {
        Self {
            pug_url: pug_url.into(),
            rest_url: rest_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Joins a REST path onto the REST base URL.
    #[must_use]
    pub fn rest(&self, path: &str) -> String {
        format!("{}/{}", self.rest_url, path.trim_start_matches('/'))
    }
}

/// Caller-supplied knobs for running PUG queries.
///
/// # Default Values
///
/// - `submit`: true
/// - `poll_interval`: 10 seconds
/// - `max_attempts`: 3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PugConfig {
    /// Whether convenience operations submit eagerly before fetching.
    pub submit: bool,
    /// Delay between status checks.
    pub poll_interval: Duration,
    /// Attempts per request for transient transport failures (minimum 1).
    pub max_attempts: u32,
    /// Service endpoints.
    pub endpoints: Endpoints,
}

impl Default for PugConfig {
    fn default() -> Self {
        Self {
            submit: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            endpoints: Endpoints::default(),
        }
    }
}

impl PugConfig {
    /// Sets the delay between status checks.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the per-request attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets whether convenience operations submit eagerly.
    #[must_use]
    pub fn with_submit(mut self, submit: bool) -> Self {
        self.submit = submit;
        self
    }

    /// Points the configuration at other endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Returns the retry policy derived from `max_attempts`.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_attempts(self.max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PugConfig::default();
        assert!(config.submit);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.endpoints.pug_url, DEFAULT_PUG_URL);
    }

    #[test]
    fn test_endpoints_rest_join() {
        let endpoints = Endpoints::new("http://127.0.0.1:1/pug", "http://127.0.0.1:1/rest/");
        assert_eq!(
            endpoints.rest("/compound/cid/2244/SDF"),
            "http://127.0.0.1:1/rest/compound/cid/2244/SDF"
        );
        assert_eq!(
            endpoints.rest("assay/aid/1/cids/txt"),
            "http://127.0.0.1:1/rest/assay/aid/1/cids/txt"
        );
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = PugConfig::default().with_max_attempts(0);
        assert_eq!(config.retry_policy().max_attempts(), 1);
    }
}
