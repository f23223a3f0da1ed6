//! Bounded retry of transient transport failures.
//!
//! PUG requests are retried immediately, with no backoff: the only pacing in
//! the protocol is the fixed poll interval between status checks. Protocol
//! errors and permanent HTTP failures are never retried.

use std::future::Future;

use tracing::{debug, warn};

use super::PugError;

/// Default maximum attempts per request (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Send the request again; `attempt` is the 1-indexed number of the next try.
    Retry {
        /// Which attempt number this will be.
        attempt: u32,
    },

    /// Give up and propagate the error.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget (minimum 1).
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed with `error`.
    #[must_use]
    pub fn should_retry(&self, error: &PugError, attempt: u32) -> RetryDecision {
        if !error.is_transient() {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }
        RetryDecision::Retry {
            attempt: attempt + 1,
        }
    }

    /// Runs `operation` until it succeeds or the policy gives up.
    ///
    /// The last error is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt.
    pub async fn run<T, F, Fut>(&self, url: &str, mut operation: F) -> Result<T, PugError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PugError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => match self.should_retry(&error, attempt) {
                    RetryDecision::Retry { attempt: next } => {
                        warn!(url, attempt, error = %error, "transient failure; retrying");
                        attempt = next;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        debug!(url, attempt, %reason, "not retrying");
                        return Err(error);
                    }
                },
            }
        }
    }
}
