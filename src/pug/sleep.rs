//! Injectable sleep used between poll attempts.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

/// Waits between status polls.
///
/// Production code uses [`TokioSleeper`]; tests substitute an implementation
/// that records the requested delays and returns immediately.
#[async_trait]
pub trait Sleeper: Send + Sync + Debug {
    /// Suspends the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
