//! The [`PugQuery`] state machine.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use flate2::read::MultiGzDecoder;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{
    HttpClient, PugConfig, PugError, PugResponse, RetryPolicy, Sleeper, Ticket, TokioSleeper,
};
use crate::query::{self, Compression};

/// Lifecycle state of one PUG request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// Not yet sent to the service.
    NotSubmitted,
    /// Accepted by the service; waiting for a download URL.
    Pending {
        /// Ticket used for status and cancel requests.
        ticket: Ticket,
    },
    /// The result can be fetched.
    Ready {
        /// Single-use link to the result payload.
        download_url: String,
        /// Ticket, when the service issued one before finishing.
        ticket: Option<Ticket>,
    },
    /// Terminal failure; the reason is the error that ended the lifecycle.
    Failed {
        /// Rendered error message.
        reason: String,
    },
    /// Cancelled by an explicit [`PugQuery::cancel`].
    Cancelled {
        /// Ticket of the cancelled job.
        ticket: Ticket,
    },
}

impl QueryState {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotSubmitted => "not_submitted",
            Self::Pending { .. } => "pending",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of [`PugQuery::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The payload was streamed to this path, as served (not decompressed).
    File(PathBuf),
    /// The payload was read into memory (decompressed when requested).
    Bytes(Vec<u8>),
}

impl Payload {
    /// Returns the in-memory bytes, if the payload was not written to a file.
    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::File(_) => None,
        }
    }

    /// Returns the written path, if the payload went to a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Bytes(_) => None,
        }
    }
}

/// One PUG request and its submission/poll/fetch lifecycle.
///
/// Every state-changing operation takes `&mut self`, so a query never has more
/// than one network conversation in flight. Dropping a pending query does not
/// cancel the server-side job; call [`cancel`](Self::cancel) or
/// [`abandon`](Self::abandon) for that.
#[derive(Debug)]
pub struct PugQuery {
    request: String,
    state: QueryState,
    pug_url: String,
    poll_interval: Duration,
    retry: RetryPolicy,
    http: HttpClient,
    sleeper: Arc<dyn Sleeper>,
}

impl PugQuery {
    /// Creates an unsubmitted query for a request document.
    pub fn new(request: impl Into<String>, config: &PugConfig) -> Self {
        Self {
            request: request.into(),
            state: QueryState::NotSubmitted,
            pug_url: config.endpoints.pug_url.clone(),
            poll_interval: config.poll_interval,
            retry: config.retry_policy(),
            http: HttpClient::new(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Uses an existing HTTP client (sharing its connection pool).
    #[must_use]
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    /// Replaces the sleeper used between status polls.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the request document.
    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Returns the ticket, once the service has issued one.
    #[must_use]
    pub fn ticket(&self) -> Option<&Ticket> {
        match &self.state {
            QueryState::Pending { ticket } | QueryState::Cancelled { ticket } => Some(ticket),
            QueryState::Ready { ticket, .. } => ticket.as_ref(),
            QueryState::NotSubmitted | QueryState::Failed { .. } => None,
        }
    }

    /// Returns the download URL, once the result is ready.
    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        match &self.state {
            QueryState::Ready { download_url, .. } => Some(download_url),
            _ => None,
        }
    }

    /// Submits the request and polls until a download URL is available.
    ///
    /// Calling this on a query that has already been submitted logs a warning
    /// and sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PugError::Protocol`] for an unacceptable status, or the
    /// transport error of a request that exhausted its attempts. A failed
    /// submission or an unacceptable status ends in [`QueryState::Failed`]; a
    /// transport failure while polling leaves the query `Pending`, so it can
    /// still be cancelled or waited on again.
    #[instrument(skip(self), fields(pug_url = %self.pug_url))]
    pub async fn submit(&mut self) -> Result<(), PugError> {
        if self.warn_if_submitted() {
            return Ok(());
        }
        if let Err(error) = self.start_inner().await {
            self.fail(&error);
            return Err(error);
        }
        self.wait().await
    }

    /// Submits the request without polling.
    ///
    /// Leaves the query `Pending` (or `Ready` when the service answered with a
    /// download URL straight away). Follow with [`wait`](Self::wait).
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Self::submit).
    #[instrument(skip(self), fields(pug_url = %self.pug_url))]
    pub async fn start(&mut self) -> Result<(), PugError> {
        if self.warn_if_submitted() {
            return Ok(());
        }
        let result = self.start_inner().await;
        if let Err(error) = &result {
            self.fail(error);
        }
        result
    }

    /// Polls until the query leaves `Pending`, sleeping the poll interval
    /// before each status check.
    ///
    /// Returns immediately in any other state. Dropping the returned future
    /// (e.g. under `tokio::time::timeout`) leaves the query `Pending`, ready to
    /// be cancelled.
    ///
    /// # Errors
    ///
    /// Same as [`check_status`](Self::check_status).
    pub async fn wait(&mut self) -> Result<(), PugError> {
        let mut polls: u32 = 0;
        while matches!(self.state, QueryState::Pending { .. }) {
            self.sleeper.sleep(self.poll_interval).await;
            polls += 1;
            debug!(polls, "checking PUG request status");
            self.check_status().await?;
        }
        Ok(())
    }

    /// Issues one status request for the known ticket.
    ///
    /// # Errors
    ///
    /// Returns [`PugError::NoTicket`] before the service issued a ticket,
    /// [`PugError::Protocol`] for an unacceptable status (the query becomes
    /// `Failed`), or a transport error (state unchanged).
    #[instrument(skip(self), fields(state = %self.state))]
    pub async fn check_status(&mut self) -> Result<(), PugError> {
        let Some(ticket) = self.ticket().cloned() else {
            return Err(PugError::NoTicket);
        };
        if matches!(self.state, QueryState::Cancelled { .. }) {
            return Err(PugError::NoTicket);
        }

        let request = query::status_request(ticket.as_str());
        let result = match self.send(&request).await {
            Ok((response, body)) => self.advance(response, body),
            Err(error) => Err(error),
        };
        if let Err(error) = &result
            && !error.is_transient()
        {
            self.fail(error);
        }
        result
    }

    /// Cancels the server-side job while it is pending.
    ///
    /// Returns `true` when a cancel request was sent, `false` when the query
    /// was not pending (nothing to cancel).
    ///
    /// # Errors
    ///
    /// Returns the error of the cancel request; the state is left unchanged.
    #[instrument(skip(self), fields(state = %self.state))]
    pub async fn cancel(&mut self) -> Result<bool, PugError> {
        let QueryState::Pending { ticket } = &self.state else {
            debug!("query is not pending; nothing to cancel");
            return Ok(false);
        };
        let ticket = ticket.clone();

        let request = query::cancel_request(ticket.as_str());
        self.send(&request).await?;

        info!(%ticket, "PUG request cancelled");
        self.state = QueryState::Cancelled { ticket };
        Ok(true)
    }

    /// Discards the query, cancelling it first if it is still pending.
    ///
    /// A failed cancel is logged as a warning rather than returned.
    pub async fn abandon(mut self) {
        if let Err(error) = self.cancel().await {
            warn!(error = %error, "failed to cancel abandoned PUG request");
        }
    }

    /// Fetches the result, submitting first if the query was never submitted.
    ///
    /// With a `destination` the payload is streamed there unchanged and the
    /// path is returned. Otherwise it is read into memory and decompressed
    /// according to `compression`.
    ///
    /// # Errors
    ///
    /// - [`PugError::NoDownloadUrl`] when the query is not `Ready`
    /// - [`PugError::UnsupportedCompression`] for in-memory bzip2
    /// - [`PugError::Decompress`] for a corrupt gzip payload
    /// - transport and IO errors from the download itself
    #[instrument(skip(self), fields(state = %self.state))]
    pub async fn fetch(
        &mut self,
        destination: Option<&Path>,
        compression: Compression,
    ) -> Result<Payload, PugError> {
        if matches!(self.state, QueryState::NotSubmitted) {
            self.submit().await?;
        }
        let Some(download_url) = self.download_url() else {
            return Err(PugError::NoDownloadUrl);
        };
        let url = download_location(download_url)?;

        match destination {
            Some(path) => {
                let bytes = self
                    .retry
                    .run(&url, || self.http.download_to_file(&url, path))
                    .await?;
                info!(path = %path.display(), bytes, "PUG result saved");
                Ok(Payload::File(path.to_path_buf()))
            }
            None => {
                let data = self.retry.run(&url, || self.http.get_bytes(&url)).await?;
                debug!(bytes = data.len(), %compression, "PUG result downloaded");
                Ok(Payload::Bytes(decompress(data, compression)?))
            }
        }
    }

    /// Fetches the result into memory.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_bytes(&mut self, compression: Compression) -> Result<Vec<u8>, PugError> {
        match self.fetch(None, compression).await? {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::File(_) => Err(PugError::NoDownloadUrl),
        }
    }

    /// Fetches the result to `path`.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_to_file(&mut self, path: &Path) -> Result<PathBuf, PugError> {
        match self.fetch(Some(path), Compression::None).await? {
            Payload::File(path) => Ok(path),
            Payload::Bytes(_) => Err(PugError::NoDownloadUrl),
        }
    }

    fn warn_if_submitted(&self) -> bool {
        if matches!(self.state, QueryState::NotSubmitted) {
            return false;
        }
        warn!(state = %self.state, "this request has already been submitted");
        true
    }

    async fn start_inner(&mut self) -> Result<(), PugError> {
        debug!("submitting PUG request");
        let (response, body) = self.send(&self.request).await?;
        self.advance(response, body)
    }

    /// Sends one document (with retries) and checks the response status.
    async fn send(&self, request: &str) -> Result<(PugResponse, String), PugError> {
        let body = self
            .retry
            .run(&self.pug_url, || self.http.post_xml(&self.pug_url, request))
            .await?;

        let response = PugResponse::parse(&body);
        match &response.status {
            Some(status) if status.is_acceptable() => {
                debug!(%status, "PUG response");
                Ok((response, body))
            }
            Some(status) => Err(PugError::protocol(status.as_str(), request, body)),
            None => Err(PugError::protocol("<missing>", request, body)),
        }
    }

    /// Applies an accepted response to the state.
    fn advance(&mut self, response: PugResponse, body: String) -> Result<(), PugError> {
        if let Some(download_url) = response.download_url {
            info!(%download_url, "PUG download URL ready");
            let ticket = self.ticket().cloned();
            self.state = QueryState::Ready {
                download_url,
                ticket,
            };
            return Ok(());
        }

        match (&self.state, response.ticket) {
            (QueryState::Pending { .. } | QueryState::Ready { .. }, _) => Ok(()),
            (_, Some(ticket)) => {
                debug!(%ticket, "PUG request accepted");
                self.state = QueryState::Pending { ticket };
                Ok(())
            }
            (_, None) => Err(PugError::MissingTicket { response: body }),
        }
    }

    fn fail(&mut self, error: &PugError) {
        debug!(error = %error, "PUG request failed");
        self.state = QueryState::Failed {
            reason: error.to_string(),
        };
    }
}

/// Turns a server-issued download URL into one reqwest can fetch.
///
/// PUG hands out `ftp://` links to its file server, which serves the same
/// paths over HTTPS.
fn download_location(download_url: &str) -> Result<String, PugError> {
    let mut url = Url::parse(download_url).map_err(|_| PugError::InvalidUrl {
        url: download_url.to_string(),
    })?;
    if url.scheme() == "ftp" {
        url.set_scheme("https").map_err(|()| PugError::InvalidUrl {
            url: download_url.to_string(),
        })?;
        debug!(url = %url, "rewrote FTP download URL to HTTPS");
    }
    Ok(url.into())
}

/// Decompresses an in-memory payload.
///
/// # Errors
///
/// Returns [`PugError::UnsupportedCompression`] for bzip2 and
/// [`PugError::Decompress`] for corrupt gzip data.
pub fn decompress(data: Vec<u8>, compression: Compression) -> Result<Vec<u8>, PugError> {
    match compression {
        Compression::None => Ok(data),
        Compression::Gzip => {
            let mut decoder = MultiGzDecoder::new(data.as_slice());
            let mut decoded = Vec::new();
            decoder
                .read_to_end(&mut decoded)
                .map_err(|source| PugError::Decompress { source })?;
            Ok(decoded)
        }
        Compression::Bzip2 => Err(PugError::UnsupportedCompression { compression }),
    }
}
