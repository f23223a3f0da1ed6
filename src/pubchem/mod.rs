//! High-level PubChem operations.
//!
//! [`PubChem`] pairs the request builders in [`crate::query`] with a
//! [`PugQuery`] per call and post-processes the results: numeric ID lists,
//! identifier-exchange mappings, and structure search list keys. It also
//! hosts the plain REST lookups that need no PUG ticket.

mod ids;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};

pub use ids::{IdMapping, MappedId, parse_id_list, parse_id_set, parse_source_ids};

use crate::pug::{
    HttpClient, Payload, PugConfig, PugError, PugQuery, RetryPolicy, Sleeper, TokioSleeper,
    compile_static_regex,
};
use crate::query::{
    AssayDataQuery, Compression, IdDatabase, IdExchangeQuery, QueryError, RecordsQuery,
    StructureFormat, assay_ids_path,
};

static LIST_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"<ListKey>\s*(\d+)\s*</ListKey>"));
static CID_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"<CID>\s*(\d+)\s*</CID>"));

/// Entry point for PubChem downloads and lookups.
///
/// # Example
///
/// ```no_run
/// use pubchem_pug::PubChem;
/// use pubchem_pug::query::{Compression, DownloadFormat, RecordsQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pubchem = PubChem::default();
/// let query = RecordsQuery::new([2244])
///     .format(DownloadFormat::Smiles)
///     .compression(Compression::Gzip);
/// let smiles = pubchem.get_records(&query, None).await?.into_bytes();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PubChem {
    config: PugConfig,
    http: HttpClient,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for PubChem {
    fn default() -> Self {
        Self::new(PugConfig::default())
    }
}

impl PubChem {
    /// Creates a client with the given configuration.
    #[must_use]
    pub fn new(config: PugConfig) -> Self {
        Self {
            config,
            http: HttpClient::new(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replaces the sleeper used between polls.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PugConfig {
        &self.config
    }

    /// Wraps a request document in an unsubmitted [`PugQuery`].
    pub fn query(&self, request: impl Into<String>) -> PugQuery {
        PugQuery::new(request, &self.config)
            .with_http_client(self.http.clone())
            .with_sleeper(Arc::clone(&self.sleeper))
    }

    /// Downloads records in bulk.
    ///
    /// In-memory results are decompressed according to the query's
    /// compression; file results are written as served.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any request, then any [`PugError`]
    /// from the query lifecycle. A job still pending when the run fails is
    /// cancelled before the error is returned.
    #[instrument(skip(self, query), fields(ids = query.ids().len()))]
    pub async fn get_records(
        &self,
        query: &RecordsQuery,
        destination: Option<&Path>,
    ) -> Result<Payload, PugError> {
        let request = query.to_xml()?;
        self.run(request, destination, query.compression_mode()).await
    }

    /// Downloads one record as SDF through the REST interface.
    ///
    /// # Errors
    ///
    /// Returns a transport error; PubChem answers 400 for unknown IDs and 404
    /// when no 3-D structure exists.
    #[instrument(skip(self))]
    pub async fn get_record(
        &self,
        id: u64,
        database: IdDatabase,
        use_3d: bool,
        destination: Option<&Path>,
    ) -> Result<Payload, PugError> {
        let mut path = format!("{}/{}/{id}/SDF", database.record_name(), database.id_name());
        if use_3d {
            path.push_str("?record_type=3d");
        }
        let url = self.config.endpoints.rest(&path);
        let retry = self.retry();

        match destination {
            Some(target) => {
                retry
                    .run(&url, || self.http.download_to_file(&url, target))
                    .await?;
                Ok(Payload::File(target.to_path_buf()))
            }
            None => {
                let data = retry.run(&url, || self.http.get_bytes(&url)).await?;
                Ok(Payload::Bytes(data))
            }
        }
    }

    /// Returns the parent CIDs of the given compounds.
    ///
    /// Parents are not reported in input order, so a set is returned.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyIds`] for an empty input, then transport or
    /// malformed-row errors.
    #[instrument(skip(self, cids), fields(cids = cids.len()))]
    pub async fn get_parent_cids(&self, cids: &[u64]) -> Result<BTreeSet<u64>, PugError> {
        if cids.is_empty() {
            return Err(QueryError::EmptyIds { kind: "compound ID" }.into());
        }
        let joined = cids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let url = self
            .config
            .endpoints
            .rest(&format!("compound/cid/{joined}/cids/TXT?cids_type=parent"));

        let body = self.get_text(&url).await?;
        parse_id_set(&body)
    }

    /// Returns the SIDs or CIDs tested in an assay, optionally filtered by
    /// activity outcome (e.g. `"active"`).
    ///
    /// # Errors
    ///
    /// Returns transport or malformed-row errors.
    #[instrument(skip(self))]
    pub async fn get_assay_ids(
        &self,
        aid: u64,
        database: IdDatabase,
        activity_outcome: Option<&str>,
    ) -> Result<Vec<u64>, PugError> {
        let url = self
            .config
            .endpoints
            .rest(&assay_ids_path(aid, database, activity_outcome));
        let body = self.get_text(&url).await?;
        let ids = parse_id_list(&body)?;
        debug!(count = ids.len(), "assay IDs retrieved");
        Ok(ids)
    }

    /// Downloads a bioassay data table (CSV).
    ///
    /// # Errors
    ///
    /// Same as [`get_records`](Self::get_records).
    #[instrument(skip(self, query))]
    pub async fn get_assay_data(
        &self,
        query: &AssayDataQuery,
        destination: Option<&Path>,
    ) -> Result<Payload, PugError> {
        let request = query.to_xml()?;
        self.run(request, destination, query.compression_mode()).await
    }

    /// Maps registry identifiers onto PubChem identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`PugError::ConflictingMapping`] when the service reports two
    /// different results for one source ID; no partial mapping is returned.
    #[instrument(skip(self, query), fields(ids = query.ids().len(), source = query.source()))]
    pub async fn id_exchange(&self, query: &IdExchangeQuery) -> Result<IdMapping, PugError> {
        let payload = self
            .run(query.to_xml(), None, Compression::Gzip)
            .await?
            .into_bytes()
            .unwrap_or_default();
        let text = String::from_utf8_lossy(&payload);
        let mapping = IdMapping::from_rows(&text, query.ids())?;
        info!(
            matched = mapping.matched().count(),
            unmatched = mapping.unmatched().count(),
            "identifier exchange complete"
        );
        Ok(mapping)
    }

    /// Looks up the CID of a structure identical to `structure`.
    ///
    /// Returns `None` when the service issues no list key or the result
    /// endpoint answers with an HTTP error (e.g. no match found).
    ///
    /// # Errors
    ///
    /// Returns transport errors from the submission, non-HTTP failures while
    /// polling, or [`PugError::MalformedRow`] for a CID that is not a valid
    /// identifier.
    #[instrument(skip(self, structure), fields(format = format.as_str()))]
    pub async fn structure_search(
        &self,
        structure: &str,
        format: StructureFormat,
    ) -> Result<Option<u64>, PugError> {
        let submit_url = self
            .config
            .endpoints
            .rest(&format!("compound/identity/{}/XML", format.as_str()));
        let retry = self.retry();
        let body = retry
            .run(&submit_url, || {
                self.http.post_form(&submit_url, format.as_str(), structure)
            })
            .await?;

        let Some(list_key) = first_capture(&LIST_KEY_RE, &body) else {
            debug!("structure search returned no list key");
            return Ok(None);
        };
        debug!(%list_key, "structure search accepted");

        let poll_url = self
            .config
            .endpoints
            .rest(&format!("compound/listkey/{list_key}/cids/XML"));
        loop {
            let body = match self.get_text(&poll_url).await {
                Ok(body) => body,
                Err(PugError::HttpStatus { status, .. }) => {
                    debug!(status, "structure search finished without a match");
                    return Ok(None);
                }
                Err(error) => return Err(error),
            };
            if let Some(cid) = first_capture(&CID_RE, &body) {
                let cid: u64 = cid
                    .parse()
                    .map_err(|_| PugError::malformed_row(cid.as_str()))?;
                info!(cid, "structure search matched");
                return Ok(Some(cid));
            }
            self.sleeper.sleep(self.config.poll_interval).await;
        }
    }

    async fn run(
        &self,
        request: String,
        destination: Option<&Path>,
        compression: Compression,
    ) -> Result<Payload, PugError> {
        let mut query = self.query(request);
        let submitted = if self.config.submit {
            query.submit().await
        } else {
            Ok(())
        };
        let result = match submitted {
            Ok(()) => query.fetch(destination, compression).await,
            Err(error) => Err(error),
        };
        if result.is_err() {
            // Only a query left pending still has a server-side job to cancel.
            query.abandon().await;
        }
        result
    }

    async fn get_text(&self, url: &str) -> Result<String, PugError> {
        self.retry().run(url, || self.http.get_text(url)).await
    }

    fn retry(&self) -> RetryPolicy {
        self.config.retry_policy()
    }
}

fn first_capture(re: &Regex, body: &str) -> Option<String> {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_capture_list_key() {
        let body = "<PUGRest>\n  <Waiting>\n    <ListKey>2157830425585364583</ListKey>\n  </Waiting>\n</PUGRest>";
        assert_eq!(
            first_capture(&LIST_KEY_RE, body).as_deref(),
            Some("2157830425585364583")
        );
    }

    #[test]
    fn test_first_capture_cid() {
        let body = "<IdentifierList>\n  <CID>2244</CID>\n</IdentifierList>";
        assert_eq!(first_capture(&CID_RE, body).as_deref(), Some("2244"));
        assert_eq!(first_capture(&CID_RE, "<Waiting/>"), None);
    }

    #[test]
    fn test_query_inherits_config() {
        let pubchem = PubChem::default();
        let query = pubchem.query("<PCT-Data/>");
        assert_eq!(query.request(), "<PCT-Data/>");
    }
}
