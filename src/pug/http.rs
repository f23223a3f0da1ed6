//! HTTP transport shared by PUG queries and REST lookups.
//!
//! Every method performs exactly one HTTP exchange; retries are layered on
//! top by [`RetryPolicy`](super::RetryPolicy).

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::PugError;
use crate::user_agent;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large result files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// HTTP client for PubChem endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// POSTs an XML document and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns a transport error (`Network`, `Timeout`, `HttpStatus`).
    #[instrument(level = "debug", skip(self, body), fields(url = %url, bytes = body.len()))]
    pub async fn post_xml(&self, url: &str, body: &str) -> Result<String, PugError> {
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body.to_string());
        let response = send(request, url).await?;
        response.text().await.map_err(|e| PugError::network(url, e))
    }

    /// POSTs a single form-encoded field and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns a transport error (`Network`, `Timeout`, `HttpStatus`).
    #[instrument(level = "debug", skip(self, value), fields(url = %url))]
    pub async fn post_form(&self, url: &str, field: &str, value: &str) -> Result<String, PugError> {
        let body = format!(
            "{}={}",
            urlencoding::encode(field),
            urlencoding::encode(value)
        );
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        let response = send(request, url).await?;
        response.text().await.map_err(|e| PugError::network(url, e))
    }

    /// GETs a URL and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns a transport error (`Network`, `Timeout`, `HttpStatus`).
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String, PugError> {
        let response = send(self.client.get(url), url).await?;
        response.text().await.map_err(|e| PugError::network(url, e))
    }

    /// GETs a URL and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns a transport error (`Network`, `Timeout`, `HttpStatus`).
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, PugError> {
        let response = send(self.client.get(url), url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PugError::network(url, e))?;
        Ok(bytes.to_vec())
    }

    /// Streams a URL to `path`, returning the number of bytes written.
    ///
    /// The file is created (or truncated) only after the server answers with a
    /// success status, and removed again if streaming fails part-way.
    ///
    /// # Errors
    ///
    /// Returns a transport error or [`PugError::Io`].
    #[instrument(level = "debug", skip(self), fields(url = %url, path = %path.display()))]
    pub async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64, PugError> {
        let response = send(self.client.get(url), url).await?;

        let mut file = File::create(path)
            .await
            .map_err(|e| PugError::io(path, e))?;

        let stream_result = stream_to_file(&mut file, response, url, path).await;
        if stream_result.is_err() {
            debug!(path = %path.display(), "cleaning up partial file after error");
            drop(file);
            let _ = tokio::fs::remove_file(path).await;
        }
        stream_result
    }
}

async fn send(request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, PugError> {
    let response = request
        .send()
        .await
        .map_err(|e| PugError::network(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PugError::http_status(url, status.as_u16()));
    }
    Ok(response)
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, PugError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| PugError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| PugError::io(path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| PugError::io(path, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_post_xml_sends_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pug/pug.cgi"))
            .and(header("content-type", "text/xml; charset=utf-8"))
            .and(body_string("<PCT-Data/>"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let body = client
            .post_xml(&format!("{}/pug/pug.cgi", server.uri()), "<PCT-Data/>")
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_post_form_encodes_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity"))
            .and(body_string("smiles=CC%28%3DO%29O"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let body = client
            .post_form(&format!("{}/identity", server.uri()), "smiles", "CC(=O)O")
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_get_text_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/missing", server.uri());
        match client.get_text(&url).await {
            Err(PugError::HttpStatus { status, url: err_url }) => {
                assert_eq!(status, 404);
                assert_eq!(err_url, url);
            }
            other => panic!("expected HttpStatus(404), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_to_file_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/result.sdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"$$$$\n".to_vec()))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.sdf");
        let client = HttpClient::new();
        let written = client
            .download_to_file(&format!("{}/result.sdf", server.uri()), &target)
            .await
            .unwrap();

        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&target).unwrap(), b"$$$$\n");
    }

    #[tokio::test]
    async fn test_download_to_file_error_status_creates_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.sdf");
        let client = HttpClient::new();
        let result = client
            .download_to_file(&format!("{}/result.sdf", server.uri()), &target)
            .await;

        assert!(matches!(result, Err(PugError::HttpStatus { status: 500, .. })));
        assert!(!target.exists());
    }
}
