//! Shared fixtures for PUG integration tests: canned PUG response documents,
//! gzip payload builders, and a sleeper that records instead of waiting.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use flate2::Compression as GzLevel;
use flate2::write::GzEncoder;
use pubchem_pug::{Endpoints, PugConfig, Sleeper};
use wiremock::MockServer;

/// Ticket issued by the canned "queued" response.
pub const TICKET: &str = "402936103567975582";

/// Poll interval used by test configurations.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Path of the PUG endpoint on the mock server.
pub const PUG_PATH: &str = "/pug/pug.cgi";

/// Path of the result payload on the mock server.
pub const RESULT_PATH: &str = "/pubchem/.fetch/result.txt.gz";

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}

/// Configuration pointing both endpoints at `server`.
pub fn config_for(server: &MockServer) -> PugConfig {
    PugConfig::default()
        .with_poll_interval(POLL_INTERVAL)
        .with_endpoints(Endpoints::new(
            format!("{}{PUG_PATH}", server.uri()),
            format!("{}/rest/pug", server.uri()),
        ))
}

/// URL of the result payload on `server`.
pub fn result_url(server: &MockServer) -> String {
    format!("{}{RESULT_PATH}", server.uri())
}

fn status_message(status: &str, output: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<PCT-Data>
  <PCT-Data_output>
    <PCT-OutputData>
      <PCT-OutputData_status>
        <PCT-Status-Message>
          <PCT-Status-Message_status>
            <PCT-Status value="{status}"/>
          </PCT-Status-Message_status>
        </PCT-Status-Message>
      </PCT-OutputData_status>
{output}    </PCT-OutputData>
  </PCT-Data_output>
</PCT-Data>
"#
    )
}

/// Response reporting `status` ("queued", "running") with the test ticket.
pub fn waiting_response(status: &str) -> String {
    status_message(
        status,
        &format!(
            "      <PCT-OutputData_output>\n        <PCT-OutputData_output_waiting>\n          <PCT-Waiting>\n            <PCT-Waiting_reqid>{TICKET}</PCT-Waiting_reqid>\n          </PCT-Waiting>\n        </PCT-OutputData_output_waiting>\n      </PCT-OutputData_output>\n"
        ),
    )
}

/// Successful response carrying a download URL.
pub fn success_response(download_url: &str) -> String {
    status_message(
        "success",
        &format!(
            "      <PCT-OutputData_output>\n        <PCT-OutputData_output_download-url>\n          <PCT-Download-URL>\n            <PCT-Download-URL_url>{download_url}</PCT-Download-URL_url>\n          </PCT-Download-URL>\n        </PCT-OutputData_output_download-url>\n      </PCT-OutputData_output>\n"
        ),
    )
}

/// Response with a bare status and no output section.
pub fn bare_response(status: &str) -> String {
    status_message(status, "")
}

/// Gzip-compresses `data`.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
