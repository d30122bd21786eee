//! Reference image download.

use std::path::Path;
use std::time::Duration;

use crate::config::DEFAULT_FETCH_TIMEOUT;
use crate::error::{StepError, StepResult};

/// Retrieves a reference image from a URL into a local file.
pub trait ReferenceFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> StepResult<()>;
}

/// Blocking HTTP(S) fetcher. A single attempt, no retries.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> StepResult<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> StepResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StepError::NetworkFetchFailure {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl ReferenceFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> StepResult<()> {
        let parsed = validate_url(url)?;
        tracing::info!("Downloading reference {parsed}");

        let failure = |reason: String| StepError::NetworkFetchFailure {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("HTTP {status}")));
        }

        let bytes = response.bytes().map_err(|e| failure(e.to_string()))?;
        std::fs::write(dest, &bytes)?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }
}

/// Parse a reference URL, accepting only http and https.
pub fn validate_url(raw: &str) -> StepResult<url::Url> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| StepError::InvalidUrl(format!("{raw}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(StepError::InvalidUrl(format!(
            "{raw}: unsupported scheme {other}"
        ))),
    }
}
