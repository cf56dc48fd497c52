//! Artifact download with retry and integrity checks.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use tfdump_common::cancel::CancelToken;
use tfdump_common::config::{DumpConfig, RetryPolicy};
use tfdump_common::error::{Result, TfdumpError};
use tfdump_common::types::Artifact;

/// Granularity at which backoff sleeps notice cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Downloads artifacts over HTTP, retrying transient failures.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: Client,
    retry: RetryPolicy,
    host_override: Option<String>,
}

impl ArtifactFetcher {
    /// Creates a fetcher from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns `TfdumpError::Config` if the HTTP client cannot be built.
    pub fn new(config: &DumpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tfdump/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TfdumpError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            retry: config.retry,
            host_override: config.source_host_override.clone(),
        })
    }

    /// Returns the URL that will actually be requested for `artifact`.
    ///
    /// # Errors
    ///
    /// Returns `TfdumpError::InvalidUrl` if the host override cannot be applied.
    pub fn effective_url(&self, artifact: &Artifact) -> Result<String> {
        match &self.host_override {
            Some(host) => crate::host::override_host(&artifact.url, host),
            None => Ok(artifact.url.clone()),
        }
    }

    /// Downloads the artifact into memory.
    ///
    /// # Errors
    ///
    /// - `Unreachable` when the transport fails after all retries.
    /// - `BadStatus` when the final response is not a success.
    /// - `SizeMismatch` when a declared size disagrees with the body length.
    /// - `Cancelled` when the token fires between attempts.
    pub fn fetch(&self, artifact: &Artifact, cancel: &CancelToken) -> Result<Vec<u8>> {
        let url = self.effective_url(artifact)?;
        let started = Instant::now();
        tracing::info!(url = %url, "downloading artifact");

        let response = self.get_with_retry(&url, cancel)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TfdumpError::BadStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| TfdumpError::Unreachable {
            url: url.clone(),
            message: format!("failed to read response body: {e}"),
        })?;

        let actual = body.len() as u64;
        match artifact.size {
            Some(expected) if expected != actual => {
                return Err(TfdumpError::SizeMismatch {
                    url,
                    expected,
                    actual,
                });
            }
            _ => {}
        }

        tracing::info!(
            url = %url,
            bytes = actual,
            elapsed_ms = started.elapsed().as_millis(),
            "artifact downloaded"
        );
        Ok(body.to_vec())
    }

    fn get_with_retry(&self, url: &str, cancel: &CancelToken) -> Result<Response> {
        let mut attempt = 0;
        loop {
            cancel.check()?;
            let outcome = self.client.get(url).send();
            let retryable = match &outcome {
                Ok(response) => is_retryable_status(response.status()),
                Err(e) => is_retryable_error(e),
            };

            if !retryable || attempt >= self.retry.max_retries {
                return outcome.map_err(|e| TfdumpError::Unreachable {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }

            let wait = self.retry.backoff(attempt);
            match &outcome {
                Ok(response) => {
                    tracing::warn!(
                        url,
                        status = %response.status(),
                        attempt = attempt + 1,
                        ?wait,
                        "retrying artifact download"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        url,
                        error = %e,
                        attempt = attempt + 1,
                        ?wait,
                        "retrying artifact download"
                    );
                }
            }
            sleep_cancellable(wait, cancel)?;
            attempt += 1;
        }
    }
}

/// 429 and 5xx (except 501) are worth another attempt.
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
}

fn is_retryable_error(e: &reqwest::Error) -> bool {
    !e.is_builder() && !e.is_redirect() && !e.is_decode()
}

fn sleep_cancellable(total: Duration, cancel: &CancelToken) -> Result<()> {
    let deadline = Instant::now() + total;
    loop {
        cancel.check()?;
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        std::thread::sleep(CANCEL_POLL.min(deadline - now));
    }
}
