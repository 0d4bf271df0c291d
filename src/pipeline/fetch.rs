//! HTTP downloads: the listing page and every song PDF.
//!
//! The orchestrator talks to the network only through the [`Fetch`] trait.
//! [`HttpFetcher`] is the reqwest implementation; tests substitute a
//! scripted fetcher and count calls.
//!
//! ## Retry Strategy
//!
//! Connection errors, timeouts, 429 and 5xx responses are transient and are
//! retried with exponential backoff (`retry_backoff_ms * 2^(attempt-1)`): with a
//! 500 ms base and 3 retries the waits are 500 ms → 1 s → 2 s. A 4xx other
//! than 429 is permanent and ends the attempts for that URL at once.

use crate::config::ScrapeConfig;
use crate::error::{FetchError, RowError, ScrapeError};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Something that can download a URL into memory.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Download `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url).await
    }
}

/// [`Fetch`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ScrapeError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let reason = format!("HTTP {status}");
            return Err(if is_transient_status(status.as_u16()) {
                FetchError::Transient {
                    url: url.to_string(),
                    reason,
                }
            } else {
                FetchError::Permanent {
                    url: url.to_string(),
                    reason,
                }
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest(url, &e))?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

fn classify_reqwest(url: &str, e: &reqwest::Error) -> FetchError {
    if e.is_builder() || e.is_redirect() {
        FetchError::Permanent {
            url: url.to_string(),
            reason: e.to_string(),
        }
    } else {
        FetchError::Transient {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

/// 429 and 5xx are worth retrying; everything else is not.
pub fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Fetch `url`, retrying transient failures up to `max_retries` times.
///
/// Never panics and never aborts the batch: exhaustion is reported as
/// [`RowError::FetchFailed`] for the orchestrator to record.
pub async fn fetch_with_retry<F: Fetch>(
    fetcher: &F,
    url: &str,
    max_retries: u32,
    retry_backoff_ms: u64,
) -> Result<Vec<u8>, RowError> {
    fetch_retrying(fetcher, url, max_retries, retry_backoff_ms)
        .await
        .map_err(|(e, attempts)| RowError::FetchFailed {
            attempts,
            detail: e.to_string(),
        })
}

/// Retry loop shared by PDF and listing downloads. On failure returns the
/// last error and the number of attempts made.
pub(crate) async fn fetch_retrying<F: Fetch>(
    fetcher: &F,
    url: &str,
    max_retries: u32,
    retry_backoff_ms: u64,
) -> Result<Vec<u8>, (FetchError, u32)> {
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let e = match fetcher.fetch(url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => e,
        };
        warn!("{}: attempt {} failed: {}", url, attempts, e);
        if !e.is_transient() || attempts > max_retries {
            return Err((e, attempts));
        }

        let backoff = retry_backoff_ms.saturating_mul(2u64.saturating_pow(attempts - 1));
        warn!(
            "{}: retry {}/{} after {}ms",
            url, attempts, max_retries, backoff
        );
        sleep(Duration::from_millis(backoff)).await;
    }
}
