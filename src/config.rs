//! Configuration types for a scrape run.
//!
//! All run behaviour is controlled through [`ScrapeConfig`], built via its
//! [`ScrapeConfigBuilder`]. Setters clamp obviously-wrong values; `build()`
//! rejects the ones that cannot be clamped (missing listing URL, empty
//! output path).

use crate::error::ScrapeError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default watermark printed across every sheet of the source site.
pub const DEFAULT_WATERMARK: &str = "moselele";

/// Configuration for one scrape run.
///
/// # Example
/// ```rust
/// use songsheet_scrape::ScrapeConfig;
///
/// let config = ScrapeConfig::builder()
///     .listing_url("https://example.org/?page_id=1")
///     .output_path("songs.json")
///     .max_retries(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.checkpoint_every, 5);
/// ```
#[derive(Clone)]
pub struct ScrapeConfig {
    /// Absolute URL of the listing page holding the song table.
    pub listing_url: String,

    /// Where the JSON dataset is read from (for resuming) and written to.
    /// Default: `songs.json`.
    pub output_path: PathBuf,

    /// Retries per PDF on a transient failure. Default: 3.
    ///
    /// Permanent failures (404, malformed URL) are not retried.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-request HTTP timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// Pause before every PDF request, in milliseconds. Default: 0.
    pub request_delay_ms: u64,

    /// PDFs downloaded at once. Default: 1 (sequential).
    pub concurrency: usize,

    /// Persist the dataset after this many completed rows. Default: 5.
    pub checkpoint_every: usize,

    /// A previous record whose body is longer than this is not re-fetched.
    /// Default: 100.
    pub resume_min_body_len: usize,

    /// Watermark phrase removed from every body, case-insensitive.
    pub watermark: String,

    /// Where chord tokens are looked for. Default: [`ChordScan::Annotations`].
    pub chord_scan: ChordScan,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Receives per-row progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            listing_url: String::new(),
            output_path: PathBuf::from("songs.json"),
            max_retries: 3,
            retry_backoff_ms: 500,
            request_timeout_secs: 30,
            request_delay_ms: 0,
            concurrency: 1,
            checkpoint_every: 5,
            resume_min_body_len: 100,
            watermark: DEFAULT_WATERMARK.to_string(),
            chord_scan: ChordScan::default(),
            user_agent: concat!("songsheet-scrape/", env!("CARGO_PKG_VERSION")).to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ScrapeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeConfig")
            .field("listing_url", &self.listing_url)
            .field("output_path", &self.output_path)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("concurrency", &self.concurrency)
            .field("checkpoint_every", &self.checkpoint_every)
            .field("resume_min_body_len", &self.resume_min_body_len)
            .field("watermark", &self.watermark)
            .field("chord_scan", &self.chord_scan)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ScrapeProgressCallback>"),
            )
            .finish()
    }
}

impl ScrapeConfig {
    /// Create a new builder for `ScrapeConfig`.
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ScrapeConfig`].
#[derive(Debug)]
pub struct ScrapeConfigBuilder {
    config: ScrapeConfig,
}

impl ScrapeConfigBuilder {
    pub fn listing_url(mut self, url: impl Into<String>) -> Self {
        self.config.listing_url = url.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(10);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn checkpoint_every(mut self, n: usize) -> Self {
        self.config.checkpoint_every = n.max(1);
        self
    }

    pub fn resume_min_body_len(mut self, n: usize) -> Self {
        self.config.resume_min_body_len = n;
        self
    }

    pub fn watermark(mut self, phrase: impl Into<String>) -> Self {
        self.config.watermark = phrase.into();
        self
    }

    pub fn chord_scan(mut self, scan: ChordScan) -> Self {
        self.config.chord_scan = scan;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScrapeConfig, ScrapeError> {
        let c = &self.config;
        if c.listing_url.trim().is_empty() {
            return Err(ScrapeError::InvalidConfig(
                "listing URL must be set".into(),
            ));
        }
        if c.output_path.as_os_str().is_empty() {
            return Err(ScrapeError::InvalidConfig(
                "output path must not be empty".into(),
            ));
        }
        if c.watermark.trim().is_empty() {
            return Err(ScrapeError::InvalidConfig(
                "watermark must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which part of the extracted text is scanned for chord tokens.
///
/// Song sheets mark every chord change with a bracketed annotation, so the
/// annotations are the precise source. Sheets without any annotation fall
/// back to a full-text scan in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChordScan {
    /// Scan the contents of `[...]` annotations (default).
    #[default]
    Annotations,
    /// Scan every token of the text.
    FullText,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.checkpoint_every, 5);
        assert_eq!(config.resume_min_body_len, 100);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.watermark, "moselele");
        assert_eq!(config.chord_scan, ChordScan::Annotations);
    }

    #[test]
    fn test_build_requires_listing_url() {
        let err = ScrapeConfig::builder().build().unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidConfig(_)));
    }

    #[test]
    fn test_setters_clamp() {
        let config = ScrapeConfig::builder()
            .listing_url("https://example.org/")
            .concurrency(0)
            .checkpoint_every(0)
            .max_retries(99)
            .build()
            .unwrap();
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.checkpoint_every, 1);
        assert_eq!(config.max_retries, 10);
    }

    #[test]
    fn test_blank_watermark_rejected() {
        let err = ScrapeConfig::builder()
            .listing_url("https://example.org/")
            .watermark("  ")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("watermark"));
    }
}
