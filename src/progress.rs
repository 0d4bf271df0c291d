//! Progress-callback trait for per-row scrape events.
//!
//! Inject an [`Arc<dyn ScrapeProgressCallback>`] via
//! [`crate::config::ScrapeConfigBuilder::progress_callback`] to receive
//! events as the orchestrator works through the listing. The library also
//! emits a structured `tracing` event per row; the callback is for hosts
//! that want to drive their own display (the CLI's progress bar, for one).
//!
//! # Example
//!
//! ```rust
//! use songsheet_scrape::{RowOutcome, ScrapeConfig, ScrapeProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl ScrapeProgressCallback for CountingCallback {
//!     fn on_row_complete(&self, index: usize, total: usize, title: &str, outcome: &RowOutcome) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{index}/{total}] {title}: {}", outcome.label());
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//! let config = ScrapeConfig::builder()
//!     .listing_url("https://example.org/")
//!     .progress_callback(cb as Arc<dyn ScrapeProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::model::{RowOutcome, RunSummary};
use std::sync::Arc;

/// Called by the orchestrator as it processes each listing row.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Rows are reported in listing order even when PDFs
/// are downloaded concurrently.
pub trait ScrapeProgressCallback: Send + Sync {
    /// Called once the listing has been parsed.
    ///
    /// # Arguments
    /// * `total_rows`: data rows found in the listing table
    fn on_run_start(&self, total_rows: usize) {
        let _ = total_rows;
    }

    /// Called after each row is finished, whatever the outcome.
    ///
    /// # Arguments
    /// * `index`: 1-indexed row number
    /// * `total`: total data rows
    /// * `title`: song title, or an empty string for rejected rows
    /// * `outcome`: what happened to the row
    fn on_row_complete(&self, index: usize, total: usize, title: &str, outcome: &RowOutcome) {
        let _ = (index, total, title, outcome);
    }

    /// Called after every successful intermediate dataset write.
    fn on_checkpoint(&self, persisted: usize) {
        let _ = persisted;
    }

    /// Called once after the final dataset write.
    fn on_run_complete(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ScrapeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ScrapeConfig`].
pub type ProgressCallback = Arc<dyn ScrapeProgressCallback>;
