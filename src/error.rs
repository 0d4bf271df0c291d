//! Error types for the songsheet-scrape library.
//!
//! The types follow the three ways a run can go wrong:
//!
//! * [`ScrapeError`]: **Fatal**: the run cannot proceed at all (listing
//!   page unreachable, no song table, dataset cannot be written). Returned
//!   as `Err(ScrapeError)` from [`crate::scrape::Scraper::run`].
//!
//! * [`ParseError`]: **Row-skippable**: one listing row is malformed. The
//!   row is logged and left out of the dataset; the batch continues.
//!
//! * [`RowError`]: **Degraded record**: the row parsed, but its PDF could
//!   not be fetched or read. The record is kept with an empty body and no
//!   chords so the display layer still lists the song.
//!
//! [`FetchError`] and [`ExtractError`] are the lower-level failures that the
//! orchestrator downgrades into a [`RowError`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the songsheet-scrape library.
///
/// Per-row failures use [`ParseError`] / [`RowError`] and are reported in
/// [`crate::model::RowOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    // ── Listing errors ────────────────────────────────────────────────────
    /// The listing URL is not an absolute HTTP/HTTPS URL.
    #[error("Invalid listing URL '{url}': {reason}")]
    InvalidListingUrl { url: String, reason: String },

    /// The listing page could not be downloaded.
    #[error("Failed to fetch listing page '{url}': {source}\nCheck your internet connection.")]
    ListingFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The listing page was downloaded but contains no song table.
    #[error("No song table found on listing page '{url}'")]
    NoTable { url: String },

    // ── Dataset errors ────────────────────────────────────────────────────
    /// An existing dataset file could not be read.
    #[error("Failed to read dataset '{path}': {source}")]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing dataset file is not valid dataset JSON.
    #[error("Dataset '{path}' is not valid JSON: {source}")]
    DatasetFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The dataset could not be written.
    #[error("Failed to write dataset '{path}': {source}")]
    DatasetWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a listing row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ParseError {
    /// Row has fewer cells than `[title-link, artist, metadata]`.
    #[error("row has {found} cells, expected at least {expected}")]
    MissingColumns { found: usize, expected: usize },

    /// The first cell carries no link.
    #[error("row has no link in the title cell")]
    MissingLink,

    /// The link does not point at a document.
    #[error("link '{href}' does not point at a PDF document")]
    NotADocument { href: String },

    /// The link could not be resolved against the listing URL.
    #[error("link '{href}' cannot be resolved: {reason}")]
    InvalidUrl { href: String, reason: String },

    /// Neither the link nor the cell has any title text.
    #[error("row has an empty title")]
    EmptyTitle,
}

/// A non-fatal failure for a single song.
///
/// Stored in [`crate::model::RowOutcome::Degraded`]; the record itself is
/// still persisted with an empty body and no chords.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum RowError {
    /// The PDF download failed after all retries.
    #[error("PDF fetch failed after {attempts} attempts: {detail}")]
    FetchFailed { attempts: u32, detail: String },

    /// The PDF was downloaded but no text could be extracted.
    #[error("PDF unreadable: {detail}")]
    Unreadable { detail: String },
}

/// A failed download.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection problems, timeouts, 5xx and 429 responses. Worth retrying.
    #[error("transient failure fetching '{url}': {reason}")]
    Transient { url: String, reason: String },

    /// 4xx responses and malformed URLs. Retrying will not help.
    #[error("permanent failure fetching '{url}': {reason}")]
    Permanent { url: String, reason: String },
}

impl FetchError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }
}

/// Why PDF text extraction produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Input is empty or has no `%PDF` header in its first kilobyte.
    #[error("not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The document is encrypted.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Header, xref or object streams are corrupt.
    #[error("PDF is corrupt: {0}")]
    Corrupt(String),
}
