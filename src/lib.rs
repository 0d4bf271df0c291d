//! # songsheet-scrape
//!
//! Build a song-sheet dataset from a remote listing of PDF song sheets.
//!
//! Each song on the listing page links to a PDF holding lyrics with chord
//! annotations (`[Am] hello [G7] world`). This crate downloads those PDFs,
//! pulls their text out, recognises the chords, strips the preamble and
//! watermark the sheets carry, and writes everything to a JSON dataset that
//! a display layer loads read-only.
//!
//! ## Pipeline Overview
//!
//! ```text
//! listing URL
//!  │
//!  ├─ 1. Listing   fetch the HTML page, find the song table (fatal on failure)
//!  ├─ 2. Metadata  one row → title / artist / difficulty / book / page / url
//!  ├─ 3. Fetch     download each PDF with bounded retry and backoff
//!  ├─ 4. Extract   per-page PDF text, best-effort
//!  ├─ 5. Chords    chord tokens, deduplicated and sorted
//!  ├─ 6. Clean     watermark / preamble removal, chord emphasis
//!  └─ 7. Persist   checkpointed, atomic JSON writes; resumable on re-run
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use songsheet_scrape::{HttpFetcher, ScrapeConfig, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScrapeConfig::builder()
//!         .listing_url("https://example.org/?page_id=1")
//!         .output_path("songs.json")
//!         .build()?;
//!     let fetcher = HttpFetcher::new(&config)?;
//!     let summary = Scraper::new(config, fetcher).run().await?;
//!     eprintln!("{} records persisted", summary.persisted);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `songsheet-scrape` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod scrape;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ChordScan, ScrapeConfig, ScrapeConfigBuilder};
pub use dataset::{ChordDefinition, ChordLibrary, Dataset};
pub use error::{ExtractError, FetchError, ParseError, RowError, ScrapeError};
pub use model::{PartialSongRecord, RowOutcome, RunSummary, SongRecord};
pub use pipeline::chords::find_chords;
pub use pipeline::clean::{clean, BodyCleaner};
pub use pipeline::extract::extract;
pub use pipeline::fetch::{Fetch, HttpFetcher};
pub use pipeline::listing::{parse_listing, parse_row, ListingCell, ListingRow};
pub use progress::{NoopProgressCallback, ProgressCallback, ScrapeProgressCallback};
pub use scrape::Scraper;
