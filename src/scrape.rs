//! Fetch orchestration: the listing-to-dataset run.
//!
//! ```text
//! Start → FetchListing → for each row:
//!           ParseMetadata ─(rejected)──────────────────────────────┐
//!             └→ resume? ─(yes)────────────────────────────────────┤
//!                  └→ FetchPDF → ExtractText → FindChords → Clean ─┴→ Append
//!       → Persist
//! ```
//!
//! Rows are processed with bounded concurrency but completed in listing
//! order, so every checkpoint is a prefix of the final dataset. A checkpoint
//! (and the final write) also carries over previous records for rows not
//! yet reached: interrupting a re-run never loses songs an earlier run had
//! already populated.

use crate::config::ScrapeConfig;
use crate::dataset::Dataset;
use crate::error::{RowError, ScrapeError};
use crate::model::{RowOutcome, RunSummary, SongRecord};
use crate::pipeline::chords::chords_for;
use crate::pipeline::clean::BodyCleaner;
use crate::pipeline::extract::extract_text;
use crate::pipeline::fetch::{fetch_retrying, fetch_with_retry, Fetch};
use crate::pipeline::listing::{parse_listing, parse_row, ListingRow};
use futures::stream::{self, StreamExt};
use reqwest::Url;
use std::collections::HashMap;
use std::future::Future;
use std::pin::pin;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Runs the pipeline for one listing with a given [`Fetch`] implementation.
pub struct Scraper<F> {
    config: ScrapeConfig,
    fetcher: F,
}

/// The result of one row, in listing order.
struct RowResult {
    index: usize,
    title: String,
    outcome: RowOutcome,
    record: Option<SongRecord>,
}

impl<F: Fetch> Scraper<F> {
    pub fn new(config: ScrapeConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// Process the whole listing and persist the dataset.
    ///
    /// # Errors
    /// Returns `Err(ScrapeError)` only for fatal errors:
    /// - Listing URL invalid or unreachable
    /// - No song table on the listing page
    /// - Final dataset write failed
    ///
    /// Per-row failures are counted in the returned [`RunSummary`].
    pub async fn run(&self) -> Result<RunSummary, ScrapeError> {
        self.run_until(std::future::pending()).await
    }

    /// Like [`Scraper::run`], but stop early when `shutdown` completes.
    ///
    /// Rows in flight are abandoned; everything completed so far is still
    /// persisted before returning, with `interrupted` set in the summary.
    pub async fn run_until(
        &self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<RunSummary, ScrapeError> {
        let start = Instant::now();
        let config = &self.config;
        info!("Starting scrape: {}", config.listing_url);

        let cleaner = BodyCleaner::new(&config.watermark)
            .map_err(|e| ScrapeError::InvalidConfig(format!("watermark: {e}")))?;

        // ── Step 1: Listing ──────────────────────────────────────────────
        let base_url = parse_listing_url(&config.listing_url)?;
        let html = fetch_retrying(
            &self.fetcher,
            base_url.as_str(),
            config.max_retries,
            config.retry_backoff_ms,
        )
        .await
        .map_err(|(source, _)| ScrapeError::ListingFetch {
            url: config.listing_url.clone(),
            source,
        })?;
        let rows = parse_listing(&String::from_utf8_lossy(&html), &config.listing_url)?;
        let total = rows.len();
        info!("Listing has {} rows", total);

        // ── Step 2: Previous run ─────────────────────────────────────────
        let previous = self.load_previous().await;

        if let Some(ref cb) = config.progress_callback {
            cb.on_run_start(total);
        }

        // ── Step 3: Rows ─────────────────────────────────────────────────
        let mut summary = RunSummary {
            total_rows: total,
            ..RunSummary::default()
        };
        let mut records: Vec<SongRecord> = Vec::with_capacity(total);
        let mut reached = 0usize;

        let mut results = pin!(stream::iter(rows.iter().enumerate())
            .map(|(i, row)| self.process_row(i + 1, row, &base_url, &previous, &cleaner))
            .buffered(config.concurrency.max(1)));
        let mut shutdown = pin!(shutdown);

        loop {
            let result = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Interrupted after {}/{} rows", reached, total);
                    summary.interrupted = true;
                    break;
                }
                next = results.next() => match next {
                    Some(result) => result,
                    None => break,
                },
            };

            let RowResult {
                index,
                title,
                outcome,
                record,
            } = result;
            info!(index, total, title = %title, outcome = outcome.label(), "row processed");
            match &outcome {
                RowOutcome::Rejected(e) => warn!("Row {}: skipped: {}", index, e),
                RowOutcome::Degraded(e) => warn!("Row {} ({}): {}", index, title, e),
                _ => {}
            }

            summary.record(&outcome);
            if let Some(ref cb) = config.progress_callback {
                cb.on_row_complete(index, total, &title, &outcome);
            }
            records.extend(record);
            reached = index;

            if reached % config.checkpoint_every.max(1) == 0 && reached < total {
                self.checkpoint(&records, &rows[reached..], &base_url, &previous)
                    .await;
            }
        }

        // ── Step 4: Persist ──────────────────────────────────────────────
        let dataset = Dataset::new(with_carry_over(
            &records,
            &rows[reached..],
            &base_url,
            &previous,
        ));
        dataset.save(&config.output_path).await?;

        summary.persisted = dataset.len();
        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Scrape complete: {}/{} rows, {} populated, {} resumed, {} degraded, {} rejected, {}ms",
            summary.processed(),
            total,
            summary.populated,
            summary.resumed,
            summary.degraded,
            summary.rejected,
            summary.duration_ms
        );

        if let Some(ref cb) = config.progress_callback {
            cb.on_run_complete(&summary);
        }
        Ok(summary)
    }

    async fn process_row(
        &self,
        index: usize,
        row: &ListingRow,
        base_url: &Url,
        previous: &HashMap<String, SongRecord>,
        cleaner: &BodyCleaner,
    ) -> RowResult {
        let config = &self.config;
        let partial = match parse_row(row, base_url) {
            Ok(p) => p,
            Err(e) => {
                return RowResult {
                    index,
                    title: String::new(),
                    outcome: RowOutcome::Rejected(e),
                    record: None,
                }
            }
        };
        let title = partial.title.clone();

        // The listing stays authoritative for metadata; only the PDF-derived
        // fields are reused.
        if let Some(prev) = previous
            .get(&partial.url)
            .filter(|r| r.is_populated(config.resume_min_body_len))
        {
            debug!("Row {}: already populated, not fetching {}", index, partial.url);
            return RowResult {
                index,
                title,
                outcome: RowOutcome::Resumed,
                record: Some(partial.into_record(prev.chords.clone(), prev.body.clone())),
            };
        }

        if config.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.request_delay_ms)).await;
        }

        let bytes = match fetch_with_retry(
            &self.fetcher,
            &partial.url,
            config.max_retries,
            config.retry_backoff_ms,
        )
        .await
        {
            Ok(b) => b,
            Err(e) => return degraded(index, partial.into_degraded(), e),
        };

        let extracted = tokio::task::spawn_blocking(move || extract_text(&bytes))
            .await
            .map_err(|e| format!("extraction task failed: {e}"))
            .and_then(|r| r.map_err(|e| e.to_string()));
        let text = match extracted {
            Ok(t) if !t.trim().is_empty() => t,
            Ok(_) => {
                return degraded(
                    index,
                    partial.into_degraded(),
                    RowError::Unreadable {
                        detail: "no text layer".into(),
                    },
                )
            }
            Err(detail) => {
                return degraded(index, partial.into_degraded(), RowError::Unreadable { detail })
            }
        };

        let chords = chords_for(&text, config.chord_scan);
        let body = cleaner.clean(&text);
        debug!(
            "Row {}: {} chords, {} body chars",
            index,
            chords.len(),
            body.chars().count()
        );

        RowResult {
            index,
            title,
            outcome: RowOutcome::Populated,
            record: Some(partial.into_record(chords, body)),
        }
    }

    /// Read the dataset of an earlier run, keyed by URL.
    ///
    /// An unreadable file is not fatal: it will be overwritten, so the run
    /// starts from scratch.
    async fn load_previous(&self) -> HashMap<String, SongRecord> {
        let path = &self.config.output_path;
        match Dataset::load_or_empty(path).await {
            Ok(d) => {
                if !d.is_empty() {
                    info!("Resuming from {} ({} records)", path.display(), d.len());
                }
                d.songs.into_iter().map(|r| (r.url.clone(), r)).collect()
            }
            Err(e) => {
                warn!("Ignoring previous dataset: {}", e);
                HashMap::new()
            }
        }
    }

    async fn checkpoint(
        &self,
        records: &[SongRecord],
        remaining: &[ListingRow],
        base_url: &Url,
        previous: &HashMap<String, SongRecord>,
    ) {
        let dataset = Dataset::new(with_carry_over(records, remaining, base_url, previous));
        match dataset.save(&self.config.output_path).await {
            Ok(()) => {
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_checkpoint(dataset.len());
                }
            }
            Err(e) => warn!("Checkpoint failed, continuing: {}", e),
        }
    }
}

fn degraded(index: usize, record: SongRecord, error: RowError) -> RowResult {
    RowResult {
        index,
        title: record.title.clone(),
        outcome: RowOutcome::Degraded(error),
        record: Some(record),
    }
}

/// `records` followed by the previous records of `remaining` rows.
fn with_carry_over(
    records: &[SongRecord],
    remaining: &[ListingRow],
    base_url: &Url,
    previous: &HashMap<String, SongRecord>,
) -> Vec<SongRecord> {
    let carried = remaining
        .iter()
        .filter_map(|row| parse_row(row, base_url).ok())
        .filter_map(|p| previous.get(&p.url).cloned());
    records.iter().cloned().chain(carried).collect()
}

fn parse_listing_url(raw: &str) -> Result<Url, ScrapeError> {
    let url = Url::parse(raw.trim()).map_err(|e| ScrapeError::InvalidListingUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScrapeError::InvalidListingUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
