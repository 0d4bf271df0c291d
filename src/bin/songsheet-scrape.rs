//! CLI binary for songsheet-scrape.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ScrapeConfig`, wires Ctrl-C to a graceful stop and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use songsheet_scrape::{
    ChordLibrary, ChordScan, Dataset, HttpFetcher, ProgressCallback, RowOutcome, RunSummary,
    ScrapeConfig, ScrapeProgressCallback, Scraper,
};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one log line per song that did not go cleanly.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until `on_run_start` tells us how many rows there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Listing");
        bar.set_message("Fetching song table…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ScrapeProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_rows: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} songs  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        self.bar.set_length(total_rows as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Scraping");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{total_rows} songs in listing"))
        ));
    }

    fn on_row_complete(&self, index: usize, total: usize, title: &str, outcome: &RowOutcome) {
        self.bar.set_message(title.to_string());
        match outcome {
            RowOutcome::Populated | RowOutcome::Resumed => {}
            RowOutcome::Degraded(e) => self.bar.println(format!(
                "  {} {:>4}/{:<4} {}  {}",
                cyan("⚠"),
                index,
                total,
                title,
                dim(&e.to_string())
            )),
            RowOutcome::Rejected(e) => self.bar.println(format!(
                "  {} {:>4}/{:<4} {}",
                red("✗"),
                index,
                total,
                dim(&e.to_string())
            )),
        }
        self.bar.inc(1);
    }

    fn on_checkpoint(&self, persisted: usize) {
        self.bar.set_message(format!("checkpoint: {persisted} saved"));
    }

    fn on_run_complete(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scrape a listing into songs.json
  songsheet-scrape "https://example.org/?page_id=1"

  # Custom output, two downloads at once, checkpoint every 10 songs
  songsheet-scrape URL -o data/songs.json --concurrency 2 --checkpoint-every 10

  # Re-run after an interruption: populated songs are not fetched again
  songsheet-scrape URL -o data/songs.json

  # Report chords that have no diagram in a chord library
  songsheet-scrape URL --chord-library chords.json

ENVIRONMENT VARIABLES:
  SONGSHEET_LISTING_URL   Listing page URL
  SONGSHEET_OUTPUT        Dataset path
  RUST_LOG                Overrides --verbose / --quiet log filtering
"#;

/// Scrape a song-sheet listing into a JSON dataset.
#[derive(Parser, Debug)]
#[command(
    name = "songsheet-scrape",
    version,
    about = "Scrape a song-sheet listing into a JSON dataset",
    long_about = "Fetch a listing page of PDF song sheets, extract lyrics and chords from \
every PDF, clean the text and write a resumable JSON dataset. Press Ctrl-C to stop: \
everything processed so far is saved.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Listing page URL (HTTP/HTTPS).
    #[arg(env = "SONGSHEET_LISTING_URL")]
    listing_url: String,

    /// Dataset file to resume from and write to.
    #[arg(short, long, env = "SONGSHEET_OUTPUT", default_value = "songs.json")]
    output: PathBuf,

    /// Retries per PDF on a transient failure.
    #[arg(long, env = "SONGSHEET_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Initial retry backoff in milliseconds (doubles per attempt).
    #[arg(long, env = "SONGSHEET_RETRY_BACKOFF_MS", default_value_t = 500)]
    retry_backoff_ms: u64,

    /// Pause before every PDF request, in milliseconds.
    #[arg(long, env = "SONGSHEET_DELAY_MS", default_value_t = 1000)]
    delay_ms: u64,

    /// HTTP timeout in seconds.
    #[arg(long, env = "SONGSHEET_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// PDFs downloaded at once.
    #[arg(short, long, env = "SONGSHEET_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Save the dataset after this many songs.
    #[arg(long, env = "SONGSHEET_CHECKPOINT_EVERY", default_value_t = 5)]
    checkpoint_every: usize,

    /// Watermark phrase stripped from every body.
    #[arg(long, env = "SONGSHEET_WATERMARK", default_value = songsheet_scrape::config::DEFAULT_WATERMARK)]
    watermark: String,

    /// Where chords are looked for.
    #[arg(long, env = "SONGSHEET_CHORD_SCAN", value_enum, default_value = "annotations")]
    chord_scan: ChordScanArg,

    /// Chord library JSON; chords without a diagram are reported at the end.
    #[arg(long, env = "SONGSHEET_CHORD_LIBRARY")]
    chord_library: Option<PathBuf>,

    /// Disable progress bar.
    #[arg(long, env = "SONGSHEET_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SONGSHEET_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SONGSHEET_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ChordScanArg {
    Annotations,
    FullText,
}

impl From<ChordScanArg> for ChordScan {
    fn from(v: ChordScanArg) -> Self {
        match v {
            ChordScanArg::Annotations => ChordScan::Annotations,
            ChordScanArg::FullText => ChordScan::FullText,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level row logs.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ScrapeProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let fetcher = HttpFetcher::new(&config).context("Failed to create HTTP client")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available: never interrupt.
            std::future::pending::<()>().await;
        }
    };
    let summary = Scraper::new(config, fetcher)
        .run_until(shutdown)
        .await
        .context("Scrape failed")?;

    if !cli.quiet {
        let mark = if summary.interrupted {
            cyan("⏸")
        } else if summary.degraded + summary.rejected == 0 {
            green("✔")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{}  {}/{} rows  {}ms  →  {} records in {}",
            mark,
            summary.processed(),
            summary.total_rows,
            summary.duration_ms,
            bold(&summary.persisted.to_string()),
            bold(&cli.output.display().to_string()),
        );
        eprintln!(
            "   {} populated  /  {} resumed  /  {} degraded  /  {} rejected",
            dim(&summary.populated.to_string()),
            dim(&summary.resumed.to_string()),
            dim(&summary.degraded.to_string()),
            dim(&summary.rejected.to_string()),
        );
    }

    if let Some(ref path) = cli.chord_library {
        report_missing_diagrams(path, &cli.output).await?;
    }

    Ok(())
}

/// Map CLI args to `ScrapeConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ScrapeConfig> {
    let mut builder = ScrapeConfig::builder()
        .listing_url(cli.listing_url.clone())
        .output_path(cli.output.clone())
        .max_retries(cli.max_retries)
        .retry_backoff_ms(cli.retry_backoff_ms)
        .request_delay_ms(cli.delay_ms)
        .request_timeout_secs(cli.timeout)
        .concurrency(cli.concurrency)
        .checkpoint_every(cli.checkpoint_every)
        .watermark(cli.watermark.clone())
        .chord_scan(cli.chord_scan.clone().into());

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Print the chords used by the dataset that the library has no diagram for.
async fn report_missing_diagrams(library_path: &Path, dataset_path: &Path) -> Result<()> {
    let library = ChordLibrary::load(library_path)
        .await
        .context("Failed to load chord library")?;
    let dataset = Dataset::load(dataset_path)
        .await
        .context("Failed to reload dataset")?;

    let missing: BTreeSet<&str> = dataset
        .songs
        .iter()
        .flat_map(|s| s.chords.iter())
        .filter(|c| library.lookup(c).is_none())
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        eprintln!("{} every chord has a diagram ({} in library)", green("✔"), library.len());
    } else {
        eprintln!(
            "{} {} chords without a diagram: {}",
            cyan("⚠"),
            missing.len(),
            missing.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    Ok(())
}
