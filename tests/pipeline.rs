//! Integration tests for the full listing → dataset run.
//!
//! Everything runs in memory: a scripted [`Fetch`] serves the listing page
//! and lopdf-built PDFs, and datasets live in a temporary directory. No
//! network access is needed.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use songsheet_scrape::{
    Dataset, Fetch, FetchError, ParseError, RowError, RowOutcome, RunSummary, ScrapeConfig,
    ScrapeError, ScrapeProgressCallback, Scraper, SongRecord,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

const LISTING: &str = "https://songs.test/?page_id=1";

// ── Test helpers ─────────────────────────────────────────────────────────────

fn song_url(slug: &str) -> String {
    format!("https://songs.test/sheets/{slug}.pdf")
}

/// A one-page PDF with one text object per line.
fn pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
        operations.push(Operation::new(
            "Td",
            vec![50.into(), (800 - 14 * i as i64).into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A typical sheet: watermark, metadata preamble, chords block, lyrics.
fn song_pdf(first_chord: &str) -> Vec<u8> {
    let first = format!("[{first_chord}]Row, row, row your [G]boat");
    pdf(&[
        "Moselele Songbook",
        "Difficulty 2",
        "Chords used: C G Am",
        &first,
        "Gently down the [Am]stream",
        "Merrily, merrily, merrily, merrily",
        "Life is but a dream [C]",
        "www.moselele.co.uk",
    ])
}

/// Listing page with a header row and one row per `(title, href, artist, meta)`.
fn listing(rows: &[(&str, &str, &str, &str)]) -> Vec<u8> {
    let mut html = String::from(
        "<html><body><h1>Songs</h1><table>\
         <tr><th>Title</th><th>Artist</th><th>Info</th></tr>",
    );
    for (title, href, artist, meta) in rows {
        html.push_str(&format!(
            "<tr><td><a href=\"{href}\">{title}</a></td><td>{artist}</td><td>{meta}</td></tr>"
        ));
    }
    html.push_str("</table></body></html>");
    html.into_bytes()
}

#[derive(Clone)]
enum Reply {
    Body(Vec<u8>),
    Fail { transient: bool },
    /// Wake the notifier, then never answer.
    Hang(Arc<Notify>),
}

/// Serves canned replies per URL and counts requests.
#[derive(Default)]
struct ScriptedFetcher {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    fn with(mut self, url: impl Into<String>, reply: Reply) -> Self {
        self.replies.insert(url.into(), reply);
        self
    }

    fn delayed(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Fetch for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        match self.replies.get(url) {
            Some(Reply::Body(bytes)) => Ok(bytes.clone()),
            Some(Reply::Fail { transient: true }) => Err(FetchError::Transient {
                url: url.to_string(),
                reason: "HTTP 503".into(),
            }),
            Some(Reply::Hang(notify)) => {
                notify.notify_one();
                std::future::pending().await
            }
            Some(Reply::Fail { transient: false }) | None => Err(FetchError::Permanent {
                url: url.to_string(),
                reason: "HTTP 404".into(),
            }),
        }
    }
}

fn config(output: &Path) -> ScrapeConfig {
    ScrapeConfig::builder()
        .listing_url(LISTING)
        .output_path(output)
        .max_retries(2)
        .retry_backoff_ms(0)
        .build()
        .unwrap()
}

fn dataset_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("songs.json")
}

fn populated_record(url: &str, title: &str) -> SongRecord {
    SongRecord {
        title: title.into(),
        artist: "Unknown".into(),
        difficulty: 3,
        book: "N/A".into(),
        page: "N/A".into(),
        url: url.into(),
        chords: vec!["C".into(), "F".into()],
        body: "**[C]** a line of lyrics that is long enough to count. ".repeat(3),
    }
}

#[derive(Default)]
struct RecordingCallback {
    started: AtomicUsize,
    rows: Mutex<Vec<(usize, String, &'static str)>>,
    checkpoints: Mutex<Vec<usize>>,
    completed: Mutex<Option<RunSummary>>,
}

impl ScrapeProgressCallback for RecordingCallback {
    fn on_run_start(&self, total_rows: usize) {
        self.started.store(total_rows, Ordering::SeqCst);
    }

    fn on_row_complete(&self, index: usize, _total: usize, title: &str, outcome: &RowOutcome) {
        self.rows
            .lock()
            .unwrap()
            .push((index, title.to_string(), outcome.label()));
    }

    fn on_checkpoint(&self, persisted: usize) {
        self.checkpoints.lock().unwrap().push(persisted);
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        *self.completed.lock().unwrap() = Some(summary.clone());
    }
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_end_to_end_builds_clean_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let fetcher = ScriptedFetcher::default()
        .with(
            LISTING,
            Reply::Body(listing(&[
                ("Row Your Boat", "/sheets/row.pdf", "Trad.", "Difficulty 8 | Book 2 | Page 14"),
                ("Boat Again", "sheets/again.pdf", "", ""),
            ])),
        )
        .with(song_url("row"), Reply::Body(song_pdf("C")))
        .with(song_url("again"), Reply::Body(song_pdf("D")));

    let summary = Scraper::new(config(&out), &fetcher).run().await.unwrap();
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.populated, 2);
    assert_eq!(summary.persisted, 2);
    assert!(!summary.interrupted);

    let dataset = Dataset::load(&out).await.unwrap();
    assert_eq!(dataset.schema, "songsheet-dataset");
    let first = &dataset.songs[0];
    assert_eq!(first.title, "Row Your Boat");
    assert_eq!(first.artist, "Trad.");
    assert_eq!(first.difficulty, 4);
    assert_eq!(first.book, "2");
    assert_eq!(first.page, "14");
    assert_eq!(first.url, song_url("row"));
    assert_eq!(first.chords, vec!["Am", "C", "G"]);
    assert!(
        first.body.starts_with("**[C]** Row, row, row your **[G]** boat"),
        "body: {:?}",
        first.body
    );
    assert!(first.body.contains("**[Am]** stream"));
    for gone in ["oselele", "Difficulty", "Chords used", "www."] {
        assert!(!first.body.contains(gone), "{gone} left in body");
    }

    let second = &dataset.songs[1];
    assert_eq!(second.url, song_url("again"));
    assert_eq!(second.artist, "Unknown");
    assert_eq!(second.difficulty, 3);
    assert_eq!(second.book, "N/A");
    assert_eq!(second.chords, vec!["Am", "C", "D", "G"]);
}

// ── Fault tolerance ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_fetch_keeps_degraded_record() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let fetcher = ScriptedFetcher::default()
        .with(
            LISTING,
            Reply::Body(listing(&[
                ("One", "/sheets/one.pdf", "A", ""),
                ("Two", "/sheets/two.pdf", "B", ""),
                ("Three", "/sheets/three.pdf", "C", ""),
            ])),
        )
        .with(song_url("one"), Reply::Body(song_pdf("C")))
        .with(song_url("two"), Reply::Fail { transient: true })
        .with(song_url("three"), Reply::Body(song_pdf("C")));

    let summary = Scraper::new(config(&out), &fetcher).run().await.unwrap();
    assert_eq!(summary.populated, 2);
    assert_eq!(summary.degraded, 1);
    // One attempt plus two retries.
    assert_eq!(fetcher.calls_to(&song_url("two")), 3);

    let dataset = Dataset::load(&out).await.unwrap();
    let titles: Vec<&str> = dataset.songs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
    assert!(dataset.songs[1].body.is_empty());
    assert!(dataset.songs[1].chords.is_empty());
    assert!(!dataset.songs[2].body.is_empty());
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let fetcher = ScriptedFetcher::default().with(
        LISTING,
        Reply::Body(listing(&[("Missing", "/sheets/missing.pdf", "A", "")])),
    );

    let callback = Arc::new(RecordingCallback::default());
    let config = ScrapeConfig::builder()
        .listing_url(LISTING)
        .output_path(&out)
        .retry_backoff_ms(0)
        .progress_callback(callback.clone())
        .build()
        .unwrap();
    let summary = Scraper::new(config, &fetcher).run().await.unwrap();

    assert_eq!(summary.degraded, 1);
    assert_eq!(fetcher.calls_to(&song_url("missing")), 1);
    let summary = callback.completed.lock().unwrap().clone().unwrap();
    assert_eq!(summary.persisted, 1);
}

#[tokio::test]
async fn test_unreadable_pdf_keeps_degraded_record() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let fetcher = ScriptedFetcher::default()
        .with(
            LISTING,
            Reply::Body(listing(&[("Broken", "/sheets/broken.pdf", "A", "")])),
        )
        .with(
            song_url("broken"),
            Reply::Body(b"<html>Please log in</html>".to_vec()),
        );

    let callback = Arc::new(RecordingCallback::default());
    let mut config = config(&out);
    config.progress_callback = Some(callback.clone());
    let summary = Scraper::new(config, &fetcher).run().await.unwrap();

    assert_eq!(summary.degraded, 1);
    assert_eq!(summary.persisted, 1);
    assert_eq!(callback.rows.lock().unwrap()[0].2, "degraded");

    let dataset = Dataset::load(&out).await.unwrap();
    assert_eq!(dataset.songs[0].title, "Broken");
    assert!(dataset.songs[0].body.is_empty());
}

#[tokio::test]
async fn test_rejected_rows_are_omitted() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let html = String::from_utf8(listing(&[
        ("Good", "/sheets/good.pdf", "A", ""),
        ("Web page", "/songs/page.html", "B", ""),
    ]))
    .unwrap()
    .replace(
        "</table>",
        "<tr><td>No link</td><td>C</td><td></td></tr><tr><td>short</td></tr></table>",
    );
    let fetcher = ScriptedFetcher::default()
        .with(LISTING, Reply::Body(html.into_bytes()))
        .with(song_url("good"), Reply::Body(song_pdf("C")));

    let callback = Arc::new(RecordingCallback::default());
    let mut config = config(&out);
    config.progress_callback = Some(callback.clone());
    let summary = Scraper::new(config, &fetcher).run().await.unwrap();

    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.rejected, 3);
    assert_eq!(summary.persisted, 1);
    assert_eq!(fetcher.total_calls(), 2);

    let labels: Vec<&str> = callback.rows.lock().unwrap().iter().map(|r| r.2).collect();
    assert_eq!(labels, vec!["populated", "rejected", "rejected", "rejected"]);
}

// ── Fatal listing errors ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_listing_without_table_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let fetcher = ScriptedFetcher::default().with(
        LISTING,
        Reply::Body(b"<html><p>Down for maintenance</p></html>".to_vec()),
    );

    let err = Scraper::new(config(&out), &fetcher).run().await.unwrap_err();
    assert!(matches!(err, ScrapeError::NoTable { .. }), "got {err:?}");
    assert!(!out.exists());
}

#[tokio::test]
async fn test_unreachable_listing_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let fetcher = ScriptedFetcher::default().with(LISTING, Reply::Fail { transient: true });

    let err = Scraper::new(config(&out), &fetcher).run().await.unwrap_err();
    assert!(matches!(err, ScrapeError::ListingFetch { .. }), "got {err:?}");
    assert_eq!(fetcher.calls_to(LISTING), 3);
    assert!(!out.exists());
}

#[tokio::test]
async fn test_invalid_listing_url_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ScriptedFetcher::default();
    let config = ScrapeConfig::builder()
        .listing_url("file:///etc/songs.html")
        .output_path(dataset_path(&dir))
        .build()
        .unwrap();

    let err = Scraper::new(config, &fetcher).run().await.unwrap_err();
    assert!(matches!(err, ScrapeError::InvalidListingUrl { .. }));
    assert_eq!(fetcher.total_calls(), 0);
}

// ── Resumability ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_resume_skips_populated_records() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);

    let mut degraded = populated_record(&song_url("two"), "Two");
    degraded.body.clear();
    degraded.chords.clear();
    Dataset::new(vec![populated_record(&song_url("one"), "Old title"), degraded])
        .save(&out)
        .await
        .unwrap();

    let fetcher = ScriptedFetcher::default()
        .with(
            LISTING,
            Reply::Body(listing(&[
                ("One", "/sheets/one.pdf", "A", "Difficulty 1"),
                ("Two", "/sheets/two.pdf", "B", ""),
            ])),
        )
        .with(song_url("one"), Reply::Body(song_pdf("C")))
        .with(song_url("two"), Reply::Body(song_pdf("C")));

    let summary = Scraper::new(config(&out), &fetcher).run().await.unwrap();
    assert_eq!(summary.resumed, 1);
    assert_eq!(summary.populated, 1);
    assert_eq!(fetcher.calls_to(&song_url("one")), 0);
    assert_eq!(fetcher.calls_to(&song_url("two")), 1);

    let dataset = Dataset::load(&out).await.unwrap();
    // Listing metadata is refreshed; PDF-derived fields are carried over.
    assert_eq!(dataset.songs[0].title, "One");
    assert_eq!(dataset.songs[0].difficulty, 1);
    assert_eq!(dataset.songs[0].chords, vec!["C", "F"]);
    assert!(!dataset.songs[1].body.is_empty());
}

#[tokio::test]
async fn test_second_run_fetches_only_what_failed() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let page = listing(&[
        ("One", "/sheets/one.pdf", "A", ""),
        ("Two", "/sheets/two.pdf", "B", ""),
    ]);

    let first = ScriptedFetcher::default()
        .with(LISTING, Reply::Body(page.clone()))
        .with(song_url("one"), Reply::Body(song_pdf("C")))
        .with(song_url("two"), Reply::Fail { transient: false });
    let summary = Scraper::new(config(&out), &first).run().await.unwrap();
    assert_eq!((summary.populated, summary.degraded), (1, 1));

    let second = ScriptedFetcher::default()
        .with(LISTING, Reply::Body(page))
        .with(song_url("one"), Reply::Body(song_pdf("C")))
        .with(song_url("two"), Reply::Body(song_pdf("C")));
    let summary = Scraper::new(config(&out), &second).run().await.unwrap();
    assert_eq!((summary.resumed, summary.populated), (1, 1));
    assert_eq!(second.calls_to(&song_url("one")), 0);
    assert_eq!(second.calls_to(&song_url("two")), 1);
}

#[tokio::test]
async fn test_corrupt_previous_dataset_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    std::fs::write(&out, "{ truncated").unwrap();

    let fetcher = ScriptedFetcher::default()
        .with(
            LISTING,
            Reply::Body(listing(&[("One", "/sheets/one.pdf", "A", "")])),
        )
        .with(song_url("one"), Reply::Body(song_pdf("C")));

    let summary = Scraper::new(config(&out), &fetcher).run().await.unwrap();
    assert_eq!(summary.populated, 1);
    assert_eq!(Dataset::load(&out).await.unwrap().len(), 1);
}

// ── Checkpoints and interruption ─────────────────────────────────────────────

#[tokio::test]
async fn test_checkpoints_every_n_rows() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let rows: Vec<(String, String)> = (1..=5)
        .map(|i| (format!("Song {i}"), format!("/sheets/s{i}.pdf")))
        .collect();
    let table: Vec<(&str, &str, &str, &str)> = rows
        .iter()
        .map(|(t, h)| (t.as_str(), h.as_str(), "A", ""))
        .collect();
    let mut fetcher = ScriptedFetcher::default().with(LISTING, Reply::Body(listing(&table)));
    for i in 1..=5 {
        fetcher = fetcher.with(song_url(&format!("s{i}")), Reply::Body(song_pdf("C")));
    }

    let callback = Arc::new(RecordingCallback::default());
    let config = ScrapeConfig::builder()
        .listing_url(LISTING)
        .output_path(&out)
        .checkpoint_every(2)
        .progress_callback(callback.clone())
        .build()
        .unwrap();
    let summary = Scraper::new(config, &fetcher).run().await.unwrap();

    assert_eq!(summary.persisted, 5);
    assert_eq!(callback.started.load(Ordering::SeqCst), 5);
    assert_eq!(*callback.checkpoints.lock().unwrap(), vec![2, 4]);
}

#[tokio::test]
async fn test_interrupt_before_first_row_keeps_previous_records() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    Dataset::new(vec![populated_record(&song_url("one"), "One")])
        .save(&out)
        .await
        .unwrap();

    let fetcher = ScriptedFetcher::default()
        .with(
            LISTING,
            Reply::Body(listing(&[
                ("One", "/sheets/one.pdf", "A", ""),
                ("Two", "/sheets/two.pdf", "B", ""),
            ])),
        )
        .with(song_url("two"), Reply::Body(song_pdf("C")));

    let summary = Scraper::new(config(&out), &fetcher)
        .run_until(async {})
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.processed(), 0);
    assert_eq!(summary.persisted, 1);
    assert_eq!(fetcher.calls_to(&song_url("two")), 0);
    assert_eq!(Dataset::load(&out).await.unwrap().songs[0].title, "One");
}

#[tokio::test]
async fn test_interrupt_mid_run_persists_completed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let stop = Arc::new(Notify::new());

    let fetcher = ScriptedFetcher::default()
        .with(
            LISTING,
            Reply::Body(listing(&[
                ("One", "/sheets/one.pdf", "A", ""),
                ("Two", "/sheets/two.pdf", "B", ""),
                ("Three", "/sheets/three.pdf", "C", ""),
                ("Four", "/sheets/four.pdf", "D", ""),
            ])),
        )
        .with(song_url("one"), Reply::Body(song_pdf("C")))
        .with(song_url("two"), Reply::Body(song_pdf("C")))
        .with(song_url("three"), Reply::Hang(stop.clone()))
        .with(song_url("four"), Reply::Body(song_pdf("C")));

    let summary = Scraper::new(config(&out), &fetcher)
        .run_until(async move { stop.notified().await })
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.populated, 2);
    assert_eq!(summary.persisted, 2);
    assert_eq!(fetcher.calls_to(&song_url("four")), 0);

    let titles: Vec<String> = Dataset::load(&out)
        .await
        .unwrap()
        .songs
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["One", "Two"]);
}

// ── Concurrency ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_downloads_keep_listing_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let fetcher = ScriptedFetcher::default()
        .with(
            LISTING,
            Reply::Body(listing(&[
                ("Slow", "/sheets/slow.pdf", "A", ""),
                ("Fast", "/sheets/fast.pdf", "B", ""),
                ("Failing", "/sheets/failing.pdf", "C", ""),
            ])),
        )
        .with(song_url("slow"), Reply::Body(song_pdf("C")))
        .delayed(song_url("slow"), Duration::from_millis(100))
        .with(song_url("fast"), Reply::Body(song_pdf("C")))
        .with(song_url("failing"), Reply::Fail { transient: false });

    let callback = Arc::new(RecordingCallback::default());
    let config = ScrapeConfig::builder()
        .listing_url(LISTING)
        .output_path(&out)
        .concurrency(3)
        .progress_callback(callback.clone())
        .build()
        .unwrap();
    Scraper::new(config, &fetcher).run().await.unwrap();

    let indices: Vec<usize> = callback.rows.lock().unwrap().iter().map(|r| r.0).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    let titles: Vec<String> = Dataset::load(&out)
        .await
        .unwrap()
        .songs
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["Slow", "Fast", "Failing"]);
}

// ── Outcome details ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_outcomes_carry_error_details() {
    let dir = tempfile::tempdir().unwrap();
    let out = dataset_path(&dir);
    let fetcher = ScriptedFetcher::default().with(
        LISTING,
        Reply::Body(listing(&[
            ("Gone", "/sheets/gone.pdf", "A", ""),
            ("Page", "/songs/page.html", "B", ""),
        ])),
    );

    #[derive(Default)]
    struct Outcomes(Mutex<Vec<RowOutcome>>);
    impl ScrapeProgressCallback for Outcomes {
        fn on_row_complete(&self, _i: usize, _t: usize, _title: &str, outcome: &RowOutcome) {
            self.0.lock().unwrap().push(outcome.clone());
        }
    }

    let outcomes = Arc::new(Outcomes::default());
    let mut config = config(&out);
    config.progress_callback = Some(outcomes.clone());
    Scraper::new(config, &fetcher).run().await.unwrap();

    let got = outcomes.0.lock().unwrap().clone();
    assert!(matches!(
        &got[0],
        RowOutcome::Degraded(RowError::FetchFailed { attempts: 1, .. })
    ));
    assert!(matches!(
        &got[1],
        RowOutcome::Rejected(ParseError::NotADocument { .. })
    ));
}
