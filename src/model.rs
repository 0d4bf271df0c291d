//! Record and result types.

use crate::error::{ParseError, RowError};
use serde::{Deserialize, Serialize};

/// Placeholder for a missing book or page reference.
pub const NOT_AVAILABLE: &str = "N/A";

/// Artist used when the listing leaves the column blank.
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Difficulty assumed when the listing does not mention one.
pub const DEFAULT_DIFFICULTY: u8 = 3;

/// Difficulty recorded when the listing mentions one that is not a number.
pub const UNKNOWN_DIFFICULTY: u8 = 0;

/// Upper bound of the normalised difficulty scale.
pub const MAX_DIFFICULTY: u8 = 5;

/// One song in the persisted dataset.
///
/// Optional fields fall back to their documented defaults when missing from
/// a dataset file, so datasets written by older runs still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub title: String,
    #[serde(default = "default_artist")]
    pub artist: String,
    /// 1–5, or [`UNKNOWN_DIFFICULTY`].
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default = "default_location")]
    pub book: String,
    #[serde(default = "default_location")]
    pub page: String,
    /// Absolute URL of the source PDF.
    pub url: String,
    /// Distinct chord tokens, sorted ascending.
    #[serde(default)]
    pub chords: Vec<String>,
    /// Cleaned lyric text with emphasised chord annotations.
    #[serde(default)]
    pub body: String,
}

impl SongRecord {
    /// Whether the body holds enough text that a re-run need not fetch the
    /// PDF again.
    pub fn is_populated(&self, min_body_len: usize) -> bool {
        self.body.trim().chars().count() > min_body_len
    }
}

fn default_artist() -> String {
    UNKNOWN_ARTIST.to_string()
}

fn default_difficulty() -> u8 {
    DEFAULT_DIFFICULTY
}

fn default_location() -> String {
    NOT_AVAILABLE.to_string()
}

/// Listing metadata for one song, before its PDF has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSongRecord {
    pub title: String,
    pub artist: String,
    pub difficulty: u8,
    pub book: String,
    pub page: String,
    pub url: String,
}

impl PartialSongRecord {
    /// Complete the record with the results of PDF processing.
    pub fn into_record(self, chords: Vec<String>, body: String) -> SongRecord {
        SongRecord {
            title: self.title,
            artist: self.artist,
            difficulty: self.difficulty,
            book: self.book,
            page: self.page,
            url: self.url,
            chords,
            body,
        }
    }

    /// A record with no body and no chords, for PDFs that could not be used.
    pub fn into_degraded(self) -> SongRecord {
        self.into_record(Vec::new(), String::new())
    }
}

/// What happened to one listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOutcome {
    /// PDF fetched, text extracted and cleaned.
    Populated,
    /// A previous run already populated this song; PDF not fetched.
    Resumed,
    /// Record kept with empty body and chords.
    Degraded(RowError),
    /// Row left out of the dataset.
    Rejected(ParseError),
}

impl RowOutcome {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            RowOutcome::Populated => "populated",
            RowOutcome::Resumed => "resumed",
            RowOutcome::Degraded(_) => "degraded",
            RowOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Data rows in the listing table.
    pub total_rows: usize,
    pub populated: usize,
    pub resumed: usize,
    pub degraded: usize,
    pub rejected: usize,
    /// Records in the final dataset file.
    pub persisted: usize,
    /// The run was stopped before every row was processed.
    pub interrupted: bool,
    pub duration_ms: u64,
}

impl RunSummary {
    /// Rows that reached an outcome.
    pub fn processed(&self) -> usize {
        self.populated + self.resumed + self.degraded + self.rejected
    }

    pub(crate) fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Populated => self.populated += 1,
            RowOutcome::Resumed => self.resumed += 1,
            RowOutcome::Degraded(_) => self.degraded += 1,
            RowOutcome::Rejected(_) => self.rejected += 1,
        }
    }
}
