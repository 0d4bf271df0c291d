//! Listing page parsing: the song table and its rows.
//!
//! The listing is an HTML page with one table. After the header row, every
//! row holds `[title-link, artist, free-text metadata]`; extra columns are
//! ignored. Parsing happens in two steps so each can be tested on its own:
//!
//! 1. [`parse_listing`] turns the HTML into plain [`ListingRow`]s. A page
//!    without a table is fatal for the run.
//! 2. [`parse_row`] turns one row into a [`PartialSongRecord`], or rejects
//!    the row with a [`ParseError`] that the caller logs before moving on.

use crate::error::{ParseError, ScrapeError};
use crate::model::{
    PartialSongRecord, DEFAULT_DIFFICULTY, MAX_DIFFICULTY, NOT_AVAILABLE, UNKNOWN_ARTIST,
    UNKNOWN_DIFFICULTY,
};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Cells a row needs: title-link, artist, metadata.
pub const REQUIRED_CELLS: usize = 3;

/// File extensions accepted as song documents.
const DOCUMENT_EXTENSIONS: [&str; 1] = [".pdf"];

/// One table cell: its visible text and the first link it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingCell {
    /// Whitespace-normalised text content.
    pub text: String,
    /// `href` of the first `<a>` in the cell.
    pub href: Option<String>,
    /// Text of that link, whitespace-normalised.
    pub link_text: Option<String>,
}

impl ListingCell {
    /// A cell with text only.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A cell holding a single link.
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            link_text: Some(text.clone()),
            text,
            href: Some(href.into()),
        }
    }
}

/// One data row of the listing table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRow {
    pub cells: Vec<ListingCell>,
}

// ── Table extraction ─────────────────────────────────────────────────────

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Extract the data rows of the first table on the page.
///
/// The first row is the header and is skipped.
pub fn parse_listing(html: &str, listing_url: &str) -> Result<Vec<ListingRow>, ScrapeError> {
    let document = Html::parse_document(html);
    let table = document
        .select(&selector("table"))
        .next()
        .ok_or_else(|| ScrapeError::NoTable {
            url: listing_url.to_string(),
        })?;

    let link = selector("a[href]");
    let rows: Vec<ListingRow> = table
        .select(&selector("tr"))
        .skip(1)
        .map(|tr| ListingRow {
            cells: tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| matches!(el.value().name(), "td" | "th"))
                .map(|cell| read_cell(cell, &link))
                .collect(),
        })
        .collect();

    debug!("Listing table has {} data rows", rows.len());
    Ok(rows)
}

fn read_cell(cell: ElementRef<'_>, link: &Selector) -> ListingCell {
    let anchor = cell.select(link).next();
    ListingCell {
        text: normalize_ws(cell.text()),
        href: anchor
            .and_then(|a| a.value().attr("href"))
            .map(|h| h.trim().to_string()),
        link_text: anchor.map(|a| normalize_ws(a.text())),
    }
}

fn normalize_ws<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Row parsing ──────────────────────────────────────────────────────────

static RE_DIFFICULTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bdifficulty\b\s*[:\-]?\s*(\w+)").unwrap());
static RE_BOOK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bbook\b\s*[:\-]?\s*(\w+)").unwrap());
static RE_PAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpages?\b\s*[:\-]?\s*(\w+)").unwrap());

/// Metadata labels. A label followed directly by another one has no value.
const METADATA_LABELS: [&str; 4] = ["difficulty", "book", "page", "pages"];

/// Turn one listing row into typed metadata.
///
/// `url` is resolved against `base_url`. Missing artist, difficulty, book
/// and page fall back to their defaults; a missing link or a link that is
/// not a document rejects the row.
pub fn parse_row(row: &ListingRow, base_url: &Url) -> Result<PartialSongRecord, ParseError> {
    if row.cells.len() < REQUIRED_CELLS {
        return Err(ParseError::MissingColumns {
            found: row.cells.len(),
            expected: REQUIRED_CELLS,
        });
    }
    let (title_cell, artist_cell, meta_cell) = (&row.cells[0], &row.cells[1], &row.cells[2]);

    let href = title_cell
        .href
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or(ParseError::MissingLink)?;
    let url = resolve_url(base_url, href)?;
    if !is_document(&url) {
        return Err(ParseError::NotADocument {
            href: href.to_string(),
        });
    }

    let title = title_cell
        .link_text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(title_cell.text.as_str())
        .trim()
        .to_string();
    if title.is_empty() {
        return Err(ParseError::EmptyTitle);
    }

    let artist = match artist_cell.text.trim() {
        "" => UNKNOWN_ARTIST.to_string(),
        a => a.to_string(),
    };

    let meta = meta_cell.text.as_str();
    let difficulty = capture(&RE_DIFFICULTY, meta)
        .map(normalize_difficulty)
        .unwrap_or(DEFAULT_DIFFICULTY);
    let book = capture(&RE_BOOK, meta).unwrap_or(NOT_AVAILABLE).to_string();
    let page = capture(&RE_PAGE, meta).unwrap_or(NOT_AVAILABLE).to_string();

    Ok(PartialSongRecord {
        title,
        artist,
        difficulty,
        book,
        page,
        url: url.to_string(),
    })
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|v| !METADATA_LABELS.iter().any(|l| v.eq_ignore_ascii_case(l)))
}

/// Resolve a possibly-relative link against the listing URL.
pub fn resolve_url(base_url: &Url, href: &str) -> Result<Url, ParseError> {
    base_url.join(href).map_err(|e| ParseError::InvalidUrl {
        href: href.to_string(),
        reason: e.to_string(),
    })
}

fn is_document(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    DOCUMENT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Normalise a raw difficulty to the 1–5 scale.
///
/// Sources grade on 1–5 or 1–10. Values above 5 are taken to be on the
/// 10-point scale: halved, rounded, then clamped. A value that is not a
/// number becomes [`UNKNOWN_DIFFICULTY`], which is distinct from any real
/// grade.
pub fn normalize_difficulty(raw: &str) -> u8 {
    let max = i64::from(MAX_DIFFICULTY);
    match raw.trim().parse::<i64>() {
        Err(_) => UNKNOWN_DIFFICULTY,
        Ok(n) if n > max => ((n as f64 / 2.0).round() as i64).clamp(1, max) as u8,
        Ok(n) => n.clamp(1, max) as u8,
    }
}
