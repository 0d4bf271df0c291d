//! Body cleaning: turn raw PDF text into a displayable song body.
//!
//! Text pulled out of a song sheet starts with a preamble (difficulty,
//! artist, "words & music" credits, book/page references, a "chords used"
//! block), carries the site watermark and URLs, and has ragged blank lines.
//! This module removes all of that and marks every `[chord]` annotation for
//! bold display.
//!
//! ## Rule Order
//!
//! 0. Strip emphasis markers left by a previous run (makes cleaning idempotent)
//! 1. Strip absolute URLs (`http://`, `https://`, `www.`)
//! 2. Strip the watermark phrase, case-insensitive
//! 3. Cut everything up to and including the first "chords used" line, and
//!    drop any later one (multi-page sheets repeat the header)
//! 4. Skip leading blank, one-character and metadata lines
//! 5. Collapse 3+ consecutive newlines to 2
//! 6. Wrap `[...]` annotations in `**`, spaced off from adjacent text
//!
//! Line endings are normalised before rule 0 and the result is trimmed at
//! both ends. Each rule is a `&str → String` function tested on its own.

use crate::config::DEFAULT_WATERMARK;
use once_cell::sync::Lazy;
use regex::Regex;

/// Emphasis delimiter wrapped around chord annotations.
pub const EMPHASIS: &str = "**";

/// Marker line that ends the preamble, matched case-insensitively.
const PREAMBLE_MARKER: &str = "chords used";

/// Lines containing any of these (case-insensitive) before the lyrics start
/// are metadata. The watermark is added per cleaner.
const METADATA_KEYWORDS: [&str; 5] = ["difficulty", "artist", "words & music", "book", "page"];

static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static RE_ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\[\]\n]*\]").unwrap());

static DEFAULT_CLEANER: Lazy<BodyCleaner> = Lazy::new(|| BodyCleaner::new(DEFAULT_WATERMARK).unwrap());

/// Clean `raw` with the default watermark.
///
/// `clean(&clean(x)) == clean(x)` for every input.
pub fn clean(raw: &str) -> String {
    DEFAULT_CLEANER.clean(raw)
}

/// A cleaner for one watermark phrase.
#[derive(Debug, Clone)]
pub struct BodyCleaner {
    watermark: Regex,
    metadata_keywords: Vec<String>,
}

impl BodyCleaner {
    /// Build a cleaner that strips `watermark` (matched literally,
    /// case-insensitive).
    pub fn new(watermark: &str) -> Result<Self, regex::Error> {
        let phrase = watermark.trim();
        let watermark = Regex::new(&format!("(?i){}", regex::escape(phrase)))?;
        let mut metadata_keywords: Vec<String> =
            METADATA_KEYWORDS.iter().map(|k| k.to_string()).collect();
        metadata_keywords.push(phrase.to_lowercase());
        Ok(Self {
            watermark,
            metadata_keywords,
        })
    }

    /// Apply every rule in order.
    pub fn clean(&self, raw: &str) -> String {
        let s = normalise_line_endings(raw);
        let s = strip_emphasis(&s);
        let s = strip_urls(&s);
        let s = self.strip_watermark(&s);
        let s = cut_preamble(&s);
        let s = self.skip_leading_metadata(&s);
        let s = collapse_blank_lines(&s);
        emphasise_annotations(&s).trim().to_string()
    }

    // ── Rule 2: Strip the watermark ──────────────────────────────────────────

    fn strip_watermark(&self, input: &str) -> String {
        self.watermark.replace_all(input, "").to_string()
    }

    // ── Rule 4: Skip leading metadata ────────────────────────────────────────

    fn is_metadata(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.metadata_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Drop lines before the first one that is not blank, not a single
    /// stray character and not metadata. From there on every line is kept,
    /// blank ones included, with trailing whitespace trimmed.
    fn skip_leading_metadata(&self, input: &str) -> String {
        let lines: Vec<&str> = input.lines().collect();
        let start = lines.iter().position(|line| {
            let t = line.trim();
            t.chars().count() > 1 && !self.is_metadata(t)
        });
        match start {
            Some(i) => lines[i..]
                .iter()
                .map(|l| l.trim_end())
                .collect::<Vec<_>>()
                .join("\n"),
            None => String::new(),
        }
    }
}

// ── Line endings ─────────────────────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 0: Strip stray emphasis markers ─────────────────────────────────────

fn strip_emphasis(input: &str) -> String {
    input.replace(EMPHASIS, "")
}

// ── Rule 1: Strip URLs ───────────────────────────────────────────────────────

fn strip_urls(input: &str) -> String {
    RE_URL.replace_all(input, "").to_string()
}

// ── Rule 3: Cut at the "chords used" line ────────────────────────────────────

fn is_preamble_marker(line: &str) -> bool {
    line.to_lowercase().contains(PREAMBLE_MARKER)
}

/// No marker line survives, so a second pass has nothing left to cut.
fn cut_preamble(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    match lines.iter().position(|l| is_preamble_marker(l)) {
        Some(i) => lines[i + 1..]
            .iter()
            .filter(|l| !is_preamble_marker(l))
            .copied()
            .collect::<Vec<_>>()
            .join("\n"),
        None => input.to_string(),
    }
}

// ── Rule 5: Collapse blank lines ─────────────────────────────────────────────

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 6: Emphasise chord annotations ──────────────────────────────────────

/// `[Am]` → `**[Am]**`, with a space inserted wherever the wrapped
/// annotation would touch a letter or digit.
fn emphasise_annotations(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut last = 0;
    for m in RE_ANNOTATION.find_iter(input) {
        out.push_str(&input[last..m.start()]);
        if input[..m.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric)
        {
            out.push(' ');
        }
        out.push_str(EMPHASIS);
        out.push_str(m.as_str());
        out.push_str(EMPHASIS);
        if input[m.end()..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric)
        {
            out.push(' ');
        }
        last = m.end();
    }
    out.push_str(&input[last..]);
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────
