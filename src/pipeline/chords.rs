//! Chord token recognition.
//!
//! A chord token is a root note `A`–`G`, an optional accidental (`#`/`b`),
//! an optional quality (`maj`, `min`, `m`, `sus`, `add`, `dim`, `aug`, `7`)
//! and an optional trailing digit: `Am`, `G7`, `Bb`, `Csus4`, `C#dim7`.
//!
//! ## Open grammar, no allow-list
//!
//! Every token that satisfies the grammar is accepted. This recognises rare
//! chords that no fixed list would carry, at the price of false positives:
//! an ordinary word that happens to fit the grammar, such as the article
//! "A", is reported as a chord in a full-text scan. The annotation scan
//! ([`find_bracketed_chords`]) avoids most of these because song sheets put
//! chords in brackets.
//!
//! Tokens are whole words: text is split on every character that is not
//! ASCII alphanumeric or `#`, so `Go`, `Bad` and `Amazing` never match and
//! `C#` is kept intact.

use crate::config::ChordScan;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_CHORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-G](?:#|b)?(?:maj|min|m|sus|add|dim|aug|7)?[0-9]?$").unwrap()
});

static RE_ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]\n]*)\]").unwrap());

/// Annotations this long or longer are stage directions, not chords.
const MAX_ANNOTATION_LEN: usize = 10;

/// Whether `token` is a chord by the grammar.
pub fn is_chord(token: &str) -> bool {
    RE_CHORD.is_match(token)
}

/// All distinct chord tokens in `text`, sorted ascending.
///
/// Identity is case-insensitive; the first spelling seen is kept.
pub fn find_chords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut chords: Vec<String> = text
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
        .filter(|t| is_chord(t))
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect();
    chords.sort();
    chords
}

/// Chord tokens written inside `[...]` annotations.
///
/// Slash bass notes are dropped (`[G/B]` → `G`) and `*` markers removed.
pub fn find_bracketed_chords(text: &str) -> Vec<String> {
    let candidates: Vec<String> = RE_ANNOTATION
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|inner| inner.chars().count() < MAX_ANNOTATION_LEN)
        .map(|inner| inner.split('/').next().unwrap_or("").replace('*', ""))
        .collect();
    find_chords(&candidates.join(" "))
}

/// Chords for one song according to the configured scan mode.
///
/// Text without any annotation is scanned in full in either mode.
pub fn chords_for(text: &str, scan: ChordScan) -> Vec<String> {
    match scan {
        ChordScan::Annotations if RE_ANNOTATION.is_match(text) => find_bracketed_chords(text),
        _ => find_chords(text),
    }
}
