//! Pipeline stages for building the song dataset.
//!
//! Each submodule implements exactly one transformation step and is
//! independently testable. [`crate::scrape`] strings them together.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ listing ──▶ fetch ──▶ extract ──▶ chords + clean
//! (HTML)    (rows)      (PDF)     (text)      (record)
//! ```
//!
//! 1. [`fetch`]: HTTP downloads with retry/backoff; the only stage with
//!    network I/O
//! 2. [`listing`]: find the song table and turn each row into typed metadata
//! 3. [`extract`]: best-effort PDF text extraction
//! 4. [`chords`]: chord token recognition
//! 5. [`clean`]: deterministic text cleanup of the extracted body

pub mod chords;
pub mod clean;
pub mod extract;
pub mod fetch;
pub mod listing;
