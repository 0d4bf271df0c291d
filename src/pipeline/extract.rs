//! PDF text extraction.
//!
//! Song sheets are small text PDFs, so extraction works straight from the
//! downloaded bytes with lopdf: no temporary file, no native library. Pages
//! are read in page order and their text concatenated without a separator;
//! line breaks inside a page are kept as lopdf lays them out.
//!
//! A batch run touches thousands of documents and a few will always be
//! broken, so the public [`extract`] never fails: it logs the failure kind
//! and returns an empty string. [`extract_text`] exposes the same work with
//! the failure kept, for callers that need to tell an unreadable PDF apart
//! from an empty one.

use crate::error::ExtractError;
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF";

/// Extract the text of every page, or explain why there is none.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    // The magic may follow a few bytes of junk; readers accept it anywhere
    // in the first kilobyte.
    let head = &bytes[..bytes.len().min(1024)];
    if !head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Err(ExtractError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        });
    }

    // lopdf can panic on hostile input; treat that as corruption.
    panic::catch_unwind(AssertUnwindSafe(|| extract_pages(bytes)))
        .unwrap_or_else(|_| Err(ExtractError::Corrupt("parser panicked".into())))
}

fn extract_pages(bytes: &[u8]) -> Result<String, ExtractError> {
    let document =
        Document::load_mem(bytes).map_err(|e| ExtractError::Corrupt(e.to_string()))?;
    if document.is_encrypted() {
        return Err(ExtractError::Encrypted);
    }

    let pages = document.get_pages();
    let mut text = String::new();
    let mut first_error: Option<String> = None;

    for &page_num in pages.keys() {
        match document.extract_text(&[page_num]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                debug!("page {}: text extraction failed: {}", page_num, e);
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    match first_error {
        Some(e) if text.is_empty() && !pages.is_empty() => Err(ExtractError::Corrupt(e)),
        _ => Ok(text),
    }
}

/// Best-effort extraction: the text of every readable page, or `""`.
pub fn extract(bytes: &[u8]) -> String {
    match extract_text(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF text extraction failed: {}", e);
            String::new()
        }
    }
}
