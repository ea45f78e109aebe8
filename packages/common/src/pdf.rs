//! Plain-text extraction from PDF documents.
//!
//! [`extract_text`] never fails: any problem opening or decoding the document
//! is logged and replaced by [`EXTRACTION_FAILED`], so the return value can
//! always be stored and displayed as-is.

use std::path::{Path, PathBuf};

use lopdf::Document;
use thiserror::Error;
use tracing::warn;

/// Text returned in place of the document content when extraction fails.
pub const EXTRACTION_FAILED: &str = "⚠️ Error extracting text from PDF.";

#[derive(Debug, Error)]
enum ExtractError {
    #[error("failed to open document: {0}")]
    Open(#[source] lopdf::Error),
    #[error("failed to read page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: lopdf::Error,
    },
}

/// Extract the text of every page, in page order, each page followed by a newline.
pub fn extract_text(path: &Path) -> String {
    match read_pages(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "PDF text extraction failed");
            EXTRACTION_FAILED.to_string()
        }
    }
}

/// Run [`extract_text`] on the blocking thread pool.
///
/// A panic inside the PDF parser is reported the same way as a parse error.
pub async fn extract_text_blocking(path: PathBuf) -> String {
    let shown = path.display().to_string();
    match tokio::task::spawn_blocking(move || extract_text(&path)).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %shown, error = %e, "PDF text extraction task aborted");
            EXTRACTION_FAILED.to_string()
        }
    }
}

fn read_pages(path: &Path) -> Result<String, ExtractError> {
    let document = Document::load(path).map_err(ExtractError::Open)?;

    let mut text = String::new();
    // `get_pages` is keyed by 1-based page number, already in ascending order.
    for &page in document.get_pages().keys() {
        let page_text = document
            .extract_text(&[page])
            .map_err(|source| ExtractError::Page { page, source })?;
        text.push_str(&page_text);
        text.push('\n');
    }

    Ok(text)
}
