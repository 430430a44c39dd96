//! PDF text extraction via lopdf.
//!
//! Text is read from each page's content stream; no rasterisation happens,
//! so scanned PDFs without a text layer come back empty and are reported as
//! such. Parsing is CPU-bound and runs in `spawn_blocking`.

use super::extract::TextExtractor;
use super::normalise::normalise_extracted;
use crate::error::SolveError;
use async_trait::async_trait;
use lopdf::Document;
use tracing::{debug, warn};

/// Extractor for `application/pdf` uploads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, SolveError> {
        tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| SolveError::Internal(format!("PDF extraction task failed: {e}")))?
    }
}

/// Parse a PDF from memory and concatenate the text of every page.
///
/// Pages whose text cannot be decoded are skipped with a warning; the
/// document only fails if nothing at all is recovered.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, SolveError> {
    let doc = Document::load_mem(bytes).map_err(|e| SolveError::PdfUnreadable {
        detail: e.to_string(),
    })?;

    let pages = doc.get_pages();
    debug!("PDF has {} pages", pages.len());

    let mut text = String::new();
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => warn!("Failed to extract text from page {}: {}", page_num, e),
        }
    }

    let text = normalise_extracted(&text);
    if text.is_empty() {
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(SolveError::PdfUnreadable {
                detail: "document is encrypted".into(),
            });
        }
        return Err(SolveError::NoTextExtracted { from: "the PDF" });
    }

    debug!("Extracted {} chars from PDF", text.len());
    Ok(text)
}
