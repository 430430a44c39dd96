//! Extraction dispatch: route a validated upload to its backend.
//!
//! Each backend turns the raw bytes of one format into text or fails with a
//! classified [`SolveError`]. The dispatcher adds one check on top of every
//! backend: the returned text must contain something other than whitespace.
//! The plain-text backend has no emptiness check of its own, so without
//! this an all-blank `.txt` upload would reach the AI backend.

use super::input::UploadedFile;
use super::intake::FileKind;
use super::ocr::{ImageExtractor, OcrEngine};
use super::pdf::PdfExtractor;
use super::text::PlainTextExtractor;
use crate::error::SolveError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// One extraction backend: bytes of a single format in, text out.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, SolveError>;
}

/// Routes uploads to the PDF, image or plain-text backend.
#[derive(Clone)]
pub struct Extractor {
    pdf: PdfExtractor,
    image: ImageExtractor,
    text: PlainTextExtractor,
}

impl Extractor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            pdf: PdfExtractor,
            image: ImageExtractor::new(ocr),
            text: PlainTextExtractor,
        }
    }

    /// Extract text from an upload that has already passed intake.
    ///
    /// A media type with no backend is treated as unsupported; intake
    /// validation should have caught it earlier.
    pub async fn extract(&self, file: UploadedFile) -> Result<String, SolveError> {
        let kind = FileKind::route(&file.media_type).ok_or_else(|| {
            SolveError::UnsupportedFileType {
                media_type: file.media_type.clone(),
            }
        })?;

        let backend: &dyn TextExtractor = match kind {
            FileKind::Pdf => &self.pdf,
            FileKind::Image => &self.image,
            FileKind::PlainText => &self.text,
        };

        info!(
            "Extracting text from '{}' via {} backend ({} bytes)",
            file.filename,
            kind.as_str(),
            file.size()
        );
        let text = backend.extract(file.bytes).await?;

        if text.trim().is_empty() {
            return Err(SolveError::NoTextExtracted {
                from: "the uploaded file",
            });
        }
        debug!("Extracted {} chars", text.len());
        Ok(text)
    }
}
