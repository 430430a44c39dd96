//! Image OCR: mandatory preprocessing followed by text recognition.
//!
//! Every image goes through the same enhancement chain before recognition:
//!
//! ```text
//! decode ──▶ grayscale ──▶ contrast stretch ──▶ unsharp mask ──▶ PNG ──▶ OCR
//! ```
//!
//! The chain is not configurable. Recognition accuracy is the dominant
//! failure mode for photographed papers, and a fixed chain keeps results
//! reproducible for the same input.
//!
//! Recognition itself sits behind [`OcrEngine`]. The production engine is
//! [`TesseractCli`], which hands a temporary PNG to the `tesseract` binary.

use super::extract::TextExtractor;
use super::normalise::normalise_extracted;
use crate::error::SolveError;
use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info};

/// Unsharp-mask blur radius.
const SHARPEN_SIGMA: f32 = 1.0;
/// Minimum brightness difference the unsharp mask will amplify.
const SHARPEN_THRESHOLD: i32 = 2;

/// Text recognition over a preprocessed PNG.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, png: Vec<u8>) -> Result<String, SolveError>;
}

/// Runs the `tesseract` command-line tool.
///
/// `tesseract <file> stdout -l <lang>` prints recognised text on stdout.
/// The PNG lives in a named temp file that is removed when recognition
/// returns.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    cmd: String,
    language: String,
}

impl TesseractCli {
    pub fn new(cmd: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            language: language.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, png: Vec<u8>) -> Result<String, SolveError> {
        let file = tempfile::Builder::new()
            .prefix("qpsolve-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| SolveError::Internal(format!("tempfile: {e}")))?;
        tokio::fs::write(file.path(), &png)
            .await
            .map_err(|e| SolveError::Internal(format!("tempfile write: {e}")))?;

        let output = tokio::process::Command::new(&self.cmd)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| SolveError::OcrEngine(format!("failed to run '{}': {e}", self.cmd)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolveError::OcrEngine(format!(
                "'{}' exited with {}: {}",
                self.cmd,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Decode an image and apply the enhancement chain, returning PNG bytes.
pub fn preprocess(bytes: &[u8]) -> Result<Vec<u8>, SolveError> {
    let img = image::load_from_memory(bytes).map_err(|e| SolveError::ImageUnreadable {
        detail: e.to_string(),
    })?;
    debug!("Decoded image {}x{}", img.width(), img.height());

    let enhanced = enhance(&img);

    let mut buf = Vec::new();
    enhanced
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| SolveError::ImageUnreadable {
            detail: e.to_string(),
        })?;
    Ok(buf)
}

/// Grayscale, stretch to the full 0–255 range, then sharpen edges.
pub fn enhance(img: &DynamicImage) -> DynamicImage {
    let gray = stretch_contrast(img.to_luma8());
    DynamicImage::ImageLuma8(gray).unsharpen(SHARPEN_SIGMA, SHARPEN_THRESHOLD)
}

/// Linear min/max stretch. Uniform images are returned unchanged.
fn stretch_contrast(mut gray: GrayImage) -> GrayImage {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), Luma([v])| (lo.min(*v), hi.max(*v)));
    if min >= max {
        return gray;
    }

    let range = (max - min) as u32;
    for Luma([v]) in gray.pixels_mut() {
        *v = (((*v - min) as u32 * 255 + range / 2) / range) as u8;
    }
    gray
}

/// Extractor for `image/*` uploads.
#[derive(Clone)]
pub struct ImageExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl ImageExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TextExtractor for ImageExtractor {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, SolveError> {
        let png = tokio::task::spawn_blocking(move || preprocess(&bytes))
            .await
            .map_err(|e| SolveError::Internal(format!("image preprocessing task failed: {e}")))??;

        info!("Running OCR on {} byte preprocessed image", png.len());
        let raw = self.engine.recognize(png).await?;

        let text = normalise_extracted(&raw);
        if text.is_empty() {
            return Err(SolveError::NoTextExtracted {
                from: "the uploaded file",
            });
        }
        debug!("OCR recovered {} chars", text.len());
        Ok(text)
    }
}
