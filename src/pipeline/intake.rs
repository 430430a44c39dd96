//! Intake validation: accept or reject an upload before any extraction work.
//!
//! Policy looks only at the declared media type and byte size, and runs
//! synchronously without touching the payload.

use crate::error::SolveError;
use tracing::debug;

/// Media types the image extractor accepts.
pub const IMAGE_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// Every media type the intake validator accepts.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/jpg",
    "text/plain",
];

/// The three formats the pipeline can extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
    PlainText,
}

impl FileKind {
    /// Route a media type to an extractor family.
    ///
    /// Broader than [`validate`]: any `image/*` routes to the image
    /// extractor. Validation must already have narrowed the type.
    pub fn route(media_type: &str) -> Option<FileKind> {
        let mt = essence(media_type);
        if mt == "application/pdf" {
            Some(FileKind::Pdf)
        } else if mt.starts_with("image/") {
            Some(FileKind::Image)
        } else if mt == "text/plain" {
            Some(FileKind::PlainText)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Image => "image",
            FileKind::PlainText => "text",
        }
    }
}

/// Lower-cased media type without parameters (`text/plain; charset=utf-8`
/// → `text/plain`).
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Decide whether an upload may proceed to extraction.
///
/// The size ceiling is checked first and applies to every type.
pub fn validate(media_type: &str, size: u64, limit: u64) -> Result<FileKind, SolveError> {
    if size > limit {
        debug!("Rejecting {} byte upload (limit {})", size, limit);
        return Err(SolveError::FileTooLarge { limit });
    }

    let mt = essence(media_type);
    let kind = match mt.as_str() {
        "application/pdf" => FileKind::Pdf,
        m if IMAGE_MEDIA_TYPES.contains(&m) => FileKind::Image,
        "text/plain" => FileKind::PlainText,
        _ => {
            return Err(SolveError::UnsupportedFileType {
                media_type: media_type.to_string(),
            })
        }
    };

    debug!("Accepted {} upload ({} bytes)", kind.as_str(), size);
    Ok(kind)
}
