//! Request-scoped inputs to the pipeline.
//!
//! Both types are owned by exactly one request and dropped when its response
//! is built. Uploaded bytes stay in memory; nothing is written to disk except
//! the short-lived OCR hand-off file in [`super::ocr`].

use serde::Deserialize;

/// Text submitted directly, without a file.
#[derive(Debug, Clone, Deserialize)]
pub struct TextSubmission {
    /// Missing is treated the same as empty.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl TextSubmission {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// A single uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename as sent by the client.
    pub filename: String,
    /// Declared media type (`Content-Type` of the multipart part).
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Declared size: the byte length of the payload.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Guess a media type from a file extension.
///
/// Used by the CLI, which has a path rather than a declared type. Unknown
/// extensions map to `application/octet-stream` so the intake validator
/// rejects them with its usual message.
pub fn media_type_for_path(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
