//! Error type for the qpsolve library.
//!
//! Every stage of the pipeline fails with a [`SolveError`] whose `Display`
//! string is the message shown to the caller. Stages classify; they never
//! decide a transport status. That translation happens once, in
//! [`crate::server::reply`], using [`SolveError::category`] and the message.
//!
//! The four categories mirror the four kinds of failure a submission can hit:
//!
//! * [`ErrorCategory::Input`]: the submission itself is unusable (empty
//!   text, no file, wrong media type, too large). Never retried.
//! * [`ErrorCategory::Extraction`]: the file was accepted but no text could
//!   be recovered from it. Terminal for the request.
//! * [`ErrorCategory::Ai`]: the AI backend refused or failed. Quota and rate
//!   limit failures are the only transient ones.
//! * [`ErrorCategory::Internal`]: configuration or environment faults
//!   (missing OCR binary, unconfigured provider).

use thiserror::Error;

/// All errors returned by the qpsolve library.
#[derive(Debug, Error)]
pub enum SolveError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Submitted text was empty or whitespace-only.
    #[error("Question text is required")]
    EmptyText,

    /// The upload request carried no file.
    #[error("No file uploaded. Please attach a PDF, image or text file.")]
    MissingFile,

    /// The upload request carried more than one file.
    #[error("Only one file can be uploaded per request")]
    TooManyFiles,

    /// Declared media type is not one of the accepted formats.
    #[error(
        "Unsupported file type: {media_type}. Please upload a PDF, PNG, JPEG or plain-text file."
    )]
    UnsupportedFileType { media_type: String },

    /// Upload exceeds the size ceiling.
    #[error("File too large. Maximum upload size is {limit} bytes.")]
    FileTooLarge { limit: u64 },

    /// The multipart body could not be read.
    #[error("Invalid upload: {0}")]
    MalformedUpload(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The extractor ran but recovered nothing but whitespace.
    ///
    /// `from` completes the sentence: "the PDF", "the uploaded file".
    #[error("No text could be extracted from {from}")]
    NoTextExtracted { from: &'static str },

    /// The PDF could not be parsed (malformed or encrypted).
    #[error("Failed to read PDF: {detail}")]
    PdfUnreadable { detail: String },

    /// The image could not be decoded or preprocessed.
    #[error("Failed to process image: {detail}")]
    ImageUnreadable { detail: String },

    /// A text/plain upload was not valid UTF-8.
    #[error("Text file is not valid UTF-8: {detail}")]
    TextUnreadable { detail: String },

    // ── AI errors ─────────────────────────────────────────────────────────
    /// Readiness pre-check failed; `reason` is the prober's classified reason.
    #[error("AI service is currently unavailable: {reason}")]
    AiUnavailable { reason: String },

    /// Backend rejected the credential.
    #[error("Invalid API key. Please check your AI provider credentials.")]
    InvalidApiKey,

    /// Backend reported an exhausted quota.
    #[error("API quota exceeded. Please try again later.")]
    QuotaExceeded,

    /// Backend refused the operation for this credential.
    #[error("Permission denied. Please check your API key permissions.")]
    PermissionDenied,

    /// Backend throttled the request.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Backend call succeeded but the text was empty.
    #[error("AI model returned empty response")]
    EmptyResponse,

    /// Unrecognised backend failure; carries the backend's own message.
    #[error("Failed to generate solutions: {0}")]
    GenerationFailed(String),

    // ── Internal errors ───────────────────────────────────────────────────
    /// The OCR engine could not be run at all.
    #[error("OCR engine failed: {0}")]
    OcrEngine(String),

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse grouping of [`SolveError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Extraction,
    Ai,
    Internal,
}

impl SolveError {
    /// Which part of the taxonomy this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        use SolveError::*;
        match self {
            EmptyText
            | MissingFile
            | TooManyFiles
            | UnsupportedFileType { .. }
            | FileTooLarge { .. }
            | MalformedUpload(_) => ErrorCategory::Input,
            NoTextExtracted { .. }
            | PdfUnreadable { .. }
            | ImageUnreadable { .. }
            | TextUnreadable { .. } => ErrorCategory::Extraction,
            AiUnavailable { .. }
            | InvalidApiKey
            | QuotaExceeded
            | PermissionDenied
            | RateLimited
            | EmptyResponse
            | GenerationFailed(_) => ErrorCategory::Ai,
            OcrEngine(_) | ProviderNotConfigured { .. } | InvalidConfig(_) | Internal(_) => {
                ErrorCategory::Internal
            }
        }
    }
}
