//! Plain-text passthrough.
//!
//! The bytes are decoded as UTF-8 and returned untouched. Emptiness is not
//! checked here; the dispatcher applies that check to every backend.

use super::extract::TextExtractor;
use crate::error::SolveError;
use async_trait::async_trait;

/// Extractor for `text/plain` uploads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, SolveError> {
        String::from_utf8(bytes).map_err(|e| SolveError::TextUnreadable {
            detail: e.utf8_error().to_string(),
        })
    }
}
