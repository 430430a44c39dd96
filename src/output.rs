//! Success shapes returned by the orchestrator.
//!
//! These serialise with camelCase field names, which is what the HTTP
//! surface and `qpsolve solve --json` emit verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filename reported for text submitted without one.
pub const MANUAL_INPUT_FILENAME: &str = "Manual Input";

/// Result of the text flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSolution {
    pub success: bool,
    pub extracted_text: String,
    pub solutions: String,
    pub filename: String,
    pub processed_at: DateTime<Utc>,
}

/// Result of the file flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSolution {
    pub success: bool,
    pub filename: String,
    /// Declared media type of the upload.
    pub file_type: String,
    pub extracted_text: String,
    pub solutions: String,
    pub processed_at: DateTime<Utc>,
}

/// Health-check report. Built fresh on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// "ok" when the AI backend answered, "degraded" otherwise.
    pub status: String,
    pub ai_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Job status probe response.
///
/// There is no job tracking behind this: every submission completes inside
/// its own request, so any identifier reports as finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub job_id: String,
    pub status: String,
    pub progress: u8,
}
