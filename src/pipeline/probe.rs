//! Readiness probe: one minimal round trip to the AI backend.
//!
//! Used by the health check and as the gate in front of every generation
//! attempt. The result is never cached; each call contacts the backend.
//! The probe never fails; every outcome is reported as a
//! [`ReadinessStatus`].

use super::llm::{AiFailure, ChatBackend, GenerationParams};
use crate::prompts::READINESS_PROMPT;
use tracing::{debug, warn};

/// Outcome of a readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessStatus {
    pub valid: bool,
    /// Human-readable reason when `valid` is false.
    pub reason: Option<String>,
}

impl ReadinessStatus {
    pub fn ready() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Ask the backend for an acknowledgment and report whether it answered.
pub async fn probe(backend: &dyn ChatBackend, max_tokens: usize) -> ReadinessStatus {
    let params = GenerationParams {
        temperature: 0.0,
        max_tokens,
    };

    match backend.complete(READINESS_PROMPT, params).await {
        Ok(reply) if !reply.trim().is_empty() => {
            debug!("AI backend ready");
            ReadinessStatus::ready()
        }
        Ok(_) => {
            warn!("AI backend returned an empty readiness reply");
            ReadinessStatus::not_ready("AI service validation failed: empty response")
        }
        Err(e) => {
            let reason = AiFailure::classify(&e)
                .to_error()
                .map(|err| err.to_string())
                .unwrap_or_else(|| format!("AI service validation failed: {}", e.message));
            warn!("AI backend not ready: {}", reason);
            ReadinessStatus::not_ready(reason)
        }
    }
}
