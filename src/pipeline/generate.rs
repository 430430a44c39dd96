//! Solution generation: paper text in, step-by-step solutions out.
//!
//! The prompt lives in [`crate::prompts`] and failure classification in
//! [`super::llm`]. This module decides only what counts as a usable answer.

use super::llm::{AiFailure, ChatBackend, GenerationParams};
use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::prompts::solution_prompt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate solutions for a question paper.
///
/// Empty or whitespace-only text is rejected without contacting the backend.
/// A successful call that returns only whitespace is treated as a failure.
pub async fn generate_solutions(
    backend: &dyn ChatBackend,
    text: &str,
    config: &SolverConfig,
) -> Result<String, SolveError> {
    if text.trim().is_empty() {
        return Err(SolveError::EmptyText);
    }

    let prompt = solution_prompt(text);
    let params = build_params(config);
    debug!("Solution prompt is {} chars", prompt.len());

    let start = Instant::now();
    let reply = backend.complete(&prompt, params).await.map_err(|e| {
        let kind = AiFailure::classify(&e);
        warn!("Generation failed ({:?}): {}", kind, e.message);
        kind.to_error()
            .unwrap_or_else(|| SolveError::GenerationFailed(e.message.clone()))
    })?;

    if reply.trim().is_empty() {
        warn!("AI backend returned an empty solution");
        return Err(SolveError::EmptyResponse);
    }

    info!(
        "Generated {} chars of solutions in {}ms",
        reply.len(),
        start.elapsed().as_millis()
    );
    Ok(reply)
}

/// Sampling parameters for solution generation.
fn build_params(config: &SolverConfig) -> GenerationParams {
    GenerationParams {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}
