//! Request flows: the two ways a paper enters the pipeline.
//!
//! Both flows are synchronous end to end. A submission is validated, the AI
//! backend is probed, text is extracted if needed, and solutions are
//! generated, all inside one call. Nothing outlives the call.
//!
//! ```text
//! text flow:  shape ──▶ probe ──▶ generate
//! file flow:  one file ──▶ probe ──▶ intake ──▶ extract ──▶ generate
//! ```
//!
//! Failures come back as [`SolveError`]; turning them into a transport
//! status is left to [`crate::server::reply`].

use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::output::{FileSolution, HealthReport, JobStatus, TextSolution, MANUAL_INPUT_FILENAME};
use crate::pipeline::extract::Extractor;
use crate::pipeline::generate::generate_solutions;
use crate::pipeline::input::{TextSubmission, UploadedFile};
use crate::pipeline::intake;
use crate::pipeline::llm::{ChatBackend, LlmBackend};
use crate::pipeline::ocr::{OcrEngine, TesseractCli};
use crate::pipeline::probe::{probe, ReadinessStatus};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The pipeline, wired to one AI backend and one OCR engine.
///
/// Built once per process and shared behind an `Arc`; every method takes
/// `&self` and keeps no per-request state.
pub struct Solver {
    backend: Arc<dyn ChatBackend>,
    extractor: Extractor,
    config: SolverConfig,
}

impl Solver {
    /// Wire a solver from explicit collaborators.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        ocr: Arc<dyn OcrEngine>,
        config: SolverConfig,
    ) -> Self {
        Self {
            backend,
            extractor: Extractor::new(ocr),
            config,
        }
    }

    /// Resolve the LLM provider and tesseract engine from `config`.
    pub fn from_config(config: SolverConfig) -> Result<Self, SolveError> {
        let backend = LlmBackend::from_config(&config)?;
        let ocr = TesseractCli::new(config.tesseract_cmd.clone(), config.ocr_language.clone());
        Ok(Self::new(Arc::new(backend), Arc::new(ocr), config))
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Probe the AI backend once.
    pub async fn readiness(&self) -> ReadinessStatus {
        probe(self.backend.as_ref(), self.config.probe_max_tokens).await
    }

    /// Health check: a fresh readiness probe, shaped for reporting.
    pub async fn health(&self) -> HealthReport {
        let status = self.readiness().await;
        HealthReport {
            status: if status.valid { "ok" } else { "degraded" }.to_string(),
            ai_connected: status.valid,
            api_error: status.reason,
            timestamp: Utc::now(),
        }
    }

    /// Text flow: solve a paper whose text the caller already has.
    pub async fn solve_text(&self, submission: TextSubmission) -> Result<TextSolution, SolveError> {
        let start = Instant::now();
        if submission.text.trim().is_empty() {
            return Err(SolveError::EmptyText);
        }
        let filename = submission
            .filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| MANUAL_INPUT_FILENAME.to_string());
        info!("Text submission '{}' ({} chars)", filename, submission.text.len());

        self.ensure_ready().await?;
        let solutions =
            generate_solutions(self.backend.as_ref(), &submission.text, &self.config).await?;

        info!(
            "Solved '{}' in {}ms",
            filename,
            start.elapsed().as_millis()
        );
        Ok(TextSolution {
            success: true,
            extracted_text: submission.text,
            solutions,
            filename,
            processed_at: Utc::now(),
        })
    }

    /// File flow: solve a paper from exactly one uploaded file.
    pub async fn solve_file(&self, mut files: Vec<UploadedFile>) -> Result<FileSolution, SolveError> {
        let start = Instant::now();
        let file = match files.len() {
            0 => return Err(SolveError::MissingFile),
            1 => files.remove(0),
            n => {
                warn!("Rejecting upload with {} files", n);
                return Err(SolveError::TooManyFiles);
            }
        };
        info!(
            "File submission '{}' ({}, {} bytes)",
            file.filename,
            file.media_type,
            file.size()
        );

        self.ensure_ready().await?;
        intake::validate(&file.media_type, file.size(), self.config.max_upload_bytes)?;

        let filename = file.filename.clone();
        let media_type = file.media_type.clone();
        let extracted_text = self.extractor.extract(file).await?;
        info!("Extracted {} chars from '{}'", extracted_text.len(), filename);

        let solutions =
            generate_solutions(self.backend.as_ref(), &extracted_text, &self.config).await?;

        info!(
            "Solved '{}' in {}ms",
            filename,
            start.elapsed().as_millis()
        );
        Ok(FileSolution {
            success: true,
            filename,
            file_type: media_type,
            extracted_text,
            solutions,
            processed_at: Utc::now(),
        })
    }

    /// Job status probe.
    ///
    /// Non-functional: submissions are never queued, so every identifier is
    /// reported as complete. Kept for clients that poll after submitting.
    pub fn job_status(&self, job_id: &str) -> JobStatus {
        JobStatus {
            job_id: job_id.to_string(),
            status: "completed".to_string(),
            progress: 100,
        }
    }

    /// Gate generation on a fresh readiness probe.
    async fn ensure_ready(&self) -> Result<(), SolveError> {
        let status = self.readiness().await;
        if status.valid {
            return Ok(());
        }
        Err(SolveError::AiUnavailable {
            reason: status
                .reason
                .unwrap_or_else(|| "AI service validation failed".to_string()),
        })
    }
}
