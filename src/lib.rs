//! # qpsolve
//!
//! Turn a question paper into step-by-step worked solutions with an LLM.
//!
//! ## Why this crate?
//!
//! Papers arrive in whatever form a student has at hand: typed text, a PDF
//! export, or a phone photo of a printed sheet. This crate recovers the text
//! from each of those, checks that the AI backend is answering, and asks it
//! to work every question the way a tutor would, ending each one with a
//! clearly marked final answer.
//!
//! ## Pipeline Overview
//!
//! ```text
//! submission
//!  │
//!  ├─ 1. Probe     one tiny round trip to the AI backend
//!  ├─ 2. Intake    media-type and size policy (PDF, PNG, JPEG, text; 10 MiB)
//!  ├─ 3. Extract   lopdf for PDFs, tesseract for images, UTF-8 for text
//!  ├─ 4. Generate  tutoring prompt → step-by-step solutions
//!  └─ 5. Reply     success shape, or a classified failure with retry hint
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qpsolve::{Solver, SolverConfig, TextSubmission};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from EDGEQUAKE_LLM_PROVIDER / GEMINI_API_KEY / …
//!     let solver = Solver::from_config(SolverConfig::default())?;
//!     let out = solver.solve_text(TextSubmission::new("Q1. Solve 2x + 3 = 11")).await?;
//!     println!("{}", out.solutions);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `qpsolve` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! The HTTP surface ([`server`]) is part of the library so it can be mounted
//! and tested without the binary.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod solve;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SolverConfig, SolverConfigBuilder, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{ErrorCategory, SolveError};
pub use output::{FileSolution, HealthReport, JobStatus, TextSolution, MANUAL_INPUT_FILENAME};
pub use pipeline::input::{media_type_for_path, TextSubmission, UploadedFile};
pub use pipeline::llm::{BackendError, ChatBackend, GenerationParams, LlmBackend};
pub use pipeline::ocr::{OcrEngine, TesseractCli};
pub use pipeline::probe::ReadinessStatus;
pub use solve::Solver;
