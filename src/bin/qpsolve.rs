//! CLI binary for qpsolve.
//!
//! A thin shim over the library crate: `serve` mounts the HTTP surface,
//! `solve` runs one submission through the same flows, `health` probes the
//! AI backend once.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use qpsolve::server::{self, AppState};
use qpsolve::{media_type_for_path, Solver, SolverConfig, TextSubmission, UploadedFile};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on port 3000
  qpsolve serve --port 3000

  # Solve a scanned paper and print the solutions
  qpsolve solve scan.jpg

  # Solve typed questions from stdin, JSON output
  echo "Q1. Solve 2x + 3 = 11" | qpsolve solve - --json

  # Check that the AI backend answers
  qpsolve health

PROVIDERS:
  Resolved in order: --provider/--model, EDGEQUAKE_LLM_PROVIDER + EDGEQUAKE_MODEL,
  GEMINI_API_KEY (gemini-2.0-flash), then any key edgequake-llm can detect
  (OPENAI_API_KEY, ANTHROPIC_API_KEY, ...).

OCR:
  Images are read with the tesseract binary, which must be on PATH
  (or pass --tesseract-cmd). Language data for --ocr-lang must be installed.
"#;

/// Turn question papers into step-by-step solutions with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "qpsolve",
    version,
    about = "Turn question papers into step-by-step solutions with an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    solver: SolverArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "QPSOLVE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "QPSOLVE_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SolverArgs {
    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-mini).
    #[arg(long, global = true, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, global = true, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "QPSOLVE_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens for the solutions.
    #[arg(long, global = true, env = "QPSOLVE_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Largest accepted upload, in bytes.
    #[arg(
        long,
        global = true,
        env = "QPSOLVE_MAX_UPLOAD_BYTES",
        default_value_t = qpsolve::DEFAULT_MAX_UPLOAD_BYTES
    )]
    max_upload_bytes: u64,

    /// Tesseract language code.
    #[arg(long, global = true, env = "QPSOLVE_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Tesseract executable.
    #[arg(long, global = true, env = "QPSOLVE_TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to bind.
        #[arg(long, env = "QPSOLVE_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on.
        #[arg(short, long, env = "QPSOLVE_PORT", default_value_t = 3000)]
        port: u16,
    },

    /// Solve one paper: a PDF, PNG, JPEG or text file, or `-` for stdin.
    Solve {
        input: String,

        /// Print the full result as JSON instead of the solutions alone.
        #[arg(long, env = "QPSOLVE_JSON")]
        json: bool,
    },

    /// Probe the AI backend and print the health report as JSON.
    Health,
}

impl SolverArgs {
    fn to_config(&self) -> Result<SolverConfig> {
        let mut builder = SolverConfig::builder()
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .max_upload_bytes(self.max_upload_bytes)
            .ocr_language(self.ocr_lang.clone())
            .tesseract_cmd(self.tesseract_cmd.clone());
        if let Some(ref model) = self.model {
            builder = builder.model(model.clone());
        }
        if let Some(ref provider) = self.provider {
            builder = builder.provider_name(provider.clone());
        }
        builder.build().context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the only feedback a one-shot solve needs, so library
    // INFO logs stay off while it runs.
    let show_progress = matches!(cli.command, Command::Solve { json: false, .. }) && !cli.quiet;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.solver.to_config()?;
    tracing::debug!("{:?}", config);
    let solver = Arc::new(Solver::from_config(config).context("Failed to set up the AI backend")?);

    match cli.command {
        Command::Serve { host, port } => {
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("Invalid listen address {host}:{port}"))?;
            server::listen(addr, AppState::new(solver))
                .await
                .context("HTTP server failed")?;
        }
        Command::Solve { input, json } => {
            let spinner = if show_progress {
                Some(spinner(&input))
            } else {
                None
            };
            let result = solve(&solver, &input).await;
            if let Some(bar) = spinner {
                bar.finish_and_clear();
            }
            let (solutions, value) = result?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).context("Failed to serialize result")?
                );
            } else {
                println!("{solutions}");
            }
        }
        Command::Health => {
            let report = solver.health().await;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
            if !report.ai_connected {
                bail!("AI backend is not connected");
            }
        }
    }

    Ok(())
}

/// Run one submission. Returns the solutions text and the full result.
async fn solve(solver: &Solver, input: &str) -> Result<(String, serde_json::Value)> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        let out = solver.solve_text(TextSubmission::new(text)).await?;
        let value = serde_json::to_value(&out).context("Failed to serialize result")?;
        return Ok((out.solutions, value));
    }

    let path = Path::new(input);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string());
    let file = UploadedFile::new(filename, media_type_for_path(path), bytes);

    let out = solver.solve_file(vec![file]).await?;
    let value = serde_json::to_value(&out).context("Failed to serialize result")?;
    Ok((out.solutions, value))
}

fn spinner(input: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("qpsolve");
    bar.set_message(if input == "-" {
        "solving stdin…".to_string()
    } else {
        format!("solving {input}…")
    });
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
