//! Configuration for the question-paper solving pipeline.
//!
//! All pipeline behaviour is controlled through [`SolverConfig`], built via
//! its [`SolverConfigBuilder`]. The config is read once at start-up; nothing
//! in it changes while requests are being served.

use crate::error::SolveError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Shared upload ceiling for every accepted format: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration for the solving pipeline.
///
/// # Example
/// ```rust
/// use qpsolve::SolverConfig;
///
/// let config = SolverConfig::builder()
///     .model("gemini-2.0-flash")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
/// ```
#[derive(Clone)]
pub struct SolverConfig {
    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-mini".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for solution generation. Default: 0.2.
    ///
    /// Tutoring output should be the same for the same paper; keep this low.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate for one paper. Default: 8192.
    ///
    /// A full paper with worked steps for every question regularly runs past
    /// 4 000 tokens; a low cap truncates the last answers.
    pub max_tokens: usize,

    /// Output cap for the readiness round trip. Default: 16.
    pub probe_max_tokens: usize,

    /// Upload size ceiling in bytes, shared by all formats. Default: 10 MiB.
    pub max_upload_bytes: u64,

    /// Tesseract language code. Default: "eng".
    pub ocr_language: String,

    /// Tesseract executable name or path. Default: "tesseract".
    pub tesseract_cmd: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 8192,
            probe_max_tokens: 16,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ocr_language: "eng".to_string(),
            tesseract_cmd: "tesseract".to_string(),
        }
    }
}

impl fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("probe_max_tokens", &self.probe_max_tokens)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .finish()
    }
}

impl SolverConfig {
    /// Create a new builder for `SolverConfig`.
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SolverConfig`].
#[derive(Debug)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn probe_max_tokens(mut self, n: usize) -> Self {
        self.config.probe_max_tokens = n.max(1);
        self
    }

    pub fn max_upload_bytes(mut self, n: u64) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SolverConfig, SolveError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(SolveError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(SolveError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(SolveError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
