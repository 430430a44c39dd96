//! AI backend access: the chat seam, provider resolution and failure
//! classification.
//!
//! The pipeline talks to the AI backend through [`ChatBackend`], a single
//! prompt-in / text-out call. [`LlmBackend`] implements it over an
//! `edgequake-llm` provider. The backend is created once per process and
//! shared by reference; nothing here re-initialises it.
//!
//! ## Failure classification
//!
//! Provider failures are reduced to five caller-facing categories
//! ([`AiFailure`]). Classification looks at structured fields first:
//!
//! 1. `code`: a provider error code such as `API_KEY_INVALID`
//! 2. `status`: the HTTP status of the failed call
//! 3. `message`: case-insensitive substring match, as a last resort
//!
//! `edgequake-llm` surfaces provider errors as display strings, so
//! [`BackendError::from_message`] recovers whatever code and status the
//! provider embedded in its message. Providers that reword their errors can
//! still fall through to the substring rules or to [`AiFailure::Other`].

use crate::config::SolverConfig;
use crate::error::SolveError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Model used when the provider is picked from `GEMINI_API_KEY` and no model
/// was configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Sampling parameters for one backend call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A failed backend call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    /// HTTP status of the failed call, when known.
    pub status: Option<u16>,
    /// Provider error code, when known.
    pub code: Option<String>,
    pub message: String,
}

static PROVIDER_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(API_KEY_INVALID|UNAUTHENTICATED|PERMISSION_DENIED|RESOURCE_EXHAUSTED|QUOTA_EXCEEDED|RATE_LIMIT_EXCEEDED|invalid_api_key|insufficient_quota|rate_limit_exceeded)\b",
    )
    .expect("valid regex")
});

static HTTP_STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:status|http|code)\b\D{0,3}([45]\d\d)\b").expect("valid regex")
});

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Build an error from a provider's display string, lifting any embedded
    /// error code or HTTP status into the structured fields.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let code = PROVIDER_CODE
            .captures(&message)
            .map(|c| c[1].to_string());
        let status = HTTP_STATUS
            .captures(&message)
            .and_then(|c| c[1].parse().ok());
        Self {
            status,
            code,
            message,
        }
    }
}

/// Caller-facing categories of AI backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiFailure {
    InvalidCredential,
    QuotaExceeded,
    PermissionDenied,
    RateLimited,
    Other,
}

impl AiFailure {
    /// Classify a backend failure: code, then status, then message text.
    pub fn classify(err: &BackendError) -> AiFailure {
        if let Some(kind) = err.code.as_deref().and_then(Self::from_code) {
            return kind;
        }
        let lower = err.message.to_lowercase();
        // Gemini reports both quota and throttling as RESOURCE_EXHAUSTED / 429.
        let status = match err.code.as_deref() {
            Some("RESOURCE_EXHAUSTED") => Some(429),
            _ => err.status,
        };
        if let Some(status) = status {
            match status {
                401 => return AiFailure::InvalidCredential,
                403 => return AiFailure::PermissionDenied,
                429 if lower.contains("quota") => return AiFailure::QuotaExceeded,
                429 => return AiFailure::RateLimited,
                _ => {}
            }
        }
        Self::from_text(&lower)
    }

    fn from_code(code: &str) -> Option<AiFailure> {
        match code {
            "API_KEY_INVALID" | "UNAUTHENTICATED" | "invalid_api_key" => {
                Some(AiFailure::InvalidCredential)
            }
            "QUOTA_EXCEEDED" | "insufficient_quota" => Some(AiFailure::QuotaExceeded),
            "PERMISSION_DENIED" => Some(AiFailure::PermissionDenied),
            "RATE_LIMIT_EXCEEDED" | "rate_limit_exceeded" => Some(AiFailure::RateLimited),
            _ => None,
        }
    }

    fn from_text(lower: &str) -> AiFailure {
        if lower.contains("api key not valid")
            || lower.contains("invalid api key")
            || lower.contains("incorrect api key")
        {
            AiFailure::InvalidCredential
        } else if lower.contains("quota") {
            AiFailure::QuotaExceeded
        } else if lower.contains("permission denied") || lower.contains("permission_denied") {
            AiFailure::PermissionDenied
        } else if lower.contains("rate limit")
            || lower.contains("rate-limit")
            || lower.contains("too many requests")
        {
            AiFailure::RateLimited
        } else {
            AiFailure::Other
        }
    }

    /// The classified error, or `None` for [`AiFailure::Other`] so each
    /// caller can wrap unrecognised failures its own way.
    pub fn to_error(self) -> Option<SolveError> {
        match self {
            AiFailure::InvalidCredential => Some(SolveError::InvalidApiKey),
            AiFailure::QuotaExceeded => Some(SolveError::QuotaExceeded),
            AiFailure::PermissionDenied => Some(SolveError::PermissionDenied),
            AiFailure::RateLimited => Some(SolveError::RateLimited),
            AiFailure::Other => None,
        }
    }
}

/// Prompt-in, text-out access to the AI backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, prompt: &str, params: GenerationParams)
        -> Result<String, BackendError>;
}

/// [`ChatBackend`] over an `edgequake-llm` provider.
#[derive(Clone)]
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
}

impl LlmBackend {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the provider from `config` and wrap it.
    pub fn from_config(config: &SolverConfig) -> Result<Self, SolveError> {
        Ok(Self::new(resolve_provider(config)?))
    }
}

#[async_trait]
impl ChatBackend for LlmBackend {
    async fn complete(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, BackendError> {
        let messages = vec![ChatMessage::user(prompt)];
        let options = CompletionOptions {
            temperature: Some(params.temperature),
            max_tokens: Some(params.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| BackendError::from_message(e.to_string()))?;

        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SolveError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        SolveError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Model for a named provider: the configured one, else the Gemini default.
fn model_for<'a>(provider_name: &str, model: Option<&'a str>) -> Result<&'a str, SolveError> {
    match model {
        Some(m) if !m.is_empty() => Ok(m),
        _ if provider_name.eq_ignore_ascii_case("gemini") => Ok(DEFAULT_GEMINI_MODEL),
        _ => Err(SolveError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!(
                "No model configured for provider '{provider_name}'.\n\
                Pass --model or set EDGEQUAKE_MODEL."
            ),
        }),
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider + model** (`config.provider_name`): the factory reads
///    the matching API key from the environment. Only Gemini has a fallback
///    model; other providers need `config.model`.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **`GEMINI_API_KEY`** present: Gemini, with the configured model or
///    [`DEFAULT_GEMINI_MODEL`].
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &SolverConfig) -> Result<Arc<dyn LLMProvider>, SolveError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = model_for(name, config.model.as_deref())?;
        info!("Using provider '{}' with model '{}'", name, model);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            info!("Using provider '{}' with model '{}' from environment", prov, model);
            return create_provider(&prov, &model);
        }
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
            info!("Using provider 'gemini' with model '{}'", model);
            return create_provider("gemini", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| SolveError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY or OPENAI_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
