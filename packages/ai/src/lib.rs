#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generative analysis of a single ward.
//!
//! [`WardAnalyst`] asks an LLM for recommendations, a trend narrative, a
//! source breakdown and recent news about one ward, written for either a
//! municipal authority or a resident. It never fails: a missing API key,
//! an unreachable provider, and any other error each produce a
//! placeholder [`AnalysisResult`] with a single advisory recommendation
//! describing what went wrong.

pub mod prompt;
pub mod providers;
pub mod response;

use airwatch_ward_models::{AnalysisResult, UserRole, Ward};
use serde::Deserialize;
use thiserror::Error;

use crate::providers::{LlmProvider, ProviderKind};

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

impl AiError {
    /// Whether the provider could not be reached at all (connection
    /// refused, DNS failure, or timeout).
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect() || e.is_timeout())
    }
}

/// Settings for the analysis provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Which backend to call.
    pub provider: ProviderKind,
    /// Model name; the provider's default when unset.
    pub model: Option<String>,
    /// API key. Empty means no key is configured.
    pub api_key: String,
    /// Override for the provider's API root.
    pub base_url: Option<String>,
    /// Upper bound on a single request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            api_key: String::new(),
            base_url: None,
            request_timeout_secs: 60,
        }
    }
}

/// Produces an [`AnalysisResult`] for a ward.
#[async_trait::async_trait]
pub trait AnalysisRequester: Send + Sync {
    /// Analyzes `ward` for the given audience. Always returns a
    /// structurally complete result.
    async fn request_analysis(&self, ward: &Ward, role: UserRole) -> AnalysisResult;
}

/// [`AnalysisRequester`] backed by an [`LlmProvider`].
pub struct WardAnalyst {
    provider: Option<Box<dyn LlmProvider>>,
}

impl WardAnalyst {
    /// Creates an analyst for `config`. Without an API key the analyst is
    /// still usable but answers every request with the "API Key Missing"
    /// placeholder and never touches the network.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &AnalysisConfig) -> Result<Self, AiError> {
        match providers::create_provider(config) {
            Ok(provider) => Ok(Self::with_provider(provider)),
            Err(AiError::Config { message }) => {
                log::warn!("AI analysis disabled: {message}");
                Ok(Self { provider: None })
            }
            Err(e) => Err(e),
        }
    }

    /// Creates an analyst over an already-built provider.
    #[must_use]
    pub fn with_provider(provider: Box<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    async fn analyze(
        provider: &dyn LlmProvider,
        ward: &Ward,
        role: UserRole,
    ) -> Result<AnalysisResult, AiError> {
        let prompt = prompt::build_prompt(ward, role);
        log::debug!("Requesting {role} analysis for {}", ward.id);

        let reply = provider.generate(&prompt).await?;
        let mut result = response::parse_analysis(&reply.text)?;
        result.grounding_urls = response::grounding_urls(reply.citations);
        Ok(result)
    }
}

#[async_trait::async_trait]
impl AnalysisRequester for WardAnalyst {
    async fn request_analysis(&self, ward: &Ward, role: UserRole) -> AnalysisResult {
        let Some(provider) = &self.provider else {
            return key_missing();
        };

        match Self::analyze(provider.as_ref(), ward, role).await {
            Ok(result) => result,
            Err(e) if e.is_unreachable() => {
                log::error!("AI service unreachable: {e}");
                offline()
            }
            Err(e) => {
                log::error!("Error generating analysis for {}: {e}", ward.id);
                unavailable()
            }
        }
    }
}

/// Placeholder returned when no API key is configured.
#[must_use]
pub fn key_missing() -> AnalysisResult {
    AnalysisResult::placeholder(
        "key-missing",
        "API Key Missing",
        "Please add your API key to use the AI analysis features.",
    )
}

/// Placeholder returned when the provider cannot be reached.
#[must_use]
pub fn offline() -> AnalysisResult {
    AnalysisResult::placeholder(
        "fallback-1",
        "System Offline",
        "AI services are currently unavailable.",
    )
}

/// Placeholder returned for any other failure.
#[must_use]
pub fn unavailable() -> AnalysisResult {
    AnalysisResult::placeholder(
        "err-1",
        "Analysis Unavailable",
        "AI service is temporarily unavailable. Please rely on standard protocols.",
    )
}
