//! LLM provider abstraction and implementations.
//!
//! Supports Google Gemini (with Google Search grounding), Anthropic Claude,
//! and `OpenAI` via a common trait. Any `OpenAI`-compatible self-hosted
//! server can be used by pointing `base_url` at it.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use std::time::Duration;

use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{AiError, AnalysisConfig};

/// A web source the model consulted while answering.
///
/// Either field may be empty when the provider omits it; such citations
/// are discarded before they reach an [`airwatch_ward_models::AnalysisResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Citation {
    /// Page title.
    pub title: String,
    /// Link target.
    pub uri: String,
}

/// Response from the LLM provider.
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// Concatenated text output.
    pub text: String,
    /// Grounding citations, in provider order. Empty for providers without
    /// search grounding.
    pub citations: Vec<Citation>,
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a single-turn prompt and asks for a JSON answer.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the provider reports an
    /// error.
    async fn generate(&self, prompt: &str) -> Result<LlmResponse, AiError>;
}

/// Which LLM backend to call.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// Google Gemini with Google Search grounding.
    #[default]
    #[strum(to_string = "gemini", serialize = "google")]
    Gemini,
    /// Anthropic Claude.
    #[strum(to_string = "anthropic", serialize = "claude")]
    Anthropic,
    /// `OpenAI` or an `OpenAI`-compatible server.
    #[serde(rename = "openai")]
    #[strum(to_string = "openai", serialize = "gpt")]
    OpenAi,
}

impl ProviderKind {
    /// Model used when none is configured.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-3-flash-preview",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::OpenAi => "gpt-4o",
        }
    }
}

/// Creates the provider selected by `config`.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no API key is configured, or
/// [`AiError::Http`] if the HTTP client cannot be built.
pub fn create_provider(config: &AnalysisConfig) -> Result<Box<dyn LlmProvider>, AiError> {
    if config.api_key.trim().is_empty() {
        return Err(AiError::Config {
            message: format!("no API key configured for provider '{}'", config.provider),
        });
    }

    let model = config
        .model
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| config.provider.default_model().to_string());
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let api_key = config.api_key.clone();
    let base_url = config.base_url.clone().filter(|u| !u.is_empty());

    log::info!("Using AI provider {} with model {model}", config.provider);

    Ok(match config.provider {
        ProviderKind::Gemini => Box::new(gemini::GeminiProvider::new(
            client, api_key, model, base_url,
        )),
        ProviderKind::Anthropic => Box::new(anthropic::AnthropicProvider::new(
            client, api_key, model, base_url,
        )),
        ProviderKind::OpenAi => Box::new(openai::OpenAiProvider::new(
            client, api_key, model, base_url,
        )),
    })
}

/// Joins a base URL and a path, tolerating a trailing slash on the base.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_aliases() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("claude".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("OPENAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let config = AnalysisConfig {
            api_key: "  ".to_string(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            create_provider(&config),
            Err(AiError::Config { .. })
        ));
    }

    #[test]
    fn joins_endpoint_paths() {
        assert_eq!(
            endpoint("http://localhost:11434/v1/", "chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
