//! Configuration loading for the `airwatch` binary.
//!
//! Settings come from a TOML file (the compiled-in `config/default.toml`
//! unless `--config` names another), then environment overrides are
//! applied. This is the only place the process environment is read; every
//! component receives its settings explicitly.

use std::path::{Path, PathBuf};

use airwatch_aggregate::RegionConfig;
use airwatch_ai::AnalysisConfig;
use airwatch_ai::providers::ProviderKind;
use airwatch_source::waqi::WaqiConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("Invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range or unrecognized.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description.
        message: String,
    },
}

/// Complete settings for one CLI invocation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Station feed connection.
    pub waqi: WaqiConfig,
    /// Aggregation geometry.
    pub region: RegionConfig,
    /// Analysis provider.
    pub analysis: AnalysisConfig,
}

/// Loads configuration from `path` (or the built-in defaults) and applies
/// environment overrides.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, or if a
/// value is invalid.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let text = match path {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    let mut config = parse(&text)?;
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Parses a TOML document into an [`AppConfig`]. Missing sections and
/// keys take their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] if the document is malformed.
pub fn parse(text: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::de::from_str(text)?)
}

/// Applies environment overrides, reading variables through `lookup`.
/// Empty values are ignored.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if `AI_PROVIDER` names an unknown
/// provider.
pub fn apply_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = var("WAQI_TOKEN") {
        config.waqi.token = token;
    }
    if let Some(base_url) = var("WAQI_BASE_URL") {
        config.waqi.base_url = base_url;
    }

    if let Some(provider) = var("AI_PROVIDER") {
        config.analysis.provider = provider.parse().map_err(|_| ConfigError::Invalid {
            message: format!(
                "Unknown AI provider: {provider}. Use 'gemini', 'anthropic', or 'openai'."
            ),
        })?;
    }
    if let Some(model) = var("AI_MODEL") {
        config.analysis.model = Some(model);
    }
    if let Some(base_url) = var("AI_BASE_URL") {
        config.analysis.base_url = Some(base_url);
    }

    let key = match config.analysis.provider {
        ProviderKind::Gemini => var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
        ProviderKind::Anthropic => var("ANTHROPIC_API_KEY"),
        ProviderKind::OpenAi => var("OPENAI_API_KEY"),
    };
    if let Some(key) = key {
        config.analysis.api_key = key;
    }

    Ok(())
}

/// Rejects settings that would make aggregation meaningless.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] describing the first bad value.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let region = &config.region;
    let invalid = |message: String| -> Result<(), ConfigError> {
        Err(ConfigError::Invalid { message })
    };

    let values = [
        ("lat_min", region.lat_min),
        ("lat_max", region.lat_max),
        ("lng_min", region.lng_min),
        ("lng_max", region.lng_max),
        ("tile_step", region.tile_step),
        ("point_radius", region.point_radius),
        ("proximity_tolerance", region.proximity_tolerance),
        ("fallback_jitter", region.fallback_jitter),
    ];
    if let Some((name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
        return invalid(format!("region.{name} must be finite, got {value}"));
    }
    if region.lat_min >= region.lat_max || region.lng_min >= region.lng_max {
        return invalid(format!("region extent {} is empty", region.extent()));
    }
    if region.tile_step.is_nan() || region.tile_step <= 0.0 {
        return invalid(format!("tile_step must be positive, got {}", region.tile_step));
    }
    if region.point_radius.is_nan() || region.point_radius <= 0.0 {
        return invalid(format!(
            "point_radius must be positive, got {}",
            region.point_radius
        ));
    }
    if config.waqi.request_timeout_secs == 0 {
        return invalid("waqi.request_timeout_secs must be at least 1".to_string());
    }
    if config.waqi.token.is_empty() {
        log::warn!("No WAQI token configured; live requests will be rejected");
    }

    Ok(())
}
