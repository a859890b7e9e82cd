//! Gemini client configuration.

use std::time::Duration;

use crate::activation::ActivationPolicy;
use crate::error::{GeminiError, GeminiResult};

/// Default public endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model used for analysis.
pub const DEFAULT_MODEL: &str = "models/gemini-2.0-flash";

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Model resource name, e.g. `models/gemini-2.0-flash`
    pub model: String,
    /// API base URL (overridable for tests and proxies)
    pub base_url: String,
    /// Interval between file status checks
    pub poll_interval: Duration,
    /// Maximum time to wait for an uploaded file to become ACTIVE
    pub activation_timeout: Duration,
    /// Server-side processing timeout declared on generation requests
    pub generation_timeout: Duration,
    /// Local HTTP timeout for a single request
    pub request_timeout: Duration,
}

impl GeminiConfig {
    /// Create a config with default endpoints and timings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(5),
            activation_timeout: Duration::from_secs(120),
            generation_timeout: Duration::from_secs(600),
            request_timeout: Duration::from_secs(660),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::config_error("GEMINI_API_KEY not set"))?;

        let secs = |name: &str, default: u64| {
            Duration::from_secs(
                std::env::var(name)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default),
            )
        };

        let generation_timeout = secs("GEMINI_GENERATION_TIMEOUT_SECS", 600);

        Ok(Self {
            api_key,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            poll_interval: secs("GEMINI_POLL_INTERVAL_SECS", 5),
            activation_timeout: secs("GEMINI_ACTIVATION_TIMEOUT_SECS", 120),
            generation_timeout,
            request_timeout: generation_timeout + Duration::from_secs(60),
        })
    }

    /// Model path with the `models/` prefix the REST API expects.
    pub fn model_path(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }

    /// Polling policy derived from this config.
    pub fn activation_policy(&self) -> ActivationPolicy {
        ActivationPolicy {
            interval: self.poll_interval,
            timeout: self.activation_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::new("key");
        assert_eq!(config.model_path(), "models/gemini-2.0-flash");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.activation_timeout, Duration::from_secs(120));
        assert_eq!(config.generation_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_model_path_adds_prefix() {
        let mut config = GeminiConfig::new("key");
        config.model = "gemini-1.5-flash".to_string();
        assert_eq!(config.model_path(), "models/gemini-1.5-flash");
    }
}
