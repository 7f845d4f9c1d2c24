//! Client configuration
//!
//! The service needs an API key; everything else has a working default.
//! Values come from the process environment (a `.env` file is honored at
//! startup), never from a config file — nothing persists across sessions.

use std::env;
use std::time::Duration;

use super::client::ApiError;

/// Image model used when `GEMINI_IMAGE_MODEL` is not set
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Google AI Studio endpoint used when `GEMINI_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the generative-image client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API key (Google AI Studio)
    pub api_key: String,
    /// Model that produces the images
    pub model: String,
    /// Base URL of the service
    pub base_url: String,
    /// Per-request timeout; image generation is slow
    pub request_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl ApiConfig {
    /// Read the configuration from the environment.
    ///
    /// Fails only when `GEMINI_API_KEY` is missing or empty; the UI shows
    /// that as a banner instead of exiting.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingApiKey);
        }

        let model = env::var("GEMINI_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ApiConfig {
            api_key,
            model,
            base_url,
            request_timeout: Duration::from_secs(180),
            connect_timeout: Duration::from_secs(10),
        })
    }

    /// Configuration with an explicit key, used by tests.
    #[cfg(test)]
    pub fn with_key(api_key: &str) -> Self {
        ApiConfig {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(180),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
