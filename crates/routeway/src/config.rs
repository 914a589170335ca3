// Client configuration: API key and base URL, from code or environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default Routeway API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.routeway.ai";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ROUTEWAY_API_KEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "ROUTEWAY_BASE_URL";

/// Configuration for the Routeway client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    /// Base URL for the API (optional, defaults to https://api.routeway.ai)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Load from `ROUTEWAY_API_KEY` and, if set, `ROUTEWAY_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .with_context(|| format!("{} is not set", API_KEY_ENV))?;

        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self { api_key, base_url })
    }

    /// Base URL without trailing slash
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = ClientConfig::new("test-key");
        assert_eq!(config.effective_base_url(), "https://api.routeway.ai");
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let config = ClientConfig::new("test-key").with_base_url("http://localhost:8080/");
        assert_eq!(config.effective_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ClientConfig::new("test-key").with_base_url("http://localhost:8080");

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ClientConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_base_url_omitted_when_unset() {
        let json = serde_json::to_string(&ClientConfig::new("k")).unwrap();
        assert!(!json.contains("base_url"));
    }
}
