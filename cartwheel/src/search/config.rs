//! Shopping-search client configuration.

use crate::error::{Error, Result};

/// Configuration for the [`SerpClient`](super::SerpClient).
#[derive(Debug, Clone)]
pub struct SerpConfig {
    /// API key for the search service.
    pub api_key: String,
    /// Endpoint for fresh queries.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl SerpConfig {
    /// Default search endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://serpapi.com/search.json";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            timeout_secs: Some(60),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `SERP_API_KEY` - Required API key
    /// - `SERP_BASE_URL` - Optional endpoint override
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `SERP_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SERP_API_KEY")
            .map_err(|_| Error::config("SERP_API_KEY environment variable is not set"))?;

        let base_url =
            std::env::var("SERP_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());

        Ok(Self {
            api_key,
            base_url,
            timeout_secs: Some(60),
        })
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SerpConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, SerpConfig::DEFAULT_BASE_URL);
    }

    #[test]
    fn config_builder() {
        let config = SerpConfig::new("key")
            .with_base_url("https://mirror.example/search.json")
            .with_timeout(10);
        assert_eq!(config.base_url, "https://mirror.example/search.json");
        assert_eq!(config.timeout_secs, Some(10));
    }
}
