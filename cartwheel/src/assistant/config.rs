//! Assistant service configuration.

use crate::error::{Error, Result};

/// Configuration for the [`AssistantClient`](super::AssistantClient).
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the service.
    pub base_url: String,
    /// Identifier of the pre-configured shopping assistant.
    pub assistant_id: String,
    /// Request timeout in seconds. Streamed runs can stay open for a
    /// while, so this is generous by default.
    pub timeout_secs: Option<u64>,
}

impl AssistantConfig {
    /// Default service base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// The hosted shopping assistant the engine runs against.
    pub const DEFAULT_ASSISTANT_ID: &'static str = "asst_0ikYWUWwI9pm3wyousqovlNp";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            assistant_id: Self::DEFAULT_ASSISTANT_ID.to_owned(),
            timeout_secs: Some(300),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `OPENAI_API_KEY` - Required API key
    /// - `OPENAI_BASE_URL` - Optional base URL
    /// - `CARTWHEEL_ASSISTANT_ID` - Optional assistant override
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::config("OPENAI_API_KEY environment variable is not set"))?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());

        let assistant_id = std::env::var("CARTWHEEL_ASSISTANT_ID")
            .unwrap_or_else(|_| Self::DEFAULT_ASSISTANT_ID.to_owned());

        Ok(Self {
            api_key,
            base_url,
            assistant_id,
            timeout_secs: Some(300),
        })
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the assistant identifier.
    #[must_use]
    pub fn with_assistant_id(mut self, id: impl Into<String>) -> Self {
        self.assistant_id = id.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}
