//! Unified error types for the cartwheel engine.
//!
//! Everything that can go wrong while orchestrating a run is expressed as a
//! single [`Error`] enum:
//! - configuration failures (missing credentials), raised before any remote call
//! - shopping-search failures, including the service's explicit `error` field
//! - defects in the assistant's tool-call construction
//! - transport and streaming failures while talking to the assistant service

use crate::assistant::types::RunStatus;

/// Result type alias for cartwheel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the cartwheel engine.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required credential or setting is missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// The search service answered with an explicit error field.
    #[error("search returned no results: {0}")]
    NoResults(String),

    /// A tool call arrived without one of its required arguments.
    #[error("tool call '{call_id}' is missing required argument '{argument}'")]
    MissingArgument {
        /// Id of the offending tool call.
        call_id: String,
        /// Name of the argument that was absent or empty.
        argument: &'static str,
    },

    /// Failure while decoding or transporting a run event stream.
    #[error("assistant stream error: {0}")]
    Stream(String),

    /// A run reached a terminal status other than `completed`.
    #[error("run '{run_id}' ended with status '{status}'")]
    RunEnded {
        /// Id of the run that ended.
        run_id: String,
        /// The terminal status it reported.
        status: RunStatus,
    },

    /// A remote service answered with a non-success HTTP status.
    #[error("{service} request failed with status {status}: {message}")]
    Api {
        /// Which remote service answered ("assistant" or "serpapi").
        service: &'static str,
        /// The HTTP status code.
        status: u16,
        /// The decoded error message, or the raw body when undecodable.
        message: String,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A service-provided link could not be parsed as a URL.
    #[error("invalid link: {0}")]
    InvalidLink(#[from] url::ParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a no-results error carrying the service's message.
    #[must_use]
    pub fn no_results(msg: impl Into<String>) -> Self {
        Self::NoResults(msg.into())
    }

    /// Create a missing-argument error for a tool call.
    #[must_use]
    pub fn missing_argument(call_id: impl Into<String>, argument: &'static str) -> Self {
        Self::MissingArgument {
            call_id: call_id.into(),
            argument,
        }
    }

    /// Create a streaming error with a message.
    #[must_use]
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Create an API error for a remote service response.
    #[must_use]
    pub fn api(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            service,
            status,
            message: message.into(),
        }
    }

    /// Returns `true` if this is the search service's explicit no-results error.
    #[must_use]
    pub const fn is_no_results(&self) -> bool {
        matches!(self, Self::NoResults(_))
    }
}
