//! Assistant API client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tools::{self, ToolDefinition};

use super::config::AssistantConfig;
use super::stream::decode_sse;
use super::types::{ThreadObject, ToolOutput};
use super::{RunEventStream, RunTransport};

/// Header advertising the assistants protocol revision.
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Request body for appending a message to a thread.
#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request body for starting a streamed run.
#[derive(Debug, Clone, Serialize)]
struct CreateRunRequest {
    assistant_id: String,
    stream: bool,
    parallel_tool_calls: bool,
    tools: Vec<AssistantTool>,
}

/// Request body for submitting tool outputs.
#[derive(Debug, Clone, Serialize)]
struct SubmitToolOutputsRequest {
    tool_outputs: Vec<ToolOutput>,
    stream: bool,
}

/// A function tool in the assistant wire format.
#[derive(Debug, Clone, Serialize)]
struct AssistantTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: ToolDefinition,
}

impl From<ToolDefinition> for AssistantTool {
    fn from(function: ToolDefinition) -> Self {
        Self {
            tool_type: "function".to_owned(),
            function,
        }
    }
}

/// Error envelope returned by the service.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// Error details inside the envelope.
#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    message: String,
}

/// Assistant API client.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    config: Arc<AssistantConfig>,
    client: Client,
}

impl AssistantClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the API key is empty, or the HTTP
    /// client fails to build.
    pub fn new(config: AssistantConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::config("assistant service API key is required"));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder.build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        Self::new(AssistantConfig::from_env()?)
    }

    /// Build the thread-creation URL.
    fn threads_url(&self) -> String {
        format!("{}/threads", self.config.base_url)
    }

    /// Build the message-append URL for a thread.
    fn messages_url(&self, thread_id: &str) -> String {
        format!("{}/threads/{thread_id}/messages", self.config.base_url)
    }

    /// Build the run-creation URL for a thread.
    fn runs_url(&self, thread_id: &str) -> String {
        format!("{}/threads/{thread_id}/runs", self.config.base_url)
    }

    /// Build the tool-output submission URL for a run.
    fn submit_url(&self, thread_id: &str, run_id: &str) -> String {
        format!(
            "{}/threads/{thread_id}/runs/{run_id}/submit_tool_outputs",
            self.config.base_url
        )
    }

    /// Build a POST request with authentication and protocol headers.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    /// Decode a non-success response into [`Error::Api`].
    fn parse_error(status: u16, body: &str) -> Error {
        let message = serde_json::from_str::<ApiErrorResponse>(body)
            .map_or_else(|_| body.to_owned(), |decoded| decoded.error.message);
        Error::api("assistant", status, message)
    }

    /// Send a request and decode the JSON response body.
    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &body));
        }

        Ok(response.json().await?)
    }

    /// Send a request and open its body as a decoded event stream.
    async fn open_stream(&self, request: reqwest::RequestBuilder) -> Result<RunEventStream> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &body));
        }

        Ok(decode_sse(response.bytes_stream()))
    }
}

#[async_trait]
impl RunTransport for AssistantClient {
    async fn create_thread(&self) -> Result<String> {
        let thread: ThreadObject = self
            .send_json(self.build_request(&self.threads_url()).json(&Value::Object(
                serde_json::Map::new(),
            )))
            .await?;
        debug!(thread = %thread.id, "Created thread");
        Ok(thread.id)
    }

    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()> {
        let body = CreateMessageRequest {
            role: "user",
            content: text,
        };
        let _: Value = self
            .send_json(self.build_request(&self.messages_url(thread_id)).json(&body))
            .await?;
        Ok(())
    }

    async fn stream_run(&self, thread_id: &str) -> Result<RunEventStream> {
        let body = CreateRunRequest {
            assistant_id: self.config.assistant_id.clone(),
            stream: true,
            parallel_tool_calls: true,
            tools: tools::definitions().into_iter().map(Into::into).collect(),
        };
        debug!(thread = %thread_id, assistant = %self.config.assistant_id, "Starting streamed run");
        self.open_stream(self.build_request(&self.runs_url(thread_id)).json(&body))
            .await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<RunEventStream> {
        let body = SubmitToolOutputsRequest {
            tool_outputs: outputs,
            stream: true,
        };
        debug!(
            thread = %thread_id,
            run = %run_id,
            outputs = body.tool_outputs.len(),
            "Submitting tool outputs",
        );
        self.open_stream(
            self.build_request(&self.submit_url(thread_id, run_id))
                .json(&body),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> AssistantClient {
        AssistantClient::new(AssistantConfig::new("test-key")).unwrap()
    }

    #[test]
    fn urls_are_rooted_at_the_base() {
        let client = client();
        assert_eq!(
            client.threads_url(),
            "https://api.openai.com/v1/threads"
        );
        assert_eq!(
            client.runs_url("thread_1"),
            "https://api.openai.com/v1/threads/thread_1/runs"
        );
        assert_eq!(
            client.submit_url("thread_1", "run_2"),
            "https://api.openai.com/v1/threads/thread_1/runs/run_2/submit_tool_outputs"
        );
    }

    #[test]
    fn run_request_serializes_the_tool_schema() {
        let body = CreateRunRequest {
            assistant_id: "asst_1".into(),
            stream: true,
            parallel_tool_calls: true,
            tools: tools::definitions().into_iter().map(Into::into).collect(),
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["assistant_id"], "asst_1");
        assert_eq!(value["stream"], true);
        assert_eq!(value["parallel_tool_calls"], true);
        let tools = value["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 3);
        assert!(tools.iter().all(|t| t["type"] == "function"));
        assert_eq!(tools[0]["function"]["name"], "execute_search");
    }

    #[test]
    fn error_bodies_are_decoded() {
        let err = AssistantClient::parse_error(
            404,
            "{\"error\": {\"message\": \"No assistant found\", \"type\": \"invalid_request_error\"}}",
        );
        assert_eq!(
            err.to_string(),
            "assistant request failed with status 404: No assistant found"
        );
    }

    #[test]
    fn undecodable_error_bodies_fall_back_to_raw_text() {
        let err = AssistantClient::parse_error(502, "Bad Gateway");
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = AssistantClient::new(AssistantConfig::new("")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
