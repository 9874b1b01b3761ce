//! Client for the hosted assistant-run service.
//!
//! A conversation lives in a *thread*; each user turn starts a streamed
//! *run* against that thread. The service pushes tagged server-sent events
//! which [`stream`] decodes into [`RunEvent`]s; when a run pauses in
//! `requires_action` the pending tool calls are answered through
//! [`RunTransport::submit_tool_outputs`], which resumes the stream.

mod client;
mod config;
pub mod stream;
pub mod types;

pub use client::AssistantClient;
pub use config::AssistantConfig;
pub use stream::{RunEvent, RunEventStream};
pub use types::{RunStatus, ToolCall, ToolOutput};

use async_trait::async_trait;

use crate::error::Result;

/// Operations the run controller needs from the assistant service.
///
/// [`AssistantClient`] implements this over HTTPS; tests substitute
/// scripted transports.
#[async_trait]
pub trait RunTransport: Send + Sync {
    /// Create a fresh conversation thread, returning its identifier.
    async fn create_thread(&self) -> Result<String>;

    /// Append a user message to a thread.
    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()>;

    /// Start a streamed run against a thread.
    async fn stream_run(&self, thread_id: &str) -> Result<RunEventStream>;

    /// Submit tool outputs for a run in `requires_action`, resuming its
    /// event stream.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<RunEventStream>;
}

#[async_trait]
impl<T: RunTransport + ?Sized> RunTransport for std::sync::Arc<T> {
    async fn create_thread(&self) -> Result<String> {
        (**self).create_thread().await
    }

    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()> {
        (**self).append_user_message(thread_id, text).await
    }

    async fn stream_run(&self, thread_id: &str) -> Result<RunEventStream> {
        (**self).stream_run(thread_id).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<RunEventStream> {
        (**self).submit_tool_outputs(thread_id, run_id, outputs).await
    }
}
