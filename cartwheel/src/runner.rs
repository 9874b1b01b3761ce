//! Runner: the run orchestration engine.
//!
//! The [`Runner`] owns one conversation with the remote assistant and
//! drives each user turn through its streaming lifecycle:
//!
//! 1. Ensure a thread exists (created lazily on the first turn)
//! 2. Append the user's message and start a streamed run
//! 3. Forward text deltas to the sink as they arrive
//! 4. On `requires_action`, resolve the tool-call batch through the
//!    [`ToolArbiter`] and submit the outputs, resuming the stream
//! 5. Repeat until the run reaches a terminal status
//!
//! Each streaming attempt is driven to a [`TurnOutcome`] with state local
//! to that attempt; nothing accumulated while one stream was open leaks
//! into the next resumption cycle. Failure statuses and transport errors
//! propagate to the caller; no retry happens at this layer.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::arbiter::ToolArbiter;
use crate::assistant::stream::{RunEvent, RunEventStream};
use crate::assistant::types::ToolCall;
use crate::assistant::RunTransport;
use crate::error::{Error, Result};
use crate::search::ShoppingBackend;
use crate::sink::EventSink;

/// Where one streaming attempt left the run.
enum TurnOutcome {
    /// The run produced its final answer; the turn is over.
    Completed,
    /// The run paused; these calls need outputs before it can resume.
    ActionRequired {
        run_id: String,
        calls: Vec<ToolCall>,
    },
}

/// Drives a conversation with the remote assistant.
///
/// One run is active at a time per instance; `start` takes `&mut self`,
/// so turns on a session are serialized by construction.
pub struct Runner<T, S> {
    transport: T,
    arbiter: ToolArbiter<S>,
    sink: Arc<dyn EventSink>,
    thread_id: Option<String>,
}

impl<T, S> std::fmt::Debug for Runner<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("thread_id", &self.thread_id)
            .finish_non_exhaustive()
    }
}

impl<T: RunTransport, S: ShoppingBackend> Runner<T, S> {
    /// Creates a runner with no session yet; the thread is created lazily
    /// on the first turn.
    #[must_use]
    pub fn new(transport: T, backend: Arc<S>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            transport,
            arbiter: ToolArbiter::new(backend),
            sink,
            thread_id: None,
        }
    }

    /// Resume an existing conversation thread.
    #[must_use]
    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// The current conversation thread, `None` before the first turn.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Run one user turn to completion.
    ///
    /// All output is delivered through the [`EventSink`]; on success the
    /// run reached `completed` and no further events will fire for this
    /// turn.
    ///
    /// # Errors
    ///
    /// Propagates transport and streaming failures, failure-terminal run
    /// statuses, and tool-call construction defects. A failed turn leaves
    /// the thread's history reflecting only what was actually submitted.
    pub async fn start(&mut self, user_text: &str) -> Result<()> {
        let thread_id = self.ensure_thread().await?;
        self.transport
            .append_user_message(&thread_id, user_text)
            .await?;

        info!(thread = %thread_id, "Starting assistant run");
        let mut events = self.transport.stream_run(&thread_id).await?;

        loop {
            match self.drive(&mut events).await? {
                TurnOutcome::Completed => return Ok(()),
                TurnOutcome::ActionRequired { run_id, calls } => {
                    debug!(run = %run_id, calls = calls.len(), "Run requires action");
                    let outputs = self.arbiter.resolve(calls, self.sink.as_ref()).await?;
                    events = self
                        .transport
                        .submit_tool_outputs(&thread_id, &run_id, outputs)
                        .await?;
                }
            }
        }
    }

    /// Return the session thread, creating it on first use.
    async fn ensure_thread(&mut self) -> Result<String> {
        match &self.thread_id {
            Some(id) => Ok(id.clone()),
            None => {
                let id = self.transport.create_thread().await?;
                debug!(thread = %id, "Created conversation thread");
                self.thread_id = Some(id.clone());
                Ok(id)
            }
        }
    }

    /// Consume events from one streaming attempt until a decision point.
    ///
    /// Text deltas are forwarded to the sink immediately, preserving
    /// arrival order exactly. The pending tool calls of an attempt live
    /// only in its `ToolCallsRequired` event and are moved out here, so no
    /// per-attempt state survives into the next cycle.
    async fn drive(&self, events: &mut RunEventStream) -> Result<TurnOutcome> {
        while let Some(event) = events.next().await {
            match event? {
                RunEvent::TextDelta(fragment) => self.sink.on_text_delta(&fragment),
                RunEvent::ToolCallsRequired { run_id, calls } => {
                    return Ok(TurnOutcome::ActionRequired { run_id, calls });
                }
                RunEvent::RunCompleted { run_id } => {
                    debug!(run = %run_id, "Run completed");
                    return Ok(TurnOutcome::Completed);
                }
                RunEvent::RunEnded {
                    run_id,
                    status,
                    message,
                } => {
                    warn!(
                        run = %run_id,
                        %status,
                        message = message.as_deref().unwrap_or(""),
                        "Run ended without completing",
                    );
                    return Err(Error::RunEnded { run_id, status });
                }
                RunEvent::StreamError(message) => return Err(Error::stream(message)),
                RunEvent::Done => break,
                RunEvent::StatusChanged { run_id, status } => {
                    debug!(run = %run_id, %status, "Run status changed");
                }
                RunEvent::MessageCompleted | RunEvent::StepCompleted => {}
            }
        }

        Err(Error::stream(
            "event stream ended before the run reached a terminal status",
        ))
    }
}
