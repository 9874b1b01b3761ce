//! SSE decoding for streamed assistant runs.
//!
//! The service pushes name-tagged server-sent events. [`SseDecoder`] turns
//! the raw byte stream into the pull-based sequence of [`RunEvent`]s the
//! run controller consumes, buffering partial lines across network chunks.
//! Payloads that fail to decode are skipped with a warning rather than
//! ending the stream.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

use super::types::{MessageDelta, Run, RunStatus, ToolCall};

/// A tagged event pulled from a streamed run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum RunEvent {
    /// Incremental assistant text, in arrival order.
    TextDelta(String),
    /// A message finished forming.
    MessageCompleted,
    /// The run moved to a non-terminal status other than `requires_action`.
    StatusChanged {
        /// Id of the run.
        run_id: String,
        /// The reported status.
        status: RunStatus,
    },
    /// The run paused waiting for tool outputs.
    ToolCallsRequired {
        /// Id of the paused run.
        run_id: String,
        /// The complete batch of pending calls, in emission order.
        calls: Vec<ToolCall>,
    },
    /// A run step finished.
    StepCompleted,
    /// The run reached `completed`.
    RunCompleted {
        /// Id of the completed run.
        run_id: String,
    },
    /// The run reached a failure/cancellation status.
    RunEnded {
        /// Id of the run.
        run_id: String,
        /// The terminal status it reported.
        status: RunStatus,
        /// The service's error message, when it sent one.
        message: Option<String>,
    },
    /// The service reported a stream-level error event.
    StreamError(String),
    /// End of the event stream.
    Done,
}

/// A pinned, boxed stream of run events.
pub type RunEventStream = Pin<Box<dyn Stream<Item = Result<RunEvent>> + Send>>;

/// Incremental SSE decoder.
///
/// Feed it raw byte chunks as they arrive; it emits every event completed
/// by each chunk and keeps unterminated tail bytes for the next feed.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    event: Option<String>,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning the events it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RunEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            self.handle_line(line.trim_end_matches(['\n', '\r']), &mut events);
        }
        events
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<RunEvent>) {
        // Data lines are converted eagerly, so a blank separator only has
        // to drop a name that never received data.
        if line.is_empty() {
            self.event = None;
            return;
        }
        if line.starts_with(':') {
            return;
        }
        if let Some(name) = line.strip_prefix("event:") {
            self.event = Some(name.trim().to_owned());
            return;
        }
        if let Some(data) = line.strip_prefix("data:") {
            let name = self.event.take().unwrap_or_default();
            if let Some(event) = convert(&name, data.trim()) {
                events.push(event);
            }
        }
    }
}

/// Convert one tagged data payload into a [`RunEvent`].
///
/// Event names outside the protocol surface the controller cares about
/// (step deltas, message creation, and so on) produce nothing.
fn convert(event: &str, data: &str) -> Option<RunEvent> {
    if data == "[DONE]" || event == "done" {
        return Some(RunEvent::Done);
    }

    match event {
        "thread.message.delta" => match serde_json::from_str::<MessageDelta>(data) {
            Ok(delta) => {
                let text = delta.text();
                (!text.is_empty()).then(|| RunEvent::TextDelta(text))
            }
            Err(e) => {
                warn!(error = %e, "Failed to decode message delta");
                None
            }
        },
        "thread.message.completed" => Some(RunEvent::MessageCompleted),
        "thread.run.step.completed" => Some(RunEvent::StepCompleted),
        "error" => Some(RunEvent::StreamError(error_message(data))),
        name if name.starts_with("thread.run.step") => None,
        name if name.starts_with("thread.run.") => convert_run(data),
        _ => None,
    }
}

/// Convert a run lifecycle payload, classifying by the status it carries
/// rather than by the event name.
fn convert_run(data: &str) -> Option<RunEvent> {
    let run: Run = match serde_json::from_str(data) {
        Ok(run) => run,
        Err(e) => {
            warn!(error = %e, "Failed to decode run event");
            return None;
        }
    };

    Some(match run.status {
        RunStatus::RequiresAction => {
            let run_id = run.id.clone();
            RunEvent::ToolCallsRequired {
                run_id,
                calls: run.pending_tool_calls(),
            }
        }
        RunStatus::Completed => RunEvent::RunCompleted { run_id: run.id },
        status if status.is_failure() => RunEvent::RunEnded {
            run_id: run.id,
            status,
            message: run.last_error.map(|e| e.message),
        },
        status => RunEvent::StatusChanged {
            run_id: run.id,
            status,
        },
    })
}

/// Best-effort extraction of the message from an `error` event payload.
fn error_message(data: &str) -> String {
    serde_json::from_str::<Value>(data)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error").and_then(|e| e.get("message")))
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| data.to_owned())
}

/// Wrap a raw byte stream into a decoded [`RunEventStream`].
///
/// Transport failures surface as [`Error::Stream`] items; decoding state
/// lives inside the returned stream, so each streaming attempt starts
/// fresh.
pub(crate) fn decode_sse<S, B, E>(stream: S) -> RunEventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut decoder = SseDecoder::new();
    Box::pin(stream.flat_map(move |chunk| {
        let batch: Vec<Result<RunEvent>> = match chunk {
            Ok(bytes) => decoder.feed(bytes.as_ref()).into_iter().map(Ok).collect(),
            Err(e) => vec![Err(Error::stream(e.to_string()))],
        };
        futures::stream::iter(batch)
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn feed_all(decoder: &mut SseDecoder, text: &str) -> Vec<RunEvent> {
        decoder.feed(text.as_bytes())
    }

    #[test]
    fn text_deltas_arrive_in_order() {
        let mut decoder = SseDecoder::new();
        let events = feed_all(
            &mut decoder,
            "event: thread.message.delta\n\
             data: {\"id\":\"msg_1\",\"delta\":{\"content\":[{\"index\":0,\"type\":\"text\",\"text\":{\"value\":\"Here \"}}]}}\n\
             \n\
             event: thread.message.delta\n\
             data: {\"id\":\"msg_1\",\"delta\":{\"content\":[{\"index\":0,\"type\":\"text\",\"text\":{\"value\":\"you go\"}}]}}\n\
             \n",
        );

        let fragments: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::TextDelta(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fragments, vec!["Here ", "you go"]);
    }

    #[test]
    fn events_split_across_chunks_are_reassembled() {
        let mut decoder = SseDecoder::new();
        let whole = "event: thread.run.completed\n\
                     data: {\"id\":\"run_1\",\"status\":\"completed\"}\n\n";
        let (head, tail) = whole.split_at(40);

        assert!(decoder.feed(head.as_bytes()).is_empty());
        let events = decoder.feed(tail.as_bytes());

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], RunEvent::RunCompleted { run_id } if run_id == "run_1"));
    }

    #[test]
    fn requires_action_carries_the_tool_call_batch() {
        let payload = serde_json::json!({
            "id": "run_7",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [
                        {"id": "call_1", "type": "function",
                         "function": {"name": "execute_search", "arguments": "{\"query\":\"mouse\"}"}},
                        {"id": "call_2", "type": "function",
                         "function": {"name": "execute_search", "arguments": "{\"query\":\"keyboard\"}"}}
                    ]
                }
            }
        });
        let mut decoder = SseDecoder::new();
        let events = feed_all(
            &mut decoder,
            &format!("event: thread.run.requires_action\ndata: {payload}\n\n"),
        );

        assert_eq!(events.len(), 1);
        match &events[0] {
            RunEvent::ToolCallsRequired { run_id, calls } => {
                assert_eq!(run_id, "run_7");
                assert_eq!(calls.len(), 2);
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[1].id, "call_2");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn failed_run_becomes_run_ended_with_message() {
        let mut decoder = SseDecoder::new();
        let events = feed_all(
            &mut decoder,
            "event: thread.run.failed\n\
             data: {\"id\":\"run_3\",\"status\":\"failed\",\"last_error\":{\"code\":\"server_error\",\"message\":\"boom\"}}\n\n",
        );

        assert_eq!(events.len(), 1);
        match &events[0] {
            RunEvent::RunEnded {
                run_id,
                status,
                message,
            } => {
                assert_eq!(run_id, "run_3");
                assert_eq!(*status, RunStatus::Failed);
                assert_eq!(message.as_deref(), Some("boom"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn done_sentinel_ends_the_stream() {
        let mut decoder = SseDecoder::new();
        let events = feed_all(&mut decoder, "event: done\ndata: [DONE]\n\n");
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RunEvent::Done));
    }

    #[test]
    fn error_events_surface_their_message() {
        let mut decoder = SseDecoder::new();
        let events = feed_all(
            &mut decoder,
            "event: error\ndata: {\"message\": \"The server had an error\"}\n\n",
        );
        assert_eq!(events.len(), 1);
        assert!(
            matches!(&events[0], RunEvent::StreamError(message) if message == "The server had an error")
        );
    }

    #[test]
    fn uninteresting_events_are_ignored() {
        let mut decoder = SseDecoder::new();
        let events = feed_all(
            &mut decoder,
            "event: thread.message.created\n\
             data: {\"id\":\"msg_1\"}\n\n\
             event: thread.run.step.delta\n\
             data: {\"id\":\"step_1\"}\n\n\
             : keep-alive\n",
        );
        assert!(events.is_empty());
    }

    #[test]
    fn malformed_payloads_are_skipped_not_fatal() {
        let mut decoder = SseDecoder::new();
        let events = feed_all(
            &mut decoder,
            "event: thread.run.completed\ndata: not json\n\n\
             event: thread.run.completed\ndata: {\"id\":\"run_9\",\"status\":\"completed\"}\n\n",
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], RunEvent::RunCompleted { run_id } if run_id == "run_9"));
    }

    #[tokio::test]
    async fn decode_sse_propagates_transport_failures() {
        let chunks: Vec<std::result::Result<&[u8], String>> = vec![
            Ok(b"event: thread.run.completed\ndata: {\"id\":\"run_1\",\"status\":\"completed\"}\n\n"),
            Err("connection reset".to_owned()),
        ];
        let mut stream = decode_sse(futures::stream::iter(chunks));

        let first = stream.next().await.unwrap();
        assert!(matches!(first, Ok(RunEvent::RunCompleted { .. })));
        let second = stream.next().await.unwrap();
        assert!(matches!(second, Err(Error::Stream(_))));
    }
}
