//! Wire types for the assistant-run protocol.

use serde::{Deserialize, Serialize};

/// Status of a run.
///
/// The core state machine only distinguishes a few of these, but the wire
/// can report the full surface; unknown future statuses are mapped to
/// failure-terminal handling by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RunStatus {
    /// Waiting for capacity.
    Queued,
    /// Actively generating.
    InProgress,
    /// Paused until tool outputs are submitted.
    RequiresAction,
    /// Cancellation in flight.
    Cancelling,
    /// Cancelled before completing.
    Cancelled,
    /// Ended with a service-side error.
    Failed,
    /// Produced a final answer.
    Completed,
    /// Ended before producing a complete answer.
    Incomplete,
    /// Timed out waiting for tool outputs.
    Expired,
}

impl RunStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Expired => "expired",
        }
    }

    /// Returns `true` once the run can make no further progress.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Incomplete | Self::Expired
        )
    }

    /// Returns `true` for terminal statuses other than `completed`.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.is_terminal() && !matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A conversation thread, as returned by thread creation.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadObject {
    /// Service-assigned thread identifier.
    pub id: String,
}

/// A run object as carried by run lifecycle events.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    /// Service-assigned run identifier.
    pub id: String,
    /// Current status.
    pub status: RunStatus,
    /// Present while the run waits for tool outputs.
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    /// Present on failure-terminal runs.
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl Run {
    /// The tool calls this run is waiting on, empty when none.
    #[must_use]
    pub fn pending_tool_calls(self) -> Vec<ToolCall> {
        self.required_action
            .map(|action| action.submit_tool_outputs.tool_calls)
            .unwrap_or_default()
    }
}

/// Error details attached to a failed run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// The action a paused run requires.
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredAction {
    /// Tool outputs to submit.
    pub submit_tool_outputs: SubmitToolOutputs,
}

/// The batch of tool calls awaiting outputs.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitToolOutputs {
    /// Calls in emission order.
    pub tool_calls: Vec<ToolCall>,
}

/// A delegation request emitted by the assistant during a run.
///
/// Immutable once received; must be answered with exactly one
/// [`ToolOutput`] bearing the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Service-assigned call identifier.
    pub id: String,
    /// The invoked function.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Creates a call, arguments given as a JSON-encoded string.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// The function half of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name, classified by
    /// [`ToolKind::from_name`](crate::tools::ToolKind::from_name).
    pub name: String,
    /// Arguments as a JSON-encoded string.
    pub arguments: String,
}

/// The answer to a [`ToolCall`], submitted to resume a paused run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Id of the call being answered.
    pub tool_call_id: String,
    /// Serialized result or structured error payload.
    pub output: String,
}

impl ToolOutput {
    /// Creates an output for the given call id.
    #[must_use]
    pub fn new(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output: output.into(),
        }
    }
}

/// A streamed message-delta event body.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDelta {
    /// The delta envelope.
    pub delta: MessageDeltaBody,
}

impl MessageDelta {
    /// Concatenated text carried by this delta, in arrival order.
    #[must_use]
    pub fn text(self) -> String {
        self.delta
            .content
            .into_iter()
            .filter_map(|part| part.text.and_then(|t| t.value))
            .collect()
    }
}

/// Content deltas inside a message delta.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeltaBody {
    /// Content parts, in order.
    #[serde(default)]
    pub content: Vec<ContentDelta>,
}

/// One content part of a message delta.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentDelta {
    /// Present for text parts; other modalities are ignored.
    #[serde(default)]
    pub text: Option<TextDelta>,
}

/// The text fragment of a content delta.
#[derive(Debug, Clone, Deserialize)]
pub struct TextDelta {
    /// The fragment value, absent in annotation-only deltas.
    #[serde(default)]
    pub value: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        let status: RunStatus = serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(status, RunStatus::RequiresAction);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"requires_action\"");
    }

    #[test]
    fn terminal_classification() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(!RunStatus::Completed.is_failure());
        assert!(RunStatus::Expired.is_failure());
        assert!(RunStatus::Cancelled.is_failure());
        assert!(!RunStatus::RequiresAction.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
    }

    #[test]
    fn run_with_required_action_exposes_tool_calls() {
        let run: Run = serde_json::from_value(serde_json::json!({
            "id": "run_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "execute_search",
                            "arguments": "{\"query\": \"wireless mouse\"}"
                        }
                    }]
                }
            }
        }))
        .unwrap();

        let calls = run.pending_tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.name, "execute_search");
    }

    #[test]
    fn run_without_required_action_has_no_calls() {
        let run: Run = serde_json::from_value(serde_json::json!({
            "id": "run_2",
            "status": "completed"
        }))
        .unwrap();
        assert!(run.pending_tool_calls().is_empty());
    }

    #[test]
    fn message_delta_concatenates_text_parts() {
        let delta: MessageDelta = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "delta": {
                "content": [
                    { "index": 0, "type": "text", "text": { "value": "Here are " } },
                    { "index": 0, "type": "text", "text": { "value": "some mice." } }
                ]
            }
        }))
        .unwrap();
        assert_eq!(delta.text(), "Here are some mice.");
    }
}
