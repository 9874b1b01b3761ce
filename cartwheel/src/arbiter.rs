//! Resolution of assistant tool calls into tool outputs.
//!
//! One `requires_action` pause yields a batch of calls. Search calls are
//! dispatched concurrently as a single batch; detail and filter calls are
//! comparatively rare and each targets a previously-known-good link, so
//! they resolve sequentially. Every recognized call produces exactly one
//! output: per-call failures become error payloads the assistant can
//! react to conversationally, never aborted batches.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::assistant::types::{ToolCall, ToolOutput};
use crate::dispatch::{Dispatcher, SearchRequest};
use crate::error::{Error, Result};
use crate::product::SearchPage;
use crate::search::ShoppingBackend;
use crate::sink::EventSink;
use crate::tools::ToolKind;

/// A validated search call awaiting dispatch.
#[derive(Debug)]
struct SearchCall {
    id: String,
    query: String,
}

/// A validated detail/filter call awaiting sequential resolution.
#[derive(Debug)]
struct LinkCall {
    id: String,
    kind: ToolKind,
    link: String,
}

/// Resolves batches of tool calls against the shopping backend.
#[derive(Debug, Clone)]
pub struct ToolArbiter<S> {
    backend: Arc<S>,
    dispatcher: Dispatcher<S>,
}

impl<S: ShoppingBackend> ToolArbiter<S> {
    /// Creates an arbiter over the given backend.
    #[must_use]
    pub fn new(backend: Arc<S>) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&backend)),
            backend,
        }
    }

    /// Resolve a batch of pending tool calls into tool outputs.
    ///
    /// For every resolved search/filter call the product batch is emitted
    /// to `sink` before the corresponding output is returned. Output order
    /// does not track input order; the assistant matches by `tool_call_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] when a recognized call lacks its
    /// required argument, before any remote call is made. Remote failures
    /// never error out of here; they are folded into the failing call's
    /// own output.
    pub async fn resolve(
        &self,
        pending: Vec<ToolCall>,
        sink: &dyn EventSink,
    ) -> Result<Vec<ToolOutput>> {
        let (searches, links) = Self::classify(pending)?;
        debug!(
            searches = searches.len(),
            links = links.len(),
            "Resolving tool-call batch",
        );

        let mut outputs = Vec::with_capacity(searches.len() + links.len());

        if !searches.is_empty() {
            let requests = searches
                .iter()
                .map(|call| SearchRequest::new(call.id.as_str(), call.query.as_str()))
                .collect();
            let mut outcomes = self.dispatcher.dispatch_all(requests).await;

            for call in &searches {
                // The dispatcher returns one outcome per request by
                // construction.
                let Some(outcome) = outcomes.remove(&call.id) else {
                    continue;
                };
                outputs.push(Self::page_output(&call.id, outcome, sink));
            }
        }

        for call in links {
            let output = match call.kind {
                ToolKind::Filter => Self::page_output(
                    &call.id,
                    self.backend.resolve_filter_link(&call.link).await,
                    sink,
                ),
                ToolKind::Details => {
                    Self::detail_output(&call.id, self.backend.resolve_detail_link(&call.link).await)
                }
                // classify() routes search calls to the dispatch group.
                ToolKind::Search => continue,
            };
            outputs.push(output);
        }

        Ok(outputs)
    }

    /// Validate and partition a batch before any remote call.
    ///
    /// Calls of unrecognized kind are dropped (the assistant-side schema is
    /// the source of truth for valid kinds); a recognized call with a
    /// missing or empty required argument fails the whole resolution.
    fn classify(pending: Vec<ToolCall>) -> Result<(Vec<SearchCall>, Vec<LinkCall>)> {
        let mut searches = Vec::new();
        let mut links = Vec::new();

        for call in pending {
            let Some(kind) = ToolKind::from_name(&call.function.name) else {
                warn!(
                    call_id = %call.id,
                    name = %call.function.name,
                    "Dropping tool call of unrecognized kind",
                );
                continue;
            };

            let arguments: Value =
                serde_json::from_str(&call.function.arguments).unwrap_or(Value::Null);
            let argument = kind.required_argument();
            let value = arguments
                .get(argument)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .ok_or_else(|| Error::missing_argument(&call.id, argument))?
                .to_owned();

            match kind {
                ToolKind::Search => searches.push(SearchCall {
                    id: call.id,
                    query: value,
                }),
                kind => links.push(LinkCall {
                    id: call.id,
                    kind,
                    link: value,
                }),
            }
        }

        Ok((searches, links))
    }

    /// Wrap a result-page outcome as a tool output, emitting the product
    /// batch to the sink on success.
    fn page_output(id: &str, outcome: Result<SearchPage>, sink: &dyn EventSink) -> ToolOutput {
        match outcome {
            Ok(page) => {
                sink.on_product_list(&page.products);
                match serde_json::to_string(&page) {
                    Ok(payload) => ToolOutput::new(id, payload),
                    Err(e) => Self::error_output(id, &Error::from(e)),
                }
            }
            Err(e) => Self::error_output(id, &e),
        }
    }

    /// Wrap a raw detail payload as a tool output.
    fn detail_output(id: &str, outcome: Result<Value>) -> ToolOutput {
        match outcome {
            Ok(payload) => ToolOutput::new(id, payload.to_string()),
            Err(e) => Self::error_output(id, &e),
        }
    }

    /// Encode a failure as the call's own output payload.
    fn error_output(id: &str, error: &Error) -> ToolOutput {
        warn!(call_id = %id, error = %error, "Tool call resolved to an error payload");
        let payload = serde_json::json!({ "error": error.to_string() });
        ToolOutput::new(id, payload.to_string())
    }
}
