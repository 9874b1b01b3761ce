//! Observer callbacks for streamed run output.
//!
//! Presentation layers implement [`EventSink`] and hand it to the
//! [`Runner`](crate::runner::Runner). Callbacks are synchronous and fire on
//! the controller's logical thread of control, in emission order, never
//! from inside a concurrent search task.

use crate::product::Product;

/// Callbacks invoked while a run streams.
///
/// Every method has a default empty body, so implementations only override
/// the events they care about.
pub trait EventSink: Send + Sync {
    /// Called for each incremental text fragment, in arrival order.
    fn on_text_delta(&self, _fragment: &str) {}

    /// Called with each product batch yielded by a resolved search or
    /// filter call, before the batch is returned to the assistant.
    fn on_product_list(&self, _products: &[Product]) {}
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {}
