//! Commonly used types, re-exported for convenience.

pub use crate::arbiter::ToolArbiter;
pub use crate::assistant::{
    AssistantClient, AssistantConfig, RunEvent, RunStatus, RunTransport, ToolCall, ToolOutput,
};
pub use crate::dispatch::{Dispatcher, SearchRequest};
pub use crate::error::{Error, Result};
pub use crate::product::{Product, SearchFilter, SearchPage};
pub use crate::runner::Runner;
pub use crate::search::{SerpClient, SerpConfig, ShoppingBackend};
pub use crate::sink::{EventSink, NoopSink};
