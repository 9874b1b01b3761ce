//! Wire types for shopping-search responses.

use serde::Deserialize;
use serde_json::Value;

/// A result page as the service sends it, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct SerpPage {
    /// Shopping results, kept raw so malformed entries can be skipped
    /// individually during normalization.
    #[serde(default)]
    pub shopping_results: Vec<Value>,
    #[serde(default)]
    pub filters: Vec<RawFilter>,
}

/// A filter entry as the service sends it; the type tag may be absent.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawFilter {
    #[serde(rename = "type", default)]
    pub filter_type: Option<String>,
    #[serde(default)]
    pub options: Vec<Value>,
}
