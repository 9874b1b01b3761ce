//! The fixed tool schema exposed to the assistant.
//!
//! Three operations are advertised with every run: a fresh product search,
//! a product-details lookup, and a filter-link resolution. The assistant's
//! side of the schema is the source of truth for valid call kinds;
//! [`ToolKind::from_name`] classifies what comes back.

use serde::Serialize;
use serde_json::Value;

/// Tool name for fresh product searches.
pub const EXECUTE_SEARCH: &str = "execute_search";
/// Tool name for product-details lookups.
pub const GET_PRODUCT_DETAILS: &str = "get_product_details";
/// Tool name for filter-link resolutions.
pub const FILTER_RESULTS: &str = "filter_results";

/// Classification of an emitted tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// A fresh product search.
    Search,
    /// A product-details lookup against a known-good link.
    Details,
    /// A filter resolution against a known-good link.
    Filter,
}

impl ToolKind {
    /// Classify a call by its function name, `None` for unrecognized names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            EXECUTE_SEARCH => Some(Self::Search),
            GET_PRODUCT_DETAILS => Some(Self::Details),
            FILTER_RESULTS => Some(Self::Filter),
            _ => None,
        }
    }

    /// The single required argument for this kind of call.
    #[must_use]
    pub const fn required_argument(self) -> &'static str {
        match self {
            Self::Search => "query",
            Self::Details => "serpapi_product_api",
            Self::Filter => "serpapi_link",
        }
    }
}

/// A function definition advertised to the assistant.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Function name.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// Whether the schema is enforced strictly.
    pub strict: bool,
    /// JSON Schema for the arguments.
    pub parameters: Value,
}

impl ToolDefinition {
    fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            strict: true,
            parameters,
        }
    }
}

/// System instructions the assistant is bootstrapped with.
#[must_use]
pub const fn instructions() -> &'static str {
    "You are a highly intelligent shopping assistant who helps users find \
     products they love. You can search for products by using Google search. \
     Identify what the user wants and search for products using queries that \
     you think will work best. If the user has a question about a specific \
     product, gather information about the product and answer them as well \
     as you can. Help the user make a purchasing decision."
}

/// The complete tool schema sent with run creation.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![execute_search(), product_details(), filter_results()]
}

fn execute_search() -> ToolDefinition {
    ToolDefinition::new(
        EXECUTE_SEARCH,
        "Search for products based on the provided query.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The query to search for products."
                }
            },
            "additionalProperties": false,
            "required": ["query"]
        }),
    )
}

fn product_details() -> ToolDefinition {
    ToolDefinition::new(
        GET_PRODUCT_DETAILS,
        "Get details for a specific product based on the provided serp api product link.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "serpapi_product_api": {
                    "type": "string",
                    "description": "The serpapi product api link to get details for."
                }
            },
            "additionalProperties": false,
            "required": ["serpapi_product_api"]
        }),
    )
}

fn filter_results() -> ToolDefinition {
    ToolDefinition::new(
        FILTER_RESULTS,
        "Filter the search results based on the provided serp api link.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "serpapi_link": {
                    "type": "string",
                    "description": "The serpapi filter link to get results for."
                }
            },
            "additionalProperties": false,
            "required": ["serpapi_link"]
        }),
    )
}
