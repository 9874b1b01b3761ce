//! Product and filter records returned by the shopping-search service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized shopping result.
///
/// Required fields are always present in a well-formed service payload.
/// Optional fields stay `None` when the service omits them and are skipped
/// when the record is serialized back to the assistant; absence is never
/// encoded as an empty string or zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product title.
    pub title: String,
    /// Link to the merchant listing.
    pub link: String,
    /// Link to the service's own product page.
    pub product_link: String,
    /// Service-assigned product identifier.
    pub product_id: String,
    /// Display price, currency included.
    pub price: String,
    /// Numeric price extracted from the display price.
    pub extracted_price: f64,
    /// Merchant name.
    pub source: String,
    /// Merchant icon URL.
    pub source_icon: String,
    /// Thumbnail image URL.
    pub thumbnail: String,
    /// Link for resolving full product details.
    pub serpapi_product_api: String,
    /// Delivery information, when advertised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<String>,
    /// Extra attributes such as "Wireless" or "USB-C".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    /// Promotional tag, e.g. "SALE".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Display price before a discount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<String>,
    /// Numeric price before a discount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_old_price: Option<f64>,
    /// Short description snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Average review rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Number of reviews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,
}

/// A refinement filter offered alongside a result page.
///
/// Filters arriving without an explicit type tag are normalized to
/// `"default"` before they reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Filter category, `"default"` when the service left it untagged.
    #[serde(rename = "type")]
    pub filter_type: String,
    /// Opaque option records, in service-provided order.
    #[serde(default)]
    pub options: Vec<Value>,
}

/// A normalized result page: products plus the filters that refine them.
///
/// This is the payload serialized back to the assistant for search and
/// filter tool calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Shopping results, in service-provided order, at most
    /// [`MAX_RESULTS`](crate::search::MAX_RESULTS) entries.
    pub products: Vec<Product>,
    /// Refinement filters, in service-provided order.
    pub filters: Vec<SearchFilter>,
}

impl SearchPage {
    /// Returns `true` when the page carries neither products nor filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.filters.is_empty()
    }
}
