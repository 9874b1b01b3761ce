//! Shopping-search API client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::product::{Product, SearchFilter, SearchPage};

use super::config::SerpConfig;
use super::types::SerpPage;
use super::{MAX_RESULTS, ShoppingBackend};

/// Search engine selector sent with every fresh query.
const ENGINE: &str = "google_shopping";
/// Fixed market defaults; not user-configurable.
const LOCATION: &str = "New York, United States";
const GOOGLE_DOMAIN: &str = "google.com";
const COUNTRY: &str = "us";
const LANGUAGE: &str = "en";

/// Shopping-search API client.
#[derive(Debug, Clone)]
pub struct SerpClient {
    config: Arc<SerpConfig>,
    client: Client,
}

impl SerpClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the API key is empty, or the HTTP
    /// client fails to build.
    pub fn new(config: SerpConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::config("search service API key is required"));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder.build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `SERP_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        Self::new(SerpConfig::from_env()?)
    }

    /// Build the URL for a fresh query.
    fn search_url(&self, query: &str) -> Result<Url> {
        let url = Url::parse_with_params(
            &self.config.base_url,
            [
                ("api_key", self.config.api_key.as_str()),
                ("engine", ENGINE),
                ("q", query),
                ("location", LOCATION),
                ("google_domain", GOOGLE_DOMAIN),
                ("gl", COUNTRY),
                ("hl", LANGUAGE),
                ("direct_link", "true"),
            ],
        )?;
        Ok(url)
    }

    /// Build the URL for a service-provided filter/detail link.
    ///
    /// The link's own query string is forwarded verbatim, with the
    /// credential injected (replacing any key the link already carried).
    fn link_url(&self, link: &str) -> Result<Url> {
        let mut url = Url::parse(link)?;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "api_key")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        {
            let mut editor = url.query_pairs_mut();
            editor.clear();
            editor.extend_pairs(&pairs);
            editor.append_pair("api_key", &self.config.api_key);
        }
        Ok(url)
    }

    /// Issue a GET request and decode the JSON payload.
    ///
    /// A response carrying an explicit `error` field fails with
    /// [`Error::NoResults`]; retry policy belongs to the caller.
    async fn fetch_json(&self, url: Url) -> Result<Value> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api("serpapi", status.as_u16(), body));
        }

        let payload: Value = response.json().await?;
        if let Some(message) = payload.get("error").and_then(Value::as_str) {
            return Err(Error::no_results(message.to_owned()));
        }

        Ok(payload)
    }

    /// Normalize a raw result page.
    ///
    /// Keeps at most the first [`MAX_RESULTS`] shopping results in
    /// service-provided order, skipping entries that fail to decode, and
    /// assigns `"default"` to filters arriving without a type tag.
    fn normalize_page(payload: Value) -> Result<SearchPage> {
        let page: SerpPage = serde_json::from_value(payload)?;

        let products: Vec<Product> = page
            .shopping_results
            .into_iter()
            .take(MAX_RESULTS)
            .filter_map(|entry| match serde_json::from_value::<Product>(entry) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed shopping result");
                    None
                }
            })
            .collect();

        let filters: Vec<SearchFilter> = page
            .filters
            .into_iter()
            .map(|raw| SearchFilter {
                filter_type: raw
                    .filter_type
                    .filter(|tag| !tag.is_empty())
                    .unwrap_or_else(|| "default".to_owned()),
                options: raw.options,
            })
            .collect();

        Ok(SearchPage { products, filters })
    }
}

#[async_trait]
impl ShoppingBackend for SerpClient {
    async fn search(&self, query: &str) -> Result<SearchPage> {
        debug!(%query, "Dispatching shopping search");
        let payload = self.fetch_json(self.search_url(query)?).await?;
        let page = Self::normalize_page(payload)?;
        debug!(
            products = page.products.len(),
            filters = page.filters.len(),
            "Shopping search resolved",
        );
        Ok(page)
    }

    async fn resolve_filter_link(&self, link: &str) -> Result<SearchPage> {
        debug!(%link, "Resolving filter link");
        let payload = self.fetch_json(self.link_url(link)?).await?;
        Self::normalize_page(payload)
    }

    async fn resolve_detail_link(&self, link: &str) -> Result<Value> {
        debug!(%link, "Resolving detail link");
        let mut payload = self.fetch_json(self.link_url(link)?).await?;
        // The detail payload proper lives under `product_results`; fall back
        // to the whole body when the service omits the envelope.
        match payload.get_mut("product_results") {
            Some(details) => Ok(details.take()),
            None => Ok(payload),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> SerpClient {
        SerpClient::new(SerpConfig::new("secret")).unwrap()
    }

    fn product_entry(id: usize) -> Value {
        serde_json::json!({
            "title": format!("Product {id}"),
            "link": format!("https://shop.example/p/{id}"),
            "product_link": format!("https://google.example/product/{id}"),
            "product_id": id.to_string(),
            "price": "$10.00",
            "extracted_price": 10.0,
            "source": "Example Shop",
            "source_icon": "https://shop.example/icon.png",
            "thumbnail": format!("https://shop.example/thumb/{id}.jpg"),
            "serpapi_product_api": format!("https://serpapi.example/search.json?product_id={id}")
        })
    }

    #[test]
    fn search_url_carries_fixed_market_parameters() {
        let url = client().search_url("wireless mouse").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("engine".into(), "google_shopping".into())));
        assert!(pairs.contains(&("q".into(), "wireless mouse".into())));
        assert!(pairs.contains(&("gl".into(), "us".into())));
        assert!(pairs.contains(&("hl".into(), "en".into())));
        assert!(pairs.contains(&("api_key".into(), "secret".into())));
        assert!(pairs.contains(&("direct_link".into(), "true".into())));
    }

    #[test]
    fn link_url_forwards_query_string_and_injects_credential() {
        let url = client()
            .link_url("https://serpapi.example/search.json?engine=google_shopping&tbs=vw:l,ss:44")
            .unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("tbs".into(), "vw:l,ss:44".into())));
        assert!(pairs.contains(&("engine".into(), "google_shopping".into())));
        assert!(pairs.contains(&("api_key".into(), "secret".into())));
    }

    #[test]
    fn link_url_replaces_existing_credential() {
        let url = client()
            .link_url("https://serpapi.example/search.json?api_key=stale&q=mouse")
            .unwrap();
        let keys: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k == "api_key")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(keys, vec![("api_key".to_owned(), "secret".to_owned())]);
    }

    #[test]
    fn normalize_keeps_first_ten_in_order() {
        let entries: Vec<Value> = (0..14).map(product_entry).collect();
        let payload = serde_json::json!({ "shopping_results": entries, "filters": [] });

        let page = SerpClient::normalize_page(payload).unwrap();
        assert_eq!(page.products.len(), MAX_RESULTS);
        assert_eq!(page.products[0].title, "Product 0");
        assert_eq!(page.products[9].title, "Product 9");
    }

    #[test]
    fn normalize_skips_malformed_entries() {
        let payload = serde_json::json!({
            "shopping_results": [product_entry(1), {"title": "missing required fields"}],
            "filters": []
        });

        let page = SerpClient::normalize_page(payload).unwrap();
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].title, "Product 1");
    }

    #[test]
    fn normalize_defaults_untyped_filters() {
        let payload = serde_json::json!({
            "shopping_results": [],
            "filters": [
                { "options": [{"text": "Under $25"}] },
                { "type": "", "options": [] },
                { "type": "brand", "options": [{"text": "Acme"}] }
            ]
        });

        let page = SerpClient::normalize_page(payload).unwrap();
        assert_eq!(page.filters[0].filter_type, "default");
        assert_eq!(page.filters[1].filter_type, "default");
        assert_eq!(page.filters[2].filter_type, "brand");
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = SerpClient::new(SerpConfig::new("")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
