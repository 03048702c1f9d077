//! HTTP client for the WordPress REST API (`wp-json/wp/v2`)

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::wire::{decode_items, WireItem};
use super::{paginate, ContentSource, Listing, PageFetch, PAGE_SIZE};
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::types::{ContentType, RemoteId, RemoteItem};

const INVALID_PAGE_CODE: &str = "rest_post_invalid_page_number";

/// Blocking WordPress API client.
///
/// Must not be created or dropped on an async runtime thread; the webhook
/// server runs it under `spawn_blocking`.
pub struct WordPressClient {
    client: Client,
    base_url: String,
}

impl WordPressClient {
    /// Create a client with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wpsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SyncError::Config(format!(
                "API URL must be http(s): {}",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a JSON document. `Ok(None)` on 404.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(SyncError::Internal(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        Ok(Some(response.json()?))
    }

    /// GET one page of a collection. `Ok(None)` once past the last page.
    fn list_page(&self, kind: ContentType, query: &[(&str, String)]) -> Result<Option<Vec<Value>>> {
        let url = format!("{}/{}", self.base_url, kind.endpoint());
        let response = self.client.get(&url).query(query).send()?;
        let status = response.status();

        if status.is_success() {
            return Ok(Some(response.json()?));
        }

        // WordPress rejects page numbers beyond the last non-empty page
        if status == StatusCode::BAD_REQUEST {
            let body: Value = response.json().unwrap_or_default();
            if body["code"] == INVALID_PAGE_CODE {
                return Ok(None);
            }
        }

        Err(SyncError::Internal(format!("GET {} returned {}", url, status)))
    }

    fn fetch_page(&self, kind: ContentType, page: u32, since: Option<&str>) -> PageFetch<RemoteItem> {
        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", PAGE_SIZE.to_string()),
            ("status", "publish".to_string()),
        ];
        if let Some(since) = since {
            query.push(("after", since.to_string()));
        }

        match self.list_page(kind, &query) {
            Ok(Some(values)) => {
                let returned = values.len();
                PageFetch::Items {
                    items: decode_items(values),
                    returned,
                }
            }
            Ok(None) => PageFetch::decoded(Vec::new()),
            Err(e) => {
                tracing::warn!("Error fetching {} page {}: {}", kind.endpoint(), page, e);
                PageFetch::Failed
            }
        }
    }
}

impl ContentSource for WordPressClient {
    fn fetch_items(&self, kind: ContentType, since: Option<&str>) -> Listing {
        let (items, complete) = paginate(|page| self.fetch_page(kind, page, since));
        tracing::debug!(
            "Fetched {} {}s (complete: {})",
            items.len(),
            kind,
            complete
        );
        Listing { items, complete }
    }

    fn fetch_single(&self, id: RemoteId) -> Option<RemoteItem> {
        match self.get_json::<Value>(&format!("posts/{}", id), &[]) {
            Ok(Some(value)) => match WireItem::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("Undecodable post {}: {}", id, e);
                    None
                }
            },
            Ok(None) => {
                tracing::warn!("Post {} not found", id);
                None
            }
            Err(e) => {
                tracing::warn!("Error fetching post {}: {}", id, e);
                None
            }
        }
    }

    fn fetch_category_ids_for_post(&self, post_id: RemoteId) -> Vec<RemoteId> {
        #[derive(Deserialize)]
        struct PostCategories {
            #[serde(default)]
            categories: Vec<RemoteId>,
        }

        let query = [("_fields", "categories".to_string())];
        match self.get_json::<PostCategories>(&format!("posts/{}", post_id), &query) {
            Ok(Some(data)) => data.categories,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Error fetching categories of post {}: {}", post_id, e);
                Vec::new()
            }
        }
    }

    fn fetch_category_name(&self, category_id: RemoteId) -> Option<String> {
        #[derive(Deserialize)]
        struct CategoryName {
            name: Option<String>,
        }

        if category_id == 0 {
            return None;
        }

        let query = [("_fields", "name".to_string())];
        match self.get_json::<CategoryName>(&format!("categories/{}", category_id), &query) {
            Ok(Some(data)) => data.name,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Error fetching category {}: {}", category_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        let err = WordPressClient::new("ftp://example.com", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_trims_trailing_slash() {
        let client =
            WordPressClient::new("http://localhost/wp-json/wp/v2/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost/wp-json/wp/v2");
    }
}
