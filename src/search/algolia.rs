//! HTTP search client for an Algolia-style indexing API.
//!
//! - `POST {base}/1/indexes/{index}/batch` with `updateObject` actions
//!   replaces documents.
//! - `DELETE {base}/1/indexes/{index}/{objectID}` removes one document.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

use super::{ListDocument, SearchClient, SearchError};

/// Connection settings for [`AlgoliaSearchClient`].
#[derive(Debug, Clone)]
pub struct AlgoliaConfig {
    /// Application ID, sent as `X-Algolia-Application-Id`.
    pub app_id: String,
    /// API key with write access, sent as `X-Algolia-API-Key`.
    pub api_key: String,
    /// Target index name.
    pub index_name: String,
    /// Base URL override. Defaults to `https://{app_id}.algolia.net`.
    pub base_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    requests: Vec<BatchOperation<'a>>,
}

#[derive(Serialize)]
struct BatchOperation<'a> {
    action: &'static str,
    body: &'a ListDocument,
}

/// [`SearchClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct AlgoliaSearchClient {
    http: reqwest::Client,
    index_url: String,
    app_id: String,
    api_key: String,
}

impl AlgoliaSearchClient {
    /// Builds a client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] when the application ID or index
    /// name is empty, and [`SearchError::Http`] if the HTTP client cannot
    /// be constructed.
    pub fn new(config: AlgoliaConfig) -> Result<Self, SearchError> {
        if config.app_id.trim().is_empty() {
            return Err(SearchError::Config("application id is empty".to_string()));
        }
        if config.index_name.trim().is_empty() {
            return Err(SearchError::Config("index name is empty".to_string()));
        }

        let base_url = config
            .base_url
            .unwrap_or_else(|| format!("https://{}.algolia.net", config.app_id));
        let index_url = format!(
            "{}/1/indexes/{}",
            base_url.trim_end_matches('/'),
            config.index_name
        );
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            index_url,
            app_id: config.app_id,
            api_key: config.api_key,
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key)
    }

    async fn rejected(response: reqwest::Response) -> SearchError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        SearchError::Rejected { status, body }
    }
}

#[async_trait]
impl SearchClient for AlgoliaSearchClient {
    async fn save_objects(&self, documents: &[ListDocument]) -> Result<(), SearchError> {
        if documents.is_empty() {
            return Ok(());
        }

        let batch = BatchRequest {
            requests: documents
                .iter()
                .map(|body| BatchOperation {
                    action: "updateObject",
                    body,
                })
                .collect(),
        };

        let response = self
            .request(reqwest::Method::POST, format!("{}/batch", self.index_url))
            .json(&batch)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        tracing::debug!(documents = documents.len(), "search documents saved");
        Ok(())
    }

    async fn delete_object(&self, object_id: &str) -> Result<(), SearchError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                format!("{}/{}", self.index_url, object_id),
            )
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(object_id, "search document already absent");
            return Ok(());
        }
        if !status.is_success() {
            return Err(Self::rejected(response).await);
        }

        tracing::debug!(object_id, "search document deleted");
        Ok(())
    }
}
