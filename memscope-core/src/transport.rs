//! JSON transport to the memory backend.
//!
//! Every request carries `Content-Type: application/json` and shares one
//! cookie store (the panel's same-origin credential scope). Failures of any
//! kind (network, non-2xx, undecodable body) are logged and surface as
//! `None`. There are no retries, timeouts or cancellation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::PanelError;
use crate::models::{
    DeleteResponse, MemoryList, MemoryRecord, ModelCatalog, ModelSwitch, NewMemory, SearchResult,
};

// ============================================================================
// MemoryApi trait
// ============================================================================

/// Backend operations the panel consumes. `None` always means "failed".
#[async_trait]
pub trait MemoryApi: Send + Sync {
    async fn list_memories(&self) -> Option<MemoryList>;

    async fn search(&self, query: &str) -> Option<Vec<SearchResult>>;

    async fn add_memory(&self, content: &str) -> Option<MemoryRecord>;

    async fn delete_memory(&self, id: &str) -> Option<DeleteResponse>;

    /// Raw `{nodes, edges}` body; shape validation is the mapper's job.
    async fn memory_network(&self, threshold: f64) -> Option<Value>;

    async fn list_models(&self) -> Option<ModelCatalog>;

    async fn set_model(&self, model: &str) -> Option<ModelSwitch>;
}

// ============================================================================
// Request options
// ============================================================================

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            body: None,
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
        }
    }
}

// ============================================================================
// ApiClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, PanelError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        // Reject unusable bases up front rather than on every call
        Url::parse(&base_url)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request against `path` (which may carry a query string).
    pub async fn call(&self, path: &str, options: RequestOptions) -> Option<Value> {
        let url = Url::parse(&format!("{}{}", self.base_url, path));
        self.fetch(url.map_err(PanelError::from), options).await
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        url: Result<Url, PanelError>,
        options: RequestOptions,
    ) -> Option<T> {
        let value = self.fetch(url, options).await?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::error!(error = %e, "API response did not match expected shape");
                None
            }
        }
    }

    async fn fetch(&self, url: Result<Url, PanelError>, options: RequestOptions) -> Option<Value> {
        let method = options.method.clone();
        let result = match url {
            Ok(url) => self.send(url, options).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(method = %method, error = %e, "API call failed");
                None
            }
        }
    }

    async fn send(&self, url: Url, options: RequestOptions) -> Result<Value, PanelError> {
        tracing::debug!(method = %options.method, url = %url, "API call");

        let mut request = self.client.request(options.method, url);
        if let Some(body) = options.body {
            request = request.body(serde_json::to_vec(&body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PanelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Build `{base}{prefix}/{segment}` with `segment` percent-encoded as a
    /// single path component.
    fn segment_url(&self, prefix: &str, segment: &str) -> Result<Url, PanelError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, prefix))?;
        url.path_segments_mut()
            .map_err(|_| PanelError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url, PanelError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }
}

#[async_trait]
impl MemoryApi for ApiClient {
    async fn list_memories(&self) -> Option<MemoryList> {
        self.call_typed(self.url("/memories"), RequestOptions::default())
            .await
    }

    async fn search(&self, query: &str) -> Option<Vec<SearchResult>> {
        self.call_typed(self.segment_url("/search", query), RequestOptions::default())
            .await
    }

    async fn add_memory(&self, content: &str) -> Option<MemoryRecord> {
        let body = serde_json::to_value(NewMemory {
            content: content.to_string(),
        })
        .ok()?;
        self.call_typed(self.url("/memories"), RequestOptions::post(body))
            .await
    }

    async fn delete_memory(&self, id: &str) -> Option<DeleteResponse> {
        self.call_typed(self.segment_url("/memories", id), RequestOptions::delete())
            .await
    }

    async fn memory_network(&self, threshold: f64) -> Option<Value> {
        let url = self.url("/memory-network").map(|mut url| {
            url.query_pairs_mut()
                .append_pair("threshold", &threshold.to_string());
            url
        });
        self.fetch(url, RequestOptions::default()).await
    }

    async fn list_models(&self) -> Option<ModelCatalog> {
        self.call_typed(self.url("/models"), RequestOptions::default())
            .await
    }

    async fn set_model(&self, model: &str) -> Option<ModelSwitch> {
        let body = serde_json::json!({ "model": model });
        self.call_typed(self.url("/models"), RequestOptions::post(body))
            .await
    }
}

// ============================================================================
// TESTS
// ============================================================================
