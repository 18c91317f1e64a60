//! Notion-backed record store.
//!
//! The client talks to the public REST API with a bearer token. Every request
//! is bounded by a timeout, and every failure maps to a [`StoreError`] so the
//! ledgers never see transport details.

use std::time::Duration;

use async_trait::async_trait;
use engine::{Filter, Properties, RecordId, RecordStore, RemoteRecord, StoreError};
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

mod properties;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("notion token must not be empty")]
    MissingToken,
    #[error("invalid auth header value: {0}")]
    InvalidToken(#[from] header::InvalidHeaderValue),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<properties::Page>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

fn encode_filter(filter: &Filter) -> Value {
    match filter {
        Filter::CheckboxEquals { property, value } => {
            json!({ "property": property, "checkbox": { "equals": value } })
        }
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_decode() {
        StoreError::Malformed(err.to_string())
    } else {
        StoreError::Unreachable(err.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct NotionStore {
    client: Client,
    base_url: String,
}

impl NotionStore {
    /// Return a builder for `NotionStore`.
    pub fn builder() -> NotionStoreBuilder {
        NotionStoreBuilder::default()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let resp = request.send().await.map_err(transport_error)?;
        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(transport_error);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => match body.code {
                Some(code) => format!("{code}: {}", body.message),
                None => body.message,
            },
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        if status == StatusCode::UNAUTHORIZED {
            tracing::error!("notion rejected the token, check the integration secret");
        }
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn create_record(
        &self,
        collection: &str,
        properties: Properties,
    ) -> Result<RecordId, StoreError> {
        let body = json!({
            "parent": { "database_id": collection },
            "properties": properties::encode(&properties),
        });
        let page: properties::Page = self
            .send(self.client.post(self.url("pages")).json(&body))
            .await?;
        tracing::debug!(page = %page.id, "created notion page");
        Ok(RecordId::new(page.id))
    }

    async fn query_all(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<RemoteRecord>, StoreError> {
        let endpoint = self.url(&format!("databases/{collection}/query"));
        let filter = filter.map(encode_filter);
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page: QueryResponse = {
                let payload = QueryRequest {
                    page_size: PAGE_SIZE,
                    start_cursor: cursor.as_deref(),
                    filter: filter.clone(),
                };
                self.send(self.client.post(&endpoint).json(&payload))
                    .await?
            };
            records.extend(page.results.into_iter().map(RemoteRecord::from));

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(collection, count = records.len(), "queried notion database");
        Ok(records)
    }

    async fn update_record(
        &self,
        id: &RecordId,
        properties: Properties,
    ) -> Result<(), StoreError> {
        let body = json!({ "properties": properties::encode(&properties) });
        let _: Value = self
            .send(
                self.client
                    .patch(self.url(&format!("pages/{id}")))
                    .json(&body),
            )
            .await?;
        Ok(())
    }
}

/// The builder for `NotionStore`
#[derive(Debug)]
pub struct NotionStoreBuilder {
    token: String,
    base_url: String,
    timeout: Duration,
}

impl Default for NotionStoreBuilder {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NotionStoreBuilder {
    /// Integration secret used as bearer token.
    pub fn token(mut self, token: &str) -> Self {
        self.token = token.trim().to_string();
        self
    }

    /// Override the API root, mostly for tests.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<NotionStore, NotionError> {
        if self.token.is_empty() {
            return Err(NotionError::MissingToken);
        }

        let mut auth = header::HeaderValue::try_from(format!("Bearer {}", self.token))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::HeaderName::from_static("notion-version"),
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()?;

        Ok(NotionStore {
            client,
            base_url: self.base_url,
        })
    }
}
