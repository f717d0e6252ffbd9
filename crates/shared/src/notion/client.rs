//! Notion REST client
//!
//! Thin wrapper over the handful of endpoints the backend needs. The client is
//! constructed once at startup and cloned into whatever needs it.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::{NotionError, NotionResult};
use super::filter::Filter;
use super::property::{Page, Properties};

pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Maximum page size accepted by the query endpoint
const QUERY_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_NOTION_API_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn check(response: Response) -> NotionResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ApiErrorBody> = serde_json::from_str(&body).ok();
        let (code, message) = match parsed {
            Some(err) => (err.code, err.message),
            None => ("unknown".to_string(), body),
        };

        tracing::warn!(
            status = status.as_u16(),
            code = %code,
            message = %message,
            "Notion API request failed"
        );

        Err(NotionError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn read_page(response: Response) -> NotionResult<Page> {
        let value: Value = Self::check(response).await?.json().await?;
        serde_json::from_value(value).map_err(|e| NotionError::Decode(e.to_string()))
    }

    /// Query a database, following pagination cursors until exhausted.
    ///
    /// Non-page results (the endpoint can also return databases) are skipped.
    pub async fn query_database(
        &self,
        database_id: &str,
        filter: Option<&Filter>,
    ) -> NotionResult<Vec<Page>> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": QUERY_PAGE_SIZE });
            if let Some(filter) = filter {
                body["filter"] = filter.to_json();
            }
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response = self
                .request(Method::POST, &format!("/v1/databases/{}/query", database_id))
                .json(&body)
                .send()
                .await?;
            let batch: QueryResponse = Self::check(response).await?.json().await?;

            for result in batch.results {
                if result.get("object").and_then(Value::as_str) != Some("page") {
                    continue;
                }
                let page: Page = serde_json::from_value(result)
                    .map_err(|e| NotionError::Decode(e.to_string()))?;
                pages.push(page);
            }

            match (batch.has_more, batch.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(database_id, count = pages.len(), "Notion database queried");
        Ok(pages)
    }

    pub async fn create_page(
        &self,
        database_id: &str,
        properties: &Properties,
    ) -> NotionResult<Page> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties.to_json(),
        });

        let response = self
            .request(Method::POST, "/v1/pages")
            .json(&body)
            .send()
            .await?;
        Self::read_page(response).await
    }

    pub async fn update_page(&self, page_id: &str, properties: &Properties) -> NotionResult<Page> {
        let body = json!({ "properties": properties.to_json() });

        let response = self
            .request(Method::PATCH, &format!("/v1/pages/{}", page_id))
            .json(&body)
            .send()
            .await?;
        Self::read_page(response).await
    }

    /// Retrieve a single page, `None` when Notion reports it does not exist
    pub async fn retrieve_page(&self, page_id: &str) -> NotionResult<Option<Page>> {
        let response = self
            .request(Method::GET, &format!("/v1/pages/{}", page_id))
            .send()
            .await?;

        match Self::read_page(response).await {
            Ok(page) => Ok(Some(page)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
