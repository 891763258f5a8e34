use crate::models::RawProviderRecord;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the listings provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("No API key configured for the listings provider")]
    MissingCredentials,
}

/// One upstream search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    pub offset: u32,
}

/// Records returned by one search call
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub records: Vec<RawProviderRecord>,
    pub total: Option<u64>,
}

/// Source of raw listing records
#[async_trait]
pub trait ListingProvider: Send + Sync {
    /// Whether the provider has the credential it needs to be called at all
    fn has_credentials(&self) -> bool;

    /// Run one search against the provider
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ProviderError>;
}

/// HTTP client for the rental data API
///
/// `GET {base_url}/listings/search?query=..&limit=..&offset=..` authenticated
/// with an `X-Api-Key` header.
pub struct RentalDataClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl RentalDataClient {
    /// Create a new client; a blank API key counts as missing
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, request: &SearchRequest) -> String {
        format!(
            "{}/listings/search?query={}&limit={}&offset={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&request.query),
            request.limit,
            request.offset
        )
    }
}

#[async_trait]
impl ListingProvider for RentalDataClient {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredentials)?;
        let url = self.search_url(request);

        tracing::debug!("Searching listings: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ProviderError::ApiError(format!(
                "Search failed with {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        let json: Value = response.json().await?;
        let page = parse_search_page(&json)?;

        tracing::debug!(
            "Query {:?} returned {} records (total: {:?})",
            request.query,
            page.records.len(),
            page.total
        );

        Ok(page)
    }
}

/// Upstream error bodies are cut to this many characters before logging
const MAX_ERROR_BODY_CHARS: usize = 200;

fn truncate_body(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(MAX_ERROR_BODY_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Extract records from a search response body
///
/// A missing or null `records` array means zero results. Records that do not
/// deserialize at all are dropped individually.
pub fn parse_search_page(json: &Value) -> Result<SearchPage, ProviderError> {
    let body = json
        .as_object()
        .ok_or_else(|| ProviderError::InvalidResponse("Expected a JSON object".into()))?;

    let records = match body.get("records").or_else(|| body.get("results")) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match serde_json::from_value::<RawProviderRecord>(item.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!("Skipping undecodable record: {}", e);
                    None
                }
            })
            .collect(),
        Some(_) => {
            return Err(ProviderError::InvalidResponse("records is not an array".into()));
        }
    };

    let total = body.get("total").and_then(|t| t.as_u64());

    Ok(SearchPage { records, total })
}
