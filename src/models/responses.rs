use serde::{Deserialize, Serialize};
use crate::models::domain::{Listing, MatchResult};
use crate::services::ingestion::CycleStatus;

/// Response for both ranking endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesResponse {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    /// Ingestion outcome when the request pulled provider listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingestion: Option<CycleStatus>,
}

/// Response for the refresh endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshListingsResponse {
    pub status: CycleStatus,
    pub listings: Vec<Listing>,
    pub calls_issued: usize,
    pub calls_failed: usize,
    pub cache_hits: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cached_entries: u64,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Cache reset response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheResetResponse {
    pub success: bool,
}
