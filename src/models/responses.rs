use serde::{Deserialize, Serialize};
use crate::models::domain::{Region, RelievePost};

/// Response for the filter posts endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterPostsResponse {
    pub posts: Vec<RelievePost>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "distanceFilterActive")]
    pub distance_filter_active: bool,
}

/// Province or ward listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionListResponse {
    pub regions: Vec<Region>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}
