use serde::{Deserialize, Serialize};

use crate::models::domain::{CarFilters, ScoredListing, UserProfile};

/// Response for the recommend endpoint
///
/// `listings` is ordered by descending value score; when nothing in the
/// store matched even the fully relaxed search, `listings` is empty and
/// `explanation` carries the fixed no-matches message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub profile: UserProfile,
    pub filters: CarFilters,
    pub explanation: String,
    pub listings: Vec<ScoredListing>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for the filters debug endpoint
///
/// Alongside the filters themselves, carries the numeric SGCarMart
/// `veh`/`eng` codes the enum values stand for, so the derived query
/// can be checked against the listing site's own vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersPreviewResponse {
    pub filters: CarFilters,
    #[serde(rename = "bodyTypeCode")]
    pub body_type_code: Option<u8>,
    #[serde(rename = "engineCode")]
    pub engine_code: Option<u8>,
}

/// Response for the next-question endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextQuestionResponse {
    pub question: Option<String>,
    pub done: bool,
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
    pub status_code: u16,
}
