use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{QaTurn, UserProfile};

/// Request to produce recommendations
///
/// Either a pre-built profile or a raw Q&A history must be supplied;
/// when the profile is absent it is built from the history.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub history: Vec<QaTurn>,
    #[validate(range(min = 1, max = 50))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request for the next interview question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextQuestionRequest {
    #[serde(default)]
    pub history: Vec<QaTurn>,
}

/// Request to preview the filters derived from a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewFiltersRequest {
    pub profile: UserProfile,
}
