// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BodyTypeCode, CarFilters, EngineCategory, Listing, QaTurn, ScoredListing, ScoringWeights,
    UserProfile,
};
pub use requests::{NextQuestionRequest, PreviewFiltersRequest, RecommendRequest};
pub use responses::{
    ErrorResponse, FiltersPreviewResponse, HealthResponse, NextQuestionResponse, RecommendResponse,
};
