//! Carrec Algo - used-car recommendation service for the Singapore market
//!
//! This library provides the recommendation pipeline: profile-derived
//! search filters, a progressively relaxed listings search, and a
//! normalized weighted value score over the results.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    build_filters, build_filters_at, build_profile_from_history, FilterPolicy, Recommender,
};
pub use models::{
    CarFilters, Listing, QaTurn, RecommendRequest, RecommendResponse, ScoredListing,
    ScoringWeights, UserProfile,
};
