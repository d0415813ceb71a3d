// Core algorithm exports
pub mod filters;
pub mod policy;
pub mod profile;
pub mod recommender;
pub mod scoring;

pub use filters::{build_filters, build_filters_at};
pub use policy::FilterPolicy;
pub use profile::build_profile_from_history;
pub use recommender::{RecommendResult, Recommender};
pub use scoring::{compute_value_scores, dense_rank_desc, normalize, Direction};
