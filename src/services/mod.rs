// Service exports
pub mod cache;
pub mod llm;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use llm::{LlmClient, LlmError, FALLBACK_SUMMARY, NO_MATCHES_SUMMARY};
pub use store::{search_with_fallback, ListingSource, ListingsDb, StoreError};
