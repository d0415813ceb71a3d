use crate::core::scoring::compute_value_scores;
use crate::models::{Listing, ScoredListing, ScoringWeights};

/// Result of ranking one search batch
#[derive(Debug)]
pub struct RecommendResult {
    pub listings: Vec<ScoredListing>,
    pub total_candidates: usize,
}

/// Ranking half of the recommendation pipeline
///
/// Scores a batch of listings fetched by the fallback search, sorts by
/// descending value score and keeps the top N. Pure over its input;
/// the HTTP handler owns the IO around it.
#[derive(Debug, Clone)]
pub struct Recommender {
    weights: ScoringWeights,
    top_n: usize,
}

impl Recommender {
    pub fn new(weights: ScoringWeights, top_n: usize) -> Self {
        Self { weights, top_n }
    }

    pub fn with_default_weights(top_n: usize) -> Self {
        Self {
            weights: ScoringWeights::default(),
            top_n,
        }
    }

    /// Score, rank and truncate one batch of listings
    ///
    /// Ties keep their batch order (stable sort), so equal-ranked rows
    /// come out in the store's price-ascending order.
    pub fn recommend(&self, listings: Vec<Listing>) -> RecommendResult {
        let total_candidates = listings.len();

        let mut scored = compute_value_scores(listings, &self.weights);

        scored.sort_by(|a, b| {
            b.value_score
                .partial_cmp(&a.value_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(self.top_n);

        RecommendResult {
            listings: scored,
            total_candidates,
        }
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::with_default_weights(10)
    }
}
