use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::core::{build_filters, build_profile_from_history, FilterPolicy, Recommender};
use crate::models::{
    CarFilters, ErrorResponse, FiltersPreviewResponse, HealthResponse, Listing,
    NextQuestionRequest, NextQuestionResponse, PreviewFiltersRequest, RecommendRequest,
    RecommendResponse, UserProfile,
};
use crate::services::{
    search_with_fallback, CacheKey, CacheManager, ListingsDb, LlmClient, FALLBACK_SUMMARY,
    NO_MATCHES_SUMMARY,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ListingsDb>,
    pub cache: Option<Arc<CacheManager>>,
    pub llm: Arc<LlmClient>,
    pub recommender: Recommender,
    pub policy: FilterPolicy,
    pub search_limit: usize,
    pub max_questions: usize,
    pub llm_timeout_secs: u64,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/recommend", web::post().to(recommend))
        .route("/questions/next", web::post().to(next_question))
        .route("/debug/filters", web::post().to(preview_filters));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Debug endpoint: show the filters a profile derives to
async fn preview_filters(
    state: web::Data<AppState>,
    req: web::Json<PreviewFiltersRequest>,
) -> impl Responder {
    let filters = build_filters(&req.profile, &state.policy);
    HttpResponse::Ok().json(filters_preview(filters))
}

fn filters_preview(filters: CarFilters) -> FiltersPreviewResponse {
    FiltersPreviewResponse {
        body_type_code: filters.body_type.map(|b| b.code()),
        engine_code: filters.engine_category.map(|e| e.code()),
        filters,
    }
}

/// Produce recommendations for a buyer profile
///
/// POST /api/v1/recommend
///
/// Request body:
/// ```json
/// {
///   "profile": { "budgetSgd": 100000, "bodyTypePref": "suv" },
///   "history": [{ "question": "...", "answer": "..." }],
///   "limit": 10
/// }
/// ```
///
/// Pipeline: derive filters, run the fallback search, score and rank,
/// then attach a natural-language summary. A store failure is a hard
/// 500; everything softer degrades in place.
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let profile = match &req.profile {
        Some(profile) => profile.clone(),
        None => build_profile_from_history(&req.history),
    };

    let filters = build_filters(&profile, &state.policy);
    tracing::info!("Derived filters: {:?}", filters);

    // Fallback search, with the filter-keyed cache in front when available
    let cache_key = CacheKey::search(&filters, state.search_limit);
    let cached: Option<Vec<Listing>> = match &state.cache {
        Some(cache) => cache.get(&cache_key).await.ok(),
        None => None,
    };

    let listings = match cached {
        Some(listings) => {
            tracing::debug!("Search cache hit ({} rows)", listings.len());
            listings
        }
        None => {
            let listings =
                match search_with_fallback(state.store.as_ref(), &filters, state.search_limit)
                    .await
                {
                    Ok(listings) => listings,
                    Err(e) => {
                        tracing::error!("Listings search failed: {}", e);
                        return HttpResponse::InternalServerError().json(ErrorResponse {
                            error: "Listings search failed".to_string(),
                            message: e.to_string(),
                            status_code: 500,
                        });
                    }
                };

            if let Some(cache) = &state.cache {
                if let Err(e) = cache.set(&cache_key, &listings).await {
                    tracing::warn!("Failed to cache search result: {}", e);
                }
            }

            listings
        }
    };

    // Even the unconstrained terminal stage found nothing: the store is
    // empty. Report that explicitly instead of scoring an empty batch.
    if listings.is_empty() {
        tracing::warn!("Listings store is empty; returning no-matches result");
        return HttpResponse::Ok().json(no_matches_response(profile, filters));
    }

    let mut result = state.recommender.recommend(listings);
    if let Some(limit) = req.limit {
        result.listings.truncate(limit as usize);
    }

    // The summary must never hold the response hostage: the client has
    // its own timeout and this is the second guard
    let explanation = match tokio::time::timeout(
        Duration::from_secs(state.llm_timeout_secs),
        state.llm.summarize(&req.history, &result.listings),
    )
    .await
    {
        Ok(summary) => summary,
        Err(_) => {
            tracing::warn!("LLM summary timed out, using fallback");
            FALLBACK_SUMMARY.to_string()
        }
    };

    tracing::info!(
        "Returning {} recommendations (from {} candidates)",
        result.listings.len(),
        result.total_candidates
    );

    HttpResponse::Ok().json(RecommendResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        profile,
        filters,
        explanation,
        listings: result.listings,
        total_candidates: result.total_candidates,
    })
}

/// Terminal result for an empty candidate batch
///
/// Takes neither the recommender nor the LLM client: nothing is scored
/// and no summary call is made, the explanation is the fixed
/// no-matches string.
fn no_matches_response(profile: UserProfile, filters: CarFilters) -> RecommendResponse {
    RecommendResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        profile,
        filters,
        explanation: NO_MATCHES_SUMMARY.to_string(),
        listings: vec![],
        total_candidates: 0,
    }
}

/// Ask for the next interview question
///
/// POST /api/v1/questions/next
///
/// Returns `{ "question": null, "done": true }` once the interview has
/// collected enough answers (hard cap included) or the model says DONE.
async fn next_question(
    state: web::Data<AppState>,
    req: web::Json<NextQuestionRequest>,
) -> impl Responder {
    if req.history.len() >= state.max_questions {
        return HttpResponse::Ok().json(NextQuestionResponse {
            question: None,
            done: true,
        });
    }

    let question = if state.llm.is_available() {
        match state.llm.next_question(&req.history).await {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!("LLM question generation failed, using script: {}", e);
                state.llm.scripted_question(req.history.len())
            }
        }
    } else {
        state.llm.scripted_question(req.history.len())
    };

    let done = question.is_none();
    HttpResponse::Ok().json(NextQuestionResponse { question, done })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build_filters_at;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_empty_batch_yields_fixed_no_matches_explanation() {
        let profile = UserProfile {
            budget_sgd: Some(100_000),
            ..UserProfile::default()
        };
        let filters = build_filters_at(&profile, &FilterPolicy::default(), 2026);

        let response = no_matches_response(profile.clone(), filters.clone());

        assert_eq!(response.explanation, crate::services::NO_MATCHES_SUMMARY);
        assert!(response.listings.is_empty());
        assert_eq!(response.total_candidates, 0);
        // The derived context still comes back so the client can show
        // what was searched for
        assert_eq!(response.filters, filters);
        assert_eq!(response.profile.budget_sgd, profile.budget_sgd);
        assert!(!response.request_id.is_empty());
    }

    #[test]
    fn test_filters_preview_carries_numeric_codes() {
        let profile = UserProfile {
            body_type_pref: Some("suv".to_string()),
            fuel_pref: Some("ev".to_string()),
            ..UserProfile::default()
        };
        let filters = build_filters_at(&profile, &FilterPolicy::default(), 2026);

        let preview = filters_preview(filters);
        assert_eq!(preview.body_type_code, Some(5));
        assert_eq!(preview.engine_code, Some(0));

        let unconstrained = filters_preview(CarFilters::default());
        assert_eq!(unconstrained.body_type_code, None);
        assert_eq!(unconstrained.engine_code, None);
    }
}
