mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::{FilterPolicy, Recommender};
use models::ScoringWeights;
use routes::recommend::AppState;
use services::{CacheManager, ListingsDb, LlmClient};
use std::sync::Arc;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Carrec recommendation service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize LLM client (optional - degrades to fixed fallbacks)
    let llm = Arc::new(LlmClient::new(
        settings.llm.base_url.clone(),
        settings.llm.api_key.clone(),
        settings.llm.model.clone(),
        settings.llm.timeout_secs.unwrap_or(20),
    ));

    if llm.is_available() {
        info!("LLM client initialized (model: {})", settings.llm.model);
    } else {
        warn!("LLM client unavailable; running with scripted questions and fixed summaries");
    }

    // Initialize cache manager (optional - app works without it)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!(
                "Cache manager initialized (L1: {} entries, TTL: {}s)",
                l1_cache_size, cache_ttl
            );
            Some(Arc::new(c))
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), running without cache", e);
            None
        }
    };

    // Initialize the listings store
    let store = Arc::new(
        ListingsDb::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        }),
    );

    info!("Listings store initialized");

    // Initialize the recommender with configured weights
    let mut weights = ScoringWeights {
        price: settings.scoring.weights.price,
        mileage: settings.scoring.weights.mileage,
        depreciation: settings.scoring.weights.depreciation,
        year: settings.scoring.weights.year,
    };

    if !weights.is_normalized() {
        warn!(
            "Configured scoring weights do not sum to 1.0 ({:?}), using defaults",
            weights
        );
        weights = ScoringWeights::default();
    }

    let top_n = settings.recommend.top_n.unwrap_or(10);
    let recommender = Recommender::new(weights, top_n);

    info!("Recommender initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        store,
        cache,
        llm,
        recommender,
        policy: FilterPolicy::default(),
        search_limit: settings.recommend.search_limit.unwrap_or(80),
        max_questions: settings.llm.max_questions.unwrap_or(5),
        llm_timeout_secs: settings.llm.timeout_secs.unwrap_or(20),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
