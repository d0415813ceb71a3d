use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use thiserror::Error;

use crate::models::{CarFilters, Listing};

/// Errors that can occur when querying the listings store
///
/// Store failures are hard failures of the request: no partial results
/// are ever rendered from a broken query.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Anything that can execute a filtered listings search
///
/// One implementation backs the service (Postgres); tests provide an
/// in-memory one so the fallback ladder can be exercised without a
/// database.
pub trait ListingSource {
    fn search(
        &self,
        filters: &CarFilters,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Listing>, StoreError>>;
}

/// Run the four-stage fallback ladder against a listings source
///
/// Stops at the first stage that yields rows. The terminal stage is
/// unconstrained, so the result is non-empty whenever the store holds
/// at least one listing; an empty result here means the store itself
/// is empty.
pub async fn search_with_fallback<S: ListingSource>(
    store: &S,
    filters: &CarFilters,
    limit: usize,
) -> Result<Vec<Listing>, StoreError> {
    for (stage, relaxed) in filters.relaxation_ladder().iter().enumerate() {
        let listings = store.search(relaxed, limit).await?;
        if !listings.is_empty() {
            if stage > 0 {
                tracing::info!(
                    "Fallback search relaxed to stage {} ({} rows)",
                    stage + 1,
                    listings.len()
                );
            }
            return Ok(listings);
        }
        tracing::debug!("Fallback stage {} returned no rows", stage + 1);
    }

    Ok(Vec::new())
}

/// Postgres-backed listings store
///
/// The `car_listings` table is scraped offline and read-only for this
/// service; queries never write.
pub struct ListingsDb {
    pool: PgPool,
}

impl ListingsDb {
    /// Connect and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a listings store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL listings store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl ListingSource for ListingsDb {
    /// Execute one conjunctive filtered query
    ///
    /// Only fields present in `filters` become predicate clauses; an
    /// empty filter set returns the cheapest `limit` listings overall.
    /// Results are ordered by ascending price and zero matches is an
    /// empty Vec, never an error.
    async fn search(&self, filters: &CarFilters, limit: usize) -> Result<Vec<Listing>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, category, make, model, variant, price_sgd, annual_cost_sgd, \
             year, mileage_km, depreciation_per_year, efficiency, efficiency_unit, \
             bhp, gearbox, country, dealer_name, dealer_link, listing_url, raw_text, \
             scraped_at, coe_left_years, colour \
             FROM car_listings WHERE 1=1",
        );

        if let Some(brand) = &filters.brand {
            qb.push(" AND make ILIKE ");
            qb.push_bind(format!("%{}%", brand));
        }
        if let Some(min_price) = filters.min_price {
            qb.push(" AND price_sgd >= ");
            qb.push_bind(min_price as f64);
        }
        if let Some(max_price) = filters.max_price {
            qb.push(" AND price_sgd <= ");
            qb.push_bind(max_price as f64);
        }
        if let Some(min_year) = filters.min_year {
            qb.push(" AND year >= ");
            qb.push_bind(min_year);
        }
        if let Some(max_year) = filters.max_year {
            qb.push(" AND year <= ");
            qb.push_bind(max_year);
        }
        if let Some(min_mileage) = filters.min_mileage {
            qb.push(" AND mileage_km >= ");
            qb.push_bind(min_mileage as f64);
        }
        if let Some(max_mileage) = filters.max_mileage {
            qb.push(" AND mileage_km <= ");
            qb.push_bind(max_mileage as f64);
        }

        qb.push(" ORDER BY price_sgd ASC NULLS LAST LIMIT ");
        qb.push_bind(limit as i64);

        let listings = qb
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Listings query returned {} rows", listings.len());

        Ok(listings)
    }
}
