// End-to-end pipeline tests: conversation history to ranked listings,
// backed by an in-memory listing source instead of Postgres.

use carrec_algo::core::{build_filters_at, build_profile_from_history, FilterPolicy, Recommender};
use carrec_algo::models::{CarFilters, Listing, QaTurn, UserProfile};
use carrec_algo::services::{search_with_fallback, ListingSource, StoreError};

struct MemoryStore {
    listings: Vec<Listing>,
}

impl ListingSource for MemoryStore {
    async fn search(&self, filters: &CarFilters, limit: usize) -> Result<Vec<Listing>, StoreError> {
        let mut hits: Vec<Listing> = self
            .listings
            .iter()
            .filter(|l| filters.matches(l))
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            let pa = a.price_sgd.unwrap_or(f64::MAX);
            let pb = b.price_sgd.unwrap_or(f64::MAX);
            pa.partial_cmp(&pb).unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

fn listing(id: i64, make: &str, price: f64, year: i32, mileage: f64, depreciation: f64) -> Listing {
    Listing {
        id,
        category: None,
        make: Some(make.to_string()),
        model: None,
        variant: None,
        price_sgd: Some(price),
        annual_cost_sgd: None,
        year: Some(year),
        mileage_km: Some(mileage),
        depreciation_per_year: Some(depreciation),
        efficiency: None,
        efficiency_unit: None,
        bhp: None,
        gearbox: None,
        country: None,
        dealer_name: None,
        dealer_link: None,
        listing_url: None,
        raw_text: None,
        scraped_at: None,
        coe_left_years: None,
        colour: None,
    }
}

fn qa(question: &str, answer: &str) -> QaTurn {
    QaTurn {
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

#[tokio::test]
async fn test_suv_shopper_pipeline_ranks_better_value_first() {
    let history = vec![
        qa("What is your budget in SGD?", "$100,000"),
        qa("How old a car are you comfortable with?", "something balanced"),
        qa("How much mileage is acceptable?", "medium mileage is fine"),
        qa("What body type do you prefer?", "an SUV for the family"),
    ];

    let profile = build_profile_from_history(&history);
    assert_eq!(profile.budget_sgd, Some(100_000));

    let filters = build_filters_at(&profile, &FilterPolicy::default(), 2026);
    assert_eq!(filters.min_price, Some(80_000));
    assert_eq!(filters.max_price, Some(120_000));

    let store = MemoryStore {
        listings: vec![
            listing(1, "Toyota", 95_000.0, 2022, 60_000.0, 11_000.0),
            listing(2, "Honda", 85_000.0, 2023, 40_000.0, 9_500.0),
            // Over the price band, must not appear in the candidates
            listing(3, "BMW", 150_000.0, 2024, 20_000.0, 18_000.0),
        ],
    };

    let candidates = search_with_fallback(&store, &filters, 50).await.unwrap();
    assert_eq!(candidates.len(), 2);

    let result = Recommender::with_default_weights(10).recommend(candidates);
    assert_eq!(result.total_candidates, 2);

    // Cheaper, newer, lower-mileage Honda wins on every component.
    assert_eq!(result.listings[0].listing.id, 2);
    assert_eq!(result.listings[0].value_rank, 1);
    assert_eq!(result.listings[1].listing.id, 1);
    assert_eq!(result.listings[1].value_rank, 2);
    assert!(result.listings[0].value_score > result.listings[1].value_score);
}

#[tokio::test]
async fn test_fallback_relaxes_before_giving_up() {
    // Only inventory is an old high-mileage car outside the strict window.
    let store = MemoryStore {
        listings: vec![listing(7, "Toyota", 90_000.0, 2010, 230_000.0, 8_000.0)],
    };

    let profile = UserProfile {
        budget_sgd: Some(100_000),
        age_preference: Some("newest".to_string()),
        mileage_tolerance: Some("low".to_string()),
        ..UserProfile::default()
    };
    let filters = build_filters_at(&profile, &FilterPolicy::default(), 2026);

    let hits = search_with_fallback(&store, &filters, 50).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 7);
}

#[tokio::test]
async fn test_empty_inventory_yields_no_matches() {
    let store = MemoryStore { listings: vec![] };
    let filters = CarFilters::default();

    let hits = search_with_fallback(&store, &filters, 50).await.unwrap();
    assert!(hits.is_empty());

    let result = Recommender::default().recommend(hits);
    assert!(result.listings.is_empty());
    assert_eq!(result.total_candidates, 0);
}

#[tokio::test]
async fn test_request_limit_is_a_cap_not_a_floor() {
    let store = MemoryStore {
        listings: (1..=8)
            .map(|i| {
                listing(
                    i,
                    "Mazda",
                    60_000.0 + i as f64 * 1_000.0,
                    2020,
                    80_000.0,
                    10_000.0,
                )
            })
            .collect(),
    };

    let hits = search_with_fallback(&store, &CarFilters::default(), 50)
        .await
        .unwrap();
    let result = Recommender::with_default_weights(3).recommend(hits);

    assert_eq!(result.listings.len(), 3);
    assert_eq!(result.total_candidates, 8);
    // Cheapest car is the best value here since everything else is equal.
    assert_eq!(result.listings[0].listing.id, 1);
}
