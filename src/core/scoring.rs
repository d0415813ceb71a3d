use crate::models::{Listing, ScoredListing, ScoringWeights};

/// Neutral sub-score used when an attribute cannot differentiate rows
const NEUTRAL: f64 = 0.5;

/// Attribute direction for normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Lower raw value is better (price, mileage, depreciation)
    LowerIsBetter,
    /// Higher raw value is better (registration year)
    HigherIsBetter,
}

/// Min-max normalize one attribute across the batch
///
/// Normalization is batch-relative: bounds come from the values that
/// are present in this batch only. Absent values score the neutral 0.5,
/// and a degenerate batch (all values equal, or none present) scores
/// 0.5 for every row so it cannot create spurious differentiation.
pub fn normalize(values: &[Option<f64>], direction: Direction) -> Vec<f64> {
    let known: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|x| x.is_finite())
        .collect();

    if known.is_empty() {
        return vec![NEUTRAL; values.len()];
    }

    let min_v = known.iter().copied().fold(f64::INFINITY, f64::min);
    let max_v = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max_v == min_v {
        return vec![NEUTRAL; values.len()];
    }

    values
        .iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => {
                let norm = (x - min_v) / (max_v - min_v);
                match direction {
                    Direction::LowerIsBetter => 1.0 - norm,
                    Direction::HigherIsBetter => norm,
                }
            }
            _ => NEUTRAL,
        })
        .collect()
}

/// Score and rank a batch of listings
///
/// Composite = 100 * (0.40*price + 0.25*mileage + 0.20*depreciation +
/// 0.15*year), each component normalized to [0,1] within the batch.
/// Pure and deterministic; defined for empty and single-row batches.
/// Output order matches input order; ranks are dense with 1 best.
pub fn compute_value_scores(listings: Vec<Listing>, weights: &ScoringWeights) -> Vec<ScoredListing> {
    if listings.is_empty() {
        return Vec::new();
    }

    let price: Vec<Option<f64>> = listings.iter().map(|l| l.price_sgd).collect();
    let mileage: Vec<Option<f64>> = listings.iter().map(|l| l.mileage_km).collect();
    let depreciation: Vec<Option<f64>> = listings.iter().map(|l| l.depreciation_per_year).collect();
    let year: Vec<Option<f64>> = listings.iter().map(|l| l.year.map(|y| y as f64)).collect();

    let value_price = normalize(&price, Direction::LowerIsBetter);
    let value_mileage = normalize(&mileage, Direction::LowerIsBetter);
    let value_depreciation = normalize(&depreciation, Direction::LowerIsBetter);
    let value_year = normalize(&year, Direction::HigherIsBetter);

    let scores: Vec<f64> = (0..listings.len())
        .map(|i| {
            100.0
                * (weights.price * value_price[i]
                    + weights.mileage * value_mileage[i]
                    + weights.depreciation * value_depreciation[i]
                    + weights.year * value_year[i])
        })
        .collect();

    let ranks = dense_rank_desc(&scores);

    listings
        .into_iter()
        .enumerate()
        .map(|(i, listing)| ScoredListing {
            listing,
            value_price: value_price[i],
            value_mileage: value_mileage[i],
            value_depreciation: value_depreciation[i],
            value_year: value_year[i],
            value_score: scores[i],
            value_rank: ranks[i],
        })
        .collect()
}

/// Dense rank by descending value: equal scores share a rank, the next
/// distinct score takes the immediately following integer, rank 1 best
pub fn dense_rank_desc(scores: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0u32; scores.len()];
    let mut rank = 0u32;
    let mut prev: Option<f64> = None;

    for &idx in &order {
        if prev != Some(scores[idx]) {
            rank += 1;
            prev = Some(scores[idx]);
        }
        ranks[idx] = rank;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(
        id: i64,
        price: Option<f64>,
        year: Option<i32>,
        mileage: Option<f64>,
        depreciation: Option<f64>,
    ) -> Listing {
        Listing {
            id,
            category: None,
            make: Some("Toyota".to_string()),
            model: Some("Corolla".to_string()),
            variant: None,
            price_sgd: price,
            annual_cost_sgd: None,
            year,
            mileage_km: mileage,
            depreciation_per_year: depreciation,
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

    #[test]
    fn test_normalize_basic() {
        let values = vec![Some(0.0), Some(50.0), Some(100.0)];

        let higher = normalize(&values, Direction::HigherIsBetter);
        assert_eq!(higher, vec![0.0, 0.5, 1.0]);

        let lower = normalize(&values, Direction::LowerIsBetter);
        assert_eq!(lower, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_normalize_constant_batch_is_neutral() {
        let values = vec![Some(42.0), Some(42.0), Some(42.0)];
        assert_eq!(
            normalize(&values, Direction::LowerIsBetter),
            vec![0.5, 0.5, 0.5]
        );
    }

    #[test]
    fn test_normalize_all_unknown_is_neutral() {
        let values: Vec<Option<f64>> = vec![None, None];
        assert_eq!(
            normalize(&values, Direction::HigherIsBetter),
            vec![0.5, 0.5]
        );
    }

    #[test]
    fn test_normalize_unknown_gets_neutral_not_zero() {
        let values = vec![Some(0.0), None, Some(100.0)];
        let norm = normalize(&values, Direction::HigherIsBetter);
        assert_eq!(norm[1], 0.5);
    }

    #[test]
    fn test_empty_and_single_batches() {
        let weights = ScoringWeights::default();

        assert!(compute_value_scores(vec![], &weights).is_empty());

        let scored = compute_value_scores(
            vec![listing(1, Some(50_000.0), Some(2020), Some(80_000.0), None)],
            &weights,
        );
        assert_eq!(scored.len(), 1);
        // Every attribute is degenerate: all components neutral
        assert_eq!(scored[0].value_score, 50.0);
        assert_eq!(scored[0].value_rank, 1);
    }

    #[test]
    fn test_cheaper_car_scores_higher() {
        let weights = ScoringWeights::default();
        let scored = compute_value_scores(
            vec![
                listing(1, Some(80_000.0), Some(2020), Some(50_000.0), Some(10_000.0)),
                listing(2, Some(120_000.0), Some(2020), Some(50_000.0), Some(10_000.0)),
            ],
            &weights,
        );

        assert!(scored[0].value_score > scored[1].value_score);
        assert_eq!(scored[0].value_rank, 1);
        assert_eq!(scored[1].value_rank, 2);
    }

    #[test]
    fn test_score_monotonic_in_price() {
        let weights = ScoringWeights::default();
        let scored = compute_value_scores(
            vec![
                listing(1, Some(60_000.0), Some(2020), Some(50_000.0), Some(9_000.0)),
                listing(2, Some(90_000.0), Some(2020), Some(50_000.0), Some(9_000.0)),
                listing(3, Some(120_000.0), Some(2020), Some(50_000.0), Some(9_000.0)),
            ],
            &weights,
        );

        assert!(scored[0].value_score >= scored[1].value_score);
        assert!(scored[1].value_score >= scored[2].value_score);
    }

    #[test]
    fn test_dense_rank() {
        assert_eq!(dense_rank_desc(&[80.0, 80.0, 60.0]), vec![1, 1, 2]);
        assert_eq!(dense_rank_desc(&[60.0, 80.0, 80.0, 40.0]), vec![2, 1, 1, 3]);
        assert_eq!(dense_rank_desc(&[]), Vec::<u32>::new());
    }

    #[test]
    fn test_scores_in_bounds() {
        let weights = ScoringWeights::default();
        let scored = compute_value_scores(
            vec![
                listing(1, Some(10_000.0), Some(2010), Some(200_000.0), Some(20_000.0)),
                listing(2, Some(200_000.0), Some(2025), Some(1_000.0), Some(5_000.0)),
                listing(3, None, None, None, None),
            ],
            &weights,
        );

        for s in &scored {
            assert!(s.value_score >= 0.0 && s.value_score <= 100.0);
        }
        // Fully unknown row sits at the neutral midpoint
        assert_eq!(scored[2].value_score, 50.0);
    }

    #[test]
    fn test_deterministic() {
        let weights = ScoringWeights::default();
        let batch = || {
            vec![
                listing(1, Some(80_000.0), Some(2018), Some(90_000.0), Some(12_000.0)),
                listing(2, Some(95_000.0), Some(2021), Some(40_000.0), Some(14_000.0)),
            ]
        };

        let a = compute_value_scores(batch(), &weights);
        let b = compute_value_scores(batch(), &weights);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.value_score, y.value_score);
            assert_eq!(x.value_rank, y.value_rank);
        }
    }
}
