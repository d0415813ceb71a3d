use chrono::Datelike;

use crate::core::policy::FilterPolicy;
use crate::models::{BodyTypeCode, CarFilters, EngineCategory, Listing, UserProfile};

/// Derive search filters from a buyer profile
///
/// Total over its input: every branch has a default, nothing panics.
/// Uses the calendar year at call time; see [`build_filters_at`] for a
/// deterministic variant.
pub fn build_filters(profile: &UserProfile, policy: &FilterPolicy) -> CarFilters {
    build_filters_at(profile, policy, chrono::Utc::now().year())
}

/// Same as [`build_filters`] with an explicit current year
pub fn build_filters_at(
    profile: &UserProfile,
    policy: &FilterPolicy,
    current_year: i32,
) -> CarFilters {
    let (min_price, max_price) = derive_price_band(profile.budget_sgd, policy);
    let (min_year, max_year) = derive_year_range(
        profile.age_preference.as_deref().unwrap_or("balanced"),
        policy,
        current_year,
    );
    let (min_mileage, max_mileage) = derive_mileage_band(
        profile.mileage_tolerance.as_deref().unwrap_or("medium"),
        policy,
    );
    let max_owners = policy.owner_ceiling(profile.owner_tolerance.as_deref().unwrap_or("medium"));
    let (min_depreciation, max_depreciation) = derive_depreciation_bounds(
        profile.running_cost_priority.as_deref().unwrap_or("medium"),
        policy,
    );

    let filters = CarFilters {
        brand: derive_brand(profile.brand_bias.as_deref(), policy),
        min_price,
        max_price,
        min_year,
        max_year,
        min_mileage,
        max_mileage,
        max_owners: Some(max_owners),
        engine_category: derive_engine_category(
            profile.running_cost_priority.as_deref().unwrap_or("medium"),
            profile.fuel_pref.as_deref(),
        ),
        body_type: Some(derive_body_type(
            profile.body_type_pref.as_deref(),
            profile.family_size,
        )),
        min_depreciation,
        max_depreciation,
    };

    normalize_bounds(filters)
}

/// Price band of +/-20% around the stated budget; unconstrained when
/// the budget is absent or non-positive
fn derive_price_band(budget_sgd: Option<i64>, policy: &FilterPolicy) -> (Option<i64>, Option<i64>) {
    match budget_sgd {
        Some(budget) if budget > 0 => {
            let min_p = (budget as f64 * policy.price_band_lower).floor() as i64;
            let max_p = (budget as f64 * policy.price_band_upper).ceil() as i64;
            (Some(min_p), Some(max_p))
        }
        _ => (None, None),
    }
}

fn derive_year_range(
    age_preference: &str,
    policy: &FilterPolicy,
    current_year: i32,
) -> (Option<i32>, Option<i32>) {
    let window = policy.year_window(age_preference);
    let min_year = (current_year - window).max(policy.year_floor);
    (Some(min_year), Some(current_year))
}

fn derive_mileage_band(tolerance: &str, policy: &FilterPolicy) -> (Option<i64>, Option<i64>) {
    // Minimum mileage is always 0 when a ceiling is in play
    (Some(0), Some(policy.mileage_ceiling(tolerance)))
}

fn derive_depreciation_bounds(
    running_cost_priority: &str,
    policy: &FilterPolicy,
) -> (Option<i64>, Option<i64>) {
    match running_cost_priority {
        // Running costs matter little: cap is fine, anything above the
        // threshold would be a premium car anyway
        "low" => (None, Some(policy.depreciation_threshold)),
        "high" => (Some(policy.depreciation_threshold), None),
        _ => (None, None),
    }
}

fn derive_engine_category(
    running_cost_priority: &str,
    fuel_pref: Option<&str>,
) -> Option<EngineCategory> {
    // EV preference wins over any displacement heuristic
    if fuel_pref.map(|f| f.trim().eq_ignore_ascii_case("ev")) == Some(true) {
        return Some(EngineCategory::Ev);
    }

    match running_cost_priority {
        "high" => Some(EngineCategory::UpTo1600),
        "low" => None,
        _ => Some(EngineCategory::UpTo2000),
    }
}

/// Body-type code from the controlled vocabulary, with a family-size
/// fallback when the preference does not resolve
fn derive_body_type(body_type_pref: Option<&str>, family_size: Option<u8>) -> BodyTypeCode {
    let pref = body_type_pref.unwrap_or("").trim().to_lowercase();

    match pref.as_str() {
        "small" => return BodyTypeCode::Hatchback,
        "suv" => return BodyTypeCode::Suv,
        "mpv" | "mpv_7_seater" | "7-seater" => return BodyTypeCode::Mpv,
        "sedan_or_hatchback" => return BodyTypeCode::Sedan,
        _ => {}
    }

    match family_size {
        Some(n) if n <= 2 => BodyTypeCode::Hatchback,
        Some(n) if n <= 4 => BodyTypeCode::Sedan,
        Some(_) => BodyTypeCode::Mpv,
        None => BodyTypeCode::All,
    }
}

/// Extract a brand constraint from the brand-bias text
///
/// Only makes on the allow-list ever become a constraint; free text
/// like "something reliable" must not fabricate a brand filter.
fn derive_brand(brand_bias: Option<&str>, policy: &FilterPolicy) -> Option<String> {
    let bias = brand_bias?.trim().to_lowercase();
    if bias.is_empty() || bias == "none" {
        return None;
    }

    // "prefers toyota" / "prefer honda" style answers
    let cleaned = bias
        .replace("prefers", "")
        .replace("prefer", "")
        .trim()
        .to_string();

    if policy.brand_allow_list.contains(&cleaned.as_str()) {
        return Some(cleaned);
    }

    policy
        .brand_allow_list
        .iter()
        .find(|make| bias.contains(*make))
        .map(|make| make.to_string())
}

/// Swap any inverted min/max pair so the min <= max invariant holds
/// regardless of how the bands were derived
fn normalize_bounds(mut filters: CarFilters) -> CarFilters {
    if let (Some(lo), Some(hi)) = (filters.min_price, filters.max_price) {
        if lo > hi {
            filters.min_price = Some(hi);
            filters.max_price = Some(lo);
        }
    }
    if let (Some(lo), Some(hi)) = (filters.min_year, filters.max_year) {
        if lo > hi {
            filters.min_year = Some(hi);
            filters.max_year = Some(lo);
        }
    }
    if let (Some(lo), Some(hi)) = (filters.min_mileage, filters.max_mileage) {
        if lo > hi {
            filters.min_mileage = Some(hi);
            filters.max_mileage = Some(lo);
        }
    }
    if let (Some(lo), Some(hi)) = (filters.min_depreciation, filters.max_depreciation) {
        if lo > hi {
            filters.min_depreciation = Some(hi);
            filters.max_depreciation = Some(lo);
        }
    }
    filters
}

impl CarFilters {
    /// Conjunctive predicate over the fields the listings store indexes
    ///
    /// Mirrors the SQL adapter exactly: brand is a case-insensitive
    /// substring match on make, price/year/mileage are inclusive
    /// ranges, and a listing with NULL in a constrained attribute
    /// fails that clause.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(brand) = &self.brand {
            match &listing.make {
                Some(make) if make.to_lowercase().contains(&brand.to_lowercase()) => {}
                _ => return false,
            }
        }

        if !in_range_f64(listing.price_sgd, self.min_price, self.max_price) {
            return false;
        }
        if !in_range_i32(listing.year, self.min_year, self.max_year) {
            return false;
        }
        if !in_range_f64(listing.mileage_km, self.min_mileage, self.max_mileage) {
            return false;
        }

        true
    }

    /// Stage 2 of the fallback ladder: year and mileage dropped
    pub fn without_year_and_mileage(&self) -> Self {
        Self {
            min_year: None,
            max_year: None,
            min_mileage: None,
            max_mileage: None,
            ..self.clone()
        }
    }

    /// Stage 3 of the fallback ladder: brand and price band only
    pub fn brand_and_price_only(&self) -> Self {
        Self {
            brand: self.brand.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            ..Self::default()
        }
    }

    /// The four progressively relaxed filter sets, strict first
    ///
    /// The last stage is empty, so the search is guaranteed to find
    /// something whenever the store holds at least one listing.
    pub fn relaxation_ladder(&self) -> Vec<CarFilters> {
        vec![
            self.clone(),
            self.without_year_and_mileage(),
            self.brand_and_price_only(),
            CarFilters::default(),
        ]
    }
}

#[inline]
fn in_range_f64(value: Option<f64>, min: Option<i64>, max: Option<i64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(v) = value else { return false };
    if let Some(lo) = min {
        if v < lo as f64 {
            return false;
        }
    }
    if let Some(hi) = max {
        if v > hi as f64 {
            return false;
        }
    }
    true
}

#[inline]
fn in_range_i32(value: Option<i32>, min: Option<i32>, max: Option<i32>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(v) = value else { return false };
    min.map_or(true, |lo| v >= lo) && max.map_or(true, |hi| v <= hi)
}
