/// Canonical filter-derivation policy
///
/// One versioned table of tolerance-level thresholds. Earlier revisions
/// of this system carried two diverging constant sets (120/160/220k km
/// mileage ceilings with 2/3/4 owner caps vs. the set below); v1 adopts
/// the stricter set and the other is intentionally not merged in.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    pub version: u32,
    /// Price band around the stated budget
    pub price_band_lower: f64,
    pub price_band_upper: f64,
    /// Year window lengths per age preference
    pub newest_year_window: i32,
    pub balanced_year_window: i32,
    pub older_ok_year_window: i32,
    /// Registration years below this are not searched
    pub year_floor: i32,
    /// Mileage ceilings in km per tolerance level
    pub mileage_ceiling_low: i64,
    pub mileage_ceiling_medium: i64,
    pub mileage_ceiling_high: i64,
    /// Previous-owner caps per tolerance level
    pub owner_ceiling_low: u8,
    pub owner_ceiling_medium: u8,
    pub owner_ceiling_high: u8,
    /// Annual depreciation threshold (SGD) splitting cheap/expensive to run
    pub depreciation_threshold: i64,
    /// Makes a brand constraint may be inferred from; anything else in
    /// the brand-bias text is ignored rather than guessed at
    pub brand_allow_list: &'static [&'static str],
}

const BRAND_ALLOW_LIST: &[&str] = &[
    "toyota",
    "honda",
    "mazda",
    "nissan",
    "mitsubishi",
    "hyundai",
    "kia",
    "subaru",
    "volkswagen",
    "bmw",
    "mercedes",
    "audi",
    "lexus",
];

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            version: 1,
            price_band_lower: 0.8,
            price_band_upper: 1.2,
            newest_year_window: 5,
            balanced_year_window: 10,
            older_ok_year_window: 13,
            year_floor: 2000,
            mileage_ceiling_low: 60_000,
            mileage_ceiling_medium: 120_000,
            mileage_ceiling_high: 180_000,
            owner_ceiling_low: 1,
            owner_ceiling_medium: 3,
            owner_ceiling_high: 5,
            depreciation_threshold: 15_000,
            brand_allow_list: BRAND_ALLOW_LIST,
        }
    }
}

impl FilterPolicy {
    /// Mileage ceiling for a tolerance level ("low"/"medium"/"high")
    pub fn mileage_ceiling(&self, tolerance: &str) -> i64 {
        match tolerance {
            "low" => self.mileage_ceiling_low,
            "high" => self.mileage_ceiling_high,
            _ => self.mileage_ceiling_medium,
        }
    }

    /// Previous-owner cap for a tolerance level
    pub fn owner_ceiling(&self, tolerance: &str) -> u8 {
        match tolerance {
            "low" => self.owner_ceiling_low,
            "high" => self.owner_ceiling_high,
            _ => self.owner_ceiling_medium,
        }
    }

    /// Year window length for an age preference
    pub fn year_window(&self, age_preference: &str) -> i32 {
        match age_preference {
            "newest" => self.newest_year_window,
            "older_ok" => self.older_ok_year_window,
            _ => self.balanced_year_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_lookups_default_to_medium() {
        let policy = FilterPolicy::default();
        assert_eq!(policy.mileage_ceiling("low"), 60_000);
        assert_eq!(policy.mileage_ceiling("high"), 180_000);
        assert_eq!(policy.mileage_ceiling("medium"), 120_000);
        assert_eq!(policy.mileage_ceiling("anything else"), 120_000);

        assert_eq!(policy.owner_ceiling("low"), 1);
        assert_eq!(policy.owner_ceiling("high"), 5);
        assert_eq!(policy.owner_ceiling(""), 3);

        assert_eq!(policy.year_window("newest"), 5);
        assert_eq!(policy.year_window("older_ok"), 13);
        assert_eq!(policy.year_window("balanced"), 10);
        assert_eq!(policy.year_window("??"), 10);
    }
}
