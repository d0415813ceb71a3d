use serde::{Deserialize, Serialize};

/// One question/answer exchange from the interview flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaTurn {
    pub question: String,
    pub answer: String,
}

/// Structured buyer profile derived from the Q&A history
///
/// Every field is optional; the filter builder supplies a default for
/// each absent field, so downstream code never has to guess.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "budgetSgd", default)]
    pub budget_sgd: Option<i64>,
    #[serde(rename = "familySize", default)]
    pub family_size: Option<u8>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(rename = "agePreference", default)]
    pub age_preference: Option<String>,
    #[serde(rename = "runningCostPriority", default)]
    pub running_cost_priority: Option<String>,
    #[serde(rename = "ownerTolerance", default)]
    pub owner_tolerance: Option<String>,
    #[serde(rename = "mileageTolerance", default)]
    pub mileage_tolerance: Option<String>,
    #[serde(rename = "bodyTypePref", default)]
    pub body_type_pref: Option<String>,
    #[serde(rename = "brandBias", default)]
    pub brand_bias: Option<String>,
    #[serde(rename = "fuelPref", default)]
    pub fuel_pref: Option<String>,
    #[serde(rename = "riskTolerance", default)]
    pub risk_tolerance: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// SGCarMart body-type (`veh`) codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyTypeCode {
    Hatchback,
    Sedan,
    Suv,
    Mpv,
    All,
}

impl BodyTypeCode {
    /// Numeric code as used in SGCarMart listing queries
    pub fn code(&self) -> u8 {
        match self {
            BodyTypeCode::Hatchback => 1,
            BodyTypeCode::Sedan => 4,
            BodyTypeCode::Suv => 5,
            BodyTypeCode::Mpv => 9,
            BodyTypeCode::All => 15,
        }
    }
}

/// Engine displacement category (`eng` codes), with 0 reserved for EVs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCategory {
    Ev,
    UpTo1000,
    UpTo1600,
    UpTo2000,
    UpTo3000,
    Over3000,
}

impl EngineCategory {
    pub fn code(&self) -> u8 {
        match self {
            EngineCategory::Ev => 0,
            EngineCategory::UpTo1000 => 1,
            EngineCategory::UpTo1600 => 2,
            EngineCategory::UpTo2000 => 3,
            EngineCategory::UpTo3000 => 4,
            EngineCategory::Over3000 => 5,
        }
    }
}

/// Search constraints derived from a buyer profile
///
/// Absent field means unconstrained. Derivation guarantees min <= max
/// whenever both bounds of a pair are present. All fields are integral
/// or enum-valued so the struct can be hashed for cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarFilters {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(rename = "minPrice", default)]
    pub min_price: Option<i64>,
    #[serde(rename = "maxPrice", default)]
    pub max_price: Option<i64>,
    #[serde(rename = "minYear", default)]
    pub min_year: Option<i32>,
    #[serde(rename = "maxYear", default)]
    pub max_year: Option<i32>,
    #[serde(rename = "minMileage", default)]
    pub min_mileage: Option<i64>,
    #[serde(rename = "maxMileage", default)]
    pub max_mileage: Option<i64>,
    #[serde(rename = "maxOwners", default)]
    pub max_owners: Option<u8>,
    #[serde(rename = "engineCategory", default)]
    pub engine_category: Option<EngineCategory>,
    #[serde(rename = "bodyType", default)]
    pub body_type: Option<BodyTypeCode>,
    #[serde(rename = "minDepreciation", default)]
    pub min_depreciation: Option<i64>,
    #[serde(rename = "maxDepreciation", default)]
    pub max_depreciation: Option<i64>,
}

/// One used-car record from the listings store
///
/// Numeric columns are nullable: the scraper stores NULL where the
/// source text did not parse, and scoring treats NULL as "unknown".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub category: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub variant: Option<String>,
    #[serde(rename = "priceSgd")]
    pub price_sgd: Option<f64>,
    #[serde(rename = "annualCostSgd")]
    pub annual_cost_sgd: Option<f64>,
    pub year: Option<i32>,
    #[serde(rename = "mileageKm")]
    pub mileage_km: Option<f64>,
    #[serde(rename = "depreciationPerYear")]
    pub depreciation_per_year: Option<f64>,
    pub efficiency: Option<f64>,
    #[serde(rename = "efficiencyUnit")]
    pub efficiency_unit: Option<String>,
    pub bhp: Option<i32>,
    pub gearbox: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "dealerName")]
    pub dealer_name: Option<String>,
    #[serde(rename = "dealerLink")]
    pub dealer_link: Option<String>,
    #[serde(rename = "listingUrl")]
    pub listing_url: Option<String>,
    #[serde(rename = "rawText")]
    pub raw_text: Option<String>,
    #[serde(rename = "scrapedAt")]
    pub scraped_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "coeLeftYears")]
    pub coe_left_years: Option<f64>,
    pub colour: Option<String>,
}

/// A listing plus its normalized sub-scores, composite score and rank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(rename = "valuePrice")]
    pub value_price: f64,
    #[serde(rename = "valueMileage")]
    pub value_mileage: f64,
    #[serde(rename = "valueDepreciation")]
    pub value_depreciation: f64,
    #[serde(rename = "valueYear")]
    pub value_year: f64,
    #[serde(rename = "valueScore")]
    pub value_score: f64,
    #[serde(rename = "valueRank")]
    pub value_rank: u32,
}

/// Value-score weights
///
/// Must sum to 1.0 before the 0-100 scaling; checked at startup before
/// the weights are handed to the recommender.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub price: f64,
    pub mileage: f64,
    pub depreciation: f64,
    pub year: f64,
}

impl ScoringWeights {
    pub fn is_normalized(&self) -> bool {
        let sum = self.price + self.mileage + self.depreciation + self.year;
        (sum - 1.0).abs() < 1e-9
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price: 0.40,
            mileage: 0.25,
            depreciation: 0.20,
            year: 0.15,
        }
    }
}
