use crate::models::{QaTurn, UserProfile};

/// Default budget guess when the interview never surfaced a number
const DEFAULT_BUDGET_SGD: i64 = 100_000;

/// Build a structured buyer profile from the raw Q&A history
///
/// Deterministic keyword matcher: each profile field is looked up by a
/// small set of question keywords and falls back to a documented
/// default when no answer matched. Numeric answers go through an
/// explicit amount grammar rather than ad hoc digit scraping.
pub fn build_profile_from_history(history: &[QaTurn]) -> UserProfile {
    let budget_sgd = answer_for(history, &["budget", "afford", "spend"])
        .and_then(|a| parse_sgd_amount(&a))
        .or(Some(DEFAULT_BUDGET_SGD));

    let family_size = answer_for(history, &["family", "passenger", "people"])
        .and_then(|a| parse_small_count(&a))
        .or(Some(1));

    let usage = answer_for(history, &["usage", "drive", "commute", "purpose"])
        .or_else(|| Some("general".to_string()));

    let age_preference =
        answer_for(history, &["age", "old", "new"]).map(|a| classify_level(&a, "balanced"));
    let running_cost_priority = answer_for(history, &["cost", "running", "depreciation"])
        .map(|a| classify_level(&a, "medium"));
    let owner_tolerance =
        answer_for(history, &["owner", "owners"]).map(|a| classify_level(&a, "medium"));
    let mileage_tolerance =
        answer_for(history, &["mileage", "km"]).map(|a| classify_level(&a, "medium"));

    let body_type_pref = answer_for(
        history,
        &["body", "type", "hatch", "sedan", "suv", "mpv"],
    )
    .map(|a| a.to_lowercase())
    .or_else(|| {
        // Infer from family size when the body type never came up
        family_size.map(|n| {
            if n >= 4 {
                "suv".to_string()
            } else {
                "sedan_or_hatchback".to_string()
            }
        })
    });

    let brand_bias = answer_for(history, &["brand", "maker", "make"]);
    let fuel_pref = answer_for(history, &["fuel", "ev", "electric", "hybrid"])
        .map(|a| a.to_lowercase())
        .or_else(|| Some("any".to_string()));
    let risk_tolerance =
        answer_for(history, &["risk", "safety"]).map(|a| classify_level(&a, "medium"));

    let notes = if history.is_empty() {
        None
    } else {
        Some(
            history
                .iter()
                .map(|qa| format!("Q: {} / A: {}", qa.question, qa.answer))
                .collect::<Vec<_>>()
                .join(" | "),
        )
    };

    UserProfile {
        budget_sgd,
        family_size,
        usage,
        age_preference: age_preference.or_else(|| Some("balanced".to_string())),
        running_cost_priority: running_cost_priority.or_else(|| Some("medium".to_string())),
        owner_tolerance: owner_tolerance.or_else(|| Some("medium".to_string())),
        mileage_tolerance: mileage_tolerance.or_else(|| Some("medium".to_string())),
        body_type_pref,
        brand_bias,
        fuel_pref,
        risk_tolerance: risk_tolerance.or_else(|| Some("medium".to_string())),
        notes,
    }
}

/// Answer of the first Q&A turn whose question mentions any keyword
fn answer_for(history: &[QaTurn], keywords: &[&str]) -> Option<String> {
    history
        .iter()
        .find(|qa| {
            let q = qa.question.to_lowercase();
            keywords.iter().any(|k| q.contains(k))
        })
        .map(|qa| qa.answer.trim().to_string())
        .filter(|a| !a.is_empty())
}

/// Collapse a free-text answer into a low/medium/high level
fn classify_level(answer: &str, default: &str) -> String {
    let a = answer.to_lowercase();
    for level in ["low", "medium", "high", "newest", "older_ok", "balanced"] {
        if a.contains(level) {
            return level.to_string();
        }
    }
    default.to_string()
}

/// Parse an SGD amount from a free-text answer
///
/// Grammar: optional `$`/`sgd` markers, thousands separators, `k`/`m`
/// suffixes, and ranges ("80k-120k", "between 80,000 and 120,000").
/// A range resolves to its upper bound: the largest amount in the
/// answer wins, mirroring "up to X" phrasing.
pub fn parse_sgd_amount(text: &str) -> Option<i64> {
    let lowered = text.to_lowercase();
    let mut amounts: Vec<i64> = Vec::new();

    let mut chars = lowered.chars().peekable();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            chars.next();
            continue;
        }

        // Consume one number token: digits with comma/underscore
        // separators, optional decimal part, optional k/m suffix
        let mut integer = String::new();
        let mut fraction = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                integer.push(c);
                chars.next();
            } else if c == ',' || c == '_' {
                chars.next();
            } else {
                break;
            }
        }
        if chars.peek() == Some(&'.') {
            chars.next();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    fraction.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        }

        let multiplier = match chars.peek() {
            Some('k') => {
                chars.next();
                1_000.0
            }
            Some('m') => {
                chars.next();
                1_000_000.0
            }
            _ => 1.0,
        };

        let mantissa: f64 = format!(
            "{}.{}",
            integer,
            if fraction.is_empty() { "0" } else { &fraction }
        )
        .parse()
        .ok()?;
        amounts.push((mantissa * multiplier).round() as i64);
    }

    amounts.into_iter().filter(|&a| a > 0).max()
}

/// Parse a small headcount (family size, passengers) from an answer
pub fn parse_small_count(text: &str) -> Option<u8> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u8>().ok().filter(|&n| n > 0 && n <= 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qa(question: &str, answer: &str) -> QaTurn {
        QaTurn {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_parse_plain_amount() {
        assert_eq!(parse_sgd_amount("100000"), Some(100_000));
        assert_eq!(parse_sgd_amount("My budget is $85,000"), Some(85_000));
        assert_eq!(parse_sgd_amount("around 90_000 sgd"), Some(90_000));
    }

    #[test]
    fn test_parse_suffixed_amount() {
        assert_eq!(parse_sgd_amount("about 100k"), Some(100_000));
        assert_eq!(parse_sgd_amount("maybe 1.5m if pushed"), Some(1_500_000));
        assert_eq!(parse_sgd_amount("80.5k"), Some(80_500));
    }

    #[test]
    fn test_parse_range_takes_upper_bound() {
        assert_eq!(parse_sgd_amount("80k-120k"), Some(120_000));
        assert_eq!(
            parse_sgd_amount("between 80,000 and 120,000"),
            Some(120_000)
        );
    }

    #[test]
    fn test_parse_no_number() {
        assert_eq!(parse_sgd_amount("whatever it takes"), None);
        assert_eq!(parse_sgd_amount(""), None);
    }

    #[test]
    fn test_parse_small_count() {
        assert_eq!(parse_small_count("we are 4 people"), Some(4));
        assert_eq!(parse_small_count("just me"), None);
        assert_eq!(parse_small_count("200"), None);
    }

    #[test]
    fn test_profile_defaults_on_empty_history() {
        let profile = build_profile_from_history(&[]);

        assert_eq!(profile.budget_sgd, Some(100_000));
        assert_eq!(profile.family_size, Some(1));
        assert_eq!(profile.age_preference.as_deref(), Some("balanced"));
        assert_eq!(profile.mileage_tolerance.as_deref(), Some("medium"));
        assert_eq!(profile.owner_tolerance.as_deref(), Some("medium"));
        assert_eq!(profile.body_type_pref.as_deref(), Some("sedan_or_hatchback"));
        assert_eq!(profile.fuel_pref.as_deref(), Some("any"));
        assert!(profile.notes.is_none());
    }

    #[test]
    fn test_profile_from_history() {
        let history = vec![
            qa("What is your budget for the car?", "around 120k"),
            qa("How many people in your family?", "5 of us"),
            qa("What mileage would you tolerate?", "low mileage please"),
            qa("Any brand you like?", "prefer Honda"),
            qa("Fuel or EV preference?", "EV"),
        ];

        let profile = build_profile_from_history(&history);

        assert_eq!(profile.budget_sgd, Some(120_000));
        assert_eq!(profile.family_size, Some(5));
        assert_eq!(profile.mileage_tolerance.as_deref(), Some("low"));
        assert_eq!(profile.brand_bias.as_deref(), Some("prefer Honda"));
        assert_eq!(profile.fuel_pref.as_deref(), Some("ev"));
        assert_eq!(profile.body_type_pref.as_deref(), Some("suv"));
        assert!(profile.notes.unwrap().contains("budget"));
    }
}
