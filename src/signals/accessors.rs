use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use super::types::{BusinessCounts, Congestion, LocationSignals, PricePoint, VisitorKey, Weekday};

/// Hours per day in an hourly breakdown; longer series are truncated.
pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// The bundle's top level is not a JSON object.
    #[error("signal bundle must be a JSON object, found {found}")]
    MalformedBundle { found: &'static str },
}

impl LocationSignals {
    /// Extract signals from a JSON bundle.
    ///
    /// Missing or wrongly-typed fields fall back to neutral defaults (empty
    /// maps, zero businesses, no price history). Only a top level that is not
    /// an object is an error.
    pub fn from_value(value: &Value) -> Result<Self, SignalError> {
        let root = value.as_object().ok_or(SignalError::MalformedBundle {
            found: json_kind(value),
        })?;

        Ok(Self {
            congestion: Congestion {
                weekly_rhythm: weekly_rhythm(root),
                hourly_breakdown: hourly_breakdown(root),
            },
            visitors: visitors_distribution(root),
            businesses: business_counts(root),
            real_estate: real_estate_trends(root),
            requested_category: root
                .get("requestedCategory")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn congestion(root: &Map<String, Value>) -> Option<&Map<String, Value>> {
    root.get("congestionData").and_then(Value::as_object)
}

fn weekly_rhythm(root: &Map<String, Value>) -> BTreeMap<Weekday, f64> {
    let Some(rhythm) = congestion(root)
        .and_then(|c| c.get("weeklyRhythm"))
        .and_then(Value::as_object)
    else {
        return BTreeMap::new();
    };

    rhythm
        .iter()
        .filter_map(|(key, value)| Some((Weekday::parse(key)?, finite(value)?)))
        .collect()
}

fn hourly_breakdown(root: &Map<String, Value>) -> BTreeMap<Weekday, Vec<f64>> {
    let Some(hourly) = congestion(root)
        .and_then(|c| c.get("hourlyBreakdown"))
        .and_then(Value::as_object)
    else {
        return BTreeMap::new();
    };

    hourly
        .iter()
        .filter_map(|(key, value)| {
            let day = Weekday::parse(key)?;
            let hours = value.as_array()?;
            // Non-numeric hours count as zero so indices stay aligned with the hour of day
            let series = hours
                .iter()
                .take(HOURS_PER_DAY)
                .map(|v| finite(v).unwrap_or(0.0))
                .collect();
            Some((day, series))
        })
        .collect()
}

fn visitors_distribution(root: &Map<String, Value>) -> BTreeMap<VisitorKey, f64> {
    let Some(visitors) = root.get("visitorsDistribution").and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    visitors
        .iter()
        .filter_map(|(key, value)| Some((VisitorKey::parse(key)?, finite(value)?.max(0.0))))
        .collect()
}

/// Reads `businessCounts`, falling back to top-level `totalCount` and
/// `categoryCounts` which older analysis responses carry.
fn business_counts(root: &Map<String, Value>) -> BusinessCounts {
    let nested = root.get("businessCounts").and_then(Value::as_object);
    let field = |name: &str| nested.and_then(|n| n.get(name)).or_else(|| root.get(name));

    let total_count = field("totalCount").map(non_negative_count).unwrap_or(0);

    let category_counts = field("categoryCounts")
        .and_then(Value::as_object)
        .map(|counts| {
            counts
                .iter()
                .filter(|(_, value)| value.is_number())
                .map(|(name, value)| (name.clone(), non_negative_count(value)))
                .collect()
        })
        .unwrap_or_default();

    BusinessCounts {
        total_count,
        category_counts,
    }
}

/// Negative, fractional and non-numeric counts collapse to a whole number >= 0.
fn non_negative_count(value: &Value) -> u64 {
    match finite(value) {
        Some(n) if n > 0.0 => n.floor() as u64,
        _ => 0,
    }
}

fn real_estate_trends(root: &Map<String, Value>) -> Vec<PricePoint> {
    let Some(trends) = root.get("realEstateTrends").and_then(Value::as_array) else {
        return Vec::new();
    };

    trends
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_object()?;
            let period_key = entry
                .get("periodKey")
                .or_else(|| entry.get("yearMonth"))
                .and_then(Value::as_str)?;
            let price = entry
                .get("medianPricePerArea")
                .or_else(|| entry.get("medianPricePerSqm"))
                .and_then(finite)?;
            Some(PricePoint {
                period_key: period_key.to_string(),
                median_price_per_area: price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::types::{AgeBucket, Gender};
    use serde_json::json;

    #[test]
    fn test_empty_object_gives_defaults() {
        let signals = LocationSignals::from_value(&json!({})).unwrap();
        assert_eq!(signals, LocationSignals::default());
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = LocationSignals::from_value(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, SignalError::MalformedBundle { found: "an array" });

        let err = LocationSignals::from_value(&Value::Null).unwrap_err();
        assert!(err.to_string().contains("null"));
    }

    #[test]
    fn test_weekly_rhythm_skips_bad_entries() {
        let value = json!({
            "congestionData": {
                "weeklyRhythm": { "MON": 80, "TUE": "high", "XYZ": 10, "SUN": 40.5 }
            }
        });
        let signals = LocationSignals::from_value(&value).unwrap();
        let rhythm = &signals.congestion.weekly_rhythm;
        assert_eq!(rhythm.len(), 2);
        assert_eq!(rhythm[&Weekday::Mon], 80.0);
        assert_eq!(rhythm[&Weekday::Sun], 40.5);
    }

    #[test]
    fn test_wrong_typed_congestion_is_ignored() {
        let value = json!({ "congestionData": "unavailable" });
        let signals = LocationSignals::from_value(&value).unwrap();
        assert!(signals.congestion.weekly_rhythm.is_empty());
        assert!(signals.congestion.hourly_breakdown.is_empty());
    }

    #[test]
    fn test_hourly_breakdown_truncates_and_zero_fills() {
        let mut hours: Vec<Value> = (0..30).map(|h| json!(h)).collect();
        hours[3] = json!(null);
        let value = json!({ "congestionData": { "hourlyBreakdown": { "WED": hours } } });
        let signals = LocationSignals::from_value(&value).unwrap();
        let wed = &signals.congestion.hourly_breakdown[&Weekday::Wed];
        assert_eq!(wed.len(), HOURS_PER_DAY);
        assert_eq!(wed[3], 0.0);
        assert_eq!(wed[23], 23.0);
    }

    #[test]
    fn test_negative_total_count_is_zero() {
        let value = json!({ "businessCounts": { "totalCount": -5 } });
        let signals = LocationSignals::from_value(&value).unwrap();
        assert_eq!(signals.businesses.total_count, 0);
    }

    #[test]
    fn test_business_counts_nested_and_top_level() {
        let nested = json!({
            "businessCounts": { "totalCount": 42, "categoryCounts": { "Cafe": 7, "Gym": "n/a" } }
        });
        let signals = LocationSignals::from_value(&nested).unwrap();
        assert_eq!(signals.businesses.total_count, 42);
        assert_eq!(signals.businesses.category_counts.len(), 1);
        assert_eq!(signals.businesses.count_for("cafe"), 7);

        let flat = json!({ "totalCount": 12.9, "categoryCounts": { "Bakery": 3 } });
        let signals = LocationSignals::from_value(&flat).unwrap();
        assert_eq!(signals.businesses.total_count, 12);
        assert_eq!(signals.businesses.count_for("Bakery"), 3);
    }

    #[test]
    fn test_visitors_distribution() {
        let value = json!({
            "visitorsDistribution": {
                "male_20": 120,
                "female_70_over": 30,
                "unknown_key": 999,
                "female_30": -4
            }
        });
        let signals = LocationSignals::from_value(&value).unwrap();
        assert_eq!(signals.visitors.len(), 3);
        // unknown_key stays out of the total
        assert_eq!(signals.total_visitors(), 150.0);
        assert_eq!(
            signals.visitors[&VisitorKey::new(Gender::Female, AgeBucket::SeventyPlus)],
            30.0
        );
        assert_eq!(
            signals.visitors[&VisitorKey::new(Gender::Female, AgeBucket::Thirties)],
            0.0
        );
    }

    #[test]
    fn test_real_estate_trends_with_aliases() {
        let value = json!({
            "realEstateTrends": [
                { "periodKey": "2023-01", "medianPricePerArea": 1200.0 },
                { "yearMonth": "202402", "medianPricePerSqm": 1300 },
                { "periodKey": "2024-03" },
                "garbage"
            ]
        });
        let signals = LocationSignals::from_value(&value).unwrap();
        assert_eq!(signals.real_estate.len(), 2);
        assert_eq!(signals.real_estate[1].period_key, "202402");
        assert_eq!(signals.real_estate[1].median_price_per_area, 1300.0);
    }

    #[test]
    fn test_requested_category() {
        let value = json!({ "requestedCategory": "cafe" });
        let signals = LocationSignals::from_value(&value).unwrap();
        assert_eq!(signals.requested_category.as_deref(), Some("cafe"));

        let value = json!({ "requestedCategory": 7 });
        let signals = LocationSignals::from_value(&value).unwrap();
        assert!(signals.requested_category.is_none());
    }
}
