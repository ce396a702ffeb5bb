use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Day of week as it appears in congestion data ("MON" .. "SUN").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
            Weekday::Sun => "SUN",
        }
    }

    /// Parse a weekday code, case-insensitive. Unknown codes yield None.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.code().eq_ignore_ascii_case(s))
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self, Weekday::Sat | Weekday::Sun)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn prefix(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Visitor age bucket, by decade. The last bucket is open-ended (70 and over).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBucket {
    Under10,
    Teens,
    Twenties,
    Thirties,
    Forties,
    Fifties,
    Sixties,
    SeventyPlus,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 8] = [
        AgeBucket::Under10,
        AgeBucket::Teens,
        AgeBucket::Twenties,
        AgeBucket::Thirties,
        AgeBucket::Forties,
        AgeBucket::Fifties,
        AgeBucket::Sixties,
        AgeBucket::SeventyPlus,
    ];

    /// Suffix used in distribution keys, e.g. "60" in "male_60".
    pub fn suffix(&self) -> &'static str {
        match self {
            AgeBucket::Under10 => "0",
            AgeBucket::Teens => "10",
            AgeBucket::Twenties => "20",
            AgeBucket::Thirties => "30",
            AgeBucket::Forties => "40",
            AgeBucket::Fifties => "50",
            AgeBucket::Sixties => "60",
            AgeBucket::SeventyPlus => "70_over",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::SeventyPlus => "70+",
            other => other.suffix(),
        }
    }

    pub fn is_senior(&self) -> bool {
        matches!(self, AgeBucket::Sixties | AgeBucket::SeventyPlus)
    }
}

/// Key of a visitor distribution entry ("male_20", "female_70_over", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisitorKey {
    pub gender: Gender,
    pub bucket: AgeBucket,
}

impl VisitorKey {
    pub fn new(gender: Gender, bucket: AgeBucket) -> Self {
        Self { gender, bucket }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (gender, rest) = if let Some(rest) = s.strip_prefix("female_") {
            (Gender::Female, rest)
        } else if let Some(rest) = s.strip_prefix("male_") {
            (Gender::Male, rest)
        } else {
            return None;
        };
        let bucket = AgeBucket::ALL.into_iter().find(|b| b.suffix() == rest)?;
        Some(Self { gender, bucket })
    }
}

impl fmt::Display for VisitorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.gender.prefix(), self.bucket.suffix())
    }
}

/// Foot-traffic congestion curves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Congestion {
    /// Congestion intensity per weekday, roughly 0-100. Days may be missing.
    pub weekly_rhythm: BTreeMap<Weekday, f64>,
    /// Hourly intensities per weekday, index = hour of day.
    pub hourly_breakdown: BTreeMap<Weekday, Vec<f64>>,
}

/// Existing businesses in the analyzed area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessCounts {
    pub total_count: u64,
    pub category_counts: BTreeMap<String, u64>,
}

impl BusinessCounts {
    /// Count for a category, matched case-insensitively on the trimmed name.
    pub fn count_for(&self, category: &str) -> u64 {
        let wanted = category.trim();
        self.category_counts
            .iter()
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, count)| *count)
            .sum()
    }
}

/// One entry of a real-estate price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    /// Period identifier, e.g. "202304" or "2023-04". Sorts chronologically.
    pub period_key: String,
    pub median_price_per_area: f64,
}

/// Everything known about one location, with missing pieces already defaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSignals {
    pub congestion: Congestion,
    pub visitors: BTreeMap<VisitorKey, f64>,
    pub businesses: BusinessCounts,
    pub real_estate: Vec<PricePoint>,
    pub requested_category: Option<String>,
}

impl LocationSignals {
    /// Sum of all visitor counts.
    ///
    /// Only `male_*` / `female_*` age buckets are counted. Entries with other
    /// keys are dropped during extraction and never reach the denominator of
    /// the senior share.
    pub fn total_visitors(&self) -> f64 {
        self.visitors.values().sum()
    }

    /// Sum of visitor counts in the 60 and 70+ buckets, both genders.
    pub fn senior_visitors(&self) -> f64 {
        self.visitors
            .iter()
            .filter(|(key, _)| key.bucket.is_senior())
            .map(|(_, count)| count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_parse() {
        assert_eq!(Weekday::parse("MON"), Some(Weekday::Mon));
        assert_eq!(Weekday::parse("sun"), Some(Weekday::Sun));
        assert_eq!(Weekday::parse(" fri "), Some(Weekday::Fri));
        assert_eq!(Weekday::parse("MONDAY"), None);
    }

    #[test]
    fn test_weekday_weekend() {
        assert!(Weekday::Sat.is_weekend());
        assert!(Weekday::Sun.is_weekend());
        assert!(!Weekday::Fri.is_weekend());
    }

    #[test]
    fn test_visitor_key_parse() {
        let key = VisitorKey::parse("male_60").unwrap();
        assert_eq!(key.gender, Gender::Male);
        assert_eq!(key.bucket, AgeBucket::Sixties);

        let key = VisitorKey::parse("female_70_over").unwrap();
        assert_eq!(key.gender, Gender::Female);
        assert_eq!(key.bucket, AgeBucket::SeventyPlus);

        assert!(VisitorKey::parse("female_80").is_none());
        assert!(VisitorKey::parse("other_20").is_none());
    }

    #[test]
    fn test_visitor_key_display() {
        let key = VisitorKey::new(Gender::Female, AgeBucket::SeventyPlus);
        assert_eq!(key.to_string(), "female_70_over");
        assert_eq!(VisitorKey::parse(&key.to_string()), Some(key));
    }

    #[test]
    fn test_count_for_case_insensitive() {
        let mut counts = BusinessCounts::default();
        counts.category_counts.insert("Cafe".to_string(), 12);
        counts.category_counts.insert("Restaurant".to_string(), 4);
        assert_eq!(counts.count_for("cafe"), 12);
        assert_eq!(counts.count_for("  CAFE "), 12);
        assert_eq!(counts.count_for("bakery"), 0);
    }

    #[test]
    fn test_senior_visitors() {
        let mut signals = LocationSignals::default();
        signals.visitors.insert(VisitorKey::new(Gender::Male, AgeBucket::Sixties), 10.0);
        signals.visitors.insert(VisitorKey::new(Gender::Female, AgeBucket::SeventyPlus), 5.0);
        signals.visitors.insert(VisitorKey::new(Gender::Female, AgeBucket::Twenties), 35.0);
        assert_eq!(signals.senior_visitors(), 15.0);
        assert_eq!(signals.total_visitors(), 50.0);
    }
}
