use std::collections::BTreeMap;

use super::accessors::HOURS_PER_DAY;
use super::types::{AgeBucket, Gender, LocationSignals, PricePoint, Weekday};

/// Number of trailing years kept in a price summary.
pub const PRICE_WINDOW_YEARS: usize = 5;

/// Which days an hourly profile averages over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySet {
    All,
    Weekdays,
    Weekend,
}

impl DaySet {
    pub fn contains(&self, day: Weekday) -> bool {
        match self {
            DaySet::All => true,
            DaySet::Weekdays => !day.is_weekend(),
            DaySet::Weekend => day.is_weekend(),
        }
    }
}

/// Weekday with the highest congestion. Ties go to the earlier day.
pub fn busiest_day(signals: &LocationSignals) -> Option<(Weekday, f64)> {
    signals
        .congestion
        .weekly_rhythm
        .iter()
        .fold(None, |best: Option<(Weekday, f64)>, (day, value)| match best {
            Some((_, top)) if top >= *value => best,
            _ => Some((*day, *value)),
        })
}

/// Average intensity per hour across the selected days.
///
/// Each hour is averaged over the days that actually report it; an hour no
/// selected day reports stays at zero.
pub fn hourly_profile(signals: &LocationSignals, days: DaySet) -> [f64; HOURS_PER_DAY] {
    let mut totals = [0.0; HOURS_PER_DAY];
    let mut counts = [0u32; HOURS_PER_DAY];

    for (day, hours) in &signals.congestion.hourly_breakdown {
        if !days.contains(*day) {
            continue;
        }
        for (hour, value) in hours.iter().enumerate().take(HOURS_PER_DAY) {
            totals[hour] += value;
            counts[hour] += 1;
        }
    }

    let mut profile = [0.0; HOURS_PER_DAY];
    for hour in 0..HOURS_PER_DAY {
        if counts[hour] > 0 {
            profile[hour] = totals[hour] / f64::from(counts[hour]);
        }
    }
    profile
}

/// Hour with the highest value in a profile, or None if the profile is all zero.
pub fn peak_hour(profile: &[f64; HOURS_PER_DAY]) -> Option<usize> {
    let (hour, value) = profile
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |(best_hour, best), (hour, value)| {
            if *value > best {
                (hour, *value)
            } else {
                (best_hour, best)
            }
        });
    (value > 0.0).then_some(hour)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisitorTotals {
    pub male: f64,
    pub female: f64,
}

impl VisitorTotals {
    pub fn total(&self) -> f64 {
        self.male + self.female
    }
}

pub fn visitor_totals(signals: &LocationSignals) -> VisitorTotals {
    signals
        .visitors
        .iter()
        .fold(VisitorTotals::default(), |mut totals, (key, count)| {
            match key.gender {
                Gender::Male => totals.male += count,
                Gender::Female => totals.female += count,
            }
            totals
        })
}

/// Age bucket with the most visitors of either gender. Ties go to the younger bucket.
pub fn dominant_age_bucket(signals: &LocationSignals) -> Option<(AgeBucket, f64)> {
    let mut by_bucket: BTreeMap<AgeBucket, f64> = BTreeMap::new();
    for (key, count) in &signals.visitors {
        *by_bucket.entry(key.bucket).or_default() += count;
    }

    by_bucket
        .into_iter()
        .filter(|(_, count)| *count > 0.0)
        .fold(None, |best: Option<(AgeBucket, f64)>, (bucket, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((bucket, count)),
        })
}

/// Summary of the recent real-estate price history.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSummary {
    /// Yearly average prices, oldest first, limited to the trailing window.
    pub yearly: Vec<(String, f64)>,
    pub latest: f64,
    pub average: f64,
    /// Percent change from the first to the last year of the window.
    pub trend_pct: f64,
}

/// Group prices by year, average each year and summarize the trailing window.
///
/// The year is the first four characters of the period key; entries with a
/// shorter key are ignored.
pub fn price_summary(trends: &[PricePoint]) -> Option<PriceSummary> {
    let mut by_year: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
    for point in trends {
        let Some(year) = point.period_key.get(..4) else {
            continue;
        };
        let entry = by_year.entry(year).or_insert((0.0, 0));
        entry.0 += point.median_price_per_area;
        entry.1 += 1;
    }

    let yearly: Vec<(String, f64)> = by_year
        .into_iter()
        .map(|(year, (sum, n))| (year.to_string(), sum / f64::from(n)))
        .collect();
    let window = &yearly[yearly.len().saturating_sub(PRICE_WINDOW_YEARS)..];

    let (_, earliest) = window.first()?;
    let (_, latest) = window.last()?;
    let average = window.iter().map(|(_, price)| price).sum::<f64>() / window.len() as f64;
    let trend_pct = if *earliest != 0.0 {
        (latest - earliest) / earliest * 100.0
    } else {
        0.0
    };

    Some(PriceSummary {
        yearly: window.to_vec(),
        latest: *latest,
        average,
        trend_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::types::VisitorKey;

    fn point(period: &str, price: f64) -> PricePoint {
        PricePoint {
            period_key: period.to_string(),
            median_price_per_area: price,
        }
    }

    #[test]
    fn test_busiest_day() {
        let mut signals = LocationSignals::default();
        assert!(busiest_day(&signals).is_none());

        let rhythm = &mut signals.congestion.weekly_rhythm;
        rhythm.insert(Weekday::Mon, 40.0);
        rhythm.insert(Weekday::Fri, 90.0);
        rhythm.insert(Weekday::Sat, 90.0);
        assert_eq!(busiest_day(&signals), Some((Weekday::Fri, 90.0)));
    }

    #[test]
    fn test_hourly_profile_weekday_weekend() {
        let mut signals = LocationSignals::default();
        let hourly = &mut signals.congestion.hourly_breakdown;
        hourly.insert(Weekday::Mon, vec![10.0; HOURS_PER_DAY]);
        hourly.insert(Weekday::Tue, vec![30.0; HOURS_PER_DAY]);
        hourly.insert(Weekday::Sun, vec![50.0; 12]);

        let weekdays = hourly_profile(&signals, DaySet::Weekdays);
        assert_eq!(weekdays[0], 20.0);
        assert_eq!(weekdays[23], 20.0);

        let weekend = hourly_profile(&signals, DaySet::Weekend);
        assert_eq!(weekend[11], 50.0);
        assert_eq!(weekend[12], 0.0);

        let all = hourly_profile(&signals, DaySet::All);
        assert_eq!(all[0], 30.0);
        assert_eq!(all[20], 20.0);
    }

    #[test]
    fn test_peak_hour() {
        let mut profile = [0.0; HOURS_PER_DAY];
        assert_eq!(peak_hour(&profile), None);
        profile[18] = 75.0;
        profile[12] = 60.0;
        assert_eq!(peak_hour(&profile), Some(18));
    }

    #[test]
    fn test_visitor_totals_and_dominant_bucket() {
        let mut signals = LocationSignals::default();
        signals.visitors.insert(VisitorKey::new(Gender::Male, AgeBucket::Twenties), 100.0);
        signals.visitors.insert(VisitorKey::new(Gender::Female, AgeBucket::Twenties), 80.0);
        signals.visitors.insert(VisitorKey::new(Gender::Female, AgeBucket::Forties), 150.0);

        let totals = visitor_totals(&signals);
        assert_eq!(totals.male, 100.0);
        assert_eq!(totals.female, 230.0);
        assert_eq!(totals.total(), 330.0);

        assert_eq!(
            dominant_age_bucket(&signals),
            Some((AgeBucket::Twenties, 180.0))
        );
    }

    #[test]
    fn test_dominant_bucket_empty() {
        assert!(dominant_age_bucket(&LocationSignals::default()).is_none());
    }

    #[test]
    fn test_price_summary_groups_by_year() {
        let trends = vec![
            point("2023-01", 100.0),
            point("2023-07", 200.0),
            point("2024-01", 300.0),
        ];
        let summary = price_summary(&trends).unwrap();
        assert_eq!(summary.yearly, vec![("2023".to_string(), 150.0), ("2024".to_string(), 300.0)]);
        assert_eq!(summary.latest, 300.0);
        assert_eq!(summary.average, 225.0);
        assert!((summary.trend_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_summary_keeps_trailing_window() {
        let trends: Vec<PricePoint> = (2015..2025)
            .map(|year| point(&format!("{}06", year), f64::from(year - 2014)))
            .collect();
        let summary = price_summary(&trends).unwrap();
        assert_eq!(summary.yearly.len(), PRICE_WINDOW_YEARS);
        assert_eq!(summary.yearly[0].0, "2020");
        assert_eq!(summary.latest, 10.0);
        assert_eq!(summary.average, 8.0);
    }

    #[test]
    fn test_price_summary_empty_or_short_keys() {
        assert!(price_summary(&[]).is_none());
        assert!(price_summary(&[point("23", 100.0)]).is_none());
    }

    #[test]
    fn test_price_summary_zero_earliest() {
        let summary = price_summary(&[point("2022", 0.0), point("2023", 50.0)]).unwrap();
        assert_eq!(summary.trend_pct, 0.0);
    }
}
