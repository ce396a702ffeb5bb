use anyhow::{bail, Context, Result};

use super::config::{DensityConfig, RealEstatePolicy};
use crate::signals::{LocationSignals, PricePoint};

/// Value a factor takes when its signal carries no information.
pub const NEUTRAL_FACTOR: f64 = 50.0;

pub const FOOT_TRAFFIC: &str = "Foot Traffic";
pub const BUSINESS_DENSITY: &str = "Business Density";
pub const DEMOGRAPHICS_FIT: &str = "Demographics Fit";
pub const REAL_ESTATE: &str = "Rent/Real Estate";

/// Senior share (percent) above which the demographics factor starts dropping.
const SENIOR_SHARE_KNEE: f64 = 40.0;
const DEMOGRAPHICS_CEILING: f64 = 70.0;
const DEMOGRAPHICS_FLOOR: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub enum RangeOp {
    LessThan(u64),
    LessEqual(u64),
    GreaterThan(u64),
    GreaterEqual(u64),
    Equal(u64),
    Between(u64, u64), // Inclusive range: N-M
}

impl RangeOp {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let number = |v: &str| -> Result<u64> {
            v.trim()
                .parse()
                .with_context(|| format!("'{}' is not a whole number", v.trim()))
        };

        if let Some(val) = s.strip_prefix(">=") {
            Ok(RangeOp::GreaterEqual(number(val)?))
        } else if let Some(val) = s.strip_prefix("<=") {
            Ok(RangeOp::LessEqual(number(val)?))
        } else if let Some(val) = s.strip_prefix('>') {
            Ok(RangeOp::GreaterThan(number(val)?))
        } else if let Some(val) = s.strip_prefix('<') {
            Ok(RangeOp::LessThan(number(val)?))
        } else if let Some((low, high)) = s.split_once('-').filter(|_| !s.starts_with('-')) {
            let (low, high) = (number(low)?, number(high)?);
            if low > high {
                bail!("Range start {} is greater than end {}", low, high);
            }
            Ok(RangeOp::Between(low, high))
        } else {
            Ok(RangeOp::Equal(number(s)?))
        }
    }

    pub fn matches(&self, value: u64) -> bool {
        match self {
            RangeOp::LessThan(n) => value < *n,
            RangeOp::LessEqual(n) => value <= *n,
            RangeOp::GreaterThan(n) => value > *n,
            RangeOp::GreaterEqual(n) => value >= *n,
            RangeOp::Equal(n) => value == *n,
            RangeOp::Between(low, high) => value >= *low && value <= *high,
        }
    }

    /// Counts on both sides of every boundary of this range.
    fn edges(&self) -> Vec<u64> {
        let around = |n: u64| [n.saturating_sub(1), n, n.saturating_add(1)];
        match self {
            RangeOp::LessThan(n)
            | RangeOp::LessEqual(n)
            | RangeOp::GreaterThan(n)
            | RangeOp::GreaterEqual(n)
            | RangeOp::Equal(n) => around(*n).to_vec(),
            RangeOp::Between(low, high) => {
                let mut edges = around(*low).to_vec();
                edges.extend(around(*high));
                edges
            }
        }
    }
}

/// Turns one family of location signals into a 0-100 factor value.
///
/// Implementations must be pure: the same signals always give the same value.
pub trait FactorExtractor: Send + Sync {
    /// Display name used in the breakdown.
    fn name(&self) -> &'static str;

    fn extract(&self, signals: &LocationSignals) -> f64;
}

/// Average weekly congestion. More sustained foot traffic is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrafficFactor;

impl FactorExtractor for TrafficFactor {
    fn name(&self) -> &'static str {
        FOOT_TRAFFIC
    }

    fn extract(&self, signals: &LocationSignals) -> f64 {
        let rhythm = &signals.congestion.weekly_rhythm;
        if rhythm.is_empty() {
            return NEUTRAL_FACTOR;
        }
        let mean = rhythm.values().sum::<f64>() / rhythm.len() as f64;
        mean.clamp(0.0, 100.0)
    }
}

/// Step function of the number of existing businesses. More competition
/// scores lower.
#[derive(Debug, Clone)]
pub struct DensityFactor {
    buckets: Vec<(RangeOp, f64)>,
}

impl DensityFactor {
    pub fn from_config(config: &DensityConfig) -> Result<Self> {
        let buckets = config
            .buckets
            .iter()
            .map(|bucket| -> Result<(RangeOp, f64)> {
                Ok((RangeOp::parse(&bucket.range)?, bucket.value.clamp(0.0, 100.0)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { buckets })
    }

    /// First matching bucket wins; a count no bucket covers is neutral.
    pub fn value_for(&self, total_count: u64) -> f64 {
        self.buckets
            .iter()
            .find(|(range, _)| range.matches(total_count))
            .map(|(_, value)| *value)
            .unwrap_or(NEUTRAL_FACTOR)
    }
}

impl DensityFactor {
    /// First pair of counts `(lower, higher)` where the factor value goes up
    /// as the business count grows, if any.
    ///
    /// Values are piecewise constant between range edges, so checking the
    /// counts around each edge covers every count.
    pub fn first_increase(&self) -> Option<(u64, u64)> {
        let mut counts: Vec<u64> = self
            .buckets
            .iter()
            .flat_map(|(range, _)| range.edges())
            .collect();
        counts.push(0);
        counts.sort_unstable();
        counts.dedup();

        counts
            .windows(2)
            .find(|pair| self.value_for(pair[1]) > self.value_for(pair[0]))
            .map(|pair| (pair[0], pair[1]))
    }
}

impl FactorExtractor for DensityFactor {
    fn name(&self) -> &'static str {
        BUSINESS_DENSITY
    }

    fn extract(&self, signals: &LocationSignals) -> f64 {
        self.value_for(signals.businesses.total_count)
    }
}

/// Penalizes a visitor base where people aged 60+ exceed 40% of the total,
/// one point per percentage point, floored at 20.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemographicFactor;

impl DemographicFactor {
    pub fn senior_share_pct(signals: &LocationSignals) -> f64 {
        let all = signals.total_visitors();
        let all = if all > 0.0 { all } else { 1.0 };
        100.0 * signals.senior_visitors() / all
    }
}

impl FactorExtractor for DemographicFactor {
    fn name(&self) -> &'static str {
        DEMOGRAPHICS_FIT
    }

    fn extract(&self, signals: &LocationSignals) -> f64 {
        let pct = Self::senior_share_pct(signals);
        let excess = (pct - SENIOR_SHARE_KNEE).max(0.0);
        (DEMOGRAPHICS_CEILING - excess).max(DEMOGRAPHICS_FLOOR)
    }
}

#[derive(Debug, Clone)]
pub struct RealEstateFactor {
    policy: RealEstatePolicy,
}

impl RealEstateFactor {
    pub fn new(policy: RealEstatePolicy) -> Self {
        Self { policy }
    }
}

/// Mean price over the `periods` latest entries, ordered by period key.
pub fn recent_mean_price(trends: &[PricePoint], periods: usize) -> Option<f64> {
    if trends.is_empty() {
        return None;
    }
    let mut sorted: Vec<&PricePoint> = trends.iter().collect();
    sorted.sort_by(|a, b| a.period_key.cmp(&b.period_key));
    let recent = &sorted[sorted.len().saturating_sub(periods.max(1))..];
    let sum: f64 = recent.iter().map(|p| p.median_price_per_area).sum();
    Some(sum / recent.len() as f64)
}

impl FactorExtractor for RealEstateFactor {
    fn name(&self) -> &'static str {
        REAL_ESTATE
    }

    fn extract(&self, signals: &LocationSignals) -> f64 {
        match &self.policy {
            RealEstatePolicy::Neutral => NEUTRAL_FACTOR,
            RealEstatePolicy::Average { recent_periods } => {
                recent_mean_price(&signals.real_estate, *recent_periods)
                    .map(|mean| mean.clamp(0.0, 100.0))
                    .unwrap_or(NEUTRAL_FACTOR)
            }
            RealEstatePolicy::PriceBand {
                low,
                high,
                recent_periods,
            } => {
                if high <= low {
                    return NEUTRAL_FACTOR;
                }
                recent_mean_price(&signals.real_estate, *recent_periods)
                    .map(|mean| ((high - mean) / (high - low) * 100.0).clamp(0.0, 100.0))
                    .unwrap_or(NEUTRAL_FACTOR)
            }
        }
    }
}
