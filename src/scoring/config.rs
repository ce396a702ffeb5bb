use serde::{Deserialize, Serialize};

pub const DEFAULT_FOOT_TRAFFIC_WEIGHT: u8 = 40;
pub const DEFAULT_REAL_ESTATE_WEIGHT: u8 = 40;
pub const DEFAULT_DENSITY_WEIGHT: u8 = 20;

pub const DEFAULT_RECENT_PERIODS: usize = 12;
pub const DEFAULT_AUDIENCE_FIT_THRESHOLD: f64 = 60.0;
pub const DEFAULT_SATURATION_SHARE: f64 = 0.3;
pub const DEFAULT_MIN_SATURATION_COUNT: u64 = 5;

/// Main scoring configuration.
///
/// Every section is optional; a missing section uses its default. The weights
/// must add up to 100.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights: { foot_traffic: 40, real_estate: 40, density: 20 }
///   density:
///     buckets:
///       - { range: "0", value: 70 }
///       - { range: "1-19", value: 60 }
///       - { range: ">=20", value: 40 }
///   real_estate:
///     mode: price_band
///     low: 3000000
///     high: 9000000
///   tailoring:
///     audience_fit_threshold: 60
///     saturation_share: 0.3
///     categories:
///       - { name: "cafe", saturation_share: 0.2 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Percent weights of the factors feeding the base score
    #[serde(default)]
    pub weights: Option<WeightsConfig>,

    /// Business-count buckets for the density factor
    #[serde(default)]
    pub density: Option<DensityConfig>,

    /// How a price series becomes a 0-100 factor
    #[serde(default)]
    pub real_estate: Option<RealEstatePolicy>,

    /// Predicates for the tailored-mode bonus and penalty
    #[serde(default)]
    pub tailoring: Option<TailoringConfig>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Some(WeightsConfig::default()),
            density: Some(DensityConfig::default()),
            real_estate: Some(RealEstatePolicy::default()),
            tailoring: Some(TailoringConfig::default()),
        }
    }
}

/// Percent weights for the base score.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WeightsConfig {
    pub foot_traffic: u8,
    pub real_estate: u8,
    pub density: u8,
}

impl WeightsConfig {
    pub fn total(&self) -> u32 {
        u32::from(self.foot_traffic) + u32::from(self.real_estate) + u32::from(self.density)
    }
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            foot_traffic: DEFAULT_FOOT_TRAFFIC_WEIGHT,
            real_estate: DEFAULT_REAL_ESTATE_WEIGHT,
            density: DEFAULT_DENSITY_WEIGHT,
        }
    }
}

/// Density factor configuration. Buckets are checked in order; the first
/// matching range wins.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DensityConfig {
    pub buckets: Vec<DensityBucket>,
}

impl Default for DensityConfig {
    fn default() -> Self {
        let bucket = |range: &str, value: f64| DensityBucket {
            range: range.to_string(),
            value,
        };
        Self {
            buckets: vec![
                bucket("0", 70.0),
                bucket("1-19", 60.0),
                bucket("20-49", 45.0),
                bucket("50-99", 35.0),
                bucket(">=100", 25.0),
            ],
        }
    }
}

/// Maps a business-count range to a factor value.
/// Range format: "<N", "<=N", ">N", ">=N", "N", "N-M" (inclusive range)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DensityBucket {
    /// Range expression (e.g., "0", "1-19", ">=100")
    pub range: String,

    /// Factor value in 0-100
    pub value: f64,
}

/// Real-estate factor policy.
///
/// An empty price series always scores 50 regardless of the policy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RealEstatePolicy {
    /// Mean price of the most recent periods, clamped to 0-100. Expects a
    /// series already expressed on a 0-100 index.
    Average {
        #[serde(default = "default_recent_periods")]
        recent_periods: usize,
    },

    /// Always 50, whatever the prices.
    Neutral,

    /// Mean price of the most recent periods mapped linearly: `low` or
    /// cheaper scores 100, `high` or pricier scores 0.
    PriceBand {
        low: f64,
        high: f64,
        #[serde(default = "default_recent_periods")]
        recent_periods: usize,
    },
}

impl Default for RealEstatePolicy {
    fn default() -> Self {
        RealEstatePolicy::Average {
            recent_periods: DEFAULT_RECENT_PERIODS,
        }
    }
}

fn default_recent_periods() -> usize {
    DEFAULT_RECENT_PERIODS
}

/// Tailored-mode configuration.
///
/// The bonus applies when the visitor mix fits the category; otherwise the
/// penalty applies when the category already crowds the area.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TailoringConfig {
    /// Demographics factor at or above which the audience counts as a fit
    #[serde(default)]
    pub audience_fit_threshold: Option<f64>,

    /// Share of all businesses (0-1) above which a category is saturated
    #[serde(default)]
    pub saturation_share: Option<f64>,

    /// Category count below which saturation is never declared
    #[serde(default)]
    pub min_saturation_count: Option<u64>,

    /// Per-category overrides, matched case-insensitively by name
    #[serde(default)]
    pub categories: Option<Vec<CategoryOverride>>,
}

impl Default for TailoringConfig {
    fn default() -> Self {
        Self {
            audience_fit_threshold: Some(DEFAULT_AUDIENCE_FIT_THRESHOLD),
            saturation_share: Some(DEFAULT_SATURATION_SHARE),
            min_saturation_count: Some(DEFAULT_MIN_SATURATION_COUNT),
            categories: None,
        }
    }
}

impl TailoringConfig {
    fn override_for(&self, category: &str) -> Option<&CategoryOverride> {
        let wanted = category.trim();
        self.categories
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|c| c.name.trim().eq_ignore_ascii_case(wanted))
    }

    /// Effective audience-fit threshold for a category.
    pub fn audience_fit_threshold_for(&self, category: &str) -> f64 {
        self.override_for(category)
            .and_then(|c| c.audience_fit_threshold)
            .or(self.audience_fit_threshold)
            .unwrap_or(DEFAULT_AUDIENCE_FIT_THRESHOLD)
    }

    /// Effective saturation share for a category.
    pub fn saturation_share_for(&self, category: &str) -> f64 {
        self.override_for(category)
            .and_then(|c| c.saturation_share)
            .or(self.saturation_share)
            .unwrap_or(DEFAULT_SATURATION_SHARE)
    }

    pub fn min_saturation_count(&self) -> u64 {
        self.min_saturation_count
            .unwrap_or(DEFAULT_MIN_SATURATION_COUNT)
    }
}

/// Category-specific tailoring thresholds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CategoryOverride {
    pub name: String,

    #[serde(default)]
    pub audience_fit_threshold: Option<f64>,

    #[serde(default)]
    pub saturation_share: Option<f64>,
}
