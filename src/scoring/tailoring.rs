use serde::Serialize;

use super::config::TailoringConfig;
use crate::signals::LocationSignals;

/// Size of the tailored-mode bonus or penalty, in score points.
pub const TAILORING_ADJUSTMENT: f64 = 15.0;

/// Why a tailored score moved away from the base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdjustmentReason {
    None,
    AudienceFit,
    Saturated,
}

impl AdjustmentReason {
    pub fn points(&self) -> f64 {
        match self {
            AdjustmentReason::None => 0.0,
            AdjustmentReason::AudienceFit => TAILORING_ADJUSTMENT,
            AdjustmentReason::Saturated => -TAILORING_ADJUSTMENT,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            AdjustmentReason::None => "no adjustment",
            AdjustmentReason::AudienceFit => "visitor mix fits the category",
            AdjustmentReason::Saturated => "category already saturated",
        }
    }
}

/// Decides the tailored-mode adjustment for a requested category.
///
/// Audience fit is checked first; saturation only matters when the audience
/// does not fit.
pub trait TailoringPolicy: Send + Sync {
    fn audience_fit(&self, category: &str, demo_factor: f64, signals: &LocationSignals) -> bool;

    fn saturated(&self, category: &str, signals: &LocationSignals) -> bool;

    fn adjustment(
        &self,
        category: &str,
        demo_factor: f64,
        signals: &LocationSignals,
    ) -> AdjustmentReason {
        if self.audience_fit(category, demo_factor, signals) {
            AdjustmentReason::AudienceFit
        } else if self.saturated(category, signals) {
            AdjustmentReason::Saturated
        } else {
            AdjustmentReason::None
        }
    }
}

/// Threshold-based policy read from the `tailoring` config section.
#[derive(Debug, Clone)]
pub struct ConfiguredTailoring {
    config: TailoringConfig,
}

impl ConfiguredTailoring {
    pub fn new(config: TailoringConfig) -> Self {
        Self { config }
    }
}

impl TailoringPolicy for ConfiguredTailoring {
    /// A fit needs observed visitors; an empty distribution says nothing
    /// about the audience.
    fn audience_fit(&self, category: &str, demo_factor: f64, signals: &LocationSignals) -> bool {
        signals.total_visitors() > 0.0
            && demo_factor >= self.config.audience_fit_threshold_for(category)
    }

    fn saturated(&self, category: &str, signals: &LocationSignals) -> bool {
        let total = signals.businesses.total_count;
        if total == 0 {
            return false;
        }
        let count = signals.businesses.count_for(category);
        if count < self.config.min_saturation_count() {
            return false;
        }
        count as f64 / total as f64 > self.config.saturation_share_for(category)
    }
}
