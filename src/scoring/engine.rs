use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::config::ScoringConfig;
use super::factors::{
    DemographicFactor, DensityFactor, FactorExtractor, RealEstateFactor, TrafficFactor,
    NEUTRAL_FACTOR,
};
use super::tailoring::{AdjustmentReason, ConfiguredTailoring, TailoringPolicy};
use crate::signals::{LocationSignals, ScoringMode};

/// Score returned when the bundle could not be read as signals at all.
pub const NEUTRAL_SCORE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreType {
    General,
    Tailored,
}

/// One row of the breakdown. `value` is rounded for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorScore {
    pub name: String,
    pub weight: u8,
    pub value: u8,
}

/// How the final score was reached; not part of the serialized result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDetail {
    /// Weighted mean of the factors, unrounded
    pub base_score: f64,
    pub adjustment: AdjustmentReason,
}

/// Feasibility of one location.
///
/// The breakdown values are rounded independently of the score, so
/// recomputing the weighted sum from them can be off by a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityResult {
    pub score: u8,
    pub score_type: ScoreType,
    pub breakdown: Vec<FactorScore>,
    #[serde(skip)]
    pub detail: ScoreDetail,
}

struct WeightedFactor {
    weight: u8,
    extractor: Box<dyn FactorExtractor>,
}

/// Immutable scoring pipeline built from a [`ScoringConfig`].
///
/// Factors are evaluated in registration order, which is also the breakdown
/// order. The demographics factor is registered with weight 0: it shows in the
/// breakdown but only influences the score through tailoring.
pub struct FeasibilityEngine {
    factors: Vec<WeightedFactor>,
    demographics: DemographicFactor,
    tailoring: Box<dyn TailoringPolicy>,
}

impl fmt::Debug for FeasibilityEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let factors: Vec<(&str, u8)> = self
            .factors
            .iter()
            .map(|f| (f.extractor.name(), f.weight))
            .collect();
        f.debug_struct("FeasibilityEngine")
            .field("factors", &factors)
            .finish_non_exhaustive()
    }
}

impl FeasibilityEngine {
    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        let weights = config.weights.unwrap_or_default();
        let density = DensityFactor::from_config(&config.density.clone().unwrap_or_default())?;
        let real_estate = RealEstateFactor::new(config.real_estate.clone().unwrap_or_default());
        let tailoring = ConfiguredTailoring::new(config.tailoring.clone().unwrap_or_default());

        Ok(Self {
            factors: vec![
                WeightedFactor {
                    weight: weights.foot_traffic,
                    extractor: Box::new(TrafficFactor),
                },
                WeightedFactor {
                    weight: weights.density,
                    extractor: Box::new(density),
                },
                WeightedFactor {
                    weight: 0,
                    extractor: Box::new(DemographicFactor),
                },
                WeightedFactor {
                    weight: weights.real_estate,
                    extractor: Box::new(real_estate),
                },
            ],
            demographics: DemographicFactor,
            tailoring: Box::new(tailoring),
        })
    }

    /// Append another factor to the base score and the breakdown.
    pub fn with_factor(mut self, extractor: Box<dyn FactorExtractor>, weight: u8) -> Self {
        self.factors.push(WeightedFactor { weight, extractor });
        self
    }

    /// Replace the tailoring predicates.
    pub fn with_tailoring(mut self, tailoring: Box<dyn TailoringPolicy>) -> Self {
        self.tailoring = tailoring;
        self
    }

    /// Score extracted signals in the given mode.
    pub fn score(&self, signals: &LocationSignals, mode: &ScoringMode) -> FeasibilityResult {
        let values: Vec<(&WeightedFactor, f64)> = self
            .factors
            .iter()
            .map(|f| (f, f.extractor.extract(signals).clamp(0.0, 100.0)))
            .collect();

        let base_score = compose(values.iter().map(|(f, value)| (f.weight, *value)));

        let (score_type, adjustment) = match mode.category() {
            None => (ScoreType::General, AdjustmentReason::None),
            Some(category) => {
                let demo_factor = self.demographics.extract(signals);
                (
                    ScoreType::Tailored,
                    self.tailoring.adjustment(category, demo_factor, signals),
                )
            }
        };

        let breakdown = values
            .iter()
            .map(|(f, value)| factor_score(f, *value))
            .collect();

        FeasibilityResult {
            score: to_score(base_score + adjustment.points()),
            score_type,
            breakdown,
            detail: ScoreDetail {
                base_score,
                adjustment,
            },
        }
    }

    /// Score a raw JSON bundle.
    ///
    /// `category` overrides the bundle's own `requestedCategory`. A bundle that
    /// is not a JSON object yields [`FeasibilityEngine::neutral_result`].
    pub fn score_value(&self, value: &Value, category: Option<&str>) -> FeasibilityResult {
        match LocationSignals::from_value(value) {
            Ok(signals) => {
                let mode = ScoringMode::from_category(
                    category.or(signals.requested_category.as_deref()),
                );
                self.score(&signals, &mode)
            }
            Err(_) => self.neutral_result(),
        }
    }

    /// General-mode result with a score of 50 and every factor at the value
    /// it takes with no signals.
    pub fn neutral_result(&self) -> FeasibilityResult {
        let empty = LocationSignals::default();
        let breakdown = self
            .factors
            .iter()
            .map(|f| factor_score(f, f.extractor.extract(&empty)))
            .collect();

        FeasibilityResult {
            score: NEUTRAL_SCORE,
            score_type: ScoreType::General,
            breakdown,
            detail: ScoreDetail {
                base_score: f64::from(NEUTRAL_SCORE),
                adjustment: AdjustmentReason::None,
            },
        }
    }
}

/// Weighted arithmetic mean of `(weight, value)` pairs; neutral when no
/// factor carries weight.
pub fn compose(factors: impl IntoIterator<Item = (u8, f64)>) -> f64 {
    let (weighted, total) = factors
        .into_iter()
        .fold((0.0, 0u32), |(sum, total), (weight, value)| {
            (sum + f64::from(weight) * value, total + u32::from(weight))
        });
    if total == 0 {
        NEUTRAL_FACTOR
    } else {
        weighted / f64::from(total)
    }
}

fn to_score(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0).round() as u8
}

fn factor_score(factor: &WeightedFactor, value: f64) -> FactorScore {
    FactorScore {
        name: factor.extractor.name().to_string(),
        weight: factor.weight,
        value: to_score(value),
    }
}

/// Build an engine from `config` and score `signals` once.
pub fn calculate_feasibility(
    signals: &LocationSignals,
    mode: &ScoringMode,
    config: &ScoringConfig,
) -> Result<FeasibilityResult> {
    let engine = FeasibilityEngine::from_config(config)?;
    Ok(engine.score(signals, mode))
}
