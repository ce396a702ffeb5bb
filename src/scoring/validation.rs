use super::config::{RealEstatePolicy, ScoringConfig, TailoringConfig};
use super::factors::{DensityFactor, RangeOp};

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Weights must form a percentage split
    if let Some(weights) = config.weights {
        if weights.total() != 100 {
            errors.push(format!(
                "scoring.weights: must sum to 100, got {} ({} + {} + {})",
                weights.total(),
                weights.foot_traffic,
                weights.real_estate,
                weights.density
            ));
        }
    }

    // Validate density buckets
    if let Some(ref density) = config.density {
        if density.buckets.is_empty() {
            errors.push("scoring.density.buckets: at least one bucket is required".to_string());
        }
        for (i, bucket) in density.buckets.iter().enumerate() {
            if let Err(e) = RangeOp::parse(&bucket.range) {
                errors.push(format!(
                    "scoring.density.buckets[{}].range: invalid '{}' - {}",
                    i, bucket.range, e
                ));
            }
            if !in_percent_range(bucket.value) {
                errors.push(format!(
                    "scoring.density.buckets[{}].value: must be between 0 and 100, got {}",
                    i, bucket.value
                ));
            }
        }

        // More businesses must never score higher
        if let Ok(factor) = DensityFactor::from_config(density) {
            if let Some((lower, higher)) = factor.first_increase() {
                errors.push(format!(
                    "scoring.density.buckets: value rises from {} at {} businesses to {} at {}; values must not increase with the count",
                    factor.value_for(lower),
                    lower,
                    factor.value_for(higher),
                    higher
                ));
            }
        }
    }

    // Validate real-estate policy
    match config.real_estate {
        Some(RealEstatePolicy::Average { recent_periods }) if recent_periods == 0 => {
            errors.push("scoring.real_estate.recent_periods: must be at least 1".to_string());
        }
        Some(RealEstatePolicy::PriceBand {
            low,
            high,
            recent_periods,
        }) => {
            if !low.is_finite() || !high.is_finite() || low < 0.0 {
                errors.push("scoring.real_estate: low and high must be non-negative numbers".to_string());
            } else if low >= high {
                errors.push(format!(
                    "scoring.real_estate: low ({}) must be below high ({})",
                    low, high
                ));
            }
            if recent_periods == 0 {
                errors.push("scoring.real_estate.recent_periods: must be at least 1".to_string());
            }
        }
        _ => {}
    }

    if let Some(ref tailoring) = config.tailoring {
        validate_tailoring(tailoring, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_tailoring(tailoring: &TailoringConfig, errors: &mut Vec<String>) {
    if let Some(threshold) = tailoring.audience_fit_threshold {
        if !in_percent_range(threshold) {
            errors.push(format!(
                "scoring.tailoring.audience_fit_threshold: must be between 0 and 100, got {}",
                threshold
            ));
        }
    }
    if let Some(share) = tailoring.saturation_share {
        if !in_share_range(share) {
            errors.push(format!(
                "scoring.tailoring.saturation_share: must be between 0 and 1, got {}",
                share
            ));
        }
    }

    for (i, category) in tailoring.categories.iter().flatten().enumerate() {
        if category.name.trim().is_empty() {
            errors.push(format!("scoring.tailoring.categories[{}].name: must not be empty", i));
        }
        if let Some(threshold) = category.audience_fit_threshold {
            if !in_percent_range(threshold) {
                errors.push(format!(
                    "scoring.tailoring.categories[{}].audience_fit_threshold: must be between 0 and 100, got {}",
                    i, threshold
                ));
            }
        }
        if let Some(share) = category.saturation_share {
            if !in_share_range(share) {
                errors.push(format!(
                    "scoring.tailoring.categories[{}].saturation_share: must be between 0 and 1, got {}",
                    i, share
                ));
            }
        }
    }
}

fn in_percent_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

fn in_share_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}
