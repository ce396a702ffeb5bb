use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::scoring::{FeasibilityEngine, FeasibilityResult};
use crate::signals::{LocationSignals, ScoringMode, SourcedBundle};

/// One scored bundle, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct RankedSite {
    pub source: String,
    #[serde(flatten)]
    pub result: FeasibilityResult,
    /// The bundle was not a JSON object and got the neutral score
    #[serde(skip)]
    pub malformed: bool,
}

/// Score every bundle, drop repeated sources and sort by score descending.
///
/// Equal scores keep their input order. The category comes from `category`
/// if given, else the bundle's own `requestedCategory`, else
/// `default_category`.
pub fn rank_bundles(
    engine: &FeasibilityEngine,
    bundles: &[SourcedBundle],
    category: Option<&str>,
    default_category: Option<&str>,
) -> Vec<RankedSite> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<RankedSite> = bundles
        .iter()
        .filter(|bundle| seen.insert(bundle.source.as_str()))
        .map(|bundle| {
            let requested = resolve_category(&bundle.value, category, default_category);
            RankedSite {
                source: bundle.source.clone(),
                result: engine.score_value(&bundle.value, requested),
                malformed: !bundle.value.is_object(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.result.score.cmp(&a.result.score));
    ranked
}

/// One bundle's signals and score, for the detailed single-bundle view.
#[derive(Debug, Clone)]
pub struct InspectedSite {
    pub source: String,
    /// Empty when the bundle is malformed
    pub signals: LocationSignals,
    pub result: FeasibilityResult,
    pub malformed: bool,
}

/// Extract and score a single bundle, using the same category precedence as
/// [`rank_bundles`]. A bundle that is not a JSON object gets empty signals and
/// the neutral result.
pub fn inspect_bundle(
    engine: &FeasibilityEngine,
    bundle: &SourcedBundle,
    category: Option<&str>,
    default_category: Option<&str>,
) -> InspectedSite {
    match LocationSignals::from_value(&bundle.value) {
        Ok(signals) => {
            let requested = resolve_category(&bundle.value, category, default_category);
            let result = engine.score(&signals, &ScoringMode::from_category(requested));
            InspectedSite {
                source: bundle.source.clone(),
                signals,
                result,
                malformed: false,
            }
        }
        Err(_) => InspectedSite {
            source: bundle.source.clone(),
            signals: LocationSignals::default(),
            result: engine.neutral_result(),
            malformed: true,
        },
    }
}

fn resolve_category<'a>(
    value: &'a Value,
    category: Option<&'a str>,
    default_category: Option<&'a str>,
) -> Option<&'a str> {
    category
        .or_else(|| value.get("requestedCategory").and_then(Value::as_str))
        .or(default_category)
}
