use serde::{Deserialize, Serialize};

/// Radius used when the caller does not pick one, in meters.
pub const DEFAULT_RADIUS_M: u32 = 1000;

/// Whether a score is computed for any business or a specific category.
///
/// Build it with [`ScoringMode::from_category`], which trims the category. The
/// engine also scores a hand-built `Tailored` with a blank category as
/// `General`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringMode {
    General,
    Tailored(String),
}

impl ScoringMode {
    /// Tailored only when the category has non-whitespace content.
    pub fn from_category(category: Option<&str>) -> Self {
        match category.map(str::trim) {
            Some(c) if !c.is_empty() => ScoringMode::Tailored(c.to_string()),
            _ => ScoringMode::General,
        }
    }

    /// The trimmed category, or None when the mode is effectively general.
    pub fn category(&self) -> Option<&str> {
        match self {
            ScoringMode::General => None,
            ScoringMode::Tailored(c) => Some(c.trim()).filter(|c| !c.is_empty()),
        }
    }
}

/// A point picked on the map, as handed over by the geocoding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

/// Everything the user selected before asking for an analysis.
///
/// The transport layer turns this into a request for signals; the engine only
/// looks at the category, through [`AnalysisRequest::scoring_mode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub location: Location,
    #[serde(default = "default_radius")]
    pub radius_m: u32,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS_M
}

impl AnalysisRequest {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            radius_m: DEFAULT_RADIUS_M,
            category: None,
        }
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn scoring_mode(&self) -> ScoringMode {
        ScoringMode::from_category(self.category.as_deref())
    }

    /// Body for the analysis endpoint: `{lat, lng, radius[, category]}`.
    pub fn to_query_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "lat": self.location.latitude,
            "lng": self.location.longitude,
            "radius": self.radius_m,
        });
        if let (ScoringMode::Tailored(category), Some(obj)) =
            (self.scoring_mode(), body.as_object_mut())
        {
            obj.insert("category".to_string(), serde_json::Value::String(category));
        }
        body
    }
}
