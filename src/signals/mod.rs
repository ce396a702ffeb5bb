pub mod accessors;
pub mod insights;
pub mod load;
pub mod request;
pub mod types;

pub use accessors::SignalError;
pub use insights::{DaySet, PriceSummary, VisitorTotals};
pub use load::{read_bundle, read_bundles, SourcedBundle};
pub use request::{AnalysisRequest, Location, ScoringMode};
pub use types::*;
