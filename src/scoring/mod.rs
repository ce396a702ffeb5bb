pub mod config;
pub mod engine;
pub mod factors;
pub mod tailoring;
pub mod validation;

pub use config::*;
pub use engine::{
    calculate_feasibility, FactorScore, FeasibilityEngine, FeasibilityResult, ScoreDetail,
    ScoreType,
};
pub use factors::{FactorExtractor, RangeOp};
pub use tailoring::{AdjustmentReason, TailoringPolicy};
pub use validation::validate_scoring;
