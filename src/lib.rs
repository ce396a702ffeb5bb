//! Feasibility scoring for candidate business locations.
//!
//! A signal bundle (foot traffic, business counts, visitor demographics,
//! real-estate prices) goes in; a 0-100 score with a factor breakdown comes
//! out. See [`scoring::FeasibilityEngine`].

pub mod config;
pub mod output;
pub mod rank;
pub mod scoring;
pub mod signals;
pub mod stderr_buffer;

pub use scoring::{FeasibilityEngine, FeasibilityResult, ScoreType, ScoringConfig};
pub use signals::{LocationSignals, ScoringMode};
