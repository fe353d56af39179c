pub mod composite;
pub mod config;
pub mod engine;
pub mod factors;
pub mod normalize;
pub mod validation;

pub use composite::{composite_score, round6};
pub use config::*;
pub use engine::{FactorContribution, RawScores, ScoreBreakdown, Scorer};
pub use factors::{compute_adjustments, Adjustments};
pub use normalize::{normalize, normalize_grouped};
pub use validation::{lint_scoring, validate_scoring};
