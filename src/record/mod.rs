pub mod rates;
pub mod types;

pub use rates::{derive_rates, RateStats};
pub use types::{BattingLine, Handedness, Position, Record};
