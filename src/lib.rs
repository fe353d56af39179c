//! Cross-level batter ranking.
//!
//! Raw batting lines from several levels are adjusted for age, sample size
//! and competition, rescaled onto a common 0-100 scale, blended into one
//! composite score and deduplicated per player.
//!
//! ```no_run
//! use prospect_rank::{io, pipeline, scoring::ScoringConfig};
//!
//! let records = io::read_dir("processed_data".as_ref())?;
//! let ranked = pipeline::rank(records, &ScoringConfig::default())?;
//! for (i, player) in ranked.iter().take(10).enumerate() {
//!     println!("{}. {} {:.1}", i + 1, player.name(), player.composite);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod level;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod scoring;

pub use error::ScoreError;
pub use pipeline::{rank, Pipeline, ScoredRecord};
