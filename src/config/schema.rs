use serde::{Deserialize, Serialize};

use crate::scoring::ScoringConfig;

/// Default directory scanned for per-team CSV files.
pub const DEFAULT_INPUT_DIR: &str = "processed_data";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of per-team CSV files (default: processed_data)
    #[serde(default)]
    pub input_dir: Option<String>,

    /// Scoring model; built-in defaults when absent
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}

impl Config {
    /// Scoring configuration for a run: the file's section with absent
    /// fields taken from the defaults.
    pub fn effective_scoring(&self) -> ScoringConfig {
        match &self.scoring {
            Some(scoring) => scoring.clone().or_else(ScoringConfig::default()),
            None => ScoringConfig::default(),
        }
    }

    pub fn input_dir(&self) -> &str {
        self.input_dir.as_deref().unwrap_or(DEFAULT_INPUT_DIR)
    }
}
