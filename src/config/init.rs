use anyhow::{Context, Result};
use std::path::PathBuf;

use super::schema::{Config, DEFAULT_INPUT_DIR};
use crate::io::write_atomic;
use crate::scoring::ScoringConfig;

const HEADER: &str = "\
# prospect-rank configuration
# Every field is optional; removed fields fall back to built-in defaults.
# A table that is present replaces the built-in table as a whole.
# Per-level tables accept any level spelling (MLB, AAA, AA, A+/high-a, A, Rookie)
# plus a `default` entry.
";

/// Starter configuration with every tunable spelled out.
pub fn default_config() -> Config {
    Config {
        input_dir: Some(DEFAULT_INPUT_DIR.to_string()),
        scoring: Some(ScoringConfig::default()),
    }
}

/// Write the starter configuration to `path` (default location when None).
///
/// Refuses to replace an existing file unless `force` is set. Returns the
/// path written.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => super::get_config_path()?,
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let yaml = serde_saphyr::to_string(&default_config())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    write_atomic(&config_path, format!("{}{}", HEADER, yaml).as_bytes())
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}
