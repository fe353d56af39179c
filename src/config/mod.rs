mod init;
mod schema;

pub use init::write_default_config;
pub use schema::{Config, DEFAULT_INPUT_DIR};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the config directory path (~/.config/prospect-rank/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("prospect-rank"))
}

/// Get the default config file path (~/.config/prospect-rank/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Parse a config file.
pub fn read_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?;

    Ok(config)
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/prospect-rank/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicit config path does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
///
/// A missing file at the default path is not an error: built-in defaults
/// are used instead.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            read_config_file(&path)
        }
        None => {
            let default_path = match get_config_path() {
                Ok(p) => p,
                Err(e) => {
                    debug!("No default config location: {}", e);
                    return Ok(Config::default());
                }
            };
            if !default_path.exists() {
                debug!(path = %default_path.display(), "No config file, using defaults");
                return Ok(Config::default());
            }
            read_config_file(&default_path)
        }
    }
}
