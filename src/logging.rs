// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/logging.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file bootstraps log4rs from a YAML configuration, writing the bundled
// sample configuration on first start.
//
// Tree Location:
// - src/logging.rs (log4rs bootstrap)
// - Depends on: log4rs

use crate::error::{PoolError, Result};
use log4rs::config::{Config, Deserializers};
use std::fs;
use std::path::Path;

/// Placeholder in the sample configuration replaced by the log directory
const LOG_DIR_PLACEHOLDER: &str = "{{log_dir}}";

/// Bundled default configuration
pub const SAMPLE_CONFIG: &str = include_str!("../log4rs_sample.yml");

/// Parse a log4rs YAML file without installing it
pub fn load_config(path: &Path) -> Result<Config> {
    log4rs::config::load_config_file(path, Deserializers::default())
        .map_err(|e| PoolError::Logging(format!("{}: {}", path.display(), e)))
}

/// Install log4rs from `config_path`.
///
/// When the file does not exist it is created from `default_config` with
/// every `{{log_dir}}` replaced by `log_dir`.
pub fn initialize_logging(config_path: &Path, log_dir: &Path, default_config: &str) -> Result<()> {
    write_default_config(config_path, log_dir, default_config)?;
    let config = load_config(config_path)?;
    log4rs::init_config(config).map_err(|e| PoolError::Logging(e.to_string()))?;
    Ok(())
}

/// Write the default configuration if `config_path` is missing. Returns
/// whether a file was written.
pub fn write_default_config(config_path: &Path, log_dir: &Path, default_config: &str) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = default_config.replace(LOG_DIR_PLACEHOLDER, &log_dir.to_string_lossy());
    fs::write(config_path, contents)?;
    Ok(true)
}


// Changelog:
// - v1.0.0 (2025-07-02): log4rs bootstrap for the pool binary.
//   - Purpose: Creates the YAML config from the bundled sample on first run.
