//! YAML configuration for a window build.

use std::path::{Path, PathBuf};

use hz_core::TimeWindow;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Configuration for one `prep` invocation.
///
/// ```yaml
/// database: utopia.sqlite
/// window:
///   base_year: 2020
///   last_year: 2030
///   last_demand_year: 2025
/// output: bundle.json
/// log_filter: hz_network=debug,info
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrepConfig {
    pub database: PathBuf,
    /// Absent means a full-horizon build.
    #[serde(default)]
    pub window: Option<TimeWindow>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub log_filter: Option<String>,
}

pub fn parse_config(text: &str) -> AppResult<PrepConfig> {
    serde_yaml::from_str(text).map_err(|e| AppError::ConfigParse(e.to_string()))
}

/// Load a config file. Relative paths inside it resolve against the file's directory.
pub fn load_config(path: &Path) -> AppResult<PrepConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut config = parse_config(&content)?;

    if let Some(dir) = path.parent() {
        config.database = dir.join(&config.database);
        config.output = config.output.map(|out| dir.join(out));
    }
    Ok(config)
}
