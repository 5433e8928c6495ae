//! Validator configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CheckError, CheckResult};

/// Placeholder the server renders for template variables it could not resolve
pub const DEFAULT_SENTINEL: &str = "XXX-unset-variable-XXX";

/// Directory receiving pages that failed to parse
pub const DEFAULT_ERROR_DIR: &str = "htmlerror";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Marker the server substitutes for unresolved template variables
    pub sentinel: String,

    /// Where unparseable pages are saved, one file per label
    pub error_dir: PathBuf,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            error_dir: PathBuf::from(DEFAULT_ERROR_DIR),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from a TOML file, or defaults if it does not exist
    pub fn load(path: &Path) -> CheckResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> CheckResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CheckError::Config(e.to_string()))?;
        if config.sentinel.is_empty() {
            return Err(CheckError::Config("sentinel must not be empty".to_string()));
        }
        Ok(config)
    }
}
