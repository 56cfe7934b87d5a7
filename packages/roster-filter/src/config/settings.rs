//! Engine settings and their YAML file format
//!
//! ```yaml
//! version: 1
//! filter:
//!   enumeration_threshold: 20
//!   materialize_batch_size: 500
//!   grade_offset: 7
//!   current_year: 2024   # optional, defaults to the local calendar year
//! ```

use std::path::Path;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Supported settings file versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Candidate-set size below which lookups are scoped to the candidates
pub const DEFAULT_ENUMERATION_THRESHOLD: usize = 20;

/// Maximum uids bound into one materialization lookup
pub const DEFAULT_MATERIALIZE_BATCH_SIZE: usize = 500;

/// Grade `g` in year `Y` corresponds to enrollment year `Y - g + offset`
pub const DEFAULT_GRADE_OFFSET: i32 = 7;

/// Upper limit on uids bound into one lookup; SQLite caps bound parameters at 32766
pub const MAX_BOUND_UIDS: usize = 30_000;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSettings {
    pub enumeration_threshold: usize,
    pub materialize_batch_size: usize,
    pub grade_offset: i32,
    /// Calendar year used for grade translation; `None` = today
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_year: Option<i32>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enumeration_threshold: DEFAULT_ENUMERATION_THRESHOLD,
            materialize_batch_size: DEFAULT_MATERIALIZE_BATCH_SIZE,
            grade_offset: DEFAULT_GRADE_OFFSET,
            current_year: None,
        }
    }
}

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFileV1 {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    filter: FilterSettings,
}

impl FilterSettings {
    /// Pin the calendar year (tests, replays)
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn with_enumeration_threshold(mut self, threshold: usize) -> Self {
        self.enumeration_threshold = threshold;
        self
    }

    pub fn with_materialize_batch_size(mut self, size: usize) -> Self {
        self.materialize_batch_size = size;
        self
    }

    /// The configured year, or the local calendar year
    pub fn resolve_current_year(&self) -> i32 {
        self.current_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=MAX_BOUND_UIDS).contains(&self.enumeration_threshold) {
            return Err(ConfigError::range(
                "enumeration_threshold",
                self.enumeration_threshold,
                1,
                MAX_BOUND_UIDS,
            ));
        }
        if !(1..=MAX_BOUND_UIDS).contains(&self.materialize_batch_size) {
            return Err(ConfigError::range(
                "materialize_batch_size",
                self.materialize_batch_size,
                1,
                MAX_BOUND_UIDS,
            ));
        }
        if !(0..=30).contains(&self.grade_offset) {
            return Err(ConfigError::range("grade_offset", self.grade_offset, 0, 30));
        }
        if let Some(year) = self.current_year {
            if !(1900..=9999).contains(&year) {
                return Err(ConfigError::range("current_year", year, 1900, 9999));
            }
        }
        Ok(())
    }

    /// Load and validate settings from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: SettingsFileV1 = serde_yaml::from_str(content)?;
        match file.version {
            None => return Err(ConfigError::MissingVersion),
            Some(v) if !SUPPORTED_VERSIONS.contains(&v) => {
                return Err(ConfigError::UnsupportedVersion {
                    found: v,
                    supported: SUPPORTED_VERSIONS.to_vec(),
                })
            }
            Some(_) => {}
        }
        file.filter.validate()?;
        Ok(file.filter)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = SettingsFileV1 {
            version: Some(1),
            filter: self.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
