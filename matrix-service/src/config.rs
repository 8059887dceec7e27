// Matrix Defaults Configuration
// Bounds applied during matrix validation, loaded from a flat key/value document

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Config key holding the maximum number of matrix combinations
pub const MAX_MATRIX_COMBINATIONS_COUNT_KEY: &str = "default-max-matrix-combinations-count";

/// Maximum number of combinations a single matrix may produce by default
pub const DEFAULT_MAX_MATRIX_COMBINATIONS_COUNT: usize = 256;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

/// Validation defaults, passed explicitly to every bound check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    /// Upper bound (inclusive) on combinations per matrix
    pub max_matrix_combinations_count: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            max_matrix_combinations_count: DEFAULT_MAX_MATRIX_COMBINATIONS_COUNT,
        }
    }
}

impl Defaults {
    /// Create defaults with a custom combinations bound
    pub fn with_max_matrix_combinations_count(max: usize) -> Self {
        Self {
            max_matrix_combinations_count: max,
        }
    }

    /// Build defaults from string key/value pairs. Missing keys keep the default.
    pub fn from_map(data: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut defaults = Self::default();

        if let Some(raw) = data.get(MAX_MATRIX_COMBINATIONS_COUNT_KEY) {
            let max: usize = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: MAX_MATRIX_COMBINATIONS_COUNT_KEY.to_string(),
                value: raw.clone(),
            })?;
            defaults.set_max_matrix_combinations_count(max)?;
        }

        Ok(defaults)
    }

    /// Override the combinations bound. The bound must be at least 1.
    pub fn set_max_matrix_combinations_count(&mut self, max: usize) -> Result<(), ConfigError> {
        if max == 0 {
            return Err(ConfigError::InvalidValue {
                key: MAX_MATRIX_COMBINATIONS_COUNT_KEY.to_string(),
                value: max.to_string(),
            });
        }
        self.max_matrix_combinations_count = max;
        Ok(())
    }

    /// Parse defaults from a flat YAML mapping
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(content)?;
        let data = raw
            .into_iter()
            .filter_map(|(key, value)| scalar_to_string(&value).map(|v| (key, v)))
            .collect();

        Self::from_map(&data)
    }

    /// Load defaults from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
