use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How negative time steps (points out of chronological order) count
/// towards the elapsed time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampPolicy {
    /// Add every step as recorded, negative ones included.
    #[default]
    SumSigned,
    /// Drop negative steps, keep the rest.
    IgnoreNegative,
    /// Fail the segment on the first negative step.
    Reject,
}

/// Altigraph grid dimensions and glyphs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileConfig {
    pub rows: usize,
    pub cols: usize,
    /// Columns between two distance labels on the x axis.
    pub label_spacing: usize,
    pub fill_char: char,
    pub blank_char: char,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            rows: 30,
            cols: 100,
            label_spacing: 10,
            fill_char: '#',
            blank_char: ' ',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub profile: ProfileConfig,
    pub timestamps: TimestampPolicy,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Deserialize only; call `validate` once every override is applied.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Command-line values win over whatever the file set.
    pub fn apply_overrides(
        &mut self,
        rows: Option<usize>,
        cols: Option<usize>,
        label_spacing: Option<usize>,
        timestamps: Option<TimestampPolicy>,
    ) {
        if let Some(rows) = rows {
            self.profile.rows = rows;
        }
        if let Some(cols) = cols {
            self.profile.cols = cols;
        }
        if let Some(spacing) = label_spacing {
            self.profile.label_spacing = spacing;
        }
        if let Some(policy) = timestamps {
            self.timestamps = policy;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.rows == 0 {
            return Err(ConfigError::ZeroDimension { field: "rows" });
        }
        if self.profile.cols == 0 {
            return Err(ConfigError::ZeroDimension { field: "cols" });
        }
        if self.profile.label_spacing == 0 {
            return Err(ConfigError::ZeroDimension { field: "label_spacing" });
        }
        Ok(())
    }
}
