//! Serializable run configuration.
//!
//! Captures everything needed to reproduce a run: date range, starting cash,
//! fee schedule, participation policy, and universe roll behavior. Loaded
//! from TOML; every field outside the date range has an engine default, so a
//! minimal config file is two lines.

use chrono::NaiveDate;
use rollsim_core::domain::FeeSchedule;
use rollsim_core::oms::{OmsConfig, ParticipationPolicy};
use rollsim_core::universe::UniverseConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("start date {start} is after end date {end}")]
    InvertedDates { start: NaiveDate, end: NaiveDate },
}

fn default_starting_cash() -> f64 {
    10_000_000.0
}

/// Configuration for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run window (inclusive on both ends).
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,

    #[serde(default)]
    pub fees: FeeSchedule,

    #[serde(default)]
    pub participation: ParticipationPolicy,

    #[serde(default)]
    pub universe: UniverseConfig,
}

impl RunConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            starting_cash: default_starting_cash(),
            fees: FeeSchedule::default(),
            participation: ParticipationPolicy::default(),
            universe: UniverseConfig::default(),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::InvertedDates {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(self)
    }

    /// Execution parameters for the OMS.
    pub fn oms_config(&self) -> OmsConfig {
        OmsConfig {
            participation: self.participation,
            fees: self.fees,
        }
    }
}
