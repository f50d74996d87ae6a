//! Generator configuration, loadable from a TOML file.
//!
//! ```toml
//! conflict_policy = "check-store"
//! timezone = "Europe/Warsaw"
//! excluded_dates = ["2023-11-01", "2023-11-10"]
//! ```

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Whether generation consults the store for bookings made by earlier runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Write every planned occurrence without looking at the store. Re-running
    /// over an overlapping range creates duplicate bookings.
    #[default]
    BlindInsert,
    /// Reject the run if any planned occurrence shares a teacher, room or group
    /// with an existing occurrence on the same date and time slot.
    CheckStore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub conflict_policy: ConflictPolicy,
    /// IANA timezone the time slots are expressed in.
    pub timezone: String,
    /// Dates on which no class is generated (holidays, exam days).
    pub excluded_dates: Vec<NaiveDate>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            timezone: "UTC".to_string(),
            excluded_dates: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(content)
            .map_err(|e| ScheduleError::Config(format!("Failed to parse config: {}", e)))?;
        config.timezone()?;
        Ok(config)
    }

    /// Load a configuration file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ScheduleError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// The configured timezone.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTimezone` if the name is not a valid IANA identifier.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| ScheduleError::InvalidTimezone(self.timezone.clone()))
    }
}
