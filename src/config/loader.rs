//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::calculation::{LeaveTimeDefaults, parse_clock_time};
use crate::error::{EngineError, EngineResult};

use super::types::{AllowanceCatalog, AllowanceKind, PayrollConfig, PayrollSettings};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/payroll/
/// ├── payroll.yaml     # Divisor and leave defaults
/// └── allowances.yaml  # Dynamic and fixed allowance types
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll").unwrap();
/// println!("Fixed divisor: {}", loader.fixed_divisor());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A default leave time is not a valid `HH:MM` time
    /// - The fixed divisor is zero
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/payroll")?;
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings_path = path.join("payroll.yaml");
        let settings = Self::load_yaml::<PayrollSettings>(&settings_path)?;

        let allowances_path = path.join("allowances.yaml");
        let allowances = Self::load_yaml::<AllowanceCatalog>(&allowances_path)?;

        let settings_path_str = settings_path.display().to_string();
        if settings.fixed_divisor == 0 {
            return Err(EngineError::ConfigParseError {
                path: settings_path_str,
                message: "fixed_divisor must be greater than zero".to_string(),
            });
        }

        let leave_defaults = LeaveTimeDefaults {
            start_time: Self::parse_time(
                &settings_path_str,
                "leave.default_start_time",
                &settings.leave.default_start_time,
            )?,
            end_time: Self::parse_time(
                &settings_path_str,
                "leave.default_end_time",
                &settings.leave.default_end_time,
            )?,
        };

        debug!(
            organisation = %settings.organisation,
            fixed_divisor = settings.fixed_divisor,
            dynamic_allowances = allowances.dynamic.len(),
            fixed_allowances = allowances.fixed.len(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            config: PayrollConfig::new(settings, leave_defaults, allowances),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn parse_time(path: &str, key: &str, value: &str) -> EngineResult<chrono::NaiveTime> {
        match parse_clock_time(value) {
            Ok(Some(time)) => Ok(time),
            _ => Err(EngineError::ConfigParseError {
                path: path.to_string(),
                message: format!("{} must be a HH:MM time, got '{}'", key, value),
            }),
        }
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the divisor for the fixed-divisor net salary formula.
    pub fn fixed_divisor(&self) -> u32 {
        self.config.settings().fixed_divisor
    }

    /// Returns the times assumed when a leave request omits them.
    pub fn leave_defaults(&self) -> &LeaveTimeDefaults {
        self.config.leave_defaults()
    }

    /// Classifies an allowance type code, or `None` if it is not in the catalog.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::{AllowanceKind, ConfigLoader};
    ///
    /// let loader = ConfigLoader::load("./config/payroll")?;
    /// assert_eq!(loader.allowance_kind("bonus"), Some(AllowanceKind::Fixed));
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn allowance_kind(&self, code: &str) -> Option<AllowanceKind> {
        let catalog = self.config.allowances();
        if catalog.dynamic.iter().any(|a| a.code == code) {
            Some(AllowanceKind::Dynamic)
        } else if catalog.fixed.iter().any(|a| a.code == code) {
            Some(AllowanceKind::Fixed)
        } else {
            None
        }
    }

    /// Returns the display name of an allowance type code.
    pub fn allowance_name(&self, code: &str) -> Option<&str> {
        let catalog = self.config.allowances();
        catalog
            .dynamic
            .iter()
            .chain(&catalog.fixed)
            .find(|a| a.code == code)
            .map(|a| a.name.as_str())
    }
}
