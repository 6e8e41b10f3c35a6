//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::{Deserialize, Serialize};

use crate::calculation::{FIXED_WORKING_DAY_DIVISOR, LeaveTimeDefaults};

fn default_fixed_divisor() -> u32 {
    FIXED_WORKING_DAY_DIVISOR
}

/// Leave section of payroll.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveSettings {
    /// Start time assumed when a request omits one (`HH:MM`).
    pub default_start_time: String,
    /// End time assumed when a request omits one (`HH:MM`).
    pub default_end_time: String,
}

/// Payroll settings from payroll.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollSettings {
    /// Organisation name shown in logs.
    pub organisation: String,
    /// Divisor for the fixed-divisor net salary formula.
    #[serde(default = "default_fixed_divisor")]
    pub fixed_divisor: u32,
    /// Leave settings.
    pub leave: LeaveSettings,
}

/// Whether an allowance varies month to month or is paid periodically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceKind {
    /// Month-specific amount (site allowance, employer EPF share).
    Dynamic,
    /// Periodic amount (bonus, LTC, loyalty bonus).
    Fixed,
}

/// One entry of the allowance catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowanceType {
    /// The code stored on allowance records (e.g. "epfByCo").
    pub code: String,
    /// Human-readable name.
    pub name: String,
}

/// Allowance catalog from allowances.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowanceCatalog {
    /// Variable, month-specific allowance types.
    #[serde(default)]
    pub dynamic: Vec<AllowanceType>,
    /// Fixed, periodic allowance types.
    #[serde(default)]
    pub fixed: Vec<AllowanceType>,
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    settings: PayrollSettings,
    leave_defaults: LeaveTimeDefaults,
    allowances: AllowanceCatalog,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(
        settings: PayrollSettings,
        leave_defaults: LeaveTimeDefaults,
        allowances: AllowanceCatalog,
    ) -> Self {
        Self {
            settings,
            leave_defaults,
            allowances,
        }
    }

    /// Returns the payroll settings.
    pub fn settings(&self) -> &PayrollSettings {
        &self.settings
    }

    /// Returns the parsed default leave times.
    pub fn leave_defaults(&self) -> &LeaveTimeDefaults {
        &self.leave_defaults
    }

    /// Returns the allowance catalog.
    pub fn allowances(&self) -> &AllowanceCatalog {
        &self.allowances
    }
}
