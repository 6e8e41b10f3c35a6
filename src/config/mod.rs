//! Configuration loading and management for the Payroll Engine.
//!
//! This module provides functionality to load payroll configuration from YAML
//! files: the fixed salary divisor, default leave times, and the catalog of
//! allowance types.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll").unwrap();
//! println!("Organisation: {}", config.config().settings().organisation);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllowanceCatalog, AllowanceKind, AllowanceType, LeaveSettings, PayrollConfig, PayrollSettings,
};
