//! Payroll Engine for HR management systems
//!
//! This crate provides the payroll arithmetic behind an HR application:
//! leave duration in half-day steps, net salary under the fixed (26 day)
//! and calendar-month divisors, merging of per-type allowance records into
//! one row per employee and month, and cost-to-company aggregation over
//! approved allowances. Every calculator returns an audit step describing
//! how its figure was reached.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
