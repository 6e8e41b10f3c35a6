//! Request types for the Payroll Engine API.
//!
//! Field names follow the HR frontend (`camelCase`). Salary records are
//! accepted as-is; the other endpoints take the small wrappers below.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AllowanceEntry, AllowanceRecord};

/// Request body for `POST /leave/duration`.
///
/// Times are UI strings (`"HH:MM"`); absent or blank times use the
/// configured defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDurationRequest {
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Time leave starts on the first day.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Time leave ends on the last day.
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Request body for `POST /allowances/merge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceMergeRequest {
    /// The flat list of allowance records to fold together.
    pub records: Vec<AllowanceRecord>,
}

/// Request body for `POST /ctc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtcRequest {
    /// The employee's gross salary for the period.
    pub gross_salary: Decimal,
    /// Variable, month-specific allowances.
    #[serde(default)]
    pub dynamic_allowances: Vec<AllowanceEntry>,
    /// Fixed, periodic allowances.
    #[serde(default)]
    pub fixed_allowances: Vec<AllowanceEntry>,
}
