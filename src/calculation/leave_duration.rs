//! Leave duration calculation functionality.
//!
//! This module turns a leave request's start/end date and time into a day
//! count in half-day steps.

use chrono::{Duration, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

use super::rounding::round_to_half_day;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// Milliseconds in one day, the unit leave is measured in.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// The times assumed when a leave request omits its start or end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeaveTimeDefaults {
    /// Assumed start time on the first day.
    pub start_time: NaiveTime,
    /// Assumed end time on the last day.
    pub end_time: NaiveTime,
}

impl Default for LeaveTimeDefaults {
    /// Midnight to 23:59.
    fn default() -> Self {
        Self {
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN + Duration::minutes(23 * 60 + 59),
        }
    }
}

/// The result of calculating a leave duration, including the audit step.
#[derive(Debug, Clone)]
pub struct LeaveDurationResult {
    /// Elapsed time in days before rounding.
    pub raw_days: Decimal,
    /// Leave length in half-day steps.
    pub days: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Parses a UI clock time such as `"09:00"` or `"09:00:30"`.
///
/// Blank input means "not given" and yields `None`, so the caller's default
/// applies.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::parse_clock_time;
/// use chrono::NaiveTime;
///
/// assert_eq!(
///     parse_clock_time("09:30").unwrap(),
///     NaiveTime::from_hms_opt(9, 30, 0)
/// );
/// assert_eq!(parse_clock_time("  ").unwrap(), None);
/// assert!(parse_clock_time("9.30am").is_err());
/// ```
pub fn parse_clock_time(value: &str) -> EngineResult<Option<NaiveTime>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map(Some)
        .map_err(|_| EngineError::InvalidTime {
            value: value.to_string(),
        })
}

/// Calculates the length of a leave request in days.
///
/// The start is `start_date` at `start_time` (default midnight) and the end
/// is `end_date` at `end_time` (default 23:59). The elapsed milliseconds are
/// divided by [`MILLIS_PER_DAY`] and snapped with
/// [`round_to_half_day`](super::round_to_half_day), so a full calendar day
/// counts as one day and half a day counts as `0.5`.
///
/// # Arguments
///
/// * `start_date` / `start_time` - When leave begins
/// * `end_date` / `end_time` - When leave ends
/// * `defaults` - Times used when `start_time` or `end_time` is `None`
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// `NegativeLeaveDuration` if the end is before the start.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{calculate_leave_duration, LeaveTimeDefaults};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let day1 = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// let day2 = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
///
/// let result = calculate_leave_duration(
///     day1, None, day2, None, &LeaveTimeDefaults::default(), 1,
/// ).unwrap();
/// assert_eq!(result.days, Decimal::new(2, 0));
/// ```
pub fn calculate_leave_duration(
    start_date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_date: NaiveDate,
    end_time: Option<NaiveTime>,
    defaults: &LeaveTimeDefaults,
    step_number: u32,
) -> EngineResult<LeaveDurationResult> {
    let start = start_date.and_time(start_time.unwrap_or(defaults.start_time));
    let end = end_date.and_time(end_time.unwrap_or(defaults.end_time));

    let elapsed_ms = (end - start).num_milliseconds();
    let raw_days = Decimal::from(elapsed_ms) / Decimal::from(MILLIS_PER_DAY);

    if raw_days < Decimal::ZERO {
        return Err(EngineError::NegativeLeaveDuration { days: raw_days });
    }

    let days = round_to_half_day(raw_days).max(Decimal::ZERO);

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_duration".to_string(),
        rule_name: "Leave Duration".to_string(),
        formula: "round_to_half_day((end - start) / 86400000 ms)".to_string(),
        input: serde_json::json!({
            "start": start.to_string(),
            "end": end.to_string(),
            "start_time_defaulted": start_time.is_none(),
            "end_time_defaulted": end_time.is_none()
        }),
        output: serde_json::json!({
            "elapsed_ms": elapsed_ms,
            "raw_days": raw_days.round_dp(6).normalize().to_string(),
            "days": days.normalize().to_string()
        }),
        reasoning: format!(
            "{} to {} is {} days, rounded to {}",
            start,
            end,
            raw_days.round_dp(4).normalize(),
            days.normalize()
        ),
    };

    Ok(LeaveDurationResult {
        raw_days,
        days,
        audit_step,
    })
}
