//! Leave request and leave balance models.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::EmployeeRef;
use crate::calculation::{
    LeaveDurationResult, LeaveTimeDefaults, calculate_leave_duration, parse_clock_time,
};
use crate::error::{EngineError, EngineResult};

/// The category of leave requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    /// Earned leave.
    El,
    /// Sick leave.
    Sl,
    /// Casual leave.
    Cl,
    /// On duty.
    Od,
    /// Anything else.
    Others,
}

impl LeaveType {
    /// Returns the wire name of the leave type.
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveType::El => "el",
            LeaveType::Sl => "sl",
            LeaveType::Cl => "cl",
            LeaveType::Od => "od",
            LeaveType::Others => "others",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
}

/// A request for leave.
///
/// `days` is derived from the dates and times; call
/// [`LeaveRequest::recompute_days`] whenever they change.
///
/// # Example
///
/// ```
/// use payroll_engine::models::LeaveRequest;
/// use rust_decimal::Decimal;
///
/// let json = r#"{
///     "leaveType": "cl",
///     "startDate": "2024-06-10",
///     "startTime": "09:00:00",
///     "endDate": "2024-06-11",
///     "endTime": "21:00:00",
///     "reason": "family function"
/// }"#;
/// let mut request: LeaveRequest = serde_json::from_str(json).unwrap();
/// request.recompute_days().unwrap();
/// assert_eq!(request.days, Decimal::new(15, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// The requesting employee.
    #[serde(default)]
    pub employee_id: Option<EmployeeRef>,
    /// The category of leave.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Time leave starts on the first day; midnight when absent or blank.
    #[serde(default, deserialize_with = "deserialize_clock_time")]
    pub start_time: Option<NaiveTime>,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Time leave ends on the last day; 23:59 when absent or blank.
    #[serde(default, deserialize_with = "deserialize_clock_time")]
    pub end_time: Option<NaiveTime>,
    /// Derived leave length in half-day steps.
    #[serde(default)]
    pub days: Decimal,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
    /// Approval state.
    #[serde(default)]
    pub status: LeaveStatus,
}

/// Reads an optional `HH:MM` or `HH:MM:SS` time, treating `null` and blank
/// strings as absent.
fn deserialize_clock_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) => parse_clock_time(&value).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl LeaveRequest {
    /// Re-derives `days` from the request's dates and times using the
    /// standard 00:00 / 23:59 defaults.
    pub fn recompute_days(&mut self) -> EngineResult<LeaveDurationResult> {
        self.recompute_days_with(&LeaveTimeDefaults::default())
    }

    /// Re-derives `days` using configured default times.
    pub fn recompute_days_with(
        &mut self,
        defaults: &LeaveTimeDefaults,
    ) -> EngineResult<LeaveDurationResult> {
        let result = calculate_leave_duration(
            self.start_date,
            self.start_time,
            self.end_date,
            self.end_time,
            defaults,
            1,
        )?;
        self.days = result.days;
        Ok(result)
    }
}

/// Per-employee leave counters.
///
/// Every counter is a non-negative number of days.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Earned leave.
    #[serde(default)]
    pub el: Decimal,
    /// Casual leave.
    #[serde(default)]
    pub cl: Decimal,
    /// Sick leave.
    #[serde(default)]
    pub sl: Decimal,
    /// On duty.
    #[serde(default)]
    pub od: Decimal,
    /// Leave without pay.
    #[serde(default)]
    pub lwp: Decimal,
    /// Other leave.
    #[serde(default)]
    pub others: Decimal,
}

impl LeaveBalance {
    /// Returns the counter for a leave type.
    pub fn available(&self, leave_type: LeaveType) -> Decimal {
        match leave_type {
            LeaveType::El => self.el,
            LeaveType::Sl => self.sl,
            LeaveType::Cl => self.cl,
            LeaveType::Od => self.od,
            LeaveType::Others => self.others,
        }
    }

    fn counter_mut(&mut self, leave_type: LeaveType) -> &mut Decimal {
        match leave_type {
            LeaveType::El => &mut self.el,
            LeaveType::Sl => &mut self.sl,
            LeaveType::Cl => &mut self.cl,
            LeaveType::Od => &mut self.od,
            LeaveType::Others => &mut self.others,
        }
    }

    /// Adds days to a counter (HR adjustment or accrual).
    pub fn credit(&mut self, leave_type: LeaveType, days: Decimal) -> EngineResult<()> {
        if days < Decimal::ZERO {
            return Err(EngineError::CalculationError {
                message: format!("Cannot credit a negative number of days: {}", days),
            });
        }
        let counter = self.counter_mut(leave_type);
        *counter = counter
            .checked_add(days)
            .ok_or_else(|| EngineError::AmountOverflow {
                operation: format!("{} balance", leave_type),
            })?;
        Ok(())
    }

    /// Removes days from a counter.
    ///
    /// # Errors
    ///
    /// `InsufficientLeaveBalance` if the counter would go negative and
    /// `CalculationError` if `days` is negative; the balance is left unchanged.
    pub fn debit(&mut self, leave_type: LeaveType, days: Decimal) -> EngineResult<()> {
        if days < Decimal::ZERO {
            return Err(EngineError::CalculationError {
                message: format!("Cannot debit a negative number of days: {}", days),
            });
        }
        let available = self.available(leave_type);
        if days > available {
            return Err(EngineError::InsufficientLeaveBalance {
                leave_type: leave_type.to_string(),
                available,
                requested: days,
            });
        }
        *self.counter_mut(leave_type) -= days;
        Ok(())
    }

    /// Applies an approved leave request to the matching counter.
    pub fn apply_approved(&mut self, request: &LeaveRequest) -> EngineResult<()> {
        if request.status != LeaveStatus::Approved {
            return Err(EngineError::CalculationError {
                message: "Only approved leave can be deducted from a balance".to_string(),
            });
        }
        self.debit(request.leave_type, request.days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_test_request() -> LeaveRequest {
        LeaveRequest {
            employee_id: None,
            leave_type: LeaveType::El,
            start_date: make_date("2024-06-10"),
            start_time: None,
            end_date: make_date("2024-06-12"),
            end_time: None,
            days: Decimal::ZERO,
            reason: "vacation".to_string(),
            status: LeaveStatus::Pending,
        }
    }

    #[test]
    fn test_recompute_days_uses_default_times() {
        let mut request = create_test_request();
        request.recompute_days().unwrap();
        // 2024-06-10 00:00 to 2024-06-12 23:59 is just under 3 days
        assert_eq!(request.days, dec("3"));
    }

    #[test]
    fn test_recompute_days_overwrites_stale_value() {
        let mut request = create_test_request();
        request.days = dec("10");
        request.end_date = make_date("2024-06-10");
        request.recompute_days().unwrap();
        assert_eq!(request.days, dec("1"));
    }

    #[test]
    fn test_recompute_rejects_reversed_dates() {
        let mut request = create_test_request();
        request.days = dec("2");
        request.end_date = make_date("2024-06-08");
        assert!(request.recompute_days().is_err());
        assert_eq!(request.days, dec("2"));
    }

    #[test]
    fn test_blank_times_fall_back_to_defaults() {
        let json = r#"{
            "leaveType": "el",
            "startDate": "2024-06-10",
            "startTime": "",
            "endDate": "2024-06-11",
            "endTime": "  "
        }"#;
        let mut request: LeaveRequest = serde_json::from_str(json).unwrap();
        assert!(request.start_time.is_none());
        assert!(request.end_time.is_none());

        request.recompute_days().unwrap();
        assert_eq!(request.days, dec("2"));
    }

    #[test]
    fn test_null_and_short_times_deserialize() {
        let json = r#"{
            "leaveType": "cl",
            "startDate": "2024-06-10",
            "startTime": null,
            "endDate": "2024-06-10",
            "endTime": "13:30"
        }"#;
        let request: LeaveRequest = serde_json::from_str(json).unwrap();
        assert!(request.start_time.is_none());
        assert_eq!(request.end_time, NaiveTime::from_hms_opt(13, 30, 0));
    }

    #[test]
    fn test_malformed_time_fails_to_deserialize() {
        let json = r#"{
            "leaveType": "cl",
            "startDate": "2024-06-10",
            "startTime": "9.30am",
            "endDate": "2024-06-10"
        }"#;
        let error = serde_json::from_str::<LeaveRequest>(json).unwrap_err();
        assert!(error.to_string().contains("9.30am"));
    }

    #[test]
    fn test_serialized_times_read_back() {
        let mut request = create_test_request();
        request.start_time = NaiveTime::from_hms_opt(9, 0, 0);
        let json = serde_json::to_string(&request).unwrap();
        let parsed: LeaveRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.start_time, request.start_time);
    }

    #[test]
    fn test_leave_type_wire_names() {
        assert_eq!(serde_json::to_string(&LeaveType::Others).unwrap(), "\"others\"");
        let lt: LeaveType = serde_json::from_str("\"od\"").unwrap();
        assert_eq!(lt, LeaveType::Od);
    }

    #[test]
    fn test_debit_and_credit() {
        let mut balance = LeaveBalance {
            cl: dec("4"),
            ..Default::default()
        };

        balance.debit(LeaveType::Cl, dec("1.5")).unwrap();
        assert_eq!(balance.cl, dec("2.5"));

        balance.credit(LeaveType::Cl, dec("1")).unwrap();
        assert_eq!(balance.available(LeaveType::Cl), dec("3.5"));
    }

    #[test]
    fn test_debit_cannot_go_negative() {
        let mut balance = LeaveBalance {
            sl: dec("1"),
            ..Default::default()
        };

        match balance.debit(LeaveType::Sl, dec("1.5")) {
            Err(EngineError::InsufficientLeaveBalance {
                leave_type,
                available,
                requested,
            }) => {
                assert_eq!(leave_type, "sl");
                assert_eq!(available, dec("1"));
                assert_eq!(requested, dec("1.5"));
            }
            other => panic!("Expected InsufficientLeaveBalance, got {:?}", other),
        }
        assert_eq!(balance.sl, dec("1"));
    }

    #[test]
    fn test_credit_rejects_negative_days() {
        let mut balance = LeaveBalance::default();
        assert!(balance.credit(LeaveType::El, dec("-1")).is_err());
        assert_eq!(balance.el, Decimal::ZERO);
    }

    #[test]
    fn test_debit_rejects_negative_days() {
        let mut balance = LeaveBalance {
            el: dec("2"),
            ..Default::default()
        };
        assert!(balance.debit(LeaveType::El, dec("-1")).is_err());
        assert_eq!(balance.el, dec("2"));
    }

    #[test]
    fn test_credit_overflow_leaves_balance_unchanged() {
        let mut balance = LeaveBalance {
            od: Decimal::MAX,
            ..Default::default()
        };
        assert!(matches!(
            balance.credit(LeaveType::Od, dec("1")),
            Err(EngineError::AmountOverflow { .. })
        ));
        assert_eq!(balance.od, Decimal::MAX);
    }

    #[test]
    fn test_apply_approved_only() {
        let mut balance = LeaveBalance {
            el: dec("10"),
            ..Default::default()
        };
        let mut request = create_test_request();
        request.recompute_days().unwrap();

        assert!(balance.apply_approved(&request).is_err());

        request.status = LeaveStatus::Approved;
        balance.apply_approved(&request).unwrap();
        assert_eq!(balance.el, dec("7"));
    }

    #[test]
    fn test_balance_deserializes_partial_document() {
        let balance: LeaveBalance = serde_json::from_str(r#"{"el": 12, "lwp": "1.5"}"#).unwrap();
        assert_eq!(balance.el, dec("12"));
        assert_eq!(balance.lwp, dec("1.5"));
        assert_eq!(balance.cl, Decimal::ZERO);
    }
}
