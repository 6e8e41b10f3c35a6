//! Calculation logic for the Payroll Engine.
//!
//! This module contains the pure calculation functions behind payroll:
//! half-day rounding, leave duration, the two net salary formulas,
//! allowance merging, and cost-to-company aggregation.

mod allowance_merge;
mod ctc;
mod leave_duration;
mod net_salary;
mod rounding;

pub use allowance_merge::{
    AllowanceMergeResult, MergeKey, MergedAllowanceRow, merge_allowance_records,
};
pub use ctc::{CtcResult, calculate_ctc, calculate_ctc_from_merged};
pub use leave_duration::{
    LeaveDurationResult, LeaveTimeDefaults, MILLIS_PER_DAY, calculate_leave_duration,
    parse_clock_time,
};
pub use net_salary::{
    FIXED_WORKING_DAY_DIVISOR, NetSalaryResult, net_salary_calendar_divisor,
    net_salary_fixed_divisor,
};
pub use rounding::{HALF, round_to_half_day};
