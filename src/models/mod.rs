//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod allowance;
mod calculation_result;
mod employee;
mod leave;
mod pay_period;
mod salary;

pub use allowance::{AllowanceEntry, AllowanceRecord, AllowanceStatus, FixedAllowanceRecord};
pub use calculation_result::{AuditStep, AuditTrace, AuditWarning, CalculationResult};
pub use employee::{DepartmentRef, EmployeeCode, EmployeeRef};
pub use leave::{LeaveBalance, LeaveRequest, LeaveStatus, LeaveType};
pub use pay_period::{Month, PayPeriod};
pub use salary::{SalaryComponent, SalaryRecord};
pub(crate) use salary::checked_sum;
