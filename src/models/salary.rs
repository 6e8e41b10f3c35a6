//! Salary record model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EmployeeRef, Month, PayPeriod};
use crate::error::{EngineError, EngineResult};

/// Adds up amounts, failing instead of panicking when the sum leaves the
/// decimal range.
pub(crate) fn checked_sum<I>(amounts: I, operation: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| EngineError::AmountOverflow {
            operation: operation.to_string(),
        })
}

/// A named allowance or deduction line on a salary record.
///
/// A missing amount counts as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    /// The label shown on the payslip (e.g. "HRA", "PF").
    #[serde(default)]
    pub name: String,
    /// The amount, if one was entered.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl SalaryComponent {
    /// Returns the amount, treating a missing value as zero.
    pub fn amount(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// A payroll entry for one employee and one month.
///
/// # Example
///
/// ```
/// use payroll_engine::models::SalaryRecord;
/// use rust_decimal::Decimal;
///
/// let json = r#"{
///     "employeeId": {"employeeId": 7},
///     "basicSalary": "26000",
///     "workingDays": 26,
///     "allowances": [{"name": "HRA", "amount": "4000"}],
///     "deductions": [],
///     "paymentMonth": "June",
///     "paymentYear": 2024
/// }"#;
/// let record: SalaryRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(record.gross_total().unwrap(), Decimal::new(30000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    /// The employee this record pays.
    #[serde(default)]
    pub employee_id: Option<EmployeeRef>,
    /// Basic salary for a full period.
    pub basic_salary: Decimal,
    /// Days actually worked in the period.
    pub working_days: u32,
    /// Allowance lines, in entry order.
    #[serde(default)]
    pub allowances: Vec<SalaryComponent>,
    /// Deduction lines, in entry order.
    #[serde(default)]
    pub deductions: Vec<SalaryComponent>,
    /// The month being paid.
    pub payment_month: Month,
    /// The year being paid.
    pub payment_year: i32,
    /// The date payment was made.
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Payable days minus Sundays, used by the calendar-divisor calculation.
    #[serde(default)]
    pub net_payable_days: Option<Decimal>,
}

impl SalaryRecord {
    /// Returns the pay period this record covers.
    pub fn pay_period(&self) -> PayPeriod {
        PayPeriod {
            month: self.payment_month,
            year: self.payment_year,
        }
    }

    /// Sum of all allowance lines.
    pub fn total_allowances(&self) -> EngineResult<Decimal> {
        checked_sum(
            self.allowances.iter().map(SalaryComponent::amount),
            "total allowances",
        )
    }

    /// Sum of all deduction lines.
    pub fn total_deductions(&self) -> EngineResult<Decimal> {
        checked_sum(
            self.deductions.iter().map(SalaryComponent::amount),
            "total deductions",
        )
    }

    /// Basic salary plus allowances minus deductions, before prorating.
    ///
    /// # Errors
    ///
    /// `AmountOverflow` if any intermediate sum leaves the decimal range.
    pub fn gross_total(&self) -> EngineResult<Decimal> {
        let total_allowances = self.total_allowances()?;
        let total_deductions = self.total_deductions()?;
        self.basic_salary
            .checked_add(total_allowances)
            .and_then(|total| total.checked_sub(total_deductions))
            .ok_or_else(|| EngineError::AmountOverflow {
                operation: "gross salary".to_string(),
            })
    }
}
