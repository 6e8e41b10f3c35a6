//! Net salary calculation functionality.
//!
//! Two prorating formulas are in use and are kept apart on purpose:
//!
//! - [`net_salary_fixed_divisor`] prorates by `working_days / 26` and snaps
//!   the result to a half unit.
//! - [`net_salary_calendar_divisor`] prorates by
//!   `net_payable_days / calendar days in the month` and rounds up.
//!
//! They disagree for most inputs. Callers pick the one their view uses.

use rust_decimal::Decimal;

use super::rounding::round_to_half_day;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, SalaryRecord};

/// The number of working days in a month assumed by the fixed-divisor formula.
pub const FIXED_WORKING_DAY_DIVISOR: u32 = 26;

/// The result of a net salary calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct NetSalaryResult {
    /// Sum of allowance lines.
    pub total_allowances: Decimal,
    /// Sum of deduction lines.
    pub total_deductions: Decimal,
    /// Basic salary plus allowances minus deductions.
    pub gross_total: Decimal,
    /// Days paid for (numerator of the proration).
    pub payable_days: Decimal,
    /// Days in the period (denominator of the proration).
    pub period_days: Decimal,
    /// The prorated amount before rounding.
    pub raw_net_salary: Decimal,
    /// The payable amount.
    pub net_salary: Decimal,
    /// Non-fatal findings about the input.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates net salary prorated over a fixed-length month.
///
/// `net = (basic + allowances - deductions) x working_days / divisor`,
/// snapped with [`round_to_half_day`](super::round_to_half_day). The
/// divisor is normally [`FIXED_WORKING_DAY_DIVISOR`].
///
/// # Errors
///
/// - `CalculationError` if `divisor` is zero
/// - `NegativeNetSalary` if deductions outweigh pay
/// - `AmountOverflow` if the amounts are too large to prorate
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{net_salary_fixed_divisor, FIXED_WORKING_DAY_DIVISOR};
/// use payroll_engine::models::{Month, SalaryComponent, SalaryRecord};
/// use rust_decimal::Decimal;
///
/// let record = SalaryRecord {
///     employee_id: None,
///     basic_salary: Decimal::new(26000, 0),
///     working_days: 13,
///     allowances: vec![SalaryComponent { name: "HRA".to_string(), amount: Some(Decimal::new(4000, 0)) }],
///     deductions: vec![],
///     payment_month: Month::June,
///     payment_year: 2024,
///     payment_date: None,
///     net_payable_days: None,
/// };
///
/// let result = net_salary_fixed_divisor(&record, FIXED_WORKING_DAY_DIVISOR, 1).unwrap();
/// assert_eq!(result.net_salary, Decimal::new(15000, 0));
/// ```
pub fn net_salary_fixed_divisor(
    record: &SalaryRecord,
    divisor: u32,
    step_number: u32,
) -> EngineResult<NetSalaryResult> {
    if divisor == 0 {
        return Err(EngineError::CalculationError {
            message: "Working day divisor must be greater than zero".to_string(),
        });
    }

    let total_allowances = record.total_allowances()?;
    let total_deductions = record.total_deductions()?;
    let gross_total = record.gross_total()?;
    let payable_days = Decimal::from(record.working_days);
    let period_days = Decimal::from(divisor);

    let raw_net_salary = prorate(gross_total, payable_days, period_days)?;
    if raw_net_salary < Decimal::ZERO {
        return Err(EngineError::NegativeNetSalary {
            amount: raw_net_salary,
        });
    }
    let net_salary = round_to_half_day(raw_net_salary);

    let mut warnings = Vec::new();
    if record.working_days > divisor {
        warnings.push(days_exceed_period_warning(payable_days, period_days));
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "net_salary_fixed_divisor".to_string(),
        rule_name: "Net Salary (fixed divisor)".to_string(),
        formula: format!(
            "round_to_half_day((basic + allowances - deductions) x working_days / {})",
            divisor
        ),
        input: serde_json::json!({
            "basic_salary": record.basic_salary.normalize().to_string(),
            "total_allowances": total_allowances.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string(),
            "working_days": record.working_days,
            "divisor": divisor
        }),
        output: serde_json::json!({
            "gross_total": gross_total.normalize().to_string(),
            "raw_net_salary": raw_net_salary.round_dp(6).normalize().to_string(),
            "net_salary": net_salary.normalize().to_string()
        }),
        reasoning: format!(
            "{} x {} / {} = {}, rounded to {}",
            gross_total.normalize(),
            record.working_days,
            divisor,
            raw_net_salary.round_dp(4).normalize(),
            net_salary.normalize()
        ),
    };

    Ok(NetSalaryResult {
        total_allowances,
        total_deductions,
        gross_total,
        payable_days,
        period_days,
        raw_net_salary,
        net_salary,
        warnings,
        audit_step,
    })
}

/// Calculates net salary prorated over the calendar length of the month.
///
/// `net = ceil((basic + allowances - deductions) x net_payable_days / days_in_month)`,
/// where `days_in_month` is the calendar length of `payment_month` in
/// `payment_year`.
///
/// # Errors
///
/// - `MissingField` if the record has no `net_payable_days`
/// - `NegativeNetSalary` if deductions outweigh pay
/// - `AmountOverflow` if the amounts are too large to prorate
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::net_salary_calendar_divisor;
/// use payroll_engine::models::{Month, SalaryRecord};
/// use rust_decimal::Decimal;
///
/// let record = SalaryRecord {
///     employee_id: None,
///     basic_salary: Decimal::new(31000, 0),
///     working_days: 27,
///     allowances: vec![],
///     deductions: vec![],
///     payment_month: Month::July,
///     payment_year: 2024,
///     payment_date: None,
///     net_payable_days: Some(Decimal::new(27, 0)),
/// };
///
/// let result = net_salary_calendar_divisor(&record, 1).unwrap();
/// assert_eq!(result.net_salary, Decimal::new(27000, 0));
/// ```
pub fn net_salary_calendar_divisor(
    record: &SalaryRecord,
    step_number: u32,
) -> EngineResult<NetSalaryResult> {
    let payable_days = record
        .net_payable_days
        .ok_or_else(|| EngineError::MissingField {
            field: "netPayableDays".to_string(),
            message: "required by the calendar-divisor salary calculation".to_string(),
        })?;
    let calendar_days = record.payment_month.days_in(record.payment_year)?;

    let total_allowances = record.total_allowances()?;
    let total_deductions = record.total_deductions()?;
    let gross_total = record.gross_total()?;
    let period_days = Decimal::from(calendar_days);

    let raw_net_salary = prorate(gross_total, payable_days, period_days)?;
    if raw_net_salary < Decimal::ZERO {
        return Err(EngineError::NegativeNetSalary {
            amount: raw_net_salary,
        });
    }
    let net_salary = raw_net_salary.ceil();

    let mut warnings = Vec::new();
    if payable_days > period_days {
        warnings.push(days_exceed_period_warning(payable_days, period_days));
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "net_salary_calendar_divisor".to_string(),
        rule_name: "Net Salary (calendar divisor)".to_string(),
        formula: "ceil((basic + allowances - deductions) x net_payable_days / days_in_month)"
            .to_string(),
        input: serde_json::json!({
            "basic_salary": record.basic_salary.normalize().to_string(),
            "total_allowances": total_allowances.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string(),
            "net_payable_days": payable_days.normalize().to_string(),
            "payment_month": record.payment_month.name(),
            "payment_year": record.payment_year,
            "days_in_month": calendar_days
        }),
        output: serde_json::json!({
            "gross_total": gross_total.normalize().to_string(),
            "raw_net_salary": raw_net_salary.round_dp(6).normalize().to_string(),
            "net_salary": net_salary.normalize().to_string()
        }),
        reasoning: format!(
            "{} x {} / {} = {}, rounded up to {}",
            gross_total.normalize(),
            payable_days.normalize(),
            calendar_days,
            raw_net_salary.round_dp(4).normalize(),
            net_salary.normalize()
        ),
    };

    Ok(NetSalaryResult {
        total_allowances,
        total_deductions,
        gross_total,
        payable_days,
        period_days,
        raw_net_salary,
        net_salary,
        warnings,
        audit_step,
    })
}

/// `gross_total x payable_days / period_days`, with overflow reported as an error.
fn prorate(
    gross_total: Decimal,
    payable_days: Decimal,
    period_days: Decimal,
) -> EngineResult<Decimal> {
    gross_total
        .checked_mul(payable_days)
        .and_then(|amount| amount.checked_div(period_days))
        .ok_or_else(|| EngineError::AmountOverflow {
            operation: "prorated net salary".to_string(),
        })
}

fn days_exceed_period_warning(payable_days: Decimal, period_days: Decimal) -> AuditWarning {
    AuditWarning::new(
        "DAYS_EXCEED_PERIOD",
        format!(
            "{} payable days exceeds the {}-day period",
            payable_days.normalize(),
            period_days
        ),
        "medium",
    )
}
