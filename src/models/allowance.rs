//! Allowance models and the approval lifecycle.
//!
//! Allowances are claimed per employee per month and only count toward
//! payroll totals once an approver has marked them approved against a
//! voucher number.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EmployeeRef, Month, PayPeriod};
use crate::error::{EngineError, EngineResult};

/// Approval state of an allowance claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowanceStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved; the amount counts toward totals.
    Approved,
    /// Rejected; kept for display only.
    Rejected,
}

impl AllowanceStatus {
    /// Returns the wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            AllowanceStatus::Pending => "pending",
            AllowanceStatus::Approved => "approved",
            AllowanceStatus::Rejected => "rejected",
        }
    }

    /// Returns true if amounts with this status count toward totals.
    pub fn is_approved(self) -> bool {
        self == AllowanceStatus::Approved
    }
}

impl fmt::Display for AllowanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monthly allowance claim for one employee.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AllowanceRecord, AllowanceStatus};
///
/// let json = r#"{
///     "employeeId": {"employeeId": 7},
///     "allowanceType": "site",
///     "allowanceAmount": 1200,
///     "allowanceMonth": "June",
///     "allowanceYear": 2024
/// }"#;
/// let mut record: AllowanceRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(record.status, AllowanceStatus::Pending);
///
/// record.approve("VCH-0042").unwrap();
/// assert_eq!(record.status, AllowanceStatus::Approved);
/// assert_eq!(record.voucher_no.as_deref(), Some("VCH-0042"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceRecord {
    /// Document id of the claim.
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The claiming employee.
    #[serde(default)]
    pub employee_id: Option<EmployeeRef>,
    /// The allowance type code (e.g. "site", "epfByCo", "bonus").
    pub allowance_type: String,
    /// The claimed amount, if one was entered.
    #[serde(default)]
    pub allowance_amount: Option<Decimal>,
    /// The month the allowance applies to.
    pub allowance_month: Month,
    /// The year the allowance applies to.
    pub allowance_year: i32,
    /// Approval state.
    #[serde(default)]
    pub status: AllowanceStatus,
    /// Voucher number, set on approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_no: Option<String>,
    /// Client the allowance is billed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Project number the allowance is billed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_no: Option<String>,
}

/// Periodic allowances (bonus, LTC, loyalty bonus) share the monthly shape.
pub type FixedAllowanceRecord = AllowanceRecord;

impl AllowanceRecord {
    /// Returns the claimed amount, treating a missing value as zero.
    pub fn amount(&self) -> Decimal {
        self.allowance_amount.unwrap_or(Decimal::ZERO)
    }

    /// Returns the amount that counts toward totals: the claimed amount when
    /// approved, zero otherwise.
    pub fn approved_amount(&self) -> Decimal {
        if self.status.is_approved() {
            self.amount()
        } else {
            Decimal::ZERO
        }
    }

    /// Returns the pay period the claim belongs to.
    pub fn pay_period(&self) -> PayPeriod {
        PayPeriod {
            month: self.allowance_month,
            year: self.allowance_year,
        }
    }

    /// Approves a pending claim against a voucher number.
    ///
    /// # Errors
    ///
    /// - `InvalidStatusTransition` if the claim is not pending
    /// - `MissingField` if `voucher_no` is blank
    pub fn approve(&mut self, voucher_no: &str) -> EngineResult<()> {
        self.ensure_pending(AllowanceStatus::Approved)?;

        let voucher_no = voucher_no.trim();
        if voucher_no.is_empty() {
            return Err(EngineError::MissingField {
                field: "voucherNo".to_string(),
                message: "a voucher number is required to approve an allowance".to_string(),
            });
        }

        self.status = AllowanceStatus::Approved;
        self.voucher_no = Some(voucher_no.to_string());
        Ok(())
    }

    /// Rejects a pending claim.
    ///
    /// # Errors
    ///
    /// `InvalidStatusTransition` if the claim is not pending.
    pub fn reject(&mut self) -> EngineResult<()> {
        self.ensure_pending(AllowanceStatus::Rejected)?;
        self.status = AllowanceStatus::Rejected;
        Ok(())
    }

    fn ensure_pending(&self, to: AllowanceStatus) -> EngineResult<()> {
        if self.status == AllowanceStatus::Pending {
            Ok(())
        } else {
            Err(EngineError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: to.to_string(),
                message: "only pending allowances can be decided".to_string(),
            })
        }
    }
}

/// A single allowance amount as fed to the CTC aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceEntry {
    /// The allowance type code.
    #[serde(rename = "type")]
    pub allowance_type: String,
    /// The amount, if one was entered.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Approval state.
    #[serde(default)]
    pub status: AllowanceStatus,
}

impl AllowanceEntry {
    /// Returns the amount that counts toward totals.
    pub fn approved_amount(&self) -> Decimal {
        if self.status.is_approved() {
            self.amount.unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}

impl From<&AllowanceRecord> for AllowanceEntry {
    fn from(record: &AllowanceRecord) -> Self {
        AllowanceEntry {
            allowance_type: record.allowance_type.clone(),
            amount: record.allowance_amount,
            status: record.status,
        }
    }
}
