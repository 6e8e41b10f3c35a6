//! Response types for the Payroll Engine API.
//!
//! This module defines the calculator outputs, the error response
//! structures, and the mapping from engine errors to HTTP statuses.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{
    AllowanceMergeResult, CtcResult, LeaveDurationResult, MergedAllowanceRow, NetSalaryResult,
};
use crate::error::EngineError;

/// Output of `POST /leave/duration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDurationOutput {
    /// Leave length in half-day steps.
    pub days: Decimal,
    /// Elapsed days before rounding.
    pub raw_days: Decimal,
}

impl From<&LeaveDurationResult> for LeaveDurationOutput {
    fn from(result: &LeaveDurationResult) -> Self {
        Self {
            days: result.days.normalize(),
            raw_days: result.raw_days.round_dp(6).normalize(),
        }
    }
}

/// Output of the net salary endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetSalaryOutput {
    /// Sum of allowance lines.
    pub total_allowances: Decimal,
    /// Sum of deduction lines.
    pub total_deductions: Decimal,
    /// Basic salary plus allowances minus deductions.
    pub gross_total: Decimal,
    /// Days paid for.
    pub payable_days: Decimal,
    /// Days in the period.
    pub period_days: Decimal,
    /// The payable amount.
    pub net_salary: Decimal,
}

impl From<&NetSalaryResult> for NetSalaryOutput {
    fn from(result: &NetSalaryResult) -> Self {
        Self {
            total_allowances: result.total_allowances.normalize(),
            total_deductions: result.total_deductions.normalize(),
            gross_total: result.gross_total.normalize(),
            payable_days: result.payable_days.normalize(),
            period_days: result.period_days.normalize(),
            net_salary: result.net_salary.normalize(),
        }
    }
}

/// Output of `POST /allowances/merge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceMergeOutput {
    /// Merged rows in order of first appearance.
    pub rows: Vec<MergedAllowanceRow>,
    /// Input indexes of records skipped for lack of an employee code.
    pub skipped: Vec<usize>,
}

impl From<&AllowanceMergeResult> for AllowanceMergeOutput {
    fn from(result: &AllowanceMergeResult) -> Self {
        Self {
            rows: result.rows.clone(),
            skipped: result.skipped.clone(),
        }
    }
}

/// Output of `POST /ctc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtcOutput {
    /// The gross salary the allowances were added to.
    pub gross_salary: Decimal,
    /// Sum of approved variable allowances.
    pub dynamic_total: Decimal,
    /// Sum of approved fixed allowances.
    pub fixed_total: Decimal,
    /// Gross plus both allowance totals.
    pub total_ctc: Decimal,
    /// Approved amounts per allowance type.
    pub approved_by_type: BTreeMap<String, Decimal>,
    /// Pending or rejected entries left out of the sums.
    pub excluded_entries: usize,
}

impl From<&CtcResult> for CtcOutput {
    fn from(result: &CtcResult) -> Self {
        Self {
            gross_salary: result.gross_salary.normalize(),
            dynamic_total: result.dynamic_total.normalize(),
            fixed_total: result.fixed_total.normalize(),
            total_ctc: result.total_ctc.normalize(),
            approved_by_type: result
                .approved_by_type
                .iter()
                .map(|(k, v)| (k.clone(), v.normalize()))
                .collect(),
            excluded_entries: result.excluded_entries,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing field error response.
    pub fn missing_field(field: impl Into<String>, details: impl Into<String>) -> Self {
        let field = field.into();
        Self::with_details("MISSING_FIELD", format!("missing field: {}", field), details)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::InvalidTime { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_TIME",
                    message,
                    "Times must be given as HH:MM or HH:MM:SS",
                ),
            },
            EngineError::NegativeLeaveDuration { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "NEGATIVE_LEAVE_DURATION",
                    message,
                    "The leave end date and time must not precede the start",
                ),
            },
            EngineError::NegativeNetSalary { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "NEGATIVE_NET_SALARY",
                    message,
                    "Deductions exceed basic salary plus allowances",
                ),
            },
            EngineError::MissingField { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::missing_field(field, message),
            },
            EngineError::InvalidStatusTransition { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("INVALID_STATUS_TRANSITION", message),
            },
            EngineError::InsufficientLeaveBalance { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::new("INSUFFICIENT_LEAVE_BALANCE", message),
            },
            EngineError::AmountOverflow { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details(
                    "AMOUNT_OVERFLOW",
                    message,
                    "Amounts are too large to calculate with",
                ),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}
