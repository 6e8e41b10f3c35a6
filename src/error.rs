//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during payroll and leave calculations.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the Payroll Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/payroll.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/payroll.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A clock time could not be parsed.
    #[error("Invalid time '{value}': expected HH:MM")]
    InvalidTime {
        /// The offending input.
        value: String,
    },

    /// A leave request ends before it starts.
    #[error("Leave ends before it starts ({days} days)")]
    NegativeLeaveDuration {
        /// The raw (unrounded) day count.
        days: Decimal,
    },

    /// A salary calculation produced a negative payable amount.
    #[error("Net salary is negative: {amount}")]
    NegativeNetSalary {
        /// The computed net amount.
        amount: Decimal,
    },

    /// A field required by the requested calculation was absent.
    #[error("Missing field '{field}': {message}")]
    MissingField {
        /// The name of the missing field.
        field: String,
        /// Why the field is needed.
        message: String,
    },

    /// A status change that the approval lifecycle does not allow.
    #[error("Cannot move allowance from '{from}' to '{to}': {message}")]
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// A description of why the transition was refused.
        message: String,
    },

    /// A leave balance counter does not cover the requested days.
    #[error("Insufficient {leave_type} balance: {available} available, {requested} requested")]
    InsufficientLeaveBalance {
        /// The leave counter that was debited.
        leave_type: String,
        /// Days currently available.
        available: Decimal,
        /// Days requested.
        requested: Decimal,
    },

    /// An amount grew past what a decimal can represent.
    #[error("Amount overflow while computing {operation}")]
    AmountOverflow {
        /// The quantity being computed.
        operation: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/payroll.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/payroll.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_time_displays_value() {
        let error = EngineError::InvalidTime {
            value: "25:99".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid time '25:99': expected HH:MM");
    }

    #[test]
    fn test_negative_net_salary_displays_amount() {
        let error = EngineError::NegativeNetSalary {
            amount: Decimal::new(-1500, 0),
        };
        assert_eq!(error.to_string(), "Net salary is negative: -1500");
    }

    #[test]
    fn test_insufficient_balance_displays_counts() {
        let error = EngineError::InsufficientLeaveBalance {
            leave_type: "cl".to_string(),
            available: Decimal::new(15, 1),
            requested: Decimal::new(2, 0),
        };
        assert_eq!(
            error.to_string(),
            "Insufficient cl balance: 1.5 available, 2 requested"
        );
    }

    #[test]
    fn test_invalid_transition_displays_statuses() {
        let error = EngineError::InvalidStatusTransition {
            from: "rejected".to_string(),
            to: "approved".to_string(),
            message: "only pending allowances can be decided".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot move allowance from 'rejected' to 'approved': only pending allowances can be decided"
        );
    }

    #[test]
    fn test_amount_overflow_displays_operation() {
        let error = EngineError::AmountOverflow {
            operation: "total CTC".to_string(),
        };
        assert_eq!(error.to_string(), "Amount overflow while computing total CTC");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_missing_field() -> EngineResult<()> {
            Err(EngineError::MissingField {
                field: "netPayableDays".to_string(),
                message: "required".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_missing_field()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
