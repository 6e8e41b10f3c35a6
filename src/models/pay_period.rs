//! Pay period models.
//!
//! This module contains the [`Month`] enum and the [`PayPeriod`] type used to
//! key salary and allowance records by calendar month.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month, serialized by its English name (e.g. `"June"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    /// January.
    January,
    /// February.
    February,
    /// March.
    March,
    /// April.
    April,
    /// May.
    May,
    /// June.
    June,
    /// July.
    July,
    /// August.
    August,
    /// September.
    September,
    /// October.
    October,
    /// November.
    November,
    /// December.
    December,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Returns the month number, 1 for January through 12 for December.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Returns the English name of the month.
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Returns the number of calendar days in this month of `year`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::Month;
    ///
    /// assert_eq!(Month::February.days_in(2024).unwrap(), 29);
    /// assert_eq!(Month::February.days_in(2023).unwrap(), 28);
    /// assert_eq!(Month::June.days_in(2024).unwrap(), 30);
    /// ```
    pub fn days_in(self, year: i32) -> EngineResult<u32> {
        let first = NaiveDate::from_ymd_opt(year, self.number(), 1);
        let next_first = if self == Month::December {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, self.number() + 1, 1)
        };

        match (first, next_first) {
            (Some(first), Some(next_first)) => Ok((next_first - first).num_days() as u32),
            _ => Err(EngineError::CalculationError {
                message: format!("Year {} is outside the supported calendar range", year),
            }),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = EngineError;

    /// Parses a full or three-letter month name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Month::ALL
            .iter()
            .copied()
            .find(|m| {
                let name = m.name().to_lowercase();
                name == needle || (needle.len() == 3 && name.starts_with(&needle))
            })
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("Unknown month: {}", s),
            })
    }
}

/// A monthly pay period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Month, PayPeriod};
///
/// let period = PayPeriod { month: Month::June, year: 2024 };
/// assert_eq!(period.calendar_days().unwrap(), 30);
/// assert_eq!(period.to_string(), "June 2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The month of the period.
    pub month: Month,
    /// The year of the period.
    pub year: i32,
}

impl PayPeriod {
    /// Returns the number of calendar days in the period.
    pub fn calendar_days(&self) -> EngineResult<u32> {
        self.month.days_in(self.year)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}
