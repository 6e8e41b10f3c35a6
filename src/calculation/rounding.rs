//! Half-day rounding.
//!
//! Leave lengths and fixed-divisor salaries are snapped with the same rule:
//! a fractional part above one half rounds up to the next whole number, any
//! other non-zero fractional part becomes exactly one half.

use rust_decimal::Decimal;

/// One half, the boundary and the snap target of [`round_to_half_day`].
pub const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Rounds a non-negative value to a whole or half unit.
///
/// | fractional part | result        |
/// |-----------------|---------------|
/// | `0`             | unchanged     |
/// | `(0, 0.5]`      | `floor + 0.5` |
/// | `(0.5, 1)`      | `ceil`        |
///
/// A remainder of exactly `0.5` stays at `.5`; the rule never rounds a
/// small remainder down to the whole number.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_to_half_day;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let d = |s: &str| Decimal::from_str(s).unwrap();
/// assert_eq!(round_to_half_day(d("2")), d("2"));
/// assert_eq!(round_to_half_day(d("1.1")), d("1.5"));
/// assert_eq!(round_to_half_day(d("1.5")), d("1.5"));
/// assert_eq!(round_to_half_day(d("1.51")), d("2"));
/// ```
pub fn round_to_half_day(value: Decimal) -> Decimal {
    let whole = value.floor();
    let fraction = value - whole;

    if fraction > HALF {
        value.ceil()
    } else if fraction > Decimal::ZERO {
        whole + HALF
    } else {
        value
    }
}
