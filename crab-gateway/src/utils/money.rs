//! Money utilities using rust_decimal for precision
//!
//! Amounts travel as `Decimal` and are stored as INTEGER thousandths
//! ("minor units"). Every conversion rounds to [`DECIMAL_PLACES`] half-up.

use rust_decimal::prelude::*;

/// Minor-currency precision (three places, half-up)
pub const DECIMAL_PLACES: u32 = 3;

/// Minor units per major unit
const MINOR_PER_UNIT: i64 = 1_000;

/// Maximum accepted amount for any single tender, refund or cash count
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Round to the domain precision, half away from zero
#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Decimal → minor units; `None` when the value does not fit in `i64`
pub fn to_minor(value: Decimal) -> Option<i64> {
    (round(value) * Decimal::from(MINOR_PER_UNIT)).to_i64()
}

/// Minor units → Decimal with three places
#[inline]
pub fn from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, DECIMAL_PLACES)
}

/// Validate a caller-supplied amount: positive and within [`MAX_AMOUNT`]
pub fn validate_positive(value: Decimal, field: &str) -> Result<Decimal, String> {
    let rounded = round(value);
    if rounded <= Decimal::ZERO {
        return Err(format!("{field} must be positive, got {value}"));
    }
    if rounded > MAX_AMOUNT {
        return Err(format!(
            "{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        ));
    }
    Ok(rounded)
}

/// Validate a cash count: zero allowed
pub fn validate_non_negative(value: Decimal, field: &str) -> Result<Decimal, String> {
    let rounded = round(value);
    if rounded < Decimal::ZERO {
        return Err(format!("{field} must be non-negative, got {value}"));
    }
    if rounded > MAX_AMOUNT {
        return Err(format!(
            "{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        ));
    }
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round(dec("1.0005")), dec("1.001"));
        assert_eq!(round(dec("1.0004")), dec("1.000"));
        assert_eq!(round(dec("2.9995")), dec("3.000"));
    }

    #[test]
    fn test_minor_conversion() {
        assert_eq!(to_minor(dec("12.345")), Some(12_345));
        assert_eq!(to_minor(dec("0.0005")), Some(1));
        assert_eq!(from_minor(12_345), dec("12.345"));
        assert_eq!(from_minor(to_minor(dec("7.5")).unwrap()), dec("7.500"));
    }

    #[test]
    fn test_validate_positive() {
        assert_eq!(validate_positive(dec("4.0001"), "amount"), Ok(dec("4.000")));
        assert!(validate_positive(Decimal::ZERO, "amount").is_err());
        assert!(validate_positive(dec("-1"), "amount").is_err());
        assert!(validate_positive(dec("0.0004"), "amount").is_err());
        assert!(validate_positive(dec("1000000.001"), "amount").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert_eq!(validate_non_negative(Decimal::ZERO, "cash"), Ok(Decimal::ZERO));
        assert!(validate_non_negative(dec("-0.01"), "cash").is_err());
    }
}
