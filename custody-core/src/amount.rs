//! Fixed-point value type
//!
//! All value in the engine is carried as an unsigned integer count of base
//! units (10^18 base units per whole token, mirroring the wei boundary of the
//! reference chain). Arithmetic is overflow-checked; nothing wraps, nothing
//! goes through floating point. The decimal string boundary exists only for
//! parse/format at the edges and routes through `rust_decimal`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base units per whole token (10^18).
pub const BASE_UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Decimal digits of the fractional part.
const SCALE: u32 = 18;

/// Unsigned fixed-point amount in base units
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Amount(u128);

impl Amount {
    /// Zero value
    pub const ZERO: Amount = Amount(0);

    /// Create from a raw base-unit count
    pub const fn from_base_units(units: u128) -> Self {
        Amount(units)
    }

    /// Raw base-unit count
    pub const fn base_units(&self) -> u128 {
        self.0
    }

    /// True if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Overflow-checked addition
    pub fn add(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(Error::Overflow)
    }

    /// Underflow-checked subtraction
    pub fn sub(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(Error::Underflow)
    }

    /// Parse a decimal token string (e.g. `"1.5"`) into base units
    ///
    /// Fails with [`Error::InvalidAmount`] on malformed or negative input and
    /// with [`Error::Overflow`] when the value does not fit.
    pub fn from_decimal_str(s: &str) -> Result<Amount> {
        let decimal = rust_decimal::Decimal::from_str(s.trim())
            .map_err(|e| Error::InvalidAmount(format!("{s:?}: {e}")))?
            .normalize();

        if decimal.is_sign_negative() {
            return Err(Error::InvalidAmount(format!("{s:?}: negative amount")));
        }

        if decimal.scale() > SCALE {
            return Err(Error::InvalidAmount(format!(
                "{s:?}: more than {SCALE} fractional digits"
            )));
        }

        // mantissa is non-negative after the sign check
        let mantissa = decimal.mantissa() as u128;
        let rescale = 10u128
            .checked_pow(SCALE - decimal.scale())
            .ok_or(Error::Overflow)?;

        mantissa
            .checked_mul(rescale)
            .map(Amount)
            .ok_or(Error::Overflow)
    }

    /// Canonical decimal token string, trailing zeros trimmed
    pub fn to_decimal_string(&self) -> String {
        let whole = self.0 / BASE_UNITS_PER_TOKEN;
        let frac = self.0 % BASE_UNITS_PER_TOKEN;

        if frac == 0 {
            return whole.to_string();
        }

        let frac = format!("{frac:018}");
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Amount::from_decimal_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_sub() {
        let a = Amount::from_base_units(600_000);
        let b = Amount::from_base_units(400_000);

        assert_eq!(a.add(b).unwrap(), Amount::from_base_units(1_000_000));
        assert_eq!(a.sub(b).unwrap(), Amount::from_base_units(200_000));
    }

    #[test]
    fn test_sub_underflow() {
        let a = Amount::from_base_units(1);
        let b = Amount::from_base_units(2);

        assert!(matches!(a.sub(b), Err(Error::Underflow)));
    }

    #[test]
    fn test_add_overflow() {
        let a = Amount::from_base_units(u128::MAX);
        let b = Amount::from_base_units(1);

        assert!(matches!(a.add(b), Err(Error::Overflow)));
    }

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(
            Amount::from_decimal_str("1").unwrap(),
            Amount::from_base_units(BASE_UNITS_PER_TOKEN)
        );
        assert_eq!(
            Amount::from_decimal_str("1.5").unwrap(),
            Amount::from_base_units(BASE_UNITS_PER_TOKEN + BASE_UNITS_PER_TOKEN / 2)
        );
        assert_eq!(Amount::from_decimal_str("0").unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Amount::from_decimal_str("abc"),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            Amount::from_decimal_str(""),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            Amount::from_decimal_str("1.2.3"),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(matches!(
            Amount::from_decimal_str("-1"),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            Amount::from_decimal_str("-0.5"),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_parse_rejects_sub_base_unit_precision() {
        // 19 fractional digits cannot be represented
        assert!(matches!(
            Amount::from_decimal_str("0.0000000000000000001"),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_format_trims_trailing_zeros() {
        assert_eq!(
            Amount::from_base_units(BASE_UNITS_PER_TOKEN / 2).to_decimal_string(),
            "0.5"
        );
        assert_eq!(
            Amount::from_base_units(3 * BASE_UNITS_PER_TOKEN).to_decimal_string(),
            "3"
        );
        assert_eq!(Amount::ZERO.to_decimal_string(), "0");
    }

    #[test]
    fn test_parse_format_round_trip() {
        for s in ["0", "1", "0.25", "123456.000000000000000001"] {
            let amount = Amount::from_decimal_str(s).unwrap();
            assert_eq!(amount.to_decimal_string(), s);
        }
    }
}
