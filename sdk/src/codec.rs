//! Decimal codec: human decimal strings ⇄ the contract's fixed-point scale.
//!
//! Every amount that crosses the contract boundary is an 18-decimal
//! fixed-point integer (wei-style). Decimal strings exist only on this side
//! of the codec; nothing else in the SDK parses or formats amounts.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `10^18` — one whole token in contract units.
pub const SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

const DECIMALS: usize = 18;

/// An amount in the contract's 18-decimal fixed-point representation.
///
/// Wraps the raw 256-bit integer; construct from user input with
/// [`FixedPoint::parse`] / [`FixedPoint::parse_positive`], and render for
/// display with `to_string()`. Parsing and display round-trip losslessly:
/// `FixedPoint::parse(&x.to_string()) == Ok(x)` for every value.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FixedPoint(U256);

impl FixedPoint {
    pub const ZERO: FixedPoint = FixedPoint(U256::ZERO);

    /// Wrap a raw contract-scale integer.
    pub const fn from_raw(raw: U256) -> Self {
        FixedPoint(raw)
    }

    /// The raw contract-scale integer.
    pub const fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Convert a decimal string (e.g. `"1.5"`) to fixed point.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAmount`] if the string is empty, not a plain decimal
    /// number, carries more than 18 fractional digits, or overflows 256 bits.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidAmount("empty amount".into()));
        }

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };

        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty()
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(Error::InvalidAmount(format!(
                "'{trimmed}' is not a decimal number"
            )));
        }
        if frac_part.len() > DECIMALS {
            return Err(Error::InvalidAmount(format!(
                "'{trimmed}' has more than {DECIMALS} decimal places"
            )));
        }

        let overflow = || Error::InvalidAmount(format!("'{trimmed}' overflows the amount range"));

        let int_value = if int_part.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(int_part, 10).map_err(|_| overflow())?
        };
        let frac_value = if frac_part.is_empty() {
            U256::ZERO
        } else {
            // Right-pad to 18 digits: "5" ⇒ 0.5 ⇒ 5 × 10^17.
            let digits = U256::from_str_radix(frac_part, 10).map_err(|_| overflow())?;
            digits * pow10(DECIMALS - frac_part.len())
        };

        int_value
            .checked_mul(SCALE)
            .and_then(|scaled| scaled.checked_add(frac_value))
            .map(FixedPoint)
            .ok_or_else(overflow)
    }

    /// [`FixedPoint::parse`], additionally rejecting zero.
    ///
    /// Used by every operation input that must be strictly positive.
    pub fn parse_positive(s: &str) -> Result<Self> {
        let value = Self::parse(s)?;
        if value.is_zero() {
            return Err(Error::InvalidAmount(format!(
                "'{}' must be greater than 0",
                s.trim()
            )));
        }
        Ok(value)
    }
}

fn pow10(exp: usize) -> U256 {
    U256::from(10u64).pow(U256::from(exp as u64))
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac.is_zero() {
            return write!(f, "{int}");
        }
        let digits = frac.to_string();
        let padded = format!("{}{digits}", "0".repeat(DECIMALS - digits.len()));
        write!(f, "{int}.{}", padded.trim_end_matches('0'))
    }
}

impl FromStr for FixedPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FixedPoint::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(n: u128) -> U256 {
        U256::from(n)
    }

    #[test]
    fn parses_whole_numbers() {
        assert_eq!(FixedPoint::parse("1").unwrap().raw(), SCALE);
        assert_eq!(
            FixedPoint::parse("42").unwrap().raw(),
            raw(42) * SCALE
        );
    }

    #[test]
    fn parses_fractions() {
        assert_eq!(
            FixedPoint::parse("1.5").unwrap().raw(),
            raw(1_500_000_000_000_000_000)
        );
        assert_eq!(
            FixedPoint::parse(".5").unwrap().raw(),
            raw(500_000_000_000_000_000)
        );
        assert_eq!(FixedPoint::parse("0.000000000000000001").unwrap().raw(), raw(1));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "  ", "abc", "1.2.3", "-1", "1e18", ".", "1,5"] {
            assert!(
                matches!(FixedPoint::parse(bad), Err(Error::InvalidAmount(_))),
                "expected InvalidAmount for {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_excess_precision() {
        assert!(matches!(
            FixedPoint::parse("0.0000000000000000001"),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn zero_parses_but_is_not_positive() {
        assert!(FixedPoint::parse("0").unwrap().is_zero());
        assert!(FixedPoint::parse("0.0").unwrap().is_zero());
        assert!(matches!(
            FixedPoint::parse_positive("0"),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(FixedPoint::parse("1.50").unwrap().to_string(), "1.5");
        assert_eq!(FixedPoint::parse("7").unwrap().to_string(), "7");
        assert_eq!(FixedPoint::parse("0.25").unwrap().to_string(), "0.25");
    }

    #[test]
    fn round_trips_through_display() {
        for s in ["0", "1", "1.5", "0.000000000000000001", "123456789.987654321"] {
            let x = FixedPoint::parse(s).unwrap();
            assert_eq!(FixedPoint::parse(&x.to_string()).unwrap(), x, "round trip of {s}");
        }
        // And from an arbitrary raw value that has no short decimal form.
        let x = FixedPoint::from_raw(raw(123_456_789_012_345_678_901));
        assert_eq!(FixedPoint::parse(&x.to_string()).unwrap(), x);
    }
}
