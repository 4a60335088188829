//! Canonical, order-independent pool identity.
//!
//! The contract may return a pair in either order, and user input may arrive
//! in either order and any letter case. Everything in the SDK that compares
//! pairs does so through [`PairKey`], never through raw tuples, so those
//! ambiguities cannot leak into existence checks or submissions.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::codec::FixedPoint;
use crate::error::{Error, Result};

/// Canonically ordered token pair: `token0 < token1` by address bytes.
///
/// Hex address strings are normalized into [`Address`] at the input boundary,
/// so comparing the parsed bytes is case-insensitive by construction, and the
/// byte order matches the lexical order of the lowercased hex form.
/// `PairKey::new(a, b) == PairKey::new(b, a)` for any two distinct addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    token0: Address,
    token1: Address,
}

impl PairKey {
    /// Build the canonical identity for an unordered pair.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPair`] if both sides are the same address.
    pub fn new(a: Address, b: Address) -> Result<Self> {
        if a == b {
            return Err(Error::InvalidPair(format!(
                "both sides of the pair are {a}"
            )));
        }
        let (token0, token1) = if a < b { (a, b) } else { (b, a) };
        Ok(PairKey { token0, token1 })
    }

    /// Canonicalize a pair together with its per-token amounts.
    ///
    /// When the pair is reordered, each amount travels with its token, so the
    /// returned `(amount0, amount1)` always line up with `(token0, token1)`.
    pub fn new_with_amounts(
        a: Address,
        amount_a: FixedPoint,
        b: Address,
        amount_b: FixedPoint,
    ) -> Result<(Self, FixedPoint, FixedPoint)> {
        let key = Self::new(a, b)?;
        if key.token0 == a {
            Ok((key, amount_a, amount_b))
        } else {
            Ok((key, amount_b, amount_a))
        }
    }

    /// Lower-address token.
    pub const fn token0(&self) -> Address {
        self.token0
    }

    /// Higher-address token.
    pub const fn token1(&self) -> Address {
        self.token1
    }

    /// Whether `addr` is one of the two tokens.
    pub fn contains(&self, addr: Address) -> bool {
        self.token0 == addr || self.token1 == addr
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.token0, self.token1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn order_independent() {
        let (a, b) = (addr(1), addr(2));
        assert_eq!(PairKey::new(a, b).unwrap(), PairKey::new(b, a).unwrap());
    }

    #[test]
    fn sorts_by_address() {
        let key = PairKey::new(addr(9), addr(3)).unwrap();
        assert_eq!(key.token0(), addr(3));
        assert_eq!(key.token1(), addr(9));
    }

    #[test]
    fn rejects_self_pair() {
        assert!(matches!(
            PairKey::new(addr(7), addr(7)),
            Err(Error::InvalidPair(_))
        ));
    }

    #[test]
    fn letter_case_does_not_matter() {
        // Same address, different hex casing: parsing normalizes both.
        let lower = Address::from_str("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap();
        let mixed = Address::from_str("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").unwrap();
        let other = addr(1);
        assert_eq!(
            PairKey::new(lower, other).unwrap(),
            PairKey::new(mixed, other).unwrap()
        );
    }

    #[test]
    fn amounts_travel_with_their_token() {
        let (low, high) = (addr(1), addr(2));
        let ten = FixedPoint::parse("10").unwrap();
        let twenty = FixedPoint::parse("20").unwrap();

        // Given in reversed order: `high` carries 10, `low` carries 20.
        let (key, amount0, amount1) =
            PairKey::new_with_amounts(high, ten, low, twenty).unwrap();
        assert_eq!(key.token0(), low);
        assert_eq!(amount0, twenty);
        assert_eq!(amount1, ten);
    }

    #[test]
    fn contains_both_sides_only() {
        let key = PairKey::new(addr(1), addr(2)).unwrap();
        assert!(key.contains(addr(1)));
        assert!(key.contains(addr(2)));
        assert!(!key.contains(addr(3)));
    }
}
