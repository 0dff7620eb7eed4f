//! Decimal-backed monetary amount.
//!
//! All cart arithmetic runs on `rust_decimal::Decimal` so totals are exact;
//! rounding to two decimal places happens only at display time.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single-currency monetary amount.
///
/// Serializes as a decimal string (`"19.99"`) to preserve precision on the
/// wire; deserialization also accepts bare JSON numbers since the backend is
/// not strict about quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// True if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate so `{:.2}` precision formatting keeps working.
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, qty: u32) -> Self {
        Self(self.0 * Decimal::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Num(f64),
        }

        let amount = match Repr::deserialize(deserializer)? {
            Repr::Str(s) => Decimal::from_str(s.trim()).map_err(serde::de::Error::custom)?,
            Repr::Num(n) => Decimal::try_from(n).map_err(serde::de::Error::custom)?,
        };
        Ok(Self(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).expect("valid decimal"))
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&money("19.99")).expect("serialize");
        assert_eq!(json, "\"19.99\"");
    }

    #[test]
    fn test_deserializes_from_string_and_number() {
        let from_str: Money = serde_json::from_str("\"10.50\"").expect("from string");
        assert_eq!(from_str, money("10.50"));

        let from_num: Money = serde_json::from_str("10.5").expect("from number");
        assert_eq!(from_num, money("10.5"));

        let from_int: Money = serde_json::from_str("25").expect("from integer");
        assert_eq!(from_int, money("25"));
    }

    #[test]
    fn test_arithmetic_is_exact() {
        // 0.1 + 0.2 is exactly 0.3 in decimal arithmetic
        assert_eq!(money("0.1") + money("0.2"), money("0.3"));
        assert_eq!(money("10.00") * 3, money("30.00"));
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(format!("{:.2}", money("18")), "18.00");
        assert_eq!(format!("{:.2}", money("2.5")), "2.50");
    }
}
