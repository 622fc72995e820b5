//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product price.
///
/// Wraps a [`Decimal`] so prices never go through binary floating point on
/// the way to a customer. The catalog treats prices as plain non-negative
/// amounts; currency handling is out of scope for this storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        let price = Price::from(10);
        assert_eq!(price.to_string(), "10.00");

        let price = Price::new(Decimal::new(1999, 2));
        assert_eq!(price.to_string(), "19.99");
    }

    #[test]
    fn test_ordering() {
        assert!(Price::from(8) < Price::from(10));
    }

    #[test]
    fn test_serde_as_string() {
        // rust_decimal with serde-with-str serializes as a string
        let price = Price::new(Decimal::new(1050, 2));
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"10.50\"");

        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
