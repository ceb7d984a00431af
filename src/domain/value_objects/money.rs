//! Monetary amount value object.
//!
//! Amounts arrive from clients in Brazilian formats ("150,00", "R$ 150,00")
//! as well as plain decimal strings, and are stored as exact decimals.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::error::AppError;

/// An exact monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl FromStr for Amount {
    type Err = AppError;

    /// Accepts "150.00", "150,00" and "R$ 150,00". A comma is treated as the
    /// decimal separator only when no dot is present.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().trim_start_matches("R$").trim();
        let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
            cleaned.replace(',', ".")
        } else {
            // "1.150,00" style: dots are thousands separators
            if cleaned.contains(',') {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.to_string()
            }
        };

        Decimal::from_str(&normalized)
            .map(Self)
            .map_err(|_| AppError::Validation(format!("Invalid monetary amount '{}'", s)))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_plain_decimal() {
        let amount: Amount = "150.00".parse().unwrap();
        assert_eq!(amount.inner(), dec!(150.00));
    }

    #[test]
    fn parses_comma_decimal() {
        let amount: Amount = "150,00".parse().unwrap();
        assert_eq!(amount.inner(), dec!(150.00));
    }

    #[test]
    fn parses_currency_prefix() {
        let amount: Amount = "R$ 89,90".parse().unwrap();
        assert_eq!(amount.inner(), dec!(89.90));
    }

    #[test]
    fn parses_thousands_separator() {
        let amount: Amount = "1.250,50".parse().unwrap();
        assert_eq!(amount.inner(), dec!(1250.50));
    }

    #[test]
    fn rejects_garbage() {
        assert!("abc".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
    }

    #[test]
    fn zero_is_not_positive() {
        let amount: Amount = "0,00".parse().unwrap();
        assert!(!amount.is_positive());
    }

    #[test]
    fn displays_with_two_decimals() {
        let amount = Amount::new(dec!(7.5));
        assert_eq!(amount.to_string(), "7.50");
    }
}
