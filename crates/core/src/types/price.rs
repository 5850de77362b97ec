//! Book prices, stored in cents.
//!
//! The storefront sells in South African rand, so prices render as `R123.45`.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Amount below zero.
    #[error("price cannot be negative")]
    Negative,
    /// Amount does not fit in the cents column.
    #[error("price is too large")]
    TooLarge,
}

/// A non-negative price in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i32);

impl Price {
    /// Currency symbol used when formatting.
    pub const SYMBOL: &'static str = "R";

    /// Build a price from whole cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for negative amounts.
    pub const fn from_cents(cents: i32) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(cents))
    }

    /// Build a price from a major-unit amount (e.g. `12.99`), rounding
    /// half away from zero to whole cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for negative amounts and
    /// [`PriceError::TooLarge`] when the cents value overflows `i32`.
    pub fn from_major(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let cents = (amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i32()
            .ok_or(PriceError::TooLarge)?;
        Self::from_cents(cents)
    }

    /// Amount in cents.
    #[must_use]
    pub const fn cents(self) -> i32 {
        self.0
    }

    /// Amount in major units with two decimal places.
    #[must_use]
    pub fn as_major(self) -> Decimal {
        Decimal::new(i64::from(self.0), 2)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{:02}", Self::SYMBOL, self.0 / 100, self.0 % 100)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_major_rounds_half_away_from_zero() {
        assert_eq!(Price::from_major(dec("12.345")).unwrap().cents(), 1235);
        assert_eq!(Price::from_major(dec("12.344")).unwrap().cents(), 1234);
        assert_eq!(Price::from_major(dec("0.005")).unwrap().cents(), 1);
        assert_eq!(Price::from_major(dec("199")).unwrap().cents(), 19900);
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Price::from_major(dec("-0.01")), Err(PriceError::Negative));
        assert_eq!(Price::from_cents(-1), Err(PriceError::Negative));
        assert!(Price::from_major(dec("-0")).is_ok());
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            Price::from_major(dec("99999999999")),
            Err(PriceError::TooLarge)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(12345).unwrap().to_string(), "R123.45");
        assert_eq!(Price::from_cents(5).unwrap().to_string(), "R0.05");
        assert_eq!(Price::default().to_string(), "R0.00");
    }

    #[test]
    fn test_as_major() {
        assert_eq!(Price::from_cents(1999).unwrap().as_major(), dec("19.99"));
    }
}
