//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are stored currency-agnostic as [`Decimal`] on listings; a
//! [`Price`] pairs an amount with a currency only when it's time to show it.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a US dollar price.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Format for display with a currency symbol, thousands separators and
    /// exactly two decimal places (e.g., `$1,234.50`).
    #[must_use]
    pub fn display(&self) -> String {
        let mut rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        let digits = rounded.abs().to_string();
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        format!(
            "{sign}{}{}.{cents}",
            self.currency_code.symbol(),
            group_thousands(whole)
        )
    }

    /// The amount in minor units (cents), rounded half away from zero.
    ///
    /// Negative amounts clamp to zero; amounts too large for `u64` cents
    /// saturate at `u64::MAX`.
    #[must_use]
    pub fn to_cents(&self) -> u64 {
        if self.amount.is_sign_negative() {
            return 0;
        }
        self.amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cents| cents.to_u64())
            .unwrap_or(u64::MAX)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `,` between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes. Listings are priced in US dollars only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
}

impl CurrencyCode {
    /// Currency symbol used as a display prefix.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Price {
        Price::usd(Decimal::new(cents, 2))
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(usd(1999).display(), "$19.99");
        assert_eq!(usd(2550).display(), "$25.50");
        assert_eq!(Price::usd(Decimal::from(5)).display(), "$5.00");
        assert_eq!(usd(0).display(), "$0.00");
    }

    #[test]
    fn test_display_thousands_separator() {
        assert_eq!(usd(123_450).display(), "$1,234.50");
        assert_eq!(usd(100_000_000).display(), "$1,000,000.00");
        assert_eq!(usd(99_999).display(), "$999.99");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Price::usd(Decimal::new(10_005, 3)).display(), "$10.01");
        assert_eq!(Price::usd(Decimal::new(10_004, 3)).display(), "$10.00");
    }

    #[test]
    fn test_display_negative_amount() {
        assert_eq!(usd(-450).display(), "-$4.50");
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(usd(1999).to_cents(), 1999);
        assert_eq!(Price::usd(Decimal::new(5_555, 3)).to_cents(), 556);
        assert_eq!(usd(-100).to_cents(), 0);
        assert_eq!(Price::usd("-0".parse().unwrap()).to_cents(), 0);
    }

    #[test]
    fn test_to_cents_saturates_on_huge_amounts() {
        assert_eq!(Price::usd(Decimal::MAX).to_cents(), u64::MAX);
        assert_eq!(Price::usd(Decimal::from(u64::MAX)).to_cents(), u64::MAX);
        assert_eq!(Price::usd(Decimal::MIN).to_cents(), 0);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
