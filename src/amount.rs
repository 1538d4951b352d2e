use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Sub;
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places an amount carries.
pub const AMOUNT_DECIMALS: usize = 8;
const BASE_UNITS_PER_COIN: i64 = 100_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("Invalid amount: '{0}'")]
    Invalid(String),
    #[error("Amount '{0}' has more than {} decimal places", AMOUNT_DECIMALS)]
    TooPrecise(String),
    #[error("Amount '{0}' is out of range")]
    OutOfRange(String),
}

/// A coin value stored as a whole number of base units (1 coin = 10^8 base units).
///
/// Amounts are signed so that malformed outputs can be represented and rejected,
/// rather than silently clamped at construction. There is no `Add`: totals go through
/// `checked_add` or `checked_sum` and an overflow surfaces as an error.
#[derive(
    Debug, Copy, Clone, Default, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize,
)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(i64::MAX);

    pub const fn from_base_units(base_units: i64) -> Self {
        Self(base_units)
    }

    pub const fn from_coins(coins: i64) -> Self {
        Self(coins * BASE_UNITS_PER_COIN)
    }

    pub fn base_units(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Sums the amounts, returning None on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |total, amount| total.checked_add(amount))
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let units_per_coin = BASE_UNITS_PER_COIN as u64;
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            magnitude / units_per_coin,
            magnitude % units_per_coin,
            width = AMOUNT_DECIMALS
        )
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parses a decimal string such as `39.9`, `-5` or `.25` without going through floats.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        let is_numeric = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_numeric(whole) || !is_numeric(fraction)
        {
            return Err(AmountParseError::Invalid(s.to_string()));
        }
        if fraction.len() > AMOUNT_DECIMALS {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }

        let out_of_range = || AmountParseError::OutOfRange(s.to_string());
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|_| out_of_range())?
        };
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            format!("{:0<width$}", fraction, width = AMOUNT_DECIMALS)
                .parse::<i64>()
                .map_err(|_| out_of_range())?
        };
        let units = whole_units
            .checked_mul(BASE_UNITS_PER_COIN)
            .and_then(|units| units.checked_add(fraction_units))
            .ok_or_else(out_of_range)?;

        Ok(Amount(if negative { -units } else { units }))
    }
}
