use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Exact decimal money amount.
///
/// Use this type for **all** monetary values in the ledger (expense costs,
/// contributions, totals, settlement transfers) to avoid floating-point
/// drift. Values keep their full precision: halving an odd number of cents
/// yields a half cent, and rounding only happens when the amount is
/// displayed.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::from_minor(4_350_00);
/// assert_eq!(amount.to_string(), "$4,350.00");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap(), Money::from_minor(1000));
/// assert_eq!("10,5".parse::<Money>().unwrap(), Money::from_minor(1050));
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps an exact decimal value.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates an amount from integer minor units (cents).
    #[must_use]
    pub fn from_minor(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Returns the exact decimal value.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[must_use]
    pub fn abs(self) -> Money {
        Money(self.0.abs())
    }

    /// Exact half of the amount, without rounding.
    #[must_use]
    pub fn half(self) -> Money {
        Money(self.0 / Decimal::TWO)
    }

    /// Value rounded to cents, half away from zero.
    #[must_use]
    pub fn rounded(self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Largest magnitude the ledger stores: one quadrillion.
    #[must_use]
    pub fn limit() -> Money {
        Money(Decimal::new(1_000_000_000_000_000, 0))
    }

    #[must_use]
    pub fn within_limit(self) -> bool {
        self.0.abs() <= Self::limit().0
    }

    /// Addition clamped to the `Decimal` range instead of panicking.
    #[must_use]
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    /// Check an amount entered for a new record: positive, at most two
    /// decimals and within [`Money::limit`].
    pub(crate) fn validate_input(self) -> ResultEngine<Money> {
        if !self.is_positive() {
            return Err(EngineError::validation("amount must be greater than zero"));
        }
        if self.0.normalize().scale() > 2 {
            return Err(EngineError::validation("amount must have at most two decimals"));
        }
        if !self.within_limit() {
            return Err(EngineError::validation("amount is too large"));
        }
        Ok(self)
    }
}

impl fmt::Display for Money {
    /// Formats as `$1,234.50`, rounding to cents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let plain = format!("{:.2}", rounded.abs());
        let (units, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (idx, digit) in units.chars().enumerate() {
            if idx > 0 && (units.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        write!(f, "{sign}${grouped}.{cents}")
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses an amount typed by a user, e.g. `12,50`, `$7.25` or `-3`.
    ///
    /// At most two fractional digits are accepted. Anything beyond
    /// [`Money::limit`] is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || EngineError::validation(format!("'{input}' is not a valid amount"));

        let (sign, unsigned) = match input.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", input.strip_prefix('+').unwrap_or(input)),
        };
        let unsigned = unsigned.trim_start();
        let digits = unsigned.strip_prefix('$').unwrap_or(unsigned).trim();
        if digits.is_empty() {
            return Err(EngineError::validation("amount is required"));
        }

        let digits = digits.replacen(',', ".", 1);
        let (units, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if units.is_empty() || !all_digits(units) || !all_digits(fraction) {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(EngineError::validation("amount must have at most two decimals"));
        }

        let value = Decimal::from_str(&format!("{sign}{units}.{fraction:0<2}"))
            .map_err(|_| EngineError::validation("amount is too large"))?;
        let money = Money(value);
        if !money.within_limit() {
            return Err(EngineError::validation("amount is too large"));
        }
        Ok(money)
    }
}
