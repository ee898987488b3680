use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// currency amount, held to 2 decimal places
///
/// every operation rounds back to cents, so sub-cent residue can never
/// accumulate across allocations or penalty math
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    /// one cent, the settlement tolerance for "fully paid"
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(2))
    }

    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(2)))
    }

    /// whole currency units (shillings, dollars, ...)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    pub fn from_cents(amount: i64) -> Self {
        Money(Decimal::from(amount) / Decimal::from(100))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative()
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// subtract, flooring the result at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        (self - other).max(Money::ZERO)
    }

    /// apply a rate (e.g. a 5% penalty on a base amount), rounded to cents
    pub fn apply(&self, rate: Rate) -> Self {
        Money((self.0 * rate.as_decimal()).round_dp(2))
    }

    /// settled within the one-cent tolerance
    pub fn is_settled_by(&self, paid: Money) -> bool {
        paid + Money::CENT > *self
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(2))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(2))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        *self = *self - other;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// penalty percentage as a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// from a ratio (0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// from a whole percentage (5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

// step percentages combine additively, never compounding
impl Add for Rate {
    type Output = Rate;

    fn add(self, other: Rate) -> Rate {
        Rate(self.0 + other.0)
    }
}
