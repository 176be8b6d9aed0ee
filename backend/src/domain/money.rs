//! Integer-cent monetary amounts.
//!
//! All persisted money is stored as whole cents. Dollar values from clients
//! or vendor APIs are converted once at the boundary with `round(d * 100)`.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg};

use serde::{Deserialize, Serialize};

/// Largest dollar magnitude accepted for conversion. Keeps `d * 100` inside
/// the range `f64` represents exactly.
const MAX_DOLLARS: f64 = 90_071_992_547_409.0;

/// Errors raised when converting dollar amounts into [`Cents`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MoneyError {
    /// The value was NaN or infinite.
    #[error("amount must be a finite number")]
    NotFinite,
    /// The value exceeds the supported magnitude.
    #[error("amount {0} is out of range")]
    OutOfRange(f64),
}

/// Monetary value in integer cents.
///
/// # Examples
/// ```
/// use patrimony::domain::Cents;
///
/// let cents = Cents::from_dollars(1234.56).expect("finite amount");
/// assert_eq!(cents.get(), 123_456);
/// assert_eq!(cents.to_dollars(), 1234.56);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw cent count.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a dollar amount, rounding half away from zero to whole cents.
    pub fn from_dollars(dollars: f64) -> Result<Self, MoneyError> {
        if !dollars.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        if dollars.abs() > MAX_DOLLARS {
            return Err(MoneyError::OutOfRange(dollars));
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "magnitude bounded by MAX_DOLLARS"
        )]
        let cents = (dollars * 100.0).round() as i64;
        Ok(Self(cents))
    }

    /// Convert an optional vendor balance, keeping `None` as `None`.
    pub fn from_optional_dollars(dollars: Option<f64>) -> Result<Option<Self>, MoneyError> {
        dollars.map(Self::from_dollars).transpose()
    }

    /// Raw cent count.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Dollar value as a float, for JSON responses.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "values stay within the exactly representable range"
    )]
    pub fn to_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// True when strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// True when strictly less than zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Share of `total` as a percentage, or zero when `total` is not positive.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "ratio of two cent counts; precision loss is immaterial"
    )]
    pub fn percentage_of(self, total: Self) -> f64 {
        if total.0 <= 0 {
            return 0.0;
        }
        self.0 as f64 / total.0 as f64 * 100.0
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Neg for Cents {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Renders as dollars with thousands separators, dropping trailing zero
/// cents: `1,234,567`, `1,234.5`, `-12.05`.
impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / 100;
        let fraction = magnitude % 100;
        if self.0 < 0 {
            f.write_str("-")?;
        }
        f.write_str(&group_thousands(whole))?;
        match fraction {
            0 => Ok(()),
            f_cents if f_cents % 10 == 0 => write!(f, ".{}", f_cents / 10),
            f_cents => write!(f, ".{f_cents:02}"),
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
