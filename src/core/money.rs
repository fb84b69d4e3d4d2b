use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

/// Whole-dollar amount as entered on the form.
///
/// Built from a decimal by dropping the cents: `44.56` becomes `44`, never `45`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WholeDollar(i64);

impl WholeDollar {
    pub const ZERO: WholeDollar = WholeDollar(0);

    pub const fn new(dollars: i64) -> Self {
        WholeDollar(dollars)
    }

    /// Truncate toward zero. Out of range amounts saturate.
    pub fn from_decimal(amount: Decimal) -> Self {
        let truncated = amount.trunc();
        let dollars = truncated.to_i64().unwrap_or(if truncated.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        });
        WholeDollar(dollars)
    }

    /// Round to the nearest dollar, halves going up (`3952.5` becomes `3953`).
    ///
    /// Used only for the contribution lines; everything else truncates.
    pub fn round_half_up(amount: Decimal) -> Self {
        Self::from_decimal((amount + dec!(0.5)).floor())
    }

    pub fn dollars(&self) -> i64 {
        self.0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// `self - other`, floored at zero
    pub fn saturating_excess_over(self, other: WholeDollar) -> WholeDollar {
        (self - other).max(WholeDollar::ZERO)
    }
}

impl From<i64> for WholeDollar {
    fn from(dollars: i64) -> Self {
        WholeDollar(dollars)
    }
}

impl From<Decimal> for WholeDollar {
    fn from(amount: Decimal) -> Self {
        WholeDollar::from_decimal(amount)
    }
}

impl Add for WholeDollar {
    type Output = WholeDollar;

    fn add(self, rhs: WholeDollar) -> WholeDollar {
        WholeDollar(self.0.saturating_add(rhs.0))
    }
}

impl Sub for WholeDollar {
    type Output = WholeDollar;

    fn sub(self, rhs: WholeDollar) -> WholeDollar {
        WholeDollar(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<u32> for WholeDollar {
    type Output = WholeDollar;

    fn mul(self, rhs: u32) -> WholeDollar {
        WholeDollar(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl Sum for WholeDollar {
    fn sum<I: Iterator<Item = WholeDollar>>(iter: I) -> Self {
        iter.fold(WholeDollar::ZERO, Add::add)
    }
}

impl std::fmt::Display for WholeDollar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if self.0 < 0 {
            write!(f, "-${}", grouped)
        } else {
            write!(f, "${}", grouped)
        }
    }
}

impl Serialize for WholeDollar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for WholeDollar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(WholeDollar::from_decimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_truncates() {
        assert_eq!(WholeDollar::from_decimal(dec!(44.560)), WholeDollar::new(44));
        assert_eq!(WholeDollar::from_decimal(dec!(856.9785623)), WholeDollar::new(856));
        assert_eq!(WholeDollar::from_decimal(dec!(9999.99)), WholeDollar::new(9999));
        assert_eq!(WholeDollar::from_decimal(dec!(-3.7)), WholeDollar::new(-3));
    }

    #[test]
    fn round_half_up_rounds_halves_up() {
        assert_eq!(WholeDollar::round_half_up(dec!(3952.3328)), WholeDollar::new(3952));
        assert_eq!(WholeDollar::round_half_up(dec!(3952.5)), WholeDollar::new(3953));
        assert_eq!(WholeDollar::round_half_up(dec!(3953.5)), WholeDollar::new(3954));
        assert_eq!(WholeDollar::round_half_up(dec!(329.99)), WholeDollar::new(330));
    }

    #[test]
    fn arithmetic_stays_whole() {
        let a = WholeDollar::new(1000);
        let b = WholeDollar::new(600);
        assert_eq!(a - b, WholeDollar::new(400));
        assert_eq!(a + b, WholeDollar::new(1600));
        assert_eq!(b * 3, WholeDollar::new(1800));
        assert_eq!(b.saturating_excess_over(a), WholeDollar::ZERO);
        assert_eq!(a.saturating_excess_over(b), WholeDollar::new(400));
    }

    #[test]
    fn display_groups_thousands() {
        assert_eq!(WholeDollar::new(0).to_string(), "$0");
        assert_eq!(WholeDollar::new(329).to_string(), "$329");
        assert_eq!(WholeDollar::new(77194).to_string(), "$77,194");
        assert_eq!(WholeDollar::new(1234567).to_string(), "$1,234,567");
        assert_eq!(WholeDollar::new(-2500).to_string(), "-$2,500");
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let from_number: WholeDollar = serde_json::from_str("700.99").unwrap();
        let from_string: WholeDollar = serde_json::from_str("\"77194.80\"").unwrap();
        assert_eq!(from_number, WholeDollar::new(700));
        assert_eq!(from_string, WholeDollar::new(77194));
        assert_eq!(serde_json::to_string(&from_string).unwrap(), "77194");
    }
}
