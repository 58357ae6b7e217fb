use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero, pow};
use thiserror::Error;

// ============================================================================
// Decimal Type
// ============================================================================

/// Fractional digits kept by [`Decimal::quo`] unless the caller asks otherwise.
pub const DIVISION_PRECISION: u32 = 16;

/// Largest exponent magnitude accepted by the parser.
const MAX_EXPONENT: i64 = 10_000;

/// Arbitrary precision signed decimal: `mantissa * 10^-scale`.
///
/// Values are kept normalised (no trailing fractional zeros, zero has scale 0)
/// so that structural equality is numeric equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid decimal `{0}`")]
    Parse(String),

    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("{0} is not a finite number")]
    NotFinite(String),
}

fn ten_pow(exponent: u32) -> BigInt {
    pow(BigInt::from(10u8), exponent as usize)
}

impl Decimal {
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Decimal {
            mantissa: mantissa.into(),
            scale,
        }
        .normalized()
    }

    pub fn zero() -> Self {
        Decimal {
            mantissa: BigInt::zero(),
            scale: 0,
        }
    }

    pub fn one() -> Self {
        Decimal::from(1i64)
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn normalized(mut self) -> Self {
        if self.mantissa.is_zero() {
            self.scale = 0;
            return self;
        }
        let ten = BigInt::from(10u8);
        while self.scale > 0 && (&self.mantissa % &ten).is_zero() {
            self.mantissa /= &ten;
            self.scale -= 1;
        }
        self
    }

    /// Both mantissas rescaled to the larger of the two scales.
    fn aligned(&self, other: &Decimal) -> (BigInt, BigInt, u32) {
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => (self.mantissa.clone(), other.mantissa.clone(), self.scale),
            Ordering::Less => (
                &self.mantissa * ten_pow(other.scale - self.scale),
                other.mantissa.clone(),
                other.scale,
            ),
            Ordering::Greater => (
                self.mantissa.clone(),
                &other.mantissa * ten_pow(self.scale - other.scale),
                self.scale,
            ),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }
}

// ============================================================================
// Arithmetic Operations
// ============================================================================

impl Decimal {
    pub fn add(&self, other: &Decimal) -> Decimal {
        let (a, b, scale) = self.aligned(other);
        Decimal::new(a + b, scale)
    }

    pub fn sub(&self, other: &Decimal) -> Decimal {
        let (a, b, scale) = self.aligned(other);
        Decimal::new(a - b, scale)
    }

    pub fn mul(&self, other: &Decimal) -> Decimal {
        Decimal::new(&self.mantissa * &other.mantissa, self.scale + other.scale)
    }

    pub fn neg(&self) -> Decimal {
        Decimal {
            mantissa: -&self.mantissa,
            scale: self.scale,
        }
    }

    pub fn abs(&self) -> Decimal {
        Decimal {
            mantissa: self.mantissa.abs(),
            scale: self.scale,
        }
    }

    /// Division with [`DIVISION_PRECISION`] fractional digits.
    pub fn quo(&self, other: &Decimal) -> Result<Decimal, DecimalError> {
        self.quo_with_precision(other, DIVISION_PRECISION)
    }

    /// Division rounded half away from zero at `precision` fractional digits.
    pub fn quo_with_precision(
        &self,
        other: &Decimal,
        precision: u32,
    ) -> Result<Decimal, DecimalError> {
        if other.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        // (a / 10^sa) / (b / 10^sb) * 10^p = (a * 10^(sb + p)) / (b * 10^sa)
        let numerator = &self.mantissa * ten_pow(other.scale + precision);
        let denominator = &other.mantissa * ten_pow(self.scale);

        let mut quotient = &numerator / &denominator;
        let remainder = &numerator % &denominator;
        if remainder.abs() * 2 >= denominator.abs() {
            if numerator.is_negative() != denominator.is_negative() {
                quotient -= 1;
            } else {
                quotient += 1;
            }
        }
        Ok(Decimal::new(quotient, precision))
    }

    /// Remainder of truncated division; takes the sign of the dividend.
    pub fn rem(&self, other: &Decimal) -> Result<Decimal, DecimalError> {
        if other.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        let (a, b, scale) = self.aligned(other);
        Ok(Decimal::new(a % b, scale))
    }

    /// Largest integer not greater than the value.
    pub fn floor(&self) -> Decimal {
        let (quotient, remainder) = self.split_integer();
        if remainder.is_negative() {
            Decimal::new(quotient - 1, 0)
        } else {
            Decimal::new(quotient, 0)
        }
    }

    /// Smallest integer not less than the value.
    pub fn ceil(&self) -> Decimal {
        let (quotient, remainder) = self.split_integer();
        if remainder.is_positive() {
            Decimal::new(quotient + 1, 0)
        } else {
            Decimal::new(quotient, 0)
        }
    }

    /// Integer part truncated toward zero.
    pub fn trunc(&self) -> Decimal {
        Decimal::new(self.split_integer().0, 0)
    }

    fn split_integer(&self) -> (BigInt, BigInt) {
        if self.scale == 0 {
            return (self.mantissa.clone(), BigInt::zero());
        }
        let divisor = ten_pow(self.scale);
        (&self.mantissa / &divisor, &self.mantissa % &divisor)
    }
}

// ============================================================================
// Conversions
// ============================================================================

macro_rules! integer_conversion {
    ($($name:ident => $target:ty),* $(,)?) => {
        $(
            /// Truncates toward zero; fails when the integer part does not fit.
            pub fn $name(&self) -> Result<$target, DecimalError> {
                self.split_integer()
                    .0
                    .$name()
                    .ok_or_else(|| DecimalError::OutOfRange {
                        value: self.to_string(),
                        target: stringify!($target),
                    })
            }
        )*
    };
}

impl Decimal {
    integer_conversion! {
        to_i8 => i8,
        to_i16 => i16,
        to_i32 => i32,
        to_i64 => i64,
        to_u8 => u8,
        to_u16 => u16,
        to_u32 => u32,
        to_u64 => u64,
        to_usize => usize,
    }

    pub fn to_f64(&self) -> Result<f64, DecimalError> {
        let value: f64 = self
            .to_string()
            .parse()
            .map_err(|_| DecimalError::Parse(self.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DecimalError::OutOfRange {
                value: self.to_string(),
                target: "f64",
            })
        }
    }

    pub fn to_f32(&self) -> Result<f32, DecimalError> {
        let value: f32 = self
            .to_string()
            .parse()
            .map_err(|_| DecimalError::Parse(self.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DecimalError::OutOfRange {
                value: self.to_string(),
                target: "f32",
            })
        }
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<usize> for Decimal {
    fn from(value: usize) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Decimal::new(value, 0)
    }
}

impl TryFrom<f64> for Decimal {
    type Error = DecimalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(DecimalError::NotFinite(value.to_string()));
        }
        // Display for f64 is the shortest representation that round-trips
        value.to_string().parse()
    }
}

// ============================================================================
// Parsing and Display
// ============================================================================

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecimalError::Parse(s.to_string());
        let text = s.trim();

        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (number, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let exponent: i64 = unsigned[pos + 1..].parse().map_err(|_| invalid())?;
                if exponent.abs() > MAX_EXPONENT {
                    return Err(invalid());
                }
                (&unsigned[..pos], exponent)
            }
            None => (unsigned, 0),
        };

        let (integer, fraction) = match number.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (number, ""),
        };
        if integer.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = format!("{integer}{fraction}");
        let mut mantissa: BigInt = if digits.is_empty() {
            BigInt::zero()
        } else {
            digits.parse().map_err(|_| invalid())?
        };
        if negative {
            mantissa = -mantissa;
        }

        let scale = fraction.len() as i64 - exponent;
        if scale >= 0 {
            Ok(Decimal::new(mantissa, scale as u32))
        } else {
            Ok(Decimal::new(mantissa * ten_pow((-scale) as u32), 0))
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let digits = self.mantissa.abs().to_string();
        let sign = if self.mantissa.is_negative() { "-" } else { "" };
        if self.scale == 0 {
            return write!(f, "{sign}{digits}");
        }

        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale - digits.len() + 1))
        } else {
            digits
        };
        let (integer, fraction) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{integer}.{fraction}")
    }
}

// ============================================================================
// Equality and Comparison
// ============================================================================

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalisation_strips_trailing_zeros() {
        assert_eq!(dec("1.500"), dec("1.5"));
        assert_eq!(dec("1.500").scale(), 1);
        assert_eq!(dec("-0.000").to_string(), "0");
        assert_eq!(dec("100").to_string(), "100");
    }

    #[test]
    fn test_display_pads_small_fractions() {
        assert_eq!(dec("0.05").to_string(), "0.05");
        assert_eq!(dec("-0.5").to_string(), "-0.5");
        assert_eq!(dec(".25").to_string(), "0.25");
    }

    #[test]
    fn test_exponent_forms() {
        assert_eq!(dec("1e3").to_string(), "1000");
        assert_eq!(dec("1.5E-3").to_string(), "0.0015");
        assert!("1e100000".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "-", ".", "1.2.3", "abc", "1e", "0x10"] {
            assert!(input.parse::<Decimal>().is_err(), "{input} should not parse");
        }
    }
}
