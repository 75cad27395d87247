//! Arbitrary-precision decimal numbers.
//!
//! A [`Number`] is an unscaled [`BigInt`] together with a decimal scale, so
//! `3.40` is stored as `340 × 10⁻²`. Parsing accepts the usual decimal and
//! exponent notation; display always uses plain decimal notation. Equality is
//! numeric, so `1.50 == 1.5`.
//!
//! ```rust
//! use semidoc::Number;
//!
//! let n: Number = "12345678901234567890.25".parse()?;
//! assert_eq!(n.to_string(), "12345678901234567890.25");
//! assert_eq!("1.50".parse::<Number>()?, Number::from_f64(1.5).unwrap());
//! assert_eq!("2.5e3".parse::<Number>()?.to_i64(), Some(2500));
//! # Ok::<(), semidoc::Error>(())
//! ```

use crate::{Error, Result};
use num_bigint::{BigInt, Sign};
use std::fmt;
use std::str::FromStr;

// Bound on |exponent| accepted by the parser; larger exponents would expand
// into absurdly long digit strings.
const MAX_EXPONENT: i64 = 4096;

/// An arbitrary-precision decimal value.
#[derive(Clone, Debug)]
pub struct Number {
    unscaled: BigInt,
    scale: u32,
}

impl Number {
    /// Creates a number equal to `unscaled × 10^-scale`.
    #[must_use]
    pub fn new(unscaled: BigInt, scale: u32) -> Self {
        Number { unscaled, scale }
    }

    /// Converts a finite float using its shortest round-trip representation.
    ///
    /// Returns `None` for NaN and infinities.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::Number;
    ///
    /// assert_eq!(Number::from_f64(0.1).unwrap().to_string(), "0.1");
    /// assert!(Number::from_f64(f64::NAN).is_none());
    /// ```
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // f64's Display never uses exponent notation.
        value.to_string().parse().ok()
    }

    /// The number of digits after the decimal point.
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Returns `true` if the value has no fractional part.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.normalized().scale == 0
    }

    /// Strips trailing fractional zeros.
    #[must_use]
    pub fn normalized(&self) -> Number {
        let ten = BigInt::from(10);
        let zero = BigInt::from(0);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        while scale > 0 && &unscaled % &ten == zero {
            unscaled /= &ten;
            scale -= 1;
        }
        Number { unscaled, scale }
    }

    /// The exact integer value, if there is no fractional part.
    #[must_use]
    pub fn to_bigint(&self) -> Option<BigInt> {
        let normalized = self.normalized();
        (normalized.scale == 0).then_some(normalized.unscaled)
    }

    /// The exact `i64` value, if the number is an integer in range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::Number;
    ///
    /// assert_eq!(Number::from(42).to_i64(), Some(42));
    /// assert_eq!(Number::from_f64(42.5).unwrap().to_i64(), None);
    /// ```
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.to_bigint().and_then(|i| i64::try_from(&i).ok())
    }

    /// The nearest `f64`; very large magnitudes become infinite.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    fn digits(&self) -> String {
        let magnitude = self.unscaled.magnitude().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return magnitude;
        }
        let padded = if magnitude.len() <= scale {
            format!("{}{}", "0".repeat(scale - magnitude.len() + 1), magnitude)
        } else {
            magnitude
        };
        let point = padded.len() - scale;
        format!("{}.{}", &padded[..point], &padded[point..])
    }
}

impl FromStr for Number {
    type Err = Error;

    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`; a leading or trailing
    /// point (`.5`, `5.`) is accepted.
    fn from_str(input: &str) -> Result<Self> {
        let invalid = || Error::conversion("string", "number", input);

        let (mantissa, exponent) = match input.find(&['e', 'E'][..]) {
            Some(at) => {
                let exp = &input[at + 1..];
                let digits = exp.strip_prefix(&['+', '-'][..]).unwrap_or(exp);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let exponent: i64 = exp.parse().map_err(|_| invalid())?;
                if exponent.abs() > MAX_EXPONENT {
                    return Err(invalid());
                }
                (&input[..at], exponent)
            }
            None => (input, 0),
        };

        let (negative, unsigned) = match mantissa.as_bytes().first() {
            Some(b'-') => (true, &mantissa[1..]),
            Some(b'+') => (false, &mantissa[1..]),
            _ => (false, mantissa),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut unscaled: BigInt = format!("{}{}", whole, fraction)
            .parse()
            .map_err(|_| invalid())?;
        if negative {
            unscaled = -unscaled;
        }

        let scale = fraction.len() as i64 - exponent;
        if scale >= 0 {
            let scale = u32::try_from(scale).map_err(|_| invalid())?;
            Ok(Number { unscaled, scale })
        } else {
            let shift = u32::try_from(-scale).map_err(|_| invalid())?;
            Ok(Number {
                unscaled: unscaled * BigInt::from(10).pow(shift),
                scale: 0,
            })
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unscaled.sign() == Sign::Minus {
            f.write_str("-")?;
        }
        f.write_str(&self.digits())
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.scale == b.scale && a.unscaled == b.unscaled
    }
}

impl Eq for Number {}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(value: $t) -> Self {
                    Number { unscaled: BigInt::from(value), scale: 0 }
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number {
            unscaled: value,
            scale: 0,
        }
    }
}

impl TryFrom<f64> for Number {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Number::from_f64(value).ok_or_else(|| Error::conversion("f64", "number", value))
    }
}

impl TryFrom<f32> for Number {
    type Error = Error;

    fn try_from(value: f32) -> Result<Self> {
        // Going through the f32's own text keeps 0.1f32 as 0.1.
        if !value.is_finite() {
            return Err(Error::conversion("f32", "number", value));
        }
        value.to_string().parse()
    }
}
