//! Conversion between stored values and requested kinds.
//!
//! All coercion goes through two entry points:
//!
//! - [`coerce`] converts a [`Value`] into another [`Value`] of a given
//!   [`Kind`]; it is applied on every write and when a sequence fixes its kind.
//! - [`FromValue`] converts a stored [`Value`] into a Rust type on read.
//!
//! The rules are the same in both directions:
//!
//! | from \ to | string         | number             | boolean          | enum            |
//! |-----------|----------------|--------------------|------------------|-----------------|
//! | string    | identity       | decimal parse      | literal sets     | name match      |
//! | number    | decimal text   | identity           | `1`/`0` only     | -               |
//! | boolean   | `true`/`false` | `1`/`0`            | identity         | -               |
//! | enum      | constant name  | -                  | literal sets     | name match      |
//! | document  | compact JSON   | -                  | -                | -               |
//!
//! Boolean literal sets are `false/0/off/no/disabled/unset` and
//! `true/1/on/yes/enabled/set`, matched case-insensitively after trimming.
//!
//! ```rust
//! use semidoc::{FromValue, Value};
//!
//! assert_eq!(bool::from_value(&Value::from(" Enabled "))?, true);
//! assert_eq!(u8::from_value(&Value::from("200"))?, 200);
//! assert!(u8::from_value(&Value::from("300")).is_err());
//! assert!(i32::from_value(&Value::from(2.5)).is_err());
//! # Ok::<(), semidoc::Error>(())
//! ```

use crate::value::{Constant, EnumConstant, Kind};
use crate::{Document, Error, Number, Result, Value};
use num_bigint::BigInt;

const FALSE_LITERALS: [&str; 6] = ["false", "0", "off", "no", "disabled", "unset"];
const TRUE_LITERALS: [&str; 6] = ["true", "1", "on", "yes", "enabled", "set"];

/// Converts `value` to `kind`. Nulls pass through unchanged.
///
/// # Errors
///
/// Returns [`Error::Conversion`] (without a key) when no rule applies.
pub fn coerce(value: Value, kind: Kind) -> Result<Value> {
    if value.is_null() || value.kind() == Some(kind) {
        return Ok(value);
    }
    match kind {
        Kind::String => Ok(Value::String(value.to_string())),
        Kind::Number => Number::from_value(&value).map(Value::Number),
        Kind::Boolean => bool::from_value(&value).map(Value::Bool),
        Kind::Enum => Constant::from_value(&value).map(Value::Enum),
        Kind::Document => Err(mismatch(&value, kind.name())),
    }
}

/// Parses a boolean from one of the accepted literal sets.
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if FALSE_LITERALS.iter().any(|l| l.eq_ignore_ascii_case(text)) {
        Some(false)
    } else if TRUE_LITERALS.iter().any(|l| l.eq_ignore_ascii_case(text)) {
        Some(true)
    } else {
        None
    }
}

/// Normalises a constant name for matching: trimmed, with internal whitespace
/// runs collapsed to `_`.
#[must_use]
pub fn normalize_constant_name(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Finds the variant of `E` whose name matches `value`.
///
/// # Errors
///
/// Returns [`Error::Conversion`] if the value is not text or names no variant.
pub fn enum_from_value<E: EnumConstant>(value: &Value) -> Result<E> {
    let name = match value {
        Value::Enum(constant) => constant.name(),
        Value::String(text) => text.as_str(),
        other => return Err(mismatch(other, E::TYPE_NAME)),
    };
    let wanted = normalize_constant_name(name);
    E::variants()
        .iter()
        .find(|variant| variant.name().eq_ignore_ascii_case(&wanted))
        .copied()
        .ok_or_else(|| mismatch(value, E::TYPE_NAME))
}

fn mismatch(value: &Value, to: &'static str) -> Error {
    Error::conversion(value.type_name(), to, value)
}

/// A type that can be read out of a stored [`Value`].
pub trait FromValue: Sized {
    /// The target name used in conversion errors.
    const KIND: &'static str;

    /// Converts the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] when the value cannot represent `Self`.
    fn from_value(value: &Value) -> Result<Self>;
}

impl FromValue for Value {
    const KIND: &'static str = "value";

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    const KIND: &'static str = "string";

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Err(mismatch(value, Self::KIND)),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for bool {
    const KIND: &'static str = "boolean";

    fn from_value(value: &Value) -> Result<Self> {
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => parse_bool(s),
            Value::Number(n) => parse_bool(&n.normalized().to_string()),
            Value::Enum(c) => parse_bool(c.name()),
            _ => None,
        };
        parsed.ok_or_else(|| mismatch(value, Self::KIND))
    }
}

impl FromValue for Number {
    const KIND: &'static str = "number";

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(n.clone()),
            Value::String(s) => s.trim().parse().map_err(|_| mismatch(value, Self::KIND)),
            Value::Bool(b) => Ok(Number::from(u8::from(*b))),
            other => Err(mismatch(other, Self::KIND)),
        }
    }
}

impl FromValue for BigInt {
    const KIND: &'static str = "integer";

    fn from_value(value: &Value) -> Result<Self> {
        Number::from_value(value)
            .map_err(|_| mismatch(value, Self::KIND))?
            .to_bigint()
            .ok_or_else(|| mismatch(value, Self::KIND))
    }
}

macro_rules! impl_from_value_integer {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                const KIND: &'static str = stringify!($t);

                fn from_value(value: &Value) -> Result<Self> {
                    let integer = BigInt::from_value(value).map_err(|_| mismatch(value, Self::KIND))?;
                    <$t>::try_from(&integer).map_err(|_| mismatch(value, Self::KIND))
                }
            }
        )*
    };
}

impl_from_value_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl FromValue for f64 {
    const KIND: &'static str = "f64";

    fn from_value(value: &Value) -> Result<Self> {
        let number = Number::from_value(value).map_err(|_| mismatch(value, Self::KIND))?;
        let float = number.to_f64();
        if float.is_finite() {
            Ok(float)
        } else {
            Err(mismatch(value, Self::KIND))
        }
    }
}

impl FromValue for f32 {
    const KIND: &'static str = "f32";

    fn from_value(value: &Value) -> Result<Self> {
        let number = Number::from_value(value).map_err(|_| mismatch(value, Self::KIND))?;
        let float: f32 = number
            .to_string()
            .parse()
            .map_err(|_| mismatch(value, Self::KIND))?;
        if float.is_finite() {
            Ok(float)
        } else {
            Err(mismatch(value, Self::KIND))
        }
    }
}

impl FromValue for Constant {
    const KIND: &'static str = "enum";

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Enum(c) => Ok(c.clone()),
            Value::String(s) if !s.trim().is_empty() => {
                Ok(Constant::untyped(normalize_constant_name(s)))
            }
            other => Err(mismatch(other, Self::KIND)),
        }
    }
}

impl FromValue for Document {
    const KIND: &'static str = "document";

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Document(d) => Ok(d.clone()),
            other => Err(mismatch(other, Self::KIND)),
        }
    }
}
