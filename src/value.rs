//! Dynamic value representation for document entries.
//!
//! This module provides the [`Value`] enum stored at every key of a
//! [`Document`], together with:
//!
//! - [`Kind`]: the element kind a [`Sequence`] is declared with
//! - [`Constant`]: a stored enumerated constant
//! - [`EnumConstant`]: the trait Rust enums implement to be stored and read back
//! - [`Sequence`]: an ordered, null-permitting list of one kind
//!
//! ## Creating Values
//!
//! ```rust
//! use semidoc::{Number, Value};
//!
//! let null = Value::Null;
//! let text = Value::from("hello");
//! let number = Value::from(42);
//! let missing: Value = None::<i32>.into();
//! assert!(missing.is_null());
//! assert_eq!(number.as_number(), Some(&Number::from(42)));
//! ```

use crate::{Document, Key, Number, Result};
use num_bigint::BigInt;
use std::fmt;

/// The kind of a non-null value, as declared by a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Number,
    Boolean,
    Enum,
    Document,
}

impl Kind {
    /// The lower-case name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Enum => "enum",
            Kind::Document => "document",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored enumerated constant.
///
/// Constants added from a Rust enum remember the enum's type name; constants
/// produced by coercing text into an enum sequence carry none.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constant {
    type_name: Option<&'static str>,
    name: String,
}

impl Constant {
    /// Captures the constant for `value`.
    #[must_use]
    pub fn of<E: EnumConstant>(value: E) -> Self {
        Constant {
            type_name: Some(E::TYPE_NAME),
            name: value.name().to_string(),
        }
    }

    /// A constant known only by name.
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Constant {
            type_name: None,
            name: name.into(),
        }
    }

    /// The constant's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name of the enum the constant came from, if known.
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A Rust enum whose variants are named constants.
///
/// Usually implemented through the [`constants!`](crate::constants) macro.
/// Names conventionally use `UPPER_SNAKE_CASE`, which also lets a constant
/// serve as a document key through [`EnumConstant::dotted_key`] and
/// [`EnumConstant::flat_key`].
pub trait EnumConstant: Sized + Copy + 'static {
    /// The enum's name, for diagnostics.
    const TYPE_NAME: &'static str;

    /// Every variant, in declaration order.
    fn variants() -> &'static [Self];

    /// The constant name of this variant.
    fn name(&self) -> &'static str;

    /// The multi-level key derived from the name (`SERVER_PORT` → `server.port`).
    ///
    /// # Errors
    ///
    /// Returns a grammar error if the derived key is invalid.
    fn dotted_key(&self) -> Result<Key> {
        Key::from_constant_name(self.name())
    }

    /// The single-level key derived from the name (`SERVER_PORT` → `SERVER_PORT`).
    ///
    /// # Errors
    ///
    /// Returns a grammar error if the derived key is invalid.
    fn flat_key(&self) -> Result<Key> {
        Key::from_constant_name_flat(self.name())
    }
}

/// A value stored at a document key.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Number(Number),
    Bool(bool),
    Enum(Constant),
    Document(Document),
    Sequence(Sequence),
}

impl Value {
    /// The kind of a non-null, non-sequence value.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Value::String(_) => Some(Kind::String),
            Value::Number(_) => Some(Kind::Number),
            Value::Bool(_) => Some(Kind::Boolean),
            Value::Enum(_) => Some(Kind::Enum),
            Value::Document(_) => Some(Kind::Document),
            Value::Null | Value::Sequence(_) => None,
        }
    }

    /// The lower-case name of the stored variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Enum(_) => "enum",
            Value::Document(_) => "document",
            Value::Sequence(_) => "sequence",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    /// If the value is a string, returns it. Otherwise returns `None`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a number, returns it. Otherwise returns `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a document, returns it. Otherwise returns `None`.
    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    /// If the value is a sequence, returns it. Otherwise returns `None`.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Writes the canonical text of a value: scalars as plain text, documents
    /// and sequences as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Enum(c) => write!(f, "{}", c),
            Value::Document(d) => write!(f, "{}", d),
            Value::Sequence(s) => write!(f, "{}", s),
        }
    }
}

/// An ordered, index-addressable, null-permitting list of one [`Kind`].
///
/// Null entries are explicit holes: they count towards the length and are
/// visited in order. The declared kind is fixed once a non-null element is
/// stored; while every element is null, a write of another kind re-declares
/// it.
///
/// # Examples
///
/// ```rust
/// use semidoc::{Kind, Sequence, Value};
///
/// let seq = Sequence::with_values(Kind::Number, vec![Value::from(1), Value::Null])?;
/// assert_eq!(seq.len(), 2);
/// assert!(seq.get(1).unwrap().is_null());
/// assert!(seq.get(2).is_none());
/// # Ok::<(), semidoc::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Sequence {
    kind: Kind,
    items: Vec<Value>,
}

pub(crate) fn index_limit_reason() -> String {
    format!("index exceeds the maximum of {}", Sequence::MAX_INDEX)
}

impl Sequence {
    /// The highest index a write may address. Padding stops here, so one
    /// oversized index cannot allocate an unbounded run of holes.
    pub const MAX_INDEX: usize = 65_535;

    /// Creates an empty sequence of `kind`.
    #[must_use]
    pub fn new(kind: Kind) -> Self {
        Sequence {
            kind,
            items: Vec::new(),
        }
    }

    /// Creates a sequence of `kind`, coercing every non-null value to it.
    ///
    /// # Errors
    ///
    /// Returns a conversion error if a value cannot be coerced to `kind`, or a
    /// structure error if a value is itself a sequence.
    pub fn with_values(kind: Kind, values: impl IntoIterator<Item = Value>) -> Result<Self> {
        let mut sequence = Sequence::new(kind);
        for value in values {
            sequence.push(value)?;
        }
        Ok(sequence)
    }

    /// Builds a sequence from values of unknown kinds without failing.
    ///
    /// A single shared kind is kept (nulls ignored); anything mixed or nested is
    /// stored as canonical text in a string sequence. An empty or all-null input
    /// yields a string sequence.
    #[must_use]
    pub fn infer(values: Vec<Value>) -> Self {
        let mut kinds = values.iter().filter(|v| !v.is_null()).map(Value::kind);
        let kind = match kinds.next() {
            Some(Some(first)) if kinds.all(|k| k == Some(first)) => first,
            Some(_) => {
                let items = values
                    .into_iter()
                    .map(|v| match v {
                        Value::Null => Value::Null,
                        Value::String(s) => Value::String(s),
                        other => Value::String(other.to_string()),
                    })
                    .collect();
                return Sequence {
                    kind: Kind::String,
                    items,
                };
            }
            None => Kind::String,
        };
        Sequence { kind, items: values }
    }

    /// The declared element kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The element at `index`; `Some(&Value::Null)` for a hole.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Iterates over the elements in index order, holes included.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Returns `true` if at least one element is non-null.
    #[must_use]
    pub fn has_values(&self) -> bool {
        self.items.iter().any(|v| !v.is_null())
    }

    /// Appends a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not fit the sequence's kind.
    pub fn push(&mut self, value: Value) -> Result<()> {
        let value = self.admit(value)?;
        self.items.push(value);
        Ok(())
    }

    /// Stores `value` at `index`, padding with nulls past the current end.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not fit the sequence's kind, or a
    /// structure error if `index` is above [`Sequence::MAX_INDEX`]; the
    /// sequence is unchanged in both cases.
    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        let len = Self::len_through(index).ok_or_else(|| crate::Error::Structure {
            key: format!("[{}]", index),
            reason: index_limit_reason(),
        })?;
        let value = self.admit(value)?;
        self.pad_to(len);
        self.items[index] = value;
        Ok(())
    }

    /// The length needed to hold `index`, or `None` above
    /// [`Sequence::MAX_INDEX`].
    pub(crate) fn len_through(index: usize) -> Option<usize> {
        if index > Self::MAX_INDEX {
            return None;
        }
        index.checked_add(1)
    }

    /// Clears the element at `index` without shifting later elements.
    ///
    /// The last element is removed outright, so the sequence shrinks by one
    /// and that index is no longer contained; any other element becomes a null
    /// hole that is still contained. Returns `false` if `index` is out of
    /// range.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if index + 1 == self.items.len() {
            self.items.pop();
        } else {
            self.items[index] = Value::Null;
        }
        true
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    /// Pads with nulls up to `len` elements.
    pub(crate) fn pad_to(&mut self, len: usize) {
        if len > self.items.len() {
            self.items.resize(len, Value::Null);
        }
    }

    /// Re-declares the kind if no element holds a value yet.
    pub(crate) fn redeclare(&mut self, kind: Kind) -> bool {
        if self.kind == kind {
            return true;
        }
        if self.has_values() {
            return false;
        }
        self.kind = kind;
        true
    }

    fn admit(&mut self, value: Value) -> Result<Value> {
        if let Value::Sequence(_) = value {
            return Err(crate::Error::conversion(
                "sequence",
                self.kind.name(),
                value,
            ));
        }
        match value.kind() {
            None => Ok(value),
            Some(kind) if self.redeclare(kind) => Ok(value),
            Some(_) => crate::convert::coerce(value, self.kind),
        }
    }
}

impl PartialEq for Sequence {
    /// Sequences are equal when their elements are; the declared kind only
    /// matters once a non-null element exists.
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items && (self.kind == other.kind || !self.has_values())
    }
}

impl fmt::Display for Sequence {
    /// Writes the sequence as a compact JSON array.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.iter().map(crate::format::json_value).collect();
        write!(f, "{}", serde_json::Value::Array(items))
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// From implementations for creating Values from primitives
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<f64> for Value {
    /// Non-finite floats have no decimal form; they are kept as their text so
    /// that storing them as a number fails with a conversion error.
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(n) => Value::Number(n),
            None => Value::String(value.to_string()),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        match Number::try_from(value) {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(value.to_string()),
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<Constant> for Value {
    fn from(value: Constant) -> Self {
        Value::Enum(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<Sequence> for Value {
    fn from(value: Sequence) -> Self {
        Value::Sequence(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
