//! The read and mutation contracts shared by documents and decorators.
//!
//! [`ReadableDocument`] needs only [`ReadableDocument::read`], which lends the
//! underlying [`Document`] to a closure; every typed accessor is built on it.
//! [`WritableDocument`] needs four primitive mutations; the typed `add_*`,
//! `add_*s` and `append_*` families are built on those and return
//! `Result<&mut Self>` for chaining.
//!
//! | family     | add (set / replace)  | add all (bulk)        | append (grow by one)   |
//! |------------|----------------------|-----------------------|------------------------|
//! | string     | `add_string`         | `add_strings`         | `append_string`        |
//! | number     | `add_number`         | `add_numbers`         | `append_number`        |
//! | boolean    | `add_boolean`        | `add_booleans`        | `append_boolean`       |
//! | enum       | `add_enum`           | `add_enums`           | `append_enum`          |
//! | document   | `add_document`       | `add_documents`       | `append_document`      |
//!
//! Every value argument accepts `impl Into<Value>`, so `None` stores a null.

use crate::convert::FromValue;
use crate::decorator::Unmodifiable;
use crate::value::Kind;
use crate::visitor::{self, Visitor};
use crate::{Document, Error, Key, Result, Value};

/// Read access to a document.
pub trait ReadableDocument {
    /// Runs `f` against the underlying document.
    ///
    /// Decorators that guard their storage hold the guard for the duration of
    /// the call.
    fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R;

    /// A copy of the value stored at `key`, if any.
    fn value(&self, key: &Key) -> Option<Value> {
        self.read(|doc| doc.resolve(key).cloned())
    }

    /// Returns `true` if anything, including an explicit null, is stored at `key`.
    fn contains(&self, key: &Key) -> bool {
        self.read(|doc| doc.resolve(key).is_some())
    }

    /// Returns `true` if a non-null value is stored at `key`.
    fn has_value(&self, key: &Key) -> bool {
        self.read(|doc| doc.resolve(key).map_or(false, |v| !v.is_null()))
    }

    /// Returns `true` if a sequence is stored at `key`.
    fn is_sequence(&self, key: &Key) -> bool {
        self.read(|doc| doc.resolve(key).map_or(false, Value::is_sequence))
    }

    /// Returns `true` if the document has no entries.
    fn is_empty(&self) -> bool {
        self.read(Document::is_empty)
    }

    /// Number of top-level entries.
    fn len(&self) -> usize {
        self.read(Document::len)
    }

    /// Length of the sequence stored at `key`, holes included.
    fn sequence_len(&self, key: &Key) -> Option<usize> {
        self.read(|doc| doc.resolve(key)?.as_sequence().map(|s| s.len()))
    }

    /// Reads the value at `key` as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unset`] if nothing or a null is stored at `key`, and
    /// [`Error::Conversion`] if the stored value cannot be read as `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::prelude::*;
    /// use semidoc::{key, Document, Error};
    ///
    /// let mut doc = Document::new();
    /// doc.add_string(&key!("greeting"), "Hello")?;
    ///
    /// assert_eq!(doc.get::<String>(&key!("greeting"))?, "Hello");
    /// assert!(matches!(doc.get::<i32>(&key!("greeting")), Err(Error::Conversion { .. })));
    /// assert!(matches!(doc.get::<i32>(&key!("missing")), Err(Error::Unset { .. })));
    /// # Ok::<(), semidoc::Error>(())
    /// ```
    fn get<T: FromValue>(&self, key: &Key) -> Result<T> {
        self.get_optional(key)?.ok_or_else(|| Error::unset(key))
    }

    /// Reads the value at `key` as `T`, or returns `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] if a stored value cannot be read as `T`.
    fn get_or<T: FromValue>(&self, key: &Key, default: T) -> Result<T> {
        Ok(self.get_optional(key)?.unwrap_or(default))
    }

    /// Reads the value at `key` as `T`, mapping absent and null to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] if a stored value cannot be read as `T`.
    fn get_optional<T: FromValue>(&self, key: &Key) -> Result<Option<T>> {
        self.read(|doc| match doc.resolve(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::from_value(value).map(Some).map_err(|e| e.at(key)),
        })
    }

    /// Reads every element stored at `key` as `T`, with holes as `None`.
    ///
    /// A scalar reads as a one-element list and a null as `[None]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unset`] if nothing is stored at `key`, and
    /// [`Error::Conversion`] naming the element key if an element cannot be
    /// read as `T`.
    fn get_all<T: FromValue>(&self, key: &Key) -> Result<Vec<Option<T>>> {
        self.read(|doc| match doc.resolve(key) {
            None => Err(Error::unset(key)),
            Some(Value::Null) => Ok(vec![None]),
            Some(Value::Sequence(sequence)) => sequence
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    if value.is_null() {
                        return Ok(None);
                    }
                    T::from_value(value).map(Some).map_err(|e| match key.index(index) {
                        Ok(element_key) => e.at(&element_key),
                        Err(_) => e.at(key),
                    })
                })
                .collect(),
            Some(value) => Ok(vec![Some(T::from_value(value).map_err(|e| e.at(key))?)]),
        })
    }

    /// A deep copy of the whole document.
    fn snapshot(&self) -> Document {
        self.read(Document::clone)
    }

    /// Drives `visitor` over the document and returns its output.
    fn accept<V: Visitor>(&self, visitor: V) -> V::Output {
        self.read(|doc| visitor::walk(doc, visitor))
    }

    /// A read-only view of this document.
    fn unmodifiable(&self) -> Unmodifiable<&Self>
    where
        Self: Sized,
    {
        Unmodifiable::new(self)
    }
}

/// Mutation access to a document.
///
/// Implementors provide the four primitive operations; `kind` is the family
/// the caller wrote through and the value is coerced to it before storing.
pub trait WritableDocument {
    /// Stores one value at `key`; an indexed key sets that sequence slot.
    ///
    /// # Errors
    ///
    /// Returns a conversion, structure or unsupported-mutation error.
    fn put(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()>;

    /// Replaces the value at `key` with a sequence of `values`.
    ///
    /// # Errors
    ///
    /// Returns a conversion, structure or unsupported-mutation error.
    fn put_all(&mut self, key: &Key, kind: Kind, values: Vec<Value>) -> Result<()>;

    /// Grows the sequence at `key` by one, promoting a scalar first.
    ///
    /// # Errors
    ///
    /// Returns a conversion, structure or unsupported-mutation error.
    fn push(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()>;

    /// Removes the value at `key`.
    ///
    /// Removing a sequence element never shifts later indices:
    ///
    /// - any element other than the last is cleared to a null hole, so
    ///   `contains(key)` stays `true` and `has_value(key)` becomes `false`;
    /// - the last element is popped, so the sequence is one shorter and
    ///   `contains(key)` becomes `false`.
    ///
    /// Returns `Ok(false)` if nothing was stored at `key`.
    ///
    /// ```rust
    /// use semidoc::prelude::*;
    /// use semidoc::{key, Document};
    ///
    /// let mut doc = Document::new();
    /// doc.add_numbers(&key!("n"), [1, 2, 3])?;
    ///
    /// doc.remove(&key!("n[0]"))?;
    /// assert!(doc.contains(&key!("n[0]")));
    /// assert!(!doc.has_value(&key!("n[0]")));
    ///
    /// doc.remove(&key!("n[2]"))?;
    /// assert!(!doc.contains(&key!("n[2]")));
    /// assert_eq!(doc.sequence_len(&key!("n")), Some(2));
    /// # Ok::<(), semidoc::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an unsupported-mutation error on read-only views.
    fn remove(&mut self, key: &Key) -> Result<bool>;

    fn add_string(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.put(key, Kind::String, value.into())?;
        Ok(self)
    }

    fn add_strings<I, V>(&mut self, key: &Key, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.put_all(key, Kind::String, values.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    fn append_string(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.push(key, Kind::String, value.into())?;
        Ok(self)
    }

    fn add_number(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.put(key, Kind::Number, value.into())?;
        Ok(self)
    }

    fn add_numbers<I, V>(&mut self, key: &Key, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.put_all(key, Kind::Number, values.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    fn append_number(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.push(key, Kind::Number, value.into())?;
        Ok(self)
    }

    fn add_boolean(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.put(key, Kind::Boolean, value.into())?;
        Ok(self)
    }

    fn add_booleans<I, V>(&mut self, key: &Key, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.put_all(key, Kind::Boolean, values.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    fn append_boolean(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.push(key, Kind::Boolean, value.into())?;
        Ok(self)
    }

    fn add_enum(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.put(key, Kind::Enum, value.into())?;
        Ok(self)
    }

    fn add_enums<I, V>(&mut self, key: &Key, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.put_all(key, Kind::Enum, values.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    fn append_enum(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.push(key, Kind::Enum, value.into())?;
        Ok(self)
    }

    fn add_document(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.put(key, Kind::Document, value.into())?;
        Ok(self)
    }

    fn add_documents<I, V>(&mut self, key: &Key, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.put_all(key, Kind::Document, values.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    fn append_document(&mut self, key: &Key, value: impl Into<Value>) -> Result<&mut Self> {
        self.push(key, Kind::Document, value.into())?;
        Ok(self)
    }
}

impl<D: ReadableDocument + ?Sized> ReadableDocument for &D {
    fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        (**self).read(f)
    }
}

impl<D: ReadableDocument + ?Sized> ReadableDocument for &mut D {
    fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        (**self).read(f)
    }
}

impl<D: WritableDocument + ?Sized> WritableDocument for &mut D {
    fn put(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        (**self).put(key, kind, value)
    }

    fn put_all(&mut self, key: &Key, kind: Kind, values: Vec<Value>) -> Result<()> {
        (**self).put_all(key, kind, values)
    }

    fn push(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        (**self).push(key, kind, value)
    }

    fn remove(&mut self, key: &Key) -> Result<bool> {
        (**self).remove(key)
    }
}
