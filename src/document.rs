//! The document storage engine.
//!
//! A [`Document`] maps element names to [`Value`]s in insertion order. Nested
//! documents and sequences form a tree that is addressed with [`Key`]s; missing
//! intermediate documents (and sequences of documents) are created on write.
//!
//! Reads and writes go through the [`ReadableDocument`] and
//! [`WritableDocument`] traits, which every decorator implements as well:
//!
//! ```rust
//! use semidoc::prelude::*;
//! use semidoc::{key, Document};
//!
//! let mut doc = Document::new();
//! doc.add_number(&key!("server.port"), 8080)?
//!     .append_string(&key!("server.hosts"), "alpha")?
//!     .append_string(&key!("server.hosts"), "beta")?;
//!
//! assert_eq!(doc.get::<u16>(&key!("server.port"))?, 8080);
//! assert_eq!(doc.get::<String>(&key!("server.hosts[1]"))?, "beta");
//! assert_eq!(doc.sequence_len(&key!("server.hosts")), Some(2));
//! # Ok::<(), semidoc::Error>(())
//! ```

use crate::convert::coerce;
use crate::key::Element;
use crate::traits::{ReadableDocument, WritableDocument};
use crate::value::{index_limit_reason, Kind, Sequence};
use crate::{Error, Key, Result, Value};
use indexmap::IndexMap;
use std::fmt;

/// An insertion-ordered tree of values addressed by [`Key`]s.
///
/// Equality ignores entry order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    entries: IndexMap<String, Value>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Document {
            entries: IndexMap::new(),
        }
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over top-level entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Top-level element names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The value stored at `key`, if any.
    ///
    /// An index on an intermediate element selects a document inside a
    /// sequence; an index on the last element selects a sequence slot, which
    /// may be [`Value::Null`].
    #[must_use]
    pub fn resolve(&self, key: &Key) -> Option<&Value> {
        let (last, parents) = key.elements().split_last()?;
        let mut current = self;
        for element in parents {
            match current.lookup_element(element)? {
                Value::Document(child) => current = child,
                _ => return None,
            }
        }
        current.lookup_element(last)
    }

    /// Stores `value` at `key` with its own kind, without coercion.
    ///
    /// A [`Value::Sequence`] replaces whatever is stored at a plain key. Nulls
    /// are stored as strings would be.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Structure`] if the key walks through a value that
    /// cannot contain it, or a sequence is written to an indexed key.
    pub fn insert(&mut self, key: &Key, value: impl Into<Value>) -> Result<()> {
        match value.into() {
            Value::Sequence(sequence) => {
                if key.is_indexed() {
                    return Err(Error::structure(key, "a sequence cannot be nested in a sequence"));
                }
                let (parent, name) = self.container_mut(key)?;
                parent.entries.insert(name, Value::Sequence(sequence));
                Ok(())
            }
            other => {
                let kind = other.kind().unwrap_or(Kind::String);
                self.store(key, kind, other)
            }
        }
    }

    fn lookup_element(&self, element: &Element) -> Option<&Value> {
        let value = self.entries.get(element.name())?;
        match element.index() {
            None => Some(value),
            Some(index) => value.as_sequence()?.get(index),
        }
    }

    fn parent_mut(&mut self, key: &Key) -> Option<&mut Document> {
        let (_, parents) = key.elements().split_last()?;
        let mut current = self;
        for element in parents {
            let value = current.entries.get_mut(element.name())?;
            let value = match element.index() {
                None => value,
                Some(index) => match value {
                    Value::Sequence(sequence) => sequence.get_mut(index)?,
                    _ => return None,
                },
            };
            match value {
                Value::Document(child) => current = child,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Walks to the document that holds the last element of `key`, creating
    /// missing documents on the way. Also returns the last element's name.
    ///
    /// Nothing is created past the first element that already exists with an
    /// incompatible value, so an error leaves the document unchanged.
    fn container_mut(&mut self, key: &Key) -> Result<(&mut Document, String)> {
        let (last, parents) = key
            .elements()
            .split_last()
            .ok_or_else(|| Error::structure(key, "key has no elements"))?;
        let oversized = key
            .elements()
            .iter()
            .filter_map(Element::index)
            .any(|index| Sequence::len_through(index).is_none());
        if oversized {
            return Err(Error::structure(key, index_limit_reason()));
        }
        let mut current = self;
        for element in parents {
            current = current.child_mut(key, element)?;
        }
        Ok((current, last.name().to_string()))
    }

    fn child_mut(&mut self, key: &Key, element: &Element) -> Result<&mut Document> {
        let name = element.name();
        let slot = self
            .entries
            .entry(name.to_string())
            .or_insert(Value::Null);

        let slot = match element.index() {
            None => slot,
            Some(index) => {
                if slot.is_null() {
                    *slot = Value::Sequence(Sequence::new(Kind::Document));
                }
                let sequence = match slot {
                    Value::Sequence(sequence) => sequence,
                    other => {
                        return Err(Error::structure(
                            key,
                            format!("'{}' holds a {}, not a sequence", name, other.type_name()),
                        ))
                    }
                };
                if !sequence.redeclare(Kind::Document) {
                    return Err(Error::structure(
                        key,
                        format!("'{}' is a sequence of {}, not of documents", name, sequence.kind()),
                    ));
                }
                let len = Sequence::len_through(index)
                    .ok_or_else(|| Error::structure(key, index_limit_reason()))?;
                sequence.pad_to(len);
                match sequence.get_mut(index) {
                    Some(item) => item,
                    None => return Err(Error::structure(key, "sequence slot is missing")),
                }
            }
        };

        if slot.is_null() {
            *slot = Value::Document(Document::new());
        }
        match slot {
            Value::Document(child) => Ok(child),
            other => Err(Error::structure(
                key,
                format!("'{}' holds a {}, not a document", element, other.type_name()),
            )),
        }
    }

    pub(crate) fn store(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        let value = coerce(value, kind).map_err(|e| e.at(key))?;
        let index = key.last().index();
        let (parent, name) = self.container_mut(key)?;
        match index {
            None => {
                parent.entries.insert(name, value);
                Ok(())
            }
            Some(index) => {
                let slot = parent
                    .entries
                    .entry(name)
                    .or_insert(Value::Null);
                if slot.is_null() {
                    *slot = Value::Sequence(Sequence::new(kind));
                }
                match slot {
                    Value::Sequence(sequence) => sequence.set(index, value).map_err(|e| e.at(key)),
                    other => Err(Error::structure(
                        key,
                        format!("cannot index into a {}", other.type_name()),
                    )),
                }
            }
        }
    }

    pub(crate) fn store_all(&mut self, key: &Key, kind: Kind, values: Vec<Value>) -> Result<()> {
        if key.is_indexed() {
            return Err(Error::structure(key, "a sequence cannot be nested in a sequence"));
        }
        let mut sequence = Sequence::new(kind);
        for (index, value) in values.into_iter().enumerate() {
            let value = coerce(value, kind).map_err(|e| match key.index(index) {
                Ok(element_key) => e.at(&element_key),
                Err(_) => e.at(key),
            })?;
            sequence.push(value).map_err(|e| e.at(key))?;
        }
        let (parent, name) = self.container_mut(key)?;
        parent.entries.insert(name, Value::Sequence(sequence));
        Ok(())
    }

    pub(crate) fn append(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        if key.is_indexed() {
            return Err(Error::structure(key, "cannot append to a sequence element"));
        }
        let value = coerce(value, kind).map_err(|e| e.at(key))?;
        let (parent, name) = self.container_mut(key)?;
        let slot = parent.entries.entry(name).or_insert(Value::Null);
        match slot {
            Value::Sequence(sequence) => sequence.push(value).map_err(|e| e.at(key)),
            slot => {
                let mut sequence = match slot.kind() {
                    Some(existing) => Sequence::with_values(existing, [slot.clone()])?,
                    None => Sequence::new(kind),
                };
                sequence.push(value).map_err(|e| e.at(key))?;
                *slot = Value::Sequence(sequence);
                Ok(())
            }
        }
    }

    pub(crate) fn delete(&mut self, key: &Key) -> bool {
        let last = key.last();
        let Some(parent) = self.parent_mut(key) else {
            return false;
        };
        match last.index() {
            None => parent.entries.shift_remove(last.name()).is_some(),
            Some(index) => match parent.entries.get_mut(last.name()) {
                Some(Value::Sequence(sequence)) => sequence.remove(index),
                _ => false,
            },
        }
    }
}

impl ReadableDocument for Document {
    fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        f(self)
    }
}

impl WritableDocument for Document {
    fn put(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        self.store(key, kind, value)
    }

    fn put_all(&mut self, key: &Key, kind: Kind, values: Vec<Value>) -> Result<()> {
        self.store_all(key, kind, values)
    }

    fn push(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        self.append(key, kind, value)
    }

    fn remove(&mut self, key: &Key) -> Result<bool> {
        Ok(self.delete(key))
    }
}

impl fmt::Display for Document {
    /// Writes the document as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = crate::visitor::walk(self, crate::format::JsonSerializer::new());
        f.write_str(&json)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
