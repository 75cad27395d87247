use crate::traits::{ReadableDocument, WritableDocument};
use crate::value::Kind;
use crate::{Document, Error, Key, Result, Value};
use tracing::debug;

/// A read-only view: reads delegate, every mutation fails with
/// [`Error::UnsupportedMutation`].
#[derive(Clone, Debug)]
pub struct Unmodifiable<D> {
    inner: D,
}

impl<D> Unmodifiable<D> {
    pub fn new(inner: D) -> Self {
        Unmodifiable { inner }
    }

    /// Returns this view itself; wrapping a view again changes nothing.
    #[must_use]
    pub fn unmodifiable(&self) -> &Self {
        self
    }

    pub fn get_ref(&self) -> &D {
        &self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

fn reject(operation: &'static str, key: &Key) -> Error {
    debug!(key = %key, operation, "rejected mutation on unmodifiable document");
    Error::unsupported_mutation(operation, key)
}

impl<D: ReadableDocument> ReadableDocument for Unmodifiable<D> {
    fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        self.inner.read(f)
    }
}

impl<D> WritableDocument for Unmodifiable<D> {
    fn put(&mut self, key: &Key, _kind: Kind, _value: Value) -> Result<()> {
        Err(reject("add", key))
    }

    fn put_all(&mut self, key: &Key, _kind: Kind, _values: Vec<Value>) -> Result<()> {
        Err(reject("add all", key))
    }

    fn push(&mut self, key: &Key, _kind: Kind, _value: Value) -> Result<()> {
        Err(reject("append", key))
    }

    fn remove(&mut self, key: &Key) -> Result<bool> {
        Err(reject("remove", key))
    }
}

// A shared view rejects mutations just like an owned one.
impl<D> WritableDocument for &Unmodifiable<D> {
    fn put(&mut self, key: &Key, _kind: Kind, _value: Value) -> Result<()> {
        Err(reject("add", key))
    }

    fn put_all(&mut self, key: &Key, _kind: Kind, _values: Vec<Value>) -> Result<()> {
        Err(reject("add all", key))
    }

    fn push(&mut self, key: &Key, _kind: Kind, _value: Value) -> Result<()> {
        Err(reject("append", key))
    }

    fn remove(&mut self, key: &Key) -> Result<bool> {
        Err(reject("remove", key))
    }
}
