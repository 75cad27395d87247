use crate::traits::{ReadableDocument, WritableDocument};
use crate::value::Kind;
use crate::{Document, Key, Result, Value};
use parking_lot::Mutex;

/// Serialises every read and mutation of the wrapped document behind one lock.
///
/// The lock is held for the duration of a single call, including a whole
/// [`accept`](ReadableDocument::accept) traversal. A shared reference is
/// itself a [`WritableDocument`], so one instance can be written from several
/// threads:
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::{key, Document, Synchronized};
///
/// let shared = Synchronized::new(Document::new());
/// std::thread::scope(|scope| {
///     for i in 0..4 {
///         let shared = &shared;
///         scope.spawn(move || {
///             let mut writer = shared;
///             writer.append_number(&key!("ids"), i).map(|_| ())
///         });
///     }
/// });
/// assert_eq!(shared.sequence_len(&key!("ids")), Some(4));
/// ```
#[derive(Debug, Default)]
pub struct Synchronized<D> {
    inner: Mutex<D>,
}

impl<D> Synchronized<D> {
    pub fn new(inner: D) -> Self {
        Synchronized {
            inner: Mutex::new(inner),
        }
    }

    /// Runs `f` with exclusive access to the wrapped document.
    ///
    /// Use this to group several operations under one acquisition of the lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn into_inner(self) -> D {
        self.inner.into_inner()
    }
}

impl<D: ReadableDocument> ReadableDocument for Synchronized<D> {
    fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        self.inner.lock().read(f)
    }
}

impl<D: WritableDocument> WritableDocument for &Synchronized<D> {
    fn put(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        self.inner.lock().put(key, kind, value)
    }

    fn put_all(&mut self, key: &Key, kind: Kind, values: Vec<Value>) -> Result<()> {
        self.inner.lock().put_all(key, kind, values)
    }

    fn push(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        self.inner.lock().push(key, kind, value)
    }

    fn remove(&mut self, key: &Key) -> Result<bool> {
        self.inner.lock().remove(key)
    }
}

impl<D: WritableDocument> WritableDocument for Synchronized<D> {
    fn put(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        (&*self).put(key, kind, value)
    }

    fn put_all(&mut self, key: &Key, kind: Kind, values: Vec<Value>) -> Result<()> {
        (&*self).put_all(key, kind, values)
    }

    fn push(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        (&*self).push(key, kind, value)
    }

    fn remove(&mut self, key: &Key) -> Result<bool> {
        (&*self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_appends_are_all_stored() {
        let shared = Arc::new(Synchronized::new(Document::new()));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let mut writer = &*shared;
                    for i in 0..50 {
                        writer.append_number(&key!("values"), t * 50 + i).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut values: Vec<i64> = shared
            .get_all::<i64>(&key!("values"))
            .unwrap()
            .into_iter()
            .map(Option::unwrap)
            .collect();
        values.sort_unstable();
        assert_eq!(values, (0..400).collect::<Vec<_>>());
    }

    #[test]
    fn test_owned_wrapper_is_writable() {
        let mut doc = Synchronized::new(Document::new());
        doc.add_string(&key!("a"), "x").unwrap();
        assert_eq!(doc.with(|inner| inner.len()), 1);
        assert_eq!(doc.into_inner().get::<String>(&key!("a")).unwrap(), "x");
    }
}
