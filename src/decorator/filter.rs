use crate::traits::{ReadableDocument, WritableDocument};
use crate::value::Kind;
use crate::{Document, Key, Result, Value};
use tracing::trace;

/// Drops null scalars before they reach the wrapped document.
///
/// Null `add_*` and `append_*` calls for the string, number, boolean and enum
/// families succeed without storing anything. Bulk `add_*s` calls store only
/// the non-null values, so the resulting sequence is compacted. Null documents
/// pass through unchanged, and documents built elsewhere are not filtered
/// after the fact.
#[derive(Clone, Debug, Default)]
pub struct NullFiltering<D> {
    inner: D,
}

impl<D> NullFiltering<D> {
    pub fn new(inner: D) -> Self {
        NullFiltering { inner }
    }

    pub fn get_ref(&self) -> &D {
        &self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

fn drops(kind: Kind, value: &Value) -> bool {
    kind != Kind::Document && value.is_null()
}

impl<D: ReadableDocument> ReadableDocument for NullFiltering<D> {
    fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        self.inner.read(f)
    }
}

impl<D: WritableDocument> WritableDocument for NullFiltering<D> {
    fn put(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        if drops(kind, &value) {
            trace!(key = %key, "dropping null {} value", kind);
            return Ok(());
        }
        self.inner.put(key, kind, value)
    }

    fn put_all(&mut self, key: &Key, kind: Kind, values: Vec<Value>) -> Result<()> {
        let before = values.len();
        let values: Vec<Value> = values.into_iter().filter(|v| !drops(kind, v)).collect();
        if values.len() != before {
            trace!(key = %key, dropped = before - values.len(), "dropping null {} values", kind);
        }
        self.inner.put_all(key, kind, values)
    }

    fn push(&mut self, key: &Key, kind: Kind, value: Value) -> Result<()> {
        if drops(kind, &value) {
            trace!(key = %key, "dropping null {} value", kind);
            return Ok(());
        }
        self.inner.push(key, kind, value)
    }

    fn remove(&mut self, key: &Key) -> Result<bool> {
        self.inner.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key, Number};

    #[test]
    fn test_null_scalars_are_dropped() {
        let mut doc = NullFiltering::new(Document::new());
        doc.add_string(&key!("s"), None::<String>)
            .unwrap()
            .append_number(&key!("n"), None::<i32>)
            .unwrap()
            .add_boolean(&key!("b"), Value::Null)
            .unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_bulk_add_compacts() {
        let mut doc = NullFiltering::new(Document::new());
        let k = key!("k");
        doc.add_numbers(&k, [Some(Value::from(1)), None, Some(Value::from(3.4))])
            .unwrap();
        assert_eq!(doc.sequence_len(&k), Some(2));
        assert_eq!(
            doc.get::<Number>(&key!("k[1]")).unwrap(),
            "3.4".parse::<Number>().unwrap()
        );
    }

    #[test]
    fn test_null_document_passes_through() {
        let mut doc = NullFiltering::new(Document::new());
        doc.add_document(&key!("d"), None::<Document>).unwrap();
        assert!(doc.contains(&key!("d")));
        assert!(!doc.has_value(&key!("d")));
    }

    #[test]
    fn test_nested_document_keeps_its_nulls() {
        let mut inner = Document::new();
        inner.add_string(&key!("gap"), None::<String>).unwrap();
        let mut doc = NullFiltering::new(Document::new());
        doc.add_document(&key!("child"), inner).unwrap();
        assert!(doc.contains(&key!("child.gap")));
    }
}
