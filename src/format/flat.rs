use crate::value::Constant;
use crate::visitor::Visitor;
use crate::{Document, Key, Number, Value};
use indexmap::IndexMap;

/// Flattens a document into full-path keys mapped to scalar values.
///
/// Nested documents disappear into their paths; sequence elements keep their
/// index and nulls are preserved. Empty documents and sequences leave no
/// entry.
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::format::FlatMapSerializer;
/// use semidoc::{key, Document, Value};
///
/// let mut doc = Document::new();
/// doc.add_strings(&key!("a.b"), [Some("x"), None])?;
///
/// let flat = doc.accept(FlatMapSerializer::new());
/// assert_eq!(flat.get("a.b[0]"), Some(&Value::from("x")));
/// assert_eq!(flat.get("a.b[1]"), Some(&Value::Null));
/// # Ok::<(), semidoc::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct FlatMapSerializer {
    entries: IndexMap<String, Value>,
    scopes: Vec<Key>,
}

impl FlatMapSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn full(&self, key: &Key) -> Key {
        match self.scopes.last() {
            Some(scope) => scope.join(key),
            None => key.clone(),
        }
    }

    fn record(&mut self, key: &Key, value: Value) {
        let path = self.full(key).to_string();
        self.entries.insert(path, value);
    }
}

impl Visitor for FlatMapSerializer {
    type Output = IndexMap<String, Value>;

    fn null_value(&mut self, key: &Key) {
        self.record(key, Value::Null);
    }

    fn string_value(&mut self, key: &Key, value: &str) {
        self.record(key, Value::from(value));
    }

    fn numeric_value(&mut self, key: &Key, value: &Number) {
        self.record(key, Value::Number(value.clone()));
    }

    fn boolean_value(&mut self, key: &Key, value: bool) {
        self.record(key, Value::Bool(value));
    }

    fn enum_value(&mut self, key: &Key, value: &Constant) {
        self.record(key, Value::Enum(value.clone()));
    }

    fn begin_child(&mut self, key: &Key, _document: &Document) -> Option<Self> {
        let scope = self.full(key);
        self.scopes.push(scope);
        None
    }

    fn end_child(&mut self, _key: &Key, _child: Option<Self>) {
        self.scopes.pop();
    }

    fn process(self) -> IndexMap<String, Value> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;
    use crate::traits::{ReadableDocument, WritableDocument};

    #[test]
    fn test_paths_through_document_sequences() {
        let mut doc = Document::new();
        doc.add_string(&key!("hosts[1].name"), "b").unwrap();
        doc.add_number(&key!("port"), 80).unwrap();

        let flat = doc.accept(FlatMapSerializer::new());
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["hosts[0]", "hosts[1].name", "port"]);
        assert_eq!(flat["hosts[0]"], Value::Null);
    }

    #[test]
    fn test_every_flat_key_resolves() {
        let mut doc = Document::new();
        doc.add_booleans(&key!("a.b.c"), [true, false]).unwrap();
        doc.add_string(&key!("a.d"), "x").unwrap();
        for path in doc.accept(FlatMapSerializer::new()).keys() {
            assert!(doc.contains(&Key::parse(path).unwrap()), "{path}");
        }
    }
}
