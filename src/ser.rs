//! Serde integration.
//!
//! Documents, values, sequences, numbers and constants implement
//! [`Serialize`], so any serde format can write them. Numbers are written as
//! `i64` or `u64` when they are integers in range and as `f64` otherwise.
//! [`to_document`] goes the other way for any `T: Serialize` whose serialized
//! form is a map with identifier keys.
//!
//! ```rust
//! use semidoc::{doc, to_document};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Server { host: String, ports: Vec<u16> }
//!
//! let server = Server { host: "alpha".into(), ports: vec![80, 443] };
//! let document = to_document(&server)?;
//! assert_eq!(document, doc!({ "host": "alpha", "ports": [80, 443] }));
//! # Ok::<(), semidoc::Error>(())
//! ```

use crate::format::load_json_value;
use crate::value::{Constant, Sequence};
use crate::{Document, Error, Number, Result, Value};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Enum(c) => c.serialize(serializer),
            Value::Document(d) => d.serialize(serializer),
            Value::Sequence(s) => s.serialize(serializer),
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(integer) = self.to_bigint() {
            if let Ok(i) = i64::try_from(&integer) {
                return serializer.serialize_i64(i);
            }
            if let Ok(u) = u64::try_from(&integer) {
                return serializer.serialize_u64(u);
            }
        }
        serializer.serialize_f64(self.to_f64())
    }
}

impl Serialize for Constant {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl Serialize for Sequence {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Builds a document from any value that serializes to a map.
///
/// Arrays follow the JSON loading rules: a homogeneous array keeps its kind,
/// a mixed one becomes a string sequence.
///
/// # Errors
///
/// Returns [`Error::Custom`] if `value` fails to serialize and
/// [`Error::Malformed`] if it is not a map or a member name is not a valid
/// key element.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_document<T>(value: &T) -> Result<Document>
where
    T: ?Sized + Serialize,
{
    let json = serde_json::to_value(value).map_err(Error::custom)?;
    let mut document = Document::new();
    load_json_value(&mut document, json)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ReadableDocument, WritableDocument};
    use crate::{doc, key};
    use num_bigint::BigInt;
    use std::collections::BTreeMap;

    #[test]
    fn test_document_serializes_in_insertion_order() {
        let doc = doc!({ "z": 1, "a": [true, null], "m": { "s": "x" } });
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"z":1,"a":[true,null],"m":{"s":"x"}}"#
        );
    }

    #[test]
    fn test_numbers_pick_the_narrowest_form() {
        let json = |n: Number| serde_json::to_value(&n).unwrap();
        assert!(json(Number::from(-5)).is_i64());
        assert!(json(Number::from(u64::MAX)).is_u64());
        assert!(json(Number::from_f64(2.5).unwrap()).is_f64());
        assert!(json(Number::new(BigInt::from(300), 2)).is_f64());
        assert!(json(Number::new(BigInt::from(300), 1)).is_i64());
    }

    #[test]
    fn test_enums_serialize_as_names() {
        let mut doc = Document::new();
        doc.add_enums(&key!("c"), ["RED", "BLUE"]).unwrap();
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"c":["RED","BLUE"]}"#);
    }

    #[test]
    fn test_to_document_from_maps() {
        let mut map = BTreeMap::new();
        map.insert("port", 8080);
        let doc = to_document(&map).unwrap();
        assert_eq!(doc.get::<u16>(&key!("port")).unwrap(), 8080);

        assert!(matches!(to_document(&vec![1, 2]), Err(Error::Malformed { .. })));
        let mut bad = BTreeMap::new();
        bad.insert("not a name", 1);
        assert!(matches!(to_document(&bad), Err(Error::Malformed { .. })));
    }
}
