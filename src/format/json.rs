//! JSON via `serde_json`.
//!
//! Numbers are read from their exact source text, so arbitrary precision
//! survives a load. Arrays map to sequences:
//!
//! - one scalar kind (nulls aside) keeps that kind;
//! - objects, optionally with nulls, become a sequence of documents;
//! - mixed scalar kinds become strings;
//! - empty and all-null arrays become string sequences;
//! - nested arrays, or objects mixed with scalars, are rejected.

use super::{input_conflict, Parser};
use crate::key::is_identifier;
use crate::traits::WritableDocument;
use crate::value::{Constant, Kind};
use crate::visitor::Visitor;
use crate::{Document, Error, FormatOptions, Key, Number, Result, Value};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value as JsonValue};
use std::io;
use std::str::FromStr;
use tracing::debug;

/// Loads a JSON object into a document.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn load_str<W: WritableDocument>(&self, target: &mut W, input: &str) -> Result<()> {
        let root = serde_json::from_str(input).map_err(json_error)?;
        load_json_value(target, root)
    }

    fn load<W: WritableDocument, R: io::Read>(&self, target: &mut W, source: R) -> Result<()> {
        let root = serde_json::from_reader(source).map_err(json_error)?;
        load_json_value(target, root)
    }
}

fn json_error(e: serde_json::Error) -> Error {
    if e.is_io() {
        Error::Io(e.into())
    } else {
        Error::malformed(e.line(), e.column(), e.to_string())
    }
}

pub(crate) fn load_json_value<W: WritableDocument>(target: &mut W, root: JsonValue) -> Result<()> {
    let JsonValue::Object(members) = root else {
        return Err(Error::malformed(1, 1, "root must be a JSON object"));
    };
    let count = members.len();
    fill(target, members, "")?;
    debug!(entries = count, "loaded JSON document");
    Ok(())
}

fn fill<W: WritableDocument>(target: &mut W, members: Map<String, JsonValue>, path: &str) -> Result<()> {
    for (name, value) in members {
        if !is_identifier(&name) {
            return Err(Error::malformed(
                0,
                0,
                format!("member name '{}' at '{}' is not a valid key element", name, path),
            ));
        }
        let key = Key::from_element(&name, None);
        let here = if path.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", path, name)
        };
        match value {
            JsonValue::Object(members) => {
                let document = document(members, &here)?;
                target
                    .add_document(&key, document)
                    .map_err(input_conflict(0, 0))?;
            }
            JsonValue::Array(items) => fill_array(target, &key, items, &here)?,
            scalar => {
                let value = scalar_value(scalar, &here)?;
                let kind = value.kind().unwrap_or(Kind::String);
                target
                    .put(&key, kind, value)
                    .map_err(input_conflict(0, 0))?;
            }
        }
    }
    Ok(())
}

fn document(members: Map<String, JsonValue>, path: &str) -> Result<Document> {
    let mut document = Document::new();
    fill(&mut document, members, path)?;
    Ok(document)
}

fn fill_array<W: WritableDocument>(
    target: &mut W,
    key: &Key,
    items: Vec<JsonValue>,
    path: &str,
) -> Result<()> {
    if items.iter().any(JsonValue::is_array) {
        return Err(Error::malformed(0, 0, format!("nested array at '{}'", path)));
    }
    let objects = items.iter().filter(|i| i.is_object()).count();
    let nulls = items.iter().filter(|i| i.is_null()).count();
    if objects > 0 && objects + nulls < items.len() {
        return Err(Error::malformed(
            0,
            0,
            format!("array at '{}' mixes objects and scalars", path),
        ));
    }

    if objects > 0 {
        let documents = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                JsonValue::Object(members) => {
                    document(members, &format!("{}[{}]", path, index)).map(Value::Document)
                }
                _ => Ok(Value::Null),
            })
            .collect::<Result<Vec<_>>>()?;
        target
            .add_documents(key, documents)
            .map_err(input_conflict(0, 0))?;
        return Ok(());
    }

    let values = items
        .into_iter()
        .map(|item| scalar_value(item, path))
        .collect::<Result<Vec<_>>>()?;
    let mut kinds = values.iter().filter_map(Value::kind);
    let kind = match kinds.next() {
        Some(first) if kinds.all(|k| k == first) => first,
        _ => Kind::String,
    };
    target
        .put_all(key, kind, values)
        .map_err(input_conflict(0, 0))
}

fn scalar_value(value: JsonValue, path: &str) -> Result<Value> {
    Ok(match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => Value::Number(n.to_string().parse().map_err(|_| {
            Error::malformed(0, 0, format!("number {} at '{}' is out of range", n, path))
        })?),
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            return Err(Error::malformed(0, 0, format!("unexpected container at '{}'", path)))
        }
    })
}

/// Writes a document as JSON text.
///
/// Every nested document and sequence is handed to its own serializer, which
/// builds a `serde_json` value that the parent folds in when the scope ends.
/// `serde_json` renders the finished tree.
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::format::JsonSerializer;
/// use semidoc::{key, Document, FormatOptions};
///
/// let mut doc = Document::new();
/// doc.add_string(&key!("a.b"), "x")?;
///
/// assert_eq!(doc.accept(JsonSerializer::new()), r#"{"a":{"b":"x"}}"#);
/// assert_eq!(
///     doc.accept(JsonSerializer::with_options(&FormatOptions::pretty())),
///     "{\n  \"a\": {\n    \"b\": \"x\"\n  }\n}"
/// );
/// # Ok::<(), semidoc::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct JsonSerializer {
    pretty: bool,
    indent: usize,
    node: Node,
}

#[derive(Debug)]
enum Node {
    Object(Map<String, JsonValue>),
    Array(Vec<JsonValue>),
}

impl Default for Node {
    fn default() -> Self {
        Node::Object(Map::new())
    }
}

impl From<Node> for JsonValue {
    fn from(node: Node) -> Self {
        match node {
            Node::Object(members) => JsonValue::Object(members),
            Node::Array(items) => JsonValue::Array(items),
        }
    }
}

impl JsonSerializer {
    /// Compact output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: &FormatOptions) -> Self {
        JsonSerializer {
            pretty: options.pretty,
            indent: options.indent,
            node: Node::default(),
        }
    }

    fn scope(&self, node: Node) -> Self {
        JsonSerializer {
            pretty: self.pretty,
            indent: self.indent,
            node,
        }
    }

    fn add(&mut self, key: &Key, value: JsonValue) {
        match &mut self.node {
            Node::Object(members) => {
                members.insert(key.last().name().to_string(), value);
            }
            Node::Array(items) => items.push(value),
        }
    }

    fn fold(&mut self, key: &Key, child: Option<Self>) {
        if let Some(child) = child {
            self.add(key, child.node.into());
        }
    }
}

impl Visitor for JsonSerializer {
    type Output = String;

    fn null_value(&mut self, key: &Key) {
        self.add(key, JsonValue::Null);
    }

    fn string_value(&mut self, key: &Key, value: &str) {
        self.add(key, JsonValue::String(value.to_string()));
    }

    fn numeric_value(&mut self, key: &Key, value: &Number) {
        self.add(key, json_number(value));
    }

    fn boolean_value(&mut self, key: &Key, value: bool) {
        self.add(key, JsonValue::Bool(value));
    }

    fn enum_value(&mut self, key: &Key, value: &Constant) {
        self.add(key, JsonValue::String(value.name().to_string()));
    }

    fn begin_child(&mut self, _key: &Key, _document: &Document) -> Option<Self> {
        Some(self.scope(Node::Object(Map::new())))
    }

    fn end_child(&mut self, key: &Key, child: Option<Self>) {
        self.fold(key, child);
    }

    fn begin_sequence(&mut self, _key: &Key, _kind: Kind, len: usize) -> Option<Self> {
        Some(self.scope(Node::Array(Vec::with_capacity(len))))
    }

    fn end_sequence(&mut self, key: &Key, child: Option<Self>) {
        self.fold(key, child);
    }

    fn process(self) -> String {
        let value = JsonValue::from(self.node);
        if !self.pretty {
            return value.to_string();
        }
        let indent = vec![b' '; self.indent];
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
        match value.serialize(&mut serializer) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => format!("{:#}", value),
        }
    }
}

/// Exact numbers survive through `arbitrary_precision`.
fn json_number(number: &Number) -> JsonValue {
    let text = number.to_string();
    match serde_json::Number::from_str(&text) {
        Ok(n) => JsonValue::Number(n),
        Err(_) => JsonValue::String(text),
    }
}

/// Converts a stored value into its `serde_json` form.
pub(crate) fn json_value(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Number(n) => json_number(n),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Enum(c) => JsonValue::String(c.name().to_string()),
        Value::Document(document) => JsonValue::Object(
            document
                .iter()
                .map(|(name, value)| (name.clone(), json_value(value)))
                .collect(),
        ),
        Value::Sequence(sequence) => JsonValue::Array(sequence.iter().map(json_value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;
    use crate::traits::ReadableDocument;

    fn parse(input: &str) -> Result<Document> {
        let mut doc = Document::new();
        JsonParser.load_str(&mut doc, input)?;
        Ok(doc)
    }

    #[test]
    fn test_mixed_scalars_become_strings() {
        let doc = parse(r#"{"data":[1,"x",null]}"#).unwrap();
        assert_eq!(
            doc.get_all::<String>(&key!("data")).unwrap(),
            vec![Some("1".to_string()), Some("x".to_string()), None]
        );
        let data = doc.value(&key!("data")).unwrap();
        assert_eq!(data.as_sequence().unwrap().kind(), Kind::String);
    }

    #[test]
    fn test_single_kind_arrays_keep_kind() {
        let doc = parse(r#"{"n":[1,null,2.5],"b":[true,false],"e":[],"z":[null]}"#).unwrap();
        let kind = |k: &str| {
            doc.value(&Key::parse(k).unwrap())
                .unwrap()
                .as_sequence()
                .unwrap()
                .kind()
        };
        assert_eq!(kind("n"), Kind::Number);
        assert_eq!(kind("b"), Kind::Boolean);
        assert_eq!(kind("e"), Kind::String);
        assert_eq!(kind("z"), Kind::String);
    }

    #[test]
    fn test_objects_and_arrays_of_objects() {
        let doc = parse(r#"{"server":{"port":8080},"hosts":[{"name":"a"},null,{"name":"c"}]}"#)
            .unwrap();
        assert_eq!(doc.get::<u16>(&key!("server.port")).unwrap(), 8080);
        assert_eq!(doc.get::<String>(&key!("hosts[2].name")).unwrap(), "c");
        assert_eq!(doc.value(&key!("hosts[1]")), Some(Value::Null));
    }

    #[test]
    fn test_numbers_keep_precision() {
        let doc = parse(r#"{"big":123456789012345678901234567890.125}"#).unwrap();
        assert_eq!(
            doc.get::<Number>(&key!("big")).unwrap().to_string(),
            "123456789012345678901234567890.125"
        );
    }

    #[test]
    fn test_rejected_inputs() {
        for input in [
            "[1,2]",
            r#"{"a":[[1]]}"#,
            r#"{"a":[{"b":1},2]}"#,
            r#"{"bad-name":1}"#,
            r#"{"a":"#,
        ] {
            assert!(
                matches!(parse(input), Err(Error::Malformed { .. })),
                "accepted {input}"
            );
        }
    }

    /// Accepts no new keys.
    struct FixedLayout;

    impl WritableDocument for FixedLayout {
        fn put(&mut self, key: &Key, _kind: Kind, _value: Value) -> Result<()> {
            Err(Error::structure(key, "layout is fixed"))
        }

        fn put_all(&mut self, key: &Key, _kind: Kind, _values: Vec<Value>) -> Result<()> {
            Err(Error::structure(key, "layout is fixed"))
        }

        fn push(&mut self, key: &Key, _kind: Kind, _value: Value) -> Result<()> {
            Err(Error::structure(key, "layout is fixed"))
        }

        fn remove(&mut self, _key: &Key) -> Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_rejected_writes_are_reported() {
        for input in [
            r#"{"a":1}"#,
            r#"{"a":[1]}"#,
            r#"{"a":{"b":1}}"#,
            r#"{"a":[{"b":1}]}"#,
        ] {
            let err = JsonParser.load_str(&mut FixedLayout, input).unwrap_err();
            assert!(matches!(err, Error::Malformed { .. }), "{input}: {err:?}");
        }

        let doc = Document::new();
        let mut view = crate::Unmodifiable::new(&doc);
        let err = JsonParser.load_str(&mut view, r#"{"a":1}"#).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMutation { .. }), "{err:?}");
    }

    #[test]
    fn test_syntax_error_position() {
        match parse("{\n  \"a\": tru\n}").unwrap_err() {
            Error::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_serializer_escapes_and_nests() {
        let doc = parse(r#"{"s":"a\"b\\c\nd","seq":[{"x":true},null],"empty":{}}"#).unwrap();
        assert_eq!(
            doc.to_string(),
            r#"{"s":"a\"b\\c\nd","seq":[{"x":true},null],"empty":{}}"#
        );
    }

    #[test]
    fn test_serializer_escapes_control_characters() {
        let mut doc = Document::new();
        doc.add_string(&key!("c"), "tab\there\u{1}").unwrap();
        assert_eq!(doc.to_string(), r#"{"c":"tab\there\u0001"}"#);
    }

    #[test]
    fn test_serializer_keeps_exact_numbers_and_enums() {
        let doc = parse(r#"{"big":123456789012345678901234567890.125,"n":[-1,0.5]}"#).unwrap();
        assert_eq!(
            doc.accept(JsonSerializer::new()),
            r#"{"big":123456789012345678901234567890.125,"n":[-1,0.5]}"#
        );

        let mut doc = Document::new();
        doc.add_enum(&key!("e"), Constant::untyped("RED")).unwrap();
        assert_eq!(doc.accept(JsonSerializer::new()), r#"{"e":"RED"}"#);
    }

    #[test]
    fn test_pretty_output_with_custom_indent() {
        let doc = parse(r#"{"a":{"b":1}}"#).unwrap();
        let options = FormatOptions::pretty().with_indent(4);
        assert_eq!(
            doc.accept(JsonSerializer::with_options(&options)),
            "{\n    \"a\": {\n        \"b\": 1\n    }\n}"
        );
    }

    #[test]
    fn test_json_value_matches_serializer() {
        let doc = parse(r#"{"s":"x","seq":[{"k":true},null],"d":{"n":2}}"#).unwrap();
        let value = json_value(&Value::Document(doc.clone()));
        assert_eq!(value.to_string(), doc.accept(JsonSerializer::new()));
    }

    #[test]
    fn test_pretty_output() {
        let doc = parse(r#"{"a":1,"d":[1,null]}"#).unwrap();
        let pretty = doc.accept(JsonSerializer::with_options(&FormatOptions::pretty()));
        assert_eq!(pretty, "{\n  \"a\": 1,\n  \"d\": [\n    1,\n    null\n  ]\n}");
        assert_eq!(Document::new().accept(JsonSerializer::with_options(&FormatOptions::pretty())), "{}");
    }
}
