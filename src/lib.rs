//! # semidoc
//!
//! A format-agnostic model for semi-structured documents addressed by
//! hierarchical path keys.
//!
//! ## What is a document?
//!
//! A [`Document`] is an insertion-ordered tree. Every entry holds a scalar
//! (string, number, boolean or named constant), a nested document, or a
//! [`Sequence`] of one of those kinds. Values are addressed by a [`Key`] such
//! as `servers[1].port`, and the same tree is loaded from and written to
//! compact notation, properties, JSON and XML.
//!
//! ## Key Features
//!
//! - **Path keys**: `a.b[2].c` walks through nested documents and sequences,
//!   creating intermediate containers on write
//! - **Typed access**: reads coerce stored values to the requested Rust type
//!   and report the key, kinds and raw value when that fails
//! - **Sparse sequences**: nulls are explicit holes; writing past the end pads
//! - **Decorators**: null filtering, synchronized access and read-only views
//!   stack over any document
//! - **Visitors**: every serializer is a [`Visitor`] over the same traversal
//!
//! ## Quick Start
//!
//! ```rust
//! use semidoc::prelude::*;
//! use semidoc::{from_compact_str, key, to_json_string};
//!
//! let mut doc = from_compact_str("name:Ada;a[0]:0;a[2]:2")?;
//! assert_eq!(doc.get_all::<i32>(&key!("a"))?, vec![Some(0), None, Some(2)]);
//!
//! doc.add_number(&key!("born"), 1815)?
//!     .append_string(&key!("tags"), "math")?;
//!
//! assert_eq!(
//!     to_json_string(&doc),
//!     r#"{"name":"Ada","a":[0,null,2],"born":1815,"tags":["math"]}"#
//! );
//! # Ok::<(), semidoc::Error>(())
//! ```
//!
//! ### Building documents with `doc!`
//!
//! ```rust
//! use semidoc::prelude::*;
//! use semidoc::{doc, key, to_xml_string};
//!
//! let doc = doc!({ "user": { "name": "Ada" }, "ids": [1, 2] });
//! assert_eq!(doc.get::<u8>(&key!("ids[1]"))?, 2);
//! assert_eq!(
//!     to_xml_string(&doc),
//!     "<document><user><name>Ada</name></user><ids>1</ids><ids>2</ids></document>"
//! );
//! # Ok::<(), semidoc::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (parsers at `debug` when a document is
//! loaded, rejected mutations at `debug`, dropped nulls and early visitor
//! completion at `trace`). No subscriber is installed.

pub mod config;
pub mod convert;
pub mod decorator;
pub mod document;
pub mod error;
pub mod format;
pub mod key;
pub mod macros;
pub mod number;
pub mod options;
pub mod ser;
pub mod text;
pub mod traits;
pub mod value;
pub mod visitor;

pub use config::Config;
pub use convert::FromValue;
pub use decorator::{NullFiltering, Synchronized, Unmodifiable};
pub use document::Document;
pub use error::{Error, Result};
pub use format::Format;
pub use key::{Element, Key, KeyBuilder};
pub use number::Number;
pub use options::FormatOptions;
pub use ser::to_document;
pub use traits::{ReadableDocument, WritableDocument};
pub use value::{Constant, EnumConstant, Kind, Sequence, Value};
pub use visitor::Visitor;

use format::{
    CompactParser, CompactSerializer, FlatMapSerializer, JsonParser, JsonSerializer, Parser,
    PropertiesParser, PropertiesSerializer, XmlParser, XmlSerializer,
};
use indexmap::IndexMap;
use std::io;

/// The traits needed to read, write and traverse documents.
pub mod prelude {
    pub use crate::convert::FromValue;
    pub use crate::format::Parser;
    pub use crate::traits::{ReadableDocument, WritableDocument};
    pub use crate::value::EnumConstant;
    pub use crate::visitor::Visitor;
}

fn parse_with<P: Parser>(parser: P, input: &str) -> Result<Document> {
    let mut document = Document::new();
    parser.load_str(&mut document, input)?;
    Ok(document)
}

/// Parses a JSON object into a document.
///
/// # Examples
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::{from_json_str, key};
///
/// let doc = from_json_str(r#"{"mixed": [1, "two", true]}"#)?;
/// assert_eq!(doc.get::<String>(&key!("mixed[0]"))?, "1");
/// # Ok::<(), semidoc::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the input is not a JSON object or a member
/// name is not a valid key element.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_json_str(input: &str) -> Result<Document> {
    parse_with(JsonParser, input)
}

/// Parses an XML element tree into a document.
///
/// # Errors
///
/// Returns [`Error::Malformed`] with the position of the first fault.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_xml_str(input: &str) -> Result<Document> {
    parse_with(XmlParser, input)
}

/// Parses `key = value` lines into a document of strings.
///
/// # Errors
///
/// Returns [`Error::Malformed`] naming the line of the first fault.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_properties_str(input: &str) -> Result<Document> {
    parse_with(PropertiesParser::default(), input)
}

/// Parses compact `key:value;key:value` notation into a document.
///
/// # Errors
///
/// Returns [`Error::Malformed`] with the position of the first fault.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_compact_str(input: &str) -> Result<Document> {
    parse_with(CompactParser, input)
}

/// Reads a document in `format` from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::{from_reader, key, Format};
/// use std::io::Cursor;
///
/// let doc = from_reader(Format::Xml, Cursor::new(b"<a><b>1</b></a>"))?;
/// assert_eq!(doc.get::<i32>(&key!("b[0]"))?, 1);
/// # Ok::<(), semidoc::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails and [`Error::Malformed`] if the
/// content is not valid for `format`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(format: Format, reader: R) -> Result<Document> {
    let mut document = Document::new();
    format.load(&mut document, reader)?;
    Ok(document)
}

/// Writes `document` as compact JSON.
#[must_use]
pub fn to_json_string<D: ReadableDocument>(document: &D) -> String {
    document.accept(JsonSerializer::new())
}

/// Writes `document` as indented JSON.
#[must_use]
pub fn to_json_string_pretty<D: ReadableDocument>(document: &D) -> String {
    document.accept(JsonSerializer::with_options(&FormatOptions::pretty()))
}

/// Writes `document` as XML under the default root element.
#[must_use]
pub fn to_xml_string<D: ReadableDocument>(document: &D) -> String {
    document.accept(XmlSerializer::new(&FormatOptions::default()))
}

/// Writes `document` as indented XML.
#[must_use]
pub fn to_xml_string_pretty<D: ReadableDocument>(document: &D) -> String {
    document.accept(XmlSerializer::new(&FormatOptions::pretty()))
}

/// Writes `document` as properties lines.
#[must_use]
pub fn to_properties_string<D: ReadableDocument>(document: &D) -> String {
    document.accept(PropertiesSerializer::new())
}

/// Writes `document` in compact notation.
#[must_use]
pub fn to_compact_string<D: ReadableDocument>(document: &D) -> String {
    document.accept(CompactSerializer::new())
}

/// Flattens `document` into full-path keys mapped to scalar values.
///
/// # Examples
///
/// ```rust
/// use semidoc::{doc, to_flat_map, Value};
///
/// let flat = to_flat_map(&doc!({ "a": { "b": [1, null] } }));
/// assert_eq!(flat.get("a.b[0]"), Some(&Value::from(1)));
/// assert_eq!(flat.get("a.b[1]"), Some(&Value::Null));
/// ```
#[must_use]
pub fn to_flat_map<D: ReadableDocument>(document: &D) -> IndexMap<String, Value> {
    document.accept(FlatMapSerializer::new())
}

/// Writes `document` in `format` to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use semidoc::{doc, to_writer, Format, FormatOptions};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &doc!({ "a": 1 }), Format::Compact, &FormatOptions::default())?;
/// assert_eq!(buffer, b"a:1");
/// # Ok::<(), semidoc::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, D>(mut writer: W, document: &D, format: Format, options: &FormatOptions) -> Result<()>
where
    W: io::Write,
    D: ReadableDocument,
{
    writer.write_all(format.render(document, options).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_format_reads_back_its_own_output() {
        let doc = doc!({ "name": "x", "list": ["a", "b"], "inner": { "v": "1" } });
        let options = FormatOptions::default();
        for format in [Format::Compact, Format::Properties, Format::Json] {
            let text = format.render(&doc, &options);
            let back = from_reader(format, text.as_bytes()).unwrap();
            assert_eq!(back, doc, "{format:?}: {text}");
        }

        // XML reads every child element as a sequence entry.
        let nested = doc!({ "name": ["x"], "list": ["a", "b"], "inner": [{ "v": ["1"] }] });
        let text = Format::Xml.render(&nested, &options);
        assert_eq!(from_reader(Format::Xml, text.as_bytes()).unwrap(), nested);
        let text = Format::Xml.render(&doc, &options);
        assert_eq!(from_reader(Format::Xml, text.as_bytes()).unwrap(), nested);
    }

    #[test]
    fn test_to_writer_reports_io_errors() {
        struct Full;
        impl io::Write for Full {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::WriteZero, "full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let result = to_writer(Full, &doc!({ "a": 1 }), Format::Json, &FormatOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
