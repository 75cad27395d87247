//! Wire formats.
//!
//! Parsers populate any [`WritableDocument`] through the [`Parser`] trait;
//! serializers are [`Visitor`](crate::Visitor)s driven by
//! [`accept`](crate::ReadableDocument::accept).
//!
//! | format     | parser             | serializer             |
//! |------------|--------------------|------------------------|
//! | compact    | [`CompactParser`]    | [`CompactSerializer`]    |
//! | properties | [`PropertiesParser`] | [`PropertiesSerializer`] |
//! | JSON       | [`JsonParser`]       | [`JsonSerializer`]       |
//! | XML        | [`XmlParser`]        | [`XmlSerializer`]        |
//! | flat map   | -                  | [`FlatMapSerializer`]    |
//!
//! ```rust
//! use semidoc::prelude::*;
//! use semidoc::format::{CompactParser, JsonSerializer, Parser};
//! use semidoc::{key, Document};
//!
//! let mut doc = Document::new();
//! CompactParser.load_str(&mut doc, "name:\"Ada Lovelace\";born:1815;a[1]:true")?;
//!
//! assert_eq!(doc.get::<u32>(&key!("born"))?, 1815);
//! assert_eq!(
//!     doc.accept(JsonSerializer::new()),
//!     r#"{"name":"Ada Lovelace","born":1815,"a":[null,true]}"#
//! );
//! # Ok::<(), semidoc::Error>(())
//! ```

mod compact;
mod flat;
mod json;
mod properties;
mod xml;

pub use compact::{CompactParser, CompactSerializer};
pub use flat::FlatMapSerializer;
pub use json::{JsonParser, JsonSerializer};
pub use properties::{PropertiesParser, PropertiesSerializer};
pub use xml::{XmlParser, XmlSerializer};

pub(crate) use json::{json_value, load_json_value};

use crate::traits::{ReadableDocument, WritableDocument};
use crate::{Error, FormatOptions, Result};
use std::io;

/// Populates a document from serialized input.
///
/// On error the target may hold part of the input; callers discard it.
pub trait Parser {
    /// Parses `input` into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for content faults, including entries
    /// that conflict with earlier ones, and passes through unsupported
    /// mutations reported by the target.
    fn load_str<W: WritableDocument>(&self, target: &mut W, input: &str) -> Result<()>;

    /// Reads `source` to the end and parses it into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading fails and [`Error::Malformed`] if the
    /// input is not valid UTF-8 or not well formed.
    fn load<W: WritableDocument, R: io::Read>(&self, target: &mut W, source: R) -> Result<()> {
        let text = read_text(source)?;
        self.load_str(target, &text)
    }
}

/// Reports a write that the input itself made impossible as malformed input
/// at `line`/`col`: a name used both for a scalar and a document, a value that
/// does not fit an earlier sequence, an index past the sequence limit.
/// Rejections that come from the target, such as a read-only view, pass
/// through unchanged.
pub(crate) fn input_conflict(line: usize, col: usize) -> impl FnOnce(Error) -> Error {
    move |error| {
        if matches!(error, Error::Structure { .. } | Error::Conversion { .. }) {
            Error::malformed(line, col, error.to_string())
        } else {
            error
        }
    }
}

/// Reads a whole stream as UTF-8 text.
pub(crate) fn read_text<R: io::Read>(mut source: R) -> Result<String> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        let col = valid.iter().rev().take_while(|&&b| b != b'\n').count() + 1;
        Error::malformed(line, col, "input is not valid UTF-8")
    })
}

/// The bundled formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Compact,
    Properties,
    Json,
    Xml,
}

impl Format {
    /// Picks a format from a file extension (without the dot), ignoring case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::format::Format;
    ///
    /// assert_eq!(Format::from_extension("JSON"), Some(Format::Json));
    /// assert_eq!(Format::from_extension("properties"), Some(Format::Properties));
    /// assert_eq!(Format::from_extension("yaml"), None);
    /// ```
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            "properties" | "props" => Some(Format::Properties),
            "compact" | "kv" => Some(Format::Compact),
            _ => None,
        }
    }

    /// Parses `source` into `target` with default options.
    ///
    /// # Errors
    ///
    /// See [`Parser::load`].
    pub fn load<W: WritableDocument, R: io::Read>(self, target: &mut W, source: R) -> Result<()> {
        self.load_with(target, source, &FormatOptions::default())
    }

    /// Parses `source` into `target` with the given options.
    ///
    /// # Errors
    ///
    /// See [`Parser::load`].
    pub fn load_with<W: WritableDocument, R: io::Read>(
        self,
        target: &mut W,
        source: R,
        options: &FormatOptions,
    ) -> Result<()> {
        match self {
            Format::Compact => CompactParser.load(target, source),
            Format::Properties => PropertiesParser::new(options).load(target, source),
            Format::Json => JsonParser.load(target, source),
            Format::Xml => XmlParser.load(target, source),
        }
    }

    /// Renders `document` in this format.
    #[must_use]
    pub fn render<D: ReadableDocument>(self, document: &D, options: &FormatOptions) -> String {
        match self {
            Format::Compact => document.accept(CompactSerializer::new()),
            Format::Properties => document.accept(PropertiesSerializer::new()),
            Format::Json => document.accept(JsonSerializer::with_options(options)),
            Format::Xml => document.accept(XmlSerializer::new(options)),
        }
    }
}

/// A character cursor over parser input that tracks line and column.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Cursor {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    pub(crate) fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consumes `prefix` if the input continues with it.
    pub(crate) fn eat(&mut self, prefix: &str) -> bool {
        if !self.starts_with(prefix) {
            return false;
        }
        for _ in prefix.chars() {
            self.next_char();
        }
        true
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, char::is_whitespace) {
            self.next_char();
        }
    }

    /// Consumes characters up to (not including) the first one matching `stop`.
    pub(crate) fn take_until(&mut self, stop: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while self.peek_char().map_or(false, |ch| !stop(ch)) {
            self.next_char();
        }
        &self.input[start..self.position]
    }

    /// Consumes everything up to and including `terminator`, returning the
    /// text before it, or `None` if the input ends first.
    pub(crate) fn take_through(&mut self, terminator: &str) -> Option<&'a str> {
        let offset = self.rest().find(terminator)?;
        let start = self.position;
        while self.position < start + offset {
            self.next_char();
        }
        let taken = &self.input[start..self.position];
        self.eat(terminator);
        Some(taken)
    }

    pub(crate) fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    pub(crate) fn error(&self, msg: impl Into<String>) -> Error {
        Error::malformed(self.line, self.column, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_reports_invalid_utf8_position() {
        let bytes: &[u8] = b"ok\nab\xffcd";
        match read_text(bytes).unwrap_err() {
            Error::Malformed { line, col, .. } => assert_eq!((line, col), (2, 3)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_read_text_propagates_io_errors() {
        struct Failing;
        impl io::Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }
        assert!(matches!(read_text(Failing), Err(Error::Io(_))));
    }

    #[test]
    fn test_input_conflicts_become_malformed() {
        let key = crate::Key::parse("a.b").unwrap();
        let structure = Error::structure(&key, "'a' holds a number, not a document");
        match input_conflict(3, 5)(structure) {
            Error::Malformed { line, col, msg } => {
                assert_eq!((line, col), (3, 5));
                assert!(msg.contains("a.b"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        let conversion = Error::conversion("string", "document", "x");
        assert!(matches!(input_conflict(1, 1)(conversion), Error::Malformed { .. }));

        let rejected = Error::unsupported_mutation("add", &key);
        assert!(matches!(
            input_conflict(1, 1)(rejected),
            Error::UnsupportedMutation { .. }
        ));
    }

    #[test]
    fn test_cursor_tracks_lines() {
        let mut cursor = Cursor::new("ab\ncd");
        assert_eq!(cursor.take_through("\n"), Some("ab"));
        assert_eq!(cursor.position(), (2, 1));
        assert_eq!(cursor.take_until(|c| c == 'd'), "c");
        assert_eq!(cursor.position(), (2, 2));
        assert!(!cursor.at_end());
        assert!(cursor.eat("d"));
        assert!(cursor.at_end());
    }
}
