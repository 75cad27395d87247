//! The single-line `key:value;key:value` notation.
//!
//! Unquoted values are typed: `null`, `true` and `false` (any case) and
//! decimal numbers are stored as such, everything else as a string.
//! Double-quoted values are always strings; inside quotes `\"` and `\\` are
//! escapes and spaces are kept.

use super::{input_conflict, Cursor, FlatMapSerializer, Parser};
use crate::traits::WritableDocument;
use crate::value::{Constant, Kind};
use crate::visitor::Visitor;
use crate::{Document, Key, Number, Result, Value};
use tracing::debug;

/// Parses compact notation.
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::format::{CompactParser, Parser};
/// use semidoc::{key, Document};
///
/// let mut doc = Document::new();
/// CompactParser.load_str(&mut doc, "a[0]:0;a[2]:2")?;
/// assert_eq!(doc.get_all::<i32>(&key!("a"))?, vec![Some(0), None, Some(2)]);
/// # Ok::<(), semidoc::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CompactParser;

impl Parser for CompactParser {
    fn load_str<W: WritableDocument>(&self, target: &mut W, input: &str) -> Result<()> {
        let mut cursor = Cursor::new(input);
        let mut entries = 0;
        loop {
            cursor.skip_whitespace();
            if cursor.at_end() {
                break;
            }
            if cursor.eat(";") {
                continue;
            }
            entry(&mut cursor, target)?;
            entries += 1;
        }
        debug!(entries, "loaded compact document");
        Ok(())
    }
}

fn entry<W: WritableDocument>(cursor: &mut Cursor<'_>, target: &mut W) -> Result<()> {
    let (line, col) = cursor.position();
    let raw_key = cursor.take_until(|c| c == ':' || c == ';');
    if !cursor.eat(":") {
        return Err(cursor.error(format!("expected ':' after '{}'", raw_key.trim())));
    }
    let key = Key::parse(raw_key.trim())
        .map_err(|e| crate::Error::malformed(line, col, e.to_string()))?;

    cursor.skip_whitespace();
    if cursor.eat("\"") {
        let text = quoted(cursor)?;
        cursor.skip_whitespace();
        if !cursor.at_end() && !cursor.eat(";") {
            return Err(cursor.error("expected ';' after quoted value"));
        }
        target
            .add_string(&key, text)
            .map_err(input_conflict(line, col))?;
        return Ok(());
    }

    let raw = cursor.take_until(|c| c == ';').trim();
    cursor.eat(";");
    let value = typed(raw);
    let kind = value.kind().unwrap_or(Kind::String);
    target
        .put(&key, kind, value)
        .map_err(input_conflict(line, col))
}

fn quoted(cursor: &mut Cursor<'_>) -> Result<String> {
    let mut text = String::new();
    loop {
        match cursor.next_char() {
            None => return Err(cursor.error("unterminated quoted value")),
            Some('"') => return Ok(text),
            Some('\\') => match cursor.next_char() {
                Some(c @ ('"' | '\\')) => text.push(c),
                Some(c) => {
                    text.push('\\');
                    text.push(c);
                }
                None => return Err(cursor.error("unterminated quoted value")),
            },
            Some(c) => text.push(c),
        }
    }
}

fn typed(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        Value::Null
    } else if raw.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else if let Ok(number) = raw.parse::<Number>() {
        Value::Number(number)
    } else {
        Value::from(raw)
    }
}

/// Writes compact notation over the flattened document.
///
/// Strings that would otherwise read back as another type, or that contain
/// `;`, `"`, `\` or surrounding whitespace, are quoted.
#[derive(Debug, Default)]
pub struct CompactSerializer {
    flat: FlatMapSerializer,
}

impl CompactSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.trim() != text
        || text.contains(&[';', '"', '\\'][..])
        || !matches!(typed(text), Value::String(_))
}

fn write_text(out: &mut String, text: &str) {
    if !needs_quotes(text) {
        out.push_str(text);
        return;
    }
    out.push('"');
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
}

impl Visitor for CompactSerializer {
    type Output = String;

    fn null_value(&mut self, key: &Key) {
        self.flat.null_value(key);
    }

    fn string_value(&mut self, key: &Key, value: &str) {
        self.flat.string_value(key, value);
    }

    fn numeric_value(&mut self, key: &Key, value: &Number) {
        self.flat.numeric_value(key, value);
    }

    fn boolean_value(&mut self, key: &Key, value: bool) {
        self.flat.boolean_value(key, value);
    }

    fn enum_value(&mut self, key: &Key, value: &Constant) {
        self.flat.enum_value(key, value);
    }

    fn begin_child(&mut self, key: &Key, document: &Document) -> Option<Self> {
        self.flat.begin_child(key, document);
        None
    }

    fn end_child(&mut self, key: &Key, _child: Option<Self>) {
        self.flat.end_child(key, None);
    }

    fn process(self) -> String {
        let mut out = String::new();
        for (path, value) in self.flat.process() {
            if !out.is_empty() {
                out.push(';');
            }
            out.push_str(&path);
            out.push(':');
            match value {
                Value::String(s) => write_text(&mut out, &s),
                Value::Enum(c) => write_text(&mut out, c.name()),
                other => out.push_str(&other.to_string()),
            }
        }
        out
    }
}
