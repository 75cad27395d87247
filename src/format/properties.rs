use super::{input_conflict, FlatMapSerializer, Parser};
use crate::text::{expand_tabs, is_comment, logical_lines, split_assignment};
use crate::traits::WritableDocument;
use crate::value::Constant;
use crate::visitor::Visitor;
use crate::{Document, Error, FormatOptions, Key, Number, Result, Value};
use tracing::debug;

/// Parses `key = value` lines.
///
/// Tabs are expanded before splitting, blank lines and lines starting with
/// `#` are skipped, and a line ending in `\` continues on the next line.
/// Values are stored as strings.
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::format::{Parser, PropertiesParser};
/// use semidoc::{key, Document, FormatOptions};
///
/// let input = "# server\nserver.port = 8080\nserver.hosts[1] = beta\n";
/// let mut doc = Document::new();
/// PropertiesParser::new(&FormatOptions::default()).load_str(&mut doc, input)?;
///
/// assert_eq!(doc.get::<u16>(&key!("server.port"))?, 8080);
/// assert_eq!(doc.sequence_len(&key!("server.hosts")), Some(2));
/// # Ok::<(), semidoc::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PropertiesParser {
    tab_width: usize,
}

impl PropertiesParser {
    #[must_use]
    pub fn new(options: &FormatOptions) -> Self {
        PropertiesParser {
            tab_width: options.tab_width,
        }
    }
}

impl Default for PropertiesParser {
    fn default() -> Self {
        PropertiesParser::new(&FormatOptions::default())
    }
}

impl Parser for PropertiesParser {
    fn load_str<W: WritableDocument>(&self, target: &mut W, input: &str) -> Result<()> {
        let mut entries = 0;
        for (number, line) in logical_lines(input) {
            let line = expand_tabs(&line, self.tab_width);
            if line.trim().is_empty() || is_comment(&line) {
                continue;
            }
            let Some((raw_key, value)) = split_assignment(&line) else {
                return Err(Error::malformed(number, 1, "expected 'key = value'"));
            };
            let key = Key::parse(raw_key)
                .map_err(|e| Error::malformed(number, 1, e.to_string()))?;
            target
                .add_string(&key, value)
                .map_err(input_conflict(number, 1))?;
            entries += 1;
        }
        debug!(entries, "loaded properties document");
        Ok(())
    }
}

/// Writes one `key=value` line per flattened entry; nulls become empty values.
#[derive(Debug, Default)]
pub struct PropertiesSerializer {
    flat: FlatMapSerializer,
}

impl PropertiesSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Visitor for PropertiesSerializer {
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
            out.push_str(&path);
            out.push('=');
            if !value.is_null() {
                // Each entry must stay on one line.
                let text = value.to_string().replace('\n', " ");
                out.push_str(&text);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;
    use crate::traits::ReadableDocument;

    fn parse(input: &str) -> Result<Document> {
        let mut doc = Document::new();
        PropertiesParser::default().load_str(&mut doc, input)?;
        Ok(doc)
    }

    #[test]
    fn test_lines_comments_and_tabs() {
        let doc = parse("\n# comment\n  a.b\t=\tone\ttwo  \nempty =\n").unwrap();
        assert_eq!(doc.get::<String>(&key!("a.b")).unwrap(), "one two");
        assert_eq!(doc.get::<String>(&key!("empty")).unwrap(), "");
    }

    #[test]
    fn test_continuation_lines() {
        let doc = parse("list = a,\\\n       b\n").unwrap();
        assert_eq!(doc.get::<String>(&key!("list")).unwrap(), "a,b");
    }

    #[test]
    fn test_malformed_lines_report_line_number() {
        match parse("a = 1\nno equals here\n").unwrap_err() {
            Error::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
        match parse("a = 1\n\n1bad = x\n").unwrap_err() {
            Error::Malformed { line, msg, .. } => {
                assert_eq!(line, 3);
                assert!(msg.contains("1bad"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_lines_are_malformed() {
        match parse("a = 1\n# note\na.b = 2\n").unwrap_err() {
            Error::Malformed { line, col, .. } => assert_eq!((line, col), (3, 1)),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(
            parse("big[70000] = x\n"),
            Err(Error::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn test_round_trip_of_strings() {
        let input = "name=x\nhosts[0]=a\nhosts[1]=b\ninner.v=1\n";
        let doc = parse(input).unwrap();
        let written = doc.accept(PropertiesSerializer::new());
        assert_eq!(written, input);
        assert_eq!(parse(&written).unwrap(), doc);
    }

    #[test]
    fn test_nulls_are_written_empty() {
        let mut doc = Document::new();
        doc.add_numbers(&key!("n"), [Some(1), None]).unwrap();
        assert_eq!(doc.accept(PropertiesSerializer::new()), "n[0]=1\nn[1]=\n");
    }
}
