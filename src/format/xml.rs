//! A small XML reader and writer.
//!
//! The root element stands for the target document. Reading maps:
//!
//! - attributes to string values;
//! - every child element to an entry of a sequence named after it, in
//!   document order: a string sequence for elements holding only text, a
//!   document sequence for elements with attributes or child elements.
//!
//! A lone `<host>` is therefore read as `host[0]`. Empty elements are dropped,
//! and so is text mixed with child elements. Comments, processing
//! instructions and the DOCTYPE are skipped, and `xmlns` attributes are
//! ignored. CDATA sections are read as text, and the predefined and numeric
//! character references are decoded. `:`, `-` and `.` in names become `_`.

use super::{input_conflict, Cursor, Parser};
use crate::key::is_identifier;
use crate::traits::WritableDocument;
use crate::value::{Constant, Kind};
use crate::visitor::Visitor;
use crate::{Document, FormatOptions, Key, Number, Result, Value};
use tracing::debug;

/// Loads an XML document.
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::format::{Parser, XmlParser};
/// use semidoc::{key, Document};
///
/// let input = r#"<config version="2">
///     <host>alpha</host>
///     <host>beta</host>
///     <db url="pg://x"><pool>4</pool></db>
/// </config>"#;
/// let mut doc = Document::new();
/// XmlParser.load_str(&mut doc, input)?;
///
/// assert_eq!(doc.get::<u8>(&key!("version"))?, 2);
/// assert_eq!(doc.get::<String>(&key!("host[1]"))?, "beta");
/// assert!(doc.is_sequence(&key!("db")));
/// assert_eq!(doc.get::<u32>(&key!("db[0].pool[0]"))?, 4);
/// # Ok::<(), semidoc::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlParser;

impl XmlParser {
    /// The deepest element nesting accepted, the root counting as one.
    pub const MAX_DEPTH: usize = 128;
}

impl Parser for XmlParser {
    fn load_str<W: WritableDocument>(&self, target: &mut W, input: &str) -> Result<()> {
        let mut cursor = Cursor::new(input);
        skip_misc(&mut cursor)?;
        if !cursor.starts_with("<") {
            return Err(cursor.error("expected a root element"));
        }
        let root = element(&mut cursor, 1)?;
        skip_misc(&mut cursor)?;
        if !cursor.at_end() {
            return Err(cursor.error("unexpected content after the root element"));
        }
        debug!(root = %root.name, children = root.children.len(), "loaded XML document");
        emit(target, root)
    }
}

struct Element {
    name: String,
    position: (usize, usize),
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

fn skip_misc(cursor: &mut Cursor<'_>) -> Result<()> {
    loop {
        cursor.skip_whitespace();
        if cursor.eat("<?") {
            cursor
                .take_through("?>")
                .ok_or_else(|| cursor.error("unterminated processing instruction"))?;
        } else if cursor.eat("<!--") {
            cursor
                .take_through("-->")
                .ok_or_else(|| cursor.error("unterminated comment"))?;
        } else if cursor.eat("<!DOCTYPE") {
            skip_doctype(cursor)?;
        } else {
            return Ok(());
        }
    }
}

fn skip_doctype(cursor: &mut Cursor<'_>) -> Result<()> {
    let mut depth = 0usize;
    loop {
        match cursor.next_char() {
            Some('[') => depth += 1,
            Some(']') => depth = depth.saturating_sub(1),
            Some('>') if depth == 0 => return Ok(()),
            Some(_) => {}
            None => return Err(cursor.error("unterminated DOCTYPE")),
        }
    }
}

fn read_name(cursor: &mut Cursor<'_>) -> Result<String> {
    let raw = cursor.take_until(|c| c.is_whitespace() || matches!(c, '/' | '>' | '=' | '<'));
    if raw.is_empty() {
        return Err(cursor.error("expected a name"));
    }
    let mapped: String = raw
        .chars()
        .map(|c| if matches!(c, ':' | '-' | '.') { '_' } else { c })
        .collect();
    if !is_identifier(&mapped) {
        return Err(cursor.error(format!("'{}' cannot be used as a key element", raw)));
    }
    Ok(mapped)
}

fn element(cursor: &mut Cursor<'_>, depth: usize) -> Result<Element> {
    if depth > XmlParser::MAX_DEPTH {
        return Err(cursor.error(format!(
            "nesting too deep: more than {} levels",
            XmlParser::MAX_DEPTH
        )));
    }
    let position = cursor.position();
    cursor.eat("<");
    let raw_name_start = cursor.rest();
    let name = read_name(cursor)?;
    let raw_name = &raw_name_start[..raw_name_start.len() - cursor.rest().len()];
    let mut node = Element {
        name,
        position,
        attributes: Vec::new(),
        children: Vec::new(),
        text: String::new(),
    };

    loop {
        cursor.skip_whitespace();
        if cursor.eat("/>") {
            return Ok(node);
        }
        if cursor.eat(">") {
            break;
        }
        if cursor.at_end() {
            return Err(cursor.error(format!("unterminated start tag <{}>", raw_name)));
        }
        let is_namespace = cursor.starts_with("xmlns:") || cursor.starts_with("xmlns=")
            || cursor.starts_with("xmlns ");
        let attribute = read_name(cursor)?;
        cursor.skip_whitespace();
        if !cursor.eat("=") {
            return Err(cursor.error(format!("expected '=' after attribute '{}'", attribute)));
        }
        cursor.skip_whitespace();
        let quote = match cursor.next_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(cursor.error("expected a quoted attribute value")),
        };
        let raw = cursor
            .take_through(if quote == '"' { "\"" } else { "'" })
            .ok_or_else(|| cursor.error("unterminated attribute value"))?;
        let value = decode(cursor, raw)?;
        if !is_namespace {
            node.attributes.push((attribute, value));
        }
    }

    loop {
        if cursor.eat("</") {
            let start = cursor.rest();
            cursor.take_until(|c| c.is_whitespace() || c == '>');
            let closing = &start[..start.len() - cursor.rest().len()];
            cursor.skip_whitespace();
            if closing != raw_name || !cursor.eat(">") {
                return Err(cursor.error(format!("expected </{}>", raw_name)));
            }
            return Ok(node);
        } else if cursor.eat("<!--") {
            cursor
                .take_through("-->")
                .ok_or_else(|| cursor.error("unterminated comment"))?;
        } else if cursor.eat("<![CDATA[") {
            let data = cursor
                .take_through("]]>")
                .ok_or_else(|| cursor.error("unterminated CDATA section"))?;
            node.text.push_str(data);
        } else if cursor.eat("<?") {
            cursor
                .take_through("?>")
                .ok_or_else(|| cursor.error("unterminated processing instruction"))?;
        } else if cursor.starts_with("<") {
            node.children.push(element(cursor, depth + 1)?);
        } else if cursor.at_end() {
            return Err(cursor.error(format!("element <{}> is not closed", raw_name)));
        } else {
            let raw = cursor.take_until(|c| c == '<');
            let text = decode(cursor, raw)?;
            node.text.push_str(&text);
        }
    }
}

fn decode(cursor: &Cursor<'_>, raw: &str) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| cursor.error("unterminated character reference"))?;
        let entity = &after[..end];
        let ch = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(|code| code.ok())
                .and_then(char::from_u32),
        };
        match ch {
            Some(ch) => out.push(ch),
            None => return Err(cursor.error(format!("unknown character reference '&{};'", entity))),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Writes the attributes and children of `element` into `target`.
fn emit<W: WritableDocument>(target: &mut W, element: Element) -> Result<()> {
    let (line, col) = element.position;
    for (name, value) in element.attributes {
        target
            .add_string(&Key::from_element(&name, None), value)
            .map_err(input_conflict(line, col))?;
    }
    for child in element.children {
        let key = Key::from_element(&child.name, None);
        let (line, col) = child.position;
        let (kind, value) = if !child.attributes.is_empty() || !child.children.is_empty() {
            let mut document = Document::new();
            emit(&mut document, child)?;
            (Kind::Document, Value::Document(document))
        } else if child.text.trim().is_empty() {
            continue;
        } else {
            (Kind::String, Value::String(child.text))
        };
        target
            .push(&key, kind, value)
            .map_err(input_conflict(line, col))?;
    }
    Ok(())
}

/// Writes a document as XML.
///
/// Scalars become text elements, nulls empty elements, nested documents
/// nested elements, and sequences repeat their element once per item. `$` in
/// names is written as `_`.
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::format::XmlSerializer;
/// use semidoc::{key, Document, FormatOptions};
///
/// let mut doc = Document::new();
/// doc.add_strings(&key!("tag"), ["a", "b"])?.add_string(&key!("db.url"), "x<y")?;
///
/// assert_eq!(
///     doc.accept(XmlSerializer::new(&FormatOptions::default())),
///     "<document><tag>a</tag><tag>b</tag><db><url>x&lt;y</url></db></document>"
/// );
/// # Ok::<(), semidoc::Error>(())
/// ```
#[derive(Debug)]
pub struct XmlSerializer {
    out: String,
    pretty: bool,
    indent: usize,
    root: String,
    scopes: Vec<Scope>,
}

#[derive(Debug)]
struct Scope {
    name: String,
    empty: bool,
}

impl XmlSerializer {
    #[must_use]
    pub fn new(options: &FormatOptions) -> Self {
        XmlSerializer {
            out: String::new(),
            pretty: options.pretty,
            indent: options.indent,
            root: options.root_element.clone(),
            scopes: Vec::new(),
        }
    }

    fn newline(&mut self) {
        if self.pretty && !self.out.is_empty() {
            self.out.push('\n');
            let width = self.indent * self.scopes.len();
            self.out.extend(std::iter::repeat(' ').take(width));
        }
    }

    fn start_line(&mut self) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.empty = false;
        }
        self.newline();
    }

    fn leaf(&mut self, key: &Key, text: Option<&str>) {
        self.start_line();
        let name = element_name(key);
        match text {
            Some(text) => {
                self.out.push('<');
                self.out.push_str(&name);
                self.out.push('>');
                escape_into(&mut self.out, text);
                self.out.push_str("</");
                self.out.push_str(&name);
                self.out.push('>');
            }
            None => {
                self.out.push('<');
                self.out.push_str(&name);
                self.out.push_str("/>");
            }
        }
    }

    fn open(&mut self, name: String) {
        self.out.push('<');
        self.out.push_str(&name);
        self.out.push('>');
        self.scopes.push(Scope { name, empty: true });
    }

    fn close(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            if !scope.empty {
                self.newline();
            }
            self.out.push_str("</");
            self.out.push_str(&scope.name);
            self.out.push('>');
        }
    }
}

fn element_name(key: &Key) -> String {
    key.last().name().replace('$', "_")
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

impl Visitor for XmlSerializer {
    type Output = String;

    fn initialise(&mut self, _document: &Document) {
        let root = self.root.clone();
        self.open(root);
    }

    fn null_value(&mut self, key: &Key) {
        self.leaf(key, None);
    }

    fn string_value(&mut self, key: &Key, value: &str) {
        self.leaf(key, Some(value));
    }

    fn numeric_value(&mut self, key: &Key, value: &Number) {
        self.leaf(key, Some(&value.to_string()));
    }

    fn boolean_value(&mut self, key: &Key, value: bool) {
        self.leaf(key, Some(if value { "true" } else { "false" }));
    }

    fn enum_value(&mut self, key: &Key, value: &Constant) {
        self.leaf(key, Some(value.name()));
    }

    fn begin_child(&mut self, key: &Key, _document: &Document) -> Option<Self> {
        self.start_line();
        self.open(element_name(key));
        None
    }

    fn end_child(&mut self, _key: &Key, _child: Option<Self>) {
        self.close();
    }

    fn process(mut self) -> String {
        while !self.scopes.is_empty() {
            self.close();
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ReadableDocument;
    use crate::{key, Error};

    fn parse(input: &str) -> Result<Document> {
        let mut doc = Document::new();
        XmlParser.load_str(&mut doc, input)?;
        Ok(doc)
    }

    #[test]
    fn test_prolog_comments_and_namespaces_are_skipped() {
        let input = r#"<?xml version="1.0"?>
<!DOCTYPE note [<!ENTITY x "y">]>
<!-- leading -->
<ns:note xmlns:ns="urn:x" xmlns="urn:y" lang="en">
  <!-- inner --><to>Tove</to><?pi data?>
</ns:note>
<!-- trailing -->"#;
        let doc = parse(input).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get::<String>(&key!("lang")).unwrap(), "en");
        assert_eq!(doc.get::<String>(&key!("to[0]")).unwrap(), "Tove");
    }

    #[test]
    fn test_lone_children_are_sequence_entries() {
        let doc = parse(r#"<r id="7"><host>alpha</host><db><pool>4</pool></db></r>"#).unwrap();
        assert!(!doc.is_sequence(&key!("id")));
        assert!(doc.is_sequence(&key!("host")));
        assert_eq!(doc.sequence_len(&key!("host")), Some(1));
        assert_eq!(
            doc.get_all::<String>(&key!("host")).unwrap(),
            vec![Some("alpha".to_string())]
        );

        let db = doc.value(&key!("db")).unwrap();
        assert_eq!(db.as_sequence().unwrap().kind(), Kind::Document);
        assert_eq!(doc.get::<u32>(&key!("db[0].pool[0]")).unwrap(), 4);
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc = parse("<r><a>&lt;&amp;&#65;&#x42;&quot;</a><b><![CDATA[<raw & text>]]></b></r>")
            .unwrap();
        assert_eq!(doc.get::<String>(&key!("a[0]")).unwrap(), "<&AB\"");
        assert_eq!(doc.get::<String>(&key!("b[0]")).unwrap(), "<raw & text>");
    }

    #[test]
    fn test_names_are_mapped() {
        let doc = parse(r#"<r data-id="1"><x.y>2</x.y><a:b>3</a:b></r>"#).unwrap();
        assert!(doc.contains(&key!("data_id")));
        assert!(doc.contains(&key!("x_y[0]")));
        assert!(doc.contains(&key!("a_b[0]")));
    }

    #[test]
    fn test_empty_elements_and_mixed_text_are_dropped() {
        let doc = parse("<r><e/><f></f><g>text<h>1</h>more</g></r>").unwrap();
        assert!(!doc.contains(&key!("e")));
        assert!(!doc.contains(&key!("f")));
        assert_eq!(doc.get::<String>(&key!("g[0].h[0]")).unwrap(), "1");
        assert_eq!(doc.value(&key!("g[0]")).unwrap().as_document().unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_documents_form_a_sequence() {
        let doc = parse(r#"<r><n id="1"/><n id="2"/></r>"#).unwrap();
        assert_eq!(doc.sequence_len(&key!("n")), Some(2));
        assert_eq!(doc.get::<i32>(&key!("n[1].id")).unwrap(), 2);
    }

    #[test]
    fn test_malformed_inputs() {
        for input in [
            "",
            "text",
            "<r>",
            "<r></s>",
            "<r a=1/>",
            "<r>&bogus;</r>",
            "<r/><r/>",
            "<1r/>",
        ] {
            assert!(
                matches!(parse(input), Err(Error::Malformed { .. })),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_nesting_depth_is_limited() {
        let depth = 200_000;
        let input = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        match parse(&input).unwrap_err() {
            Error::Malformed { line, col, msg } => {
                assert!(msg.contains("nesting too deep"), "{msg}");
                assert_eq!((line, col), (1, 3 * XmlParser::MAX_DEPTH + 1));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let depth = XmlParser::MAX_DEPTH;
        let input = format!("{}x{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(parse(&input).is_ok());
    }

    #[test]
    fn test_conflicting_children_are_malformed() {
        let input = "<r>\n<a><b>1</b></a>\n<a>text</a>\n</r>";
        match parse(input).unwrap_err() {
            Error::Malformed { line, col, .. } => assert_eq!((line, col), (3, 1)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_of_parsed_documents() {
        let input = "<r><name>x &amp; y</name><tags>a</tags><tags>b</tags>\
<inner><v>1</v></inner><list><k>p</k></list><list><k>q</k></list></r>";
        let doc = parse(input).unwrap();
        assert_eq!(doc.get::<String>(&key!("list[1].k[0]")).unwrap(), "q");

        for options in [FormatOptions::default(), FormatOptions::pretty()] {
            let xml = doc.accept(XmlSerializer::new(&options));
            assert_eq!(parse(&xml).unwrap(), doc, "{xml}");
        }
    }

    #[test]
    fn test_pretty_layout() {
        let mut doc = Document::new();
        doc.add_string(&key!("inner.v"), "1").unwrap();
        doc.add_string(&key!("n"), None::<String>).unwrap();
        let options = FormatOptions::pretty().with_root_element("cfg");
        assert_eq!(
            doc.accept(XmlSerializer::new(&options)),
            "<cfg>\n  <inner>\n    <v>1</v>\n  </inner>\n  <n/>\n</cfg>"
        );
    }
}
