//! Hierarchical path keys.
//!
//! A [`Key`] addresses a value inside a [`Document`](crate::Document). It is one
//! or more *elements* joined by `.`, where each element is an identifier
//! (`[A-Za-z_$][A-Za-z0-9_$]*`) optionally followed by a zero-based index in
//! brackets:
//!
//! ```text
//! name            simple key
//! server.port     nested documents
//! hosts[2]        third element of a sequence
//! hosts[2].name   field of a document stored in a sequence
//! ```
//!
//! Keys are validated when constructed and never afterwards; the string a key
//! was parsed from is exactly the string it displays as.
//!
//! ## Examples
//!
//! ```rust
//! use semidoc::Key;
//!
//! let key = Key::parse("hosts[2].name")?;
//! assert_eq!(key.to_string(), "hosts[2].name");
//! assert_eq!(key.elements().len(), 2);
//!
//! let built = Key::builder().element("hosts").index(2).element("name").build()?;
//! assert_eq!(built, key);
//! # Ok::<(), semidoc::Error>(())
//! ```

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// One `.`-delimited segment of a [`Key`], with its optional index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element {
    name: String,
    index: Option<usize>,
}

impl Element {
    /// The identifier part of the element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bracketed index, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

/// A validated hierarchical address into a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    raw: String,
    elements: Vec<Element>,
}

impl Key {
    /// Parses and validates a key string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] if the string is empty, contains an empty
    /// element, contains characters outside the identifier alphabet, or has a
    /// malformed index.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::Key;
    ///
    /// assert!(Key::parse("a.b[0].c").is_ok());
    /// assert!(Key::parse("").is_err());
    /// assert!(Key::parse("1abc").is_err());
    /// assert!(Key::parse("a[x]").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::grammar(input, "key is empty"));
        }

        let elements = input
            .split('.')
            .map(|segment| parse_element(input, segment))
            .collect::<Result<Vec<_>>>()?;

        Ok(Key {
            raw: input.to_string(),
            elements,
        })
    }

    /// Builds a single-element key from parts already known to be valid.
    pub(crate) fn from_element(name: &str, index: Option<usize>) -> Self {
        let element = Element {
            name: name.to_string(),
            index,
        };
        Key {
            raw: element.to_string(),
            elements: vec![element],
        }
    }

    /// Starts a [`KeyBuilder`].
    #[must_use]
    pub fn builder() -> KeyBuilder {
        KeyBuilder::default()
    }

    /// Derives a multi-level key from a constant name: the name is lower-cased
    /// and each `_` word separator becomes a `.`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::Key;
    ///
    /// let key = Key::from_constant_name("SERVER_PORT")?;
    /// assert_eq!(key.as_str(), "server.port");
    /// # Ok::<(), semidoc::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] if the transformed name is not a valid key.
    pub fn from_constant_name(name: &str) -> Result<Self> {
        Key::parse(&name.to_lowercase().replace('_', "."))
    }

    /// Derives a single-level key from a constant name by upper-casing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] if the transformed name is not a valid key.
    pub fn from_constant_name_flat(name: &str) -> Result<Self> {
        let key = Key::parse(&name.to_uppercase())?;
        if key.is_simple() {
            Ok(key)
        } else {
            Err(Error::grammar(name, "constant name must map to a single element"))
        }
    }

    /// The externalised key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The elements of this key, outermost first.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The innermost element.
    #[must_use]
    pub fn last(&self) -> &Element {
        // A key always has at least one element.
        &self.elements[self.elements.len() - 1]
    }

    /// Returns `true` for a single-element key.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.elements.len() == 1
    }

    /// Returns `true` if the innermost element carries an index.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.last().index.is_some()
    }

    /// The key without its innermost element, or `None` for a simple key.
    #[must_use]
    pub fn parent(&self) -> Option<Key> {
        let cut = self.raw.rfind('.')?;
        Some(Key {
            raw: self.raw[..cut].to_string(),
            elements: self.elements[..self.elements.len() - 1].to_vec(),
        })
    }

    /// The same key with the index removed from its innermost element.
    #[must_use]
    pub fn without_index(&self) -> Key {
        let mut elements = self.elements.clone();
        let last = elements.len() - 1;
        elements[last].index = None;
        Key::from_elements(elements)
    }

    /// Concatenates two keys with a `.`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::Key;
    ///
    /// let joined = Key::parse("a.b[1]")?.join(&Key::parse("c")?);
    /// assert_eq!(joined.as_str(), "a.b[1].c");
    /// # Ok::<(), semidoc::Error>(())
    /// ```
    #[must_use]
    pub fn join(&self, other: &Key) -> Key {
        let mut elements = self.elements.clone();
        elements.extend(other.elements.iter().cloned());
        Key {
            raw: format!("{}.{}", self.raw, other.raw),
            elements,
        }
    }

    /// Concatenates this key with every key in `others`, left to right.
    #[must_use]
    pub fn join_all<'a>(&self, others: impl IntoIterator<Item = &'a Key>) -> Key {
        others
            .into_iter()
            .fold(self.clone(), |joined, next| joined.join(next))
    }

    /// Appends a single element name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] if `name` is not a valid identifier.
    pub fn child(&self, name: &str) -> Result<Key> {
        let element = parse_element(name, name)?;
        if element.index.is_some() {
            return Err(Error::grammar(name, "child name must not carry an index"));
        }
        let mut elements = self.elements.clone();
        elements.push(element);
        Ok(Key {
            raw: format!("{}.{}", self.raw, name),
            elements,
        })
    }

    /// Attaches `index` to the innermost element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] if the innermost element is already indexed.
    pub fn index(&self, index: usize) -> Result<Key> {
        if self.is_indexed() {
            return Err(Error::grammar(
                &format!("{}[{}]", self.raw, index),
                "an element takes at most one index",
            ));
        }
        Ok(Key {
            raw: format!("{}[{}]", self.raw, index),
            elements: {
                let mut elements = self.elements.clone();
                let last = elements.len() - 1;
                elements[last].index = Some(index);
                elements
            },
        })
    }

    fn from_elements(elements: Vec<Element>) -> Key {
        let raw = elements
            .iter()
            .map(Element::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Key { raw, elements }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Returns `true` if `name` is a valid unindexed element.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(ch) if is_identifier_start(ch)) && chars.all(is_identifier_part)
}

fn parse_element(input: &str, segment: &str) -> Result<Element> {
    if segment.is_empty() {
        return Err(Error::grammar(input, "empty element"));
    }

    let (name, index) = match segment.find('[') {
        Some(open) => {
            let Some(digits) = segment[open + 1..].strip_suffix(']') else {
                return Err(Error::grammar(input, "index is not closed by ']'"));
            };
            (&segment[..open], Some(parse_index(input, digits)?))
        }
        None => (segment, None),
    };

    if !is_identifier(name) {
        return Err(Error::grammar(
            input,
            &format!("'{}' is not a valid element name", name),
        ));
    }

    Ok(Element {
        name: name.to_string(),
        index,
    })
}

fn parse_index(input: &str, digits: &str) -> Result<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::grammar(input, "index must be a decimal number"));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(Error::grammar(input, "index must not have leading zeros"));
    }
    digits
        .parse::<usize>()
        .map_err(|_| Error::grammar(input, "index is too large"))
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Key::parse(s)
    }
}

impl TryFrom<&str> for Key {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Key::parse(s)
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Key::parse(&s)
    }
}

/// Accumulates keys, element names and indices into a [`Key`].
///
/// A `.` is inserted before each appended key or element, and `[i]` is attached
/// directly after the preceding element for each appended index. Validation
/// happens once, in [`KeyBuilder::build`].
///
/// # Examples
///
/// ```rust
/// use semidoc::Key;
///
/// let base = Key::parse("cluster.nodes")?;
/// let key = Key::builder().key(&base).index(0).element("address").build()?;
/// assert_eq!(key.as_str(), "cluster.nodes[0].address");
/// # Ok::<(), semidoc::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyBuilder {
    buffer: String,
}

impl KeyBuilder {
    /// Appends an existing key.
    #[must_use]
    pub fn key(self, key: &Key) -> Self {
        self.element(key.as_str())
    }

    /// Appends a raw element string.
    #[must_use]
    pub fn element(mut self, element: &str) -> Self {
        if !self.buffer.is_empty() {
            self.buffer.push('.');
        }
        self.buffer.push_str(element);
        self
    }

    /// Attaches an index to the preceding element.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.buffer.push('[');
        self.buffer.push_str(&index.to_string());
        self.buffer.push(']');
        self
    }

    /// Validates the accumulated string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`] if the accumulated string is not a valid key,
    /// e.g. when nothing was appended or an index had no preceding element.
    pub fn build(self) -> Result<Key> {
        Key::parse(&self.buffer)
    }
}
