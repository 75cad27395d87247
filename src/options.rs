//! Options shared by the format parsers and serializers.
//!
//! ```rust
//! use semidoc::FormatOptions;
//!
//! let options = FormatOptions::pretty()
//!     .with_indent(4)
//!     .with_root_element("settings");
//! assert!(options.pretty);
//! assert_eq!(options.root_element, "settings");
//! ```

/// Formatting and parsing knobs for the bundled formats.
///
/// Not every option applies to every format: `root_element` is only read by
/// the XML serializer and `tab_width` only by the properties parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per nesting level in pretty output.
    pub indent: usize,
    /// Emit newlines and indentation.
    pub pretty: bool,
    /// Name of the XML root element.
    pub root_element: String,
    /// Column width a tab expands to when reading properties.
    pub tab_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            indent: 2,
            pretty: false,
            root_element: "document".to_string(),
            tab_width: 4,
        }
    }
}

impl FormatOptions {
    /// Creates default options (compact output, 2-space indent, `document`
    /// root element, tab width 4).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::FormatOptions;
    ///
    /// let options = FormatOptions::new();
    /// assert_eq!(options.indent, 2);
    /// assert!(!options.pretty);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output.
    #[must_use]
    pub fn pretty() -> Self {
        FormatOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the indentation size. Only affects pretty output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the XML root element name.
    #[must_use]
    pub fn with_root_element(mut self, name: impl Into<String>) -> Self {
        self.root_element = name.into();
        self
    }

    /// Sets the tab width used when expanding tabs in properties input.
    ///
    /// A width of zero is treated as one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::FormatOptions;
    ///
    /// assert_eq!(FormatOptions::new().with_tab_width(8).tab_width, 8);
    /// assert_eq!(FormatOptions::new().with_tab_width(0).tab_width, 1);
    /// ```
    #[must_use]
    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.tab_width = width.max(1);
        self
    }
}
