//! Read-only application settings.
//!
//! A [`Config`] is loaded once from any bundled [`Format`] and then read
//! through named constants: a constant `SERVER_PORT` addresses the key
//! `server.port`.
//!
//! ```rust
//! use semidoc::{constants, Config, Format};
//!
//! constants! {
//!     pub enum Setting {
//!         ServerPort = "SERVER_PORT",
//!         ServerName = "SERVER_NAME",
//!         Debug = "DEBUG",
//!     }
//! }
//!
//! let config = Config::load(Format::Properties, "server.port = 8080\n".as_bytes())?;
//! assert_eq!(config.setting::<u16, _>(Setting::ServerPort)?, 8080);
//! assert_eq!(config.setting_or(Setting::Debug, false)?, false);
//! # Ok::<(), semidoc::Error>(())
//! ```

use crate::convert::FromValue;
use crate::decorator::Unmodifiable;
use crate::format::Format;
use crate::traits::ReadableDocument;
use crate::value::EnumConstant;
use crate::{Document, FormatOptions, Result};
use std::io;
use tracing::debug;

/// Settings loaded from a document source. There is no mutation access.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    document: Document,
}

impl Config {
    /// Loads settings from `source` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) or
    /// [`Error::Malformed`](crate::Error::Malformed) if the source cannot be
    /// read or parsed.
    pub fn load<R: io::Read>(format: Format, source: R) -> Result<Self> {
        Self::load_with(format, source, &FormatOptions::default())
    }

    /// Loads settings from `source` with the given options.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with<R: io::Read>(
        format: Format,
        source: R,
        options: &FormatOptions,
    ) -> Result<Self> {
        let mut document = Document::new();
        format.load_with(&mut document, source, options)?;
        debug!(?format, entries = document.len(), "loaded configuration");
        Ok(Config { document })
    }

    #[must_use]
    pub fn from_document(document: Document) -> Self {
        Config { document }
    }

    /// A read-only view of the loaded document.
    #[must_use]
    pub fn document(&self) -> Unmodifiable<&Document> {
        Unmodifiable::new(&self.document)
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Reads the setting named by `name` as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Grammar`](crate::Error::Grammar) if the constant does
    /// not form a key, [`Error::Unset`](crate::Error::Unset) if the setting is
    /// missing, and [`Error::Conversion`](crate::Error::Conversion) if it
    /// cannot be read as `T`.
    pub fn setting<T: FromValue, E: EnumConstant>(&self, name: E) -> Result<T> {
        self.document.get(&name.dotted_key()?)
    }

    /// Reads the setting named by `name`, or `default` when it is missing.
    ///
    /// # Errors
    ///
    /// See [`Config::setting`]; a missing setting is not an error.
    pub fn setting_or<T: FromValue, E: EnumConstant>(&self, name: E, default: T) -> Result<T> {
        self.document.get_or(&name.dotted_key()?, default)
    }

    /// Reads every element of the setting named by `name`.
    ///
    /// # Errors
    ///
    /// See [`Config::setting`].
    pub fn settings<T: FromValue, E: EnumConstant>(&self, name: E) -> Result<Vec<Option<T>>> {
        self.document.get_all(&name.dotted_key()?)
    }

    /// Returns `true` if the setting named by `name` holds a non-null value.
    pub fn is_set<E: EnumConstant>(&self, name: E) -> bool {
        name.dotted_key()
            .map_or(false, |key| self.document.has_value(&key))
    }
}

impl ReadableDocument for Config {
    fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        f(&self.document)
    }
}

impl From<Document> for Config {
    fn from(document: Document) -> Self {
        Config::from_document(document)
    }
}
