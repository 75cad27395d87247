//! Error types for key parsing, document access and format loading.
//!
//! Every failure surfaces synchronously to the immediate caller with enough
//! context (key path, kind names, raw value, input position) to diagnose it
//! without re-deriving state.
//!
//! ## Error Categories
//!
//! - **Grammar**: a malformed key string, rejected at construction
//! - **Unset**: a read of a key with no stored value and no default
//! - **Conversion**: a stored value that cannot be coerced to the requested kind
//! - **Unsupported mutation**: a write against an unmodifiable view
//! - **Structure**: a key that walks through a value which cannot contain it
//! - **I/O** and **Malformed**: stream and content faults raised by parsers
//!
//! ## Examples
//!
//! ```rust
//! use semidoc::{Error, Key};
//!
//! let err = Key::parse("a..b").unwrap_err();
//! assert!(matches!(err, Error::Grammar { .. }));
//! assert!(err.to_string().contains("a..b"));
//! ```

use crate::Key;
use std::fmt;
use std::io;
use thiserror::Error;

/// Represents every error the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// A key string does not satisfy the key grammar.
    #[error("Invalid key '{input}': {reason}")]
    Grammar { input: String, reason: String },

    /// The key holds no value and no default was supplied.
    #[error("Key '{key}' has no value")]
    Unset { key: String },

    /// A stored value cannot be converted to the requested kind.
    #[error("Cannot convert {from} '{raw}' to {to}{}", key_suffix(.key))]
    Conversion {
        key: Option<String>,
        from: &'static str,
        to: &'static str,
        raw: String,
    },

    /// A mutation was attempted on an unmodifiable document.
    #[error("Unsupported mutation: cannot {operation} '{key}' on an unmodifiable document")]
    UnsupportedMutation {
        operation: &'static str,
        key: String,
    },

    /// The key addresses a position that cannot hold a value.
    #[error("Invalid structure at '{key}': {reason}")]
    Structure { key: String, reason: String },

    /// IO error while reading a source or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input is not well formed for the format being parsed.
    #[error("Malformed input at line {line}, column {col}: {msg}")]
    Malformed { line: usize, col: usize, msg: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_ref()
        .map(|k| format!(" at '{}'", k))
        .unwrap_or_default()
}

impl Error {
    /// Creates a grammar error for the offending input.
    pub fn grammar(input: &str, reason: &str) -> Self {
        Error::Grammar {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an unset error for `key`.
    pub fn unset(key: &Key) -> Self {
        Error::Unset {
            key: key.to_string(),
        }
    }

    /// Creates a conversion error not yet attached to a key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::Error;
    ///
    /// let err = Error::conversion("string", "i32", "Hello");
    /// assert!(err.to_string().contains("Cannot convert string 'Hello' to i32"));
    /// ```
    pub fn conversion(from: &'static str, to: &'static str, raw: impl fmt::Display) -> Self {
        Error::Conversion {
            key: None,
            from,
            to,
            raw: raw.to_string(),
        }
    }

    /// Creates an unsupported-mutation error.
    pub fn unsupported_mutation(operation: &'static str, key: &Key) -> Self {
        Error::UnsupportedMutation {
            operation,
            key: key.to_string(),
        }
    }

    /// Creates a structure error for `key`.
    pub fn structure(key: &Key, reason: impl Into<String>) -> Self {
        Error::Structure {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed-input error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use semidoc::Error;
    ///
    /// let err = Error::malformed(3, 7, "expected ':'");
    /// assert!(err.to_string().contains("line 3, column 7"));
    /// ```
    pub fn malformed(line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::Malformed {
            line,
            col,
            msg: msg.into(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Attaches `key` to a conversion error that does not carry one yet.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn at(self, key: &Key) -> Self {
        match self {
            Error::Conversion {
                key: None,
                from,
                to,
                raw,
            } => Error::Conversion {
                key: Some(key.to_string()),
                from,
                to,
                raw,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
