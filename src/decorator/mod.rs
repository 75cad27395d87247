//! Wrappers that change how a document accepts mutations.
//!
//! Each decorator implements [`ReadableDocument`](crate::ReadableDocument) and
//! [`WritableDocument`](crate::WritableDocument) over the document it wraps,
//! so decorators stack freely:
//!
//! ```rust
//! use semidoc::prelude::*;
//! use semidoc::{key, Document, NullFiltering, Synchronized};
//!
//! let shared = Synchronized::new(NullFiltering::new(Document::new()));
//! let mut writer = &shared;
//! writer.add_string(&key!("kept"), "x")?.add_string(&key!("dropped"), None::<String>)?;
//!
//! assert!(shared.contains(&key!("kept")));
//! assert!(!shared.contains(&key!("dropped")));
//! # Ok::<(), semidoc::Error>(())
//! ```

mod filter;
mod sync;
mod unmodifiable;

pub use filter::NullFiltering;
pub use sync::Synchronized;
pub use unmodifiable::Unmodifiable;
