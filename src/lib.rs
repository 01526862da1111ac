//! An audio catalog built from ID3v2 tags and kept in sync with a
//! directory tree.
//!
//! [`tag`] parses ID3v2.2/2.3/2.4 tags, [`library`] walks directories into
//! a shared catalog and answers queries over it, and [`reconcile`] keeps
//! the catalog in step with the filesystem from a background thread.

pub mod config;
pub mod error;
pub mod library;
pub mod probe;
pub mod reconcile;
pub mod shell;
pub mod tag;

#[cfg(test)]
mod test_support;

pub use error::{LibraryError, Result};
pub use library::{CatalogEntry, LibraryManager};
pub use reconcile::{Reconciler, ReconcilerState};
pub use tag::TrackMetadata;
