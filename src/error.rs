use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `LibraryError`.
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Errors surfaced to callers of the catalog.
///
/// Tag parsing and scanning never produce these: malformed tags and
/// unreadable files degrade to partial or placeholder entries instead.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The library root exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Settings were loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
