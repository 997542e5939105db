//! Hard failures of a collection run.
//!
//! Missing references, cycles and malformed commands never show up here:
//! they are recorded in the tree itself.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    /// The root document does not exist.
    #[error("Root document not found: {path}")]
    RootNotFound { path: PathBuf },

    /// The root path exists but is a directory or special file.
    #[error("Root path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// A file exists but could not be read. Always raised for the root,
    /// raised for referenced files only in strict mode.
    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file could not be parsed.
    #[error("Invalid config file {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },
}

impl CollectError {
    /// Map an I/O error on the root path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::RootNotFound { path },
            _ => Self::Unreadable { path, source },
        }
    }
}
