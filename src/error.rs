use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DumlError>;

#[derive(Debug, Error)]
pub enum DumlError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read DUML input: {0}")]
    Read(#[from] io::Error),

    /// A key made only of dots, e.g. `..`, names no location.
    #[error("line {line}: key has no path segments")]
    EmptyKeyPath { line: usize },

    #[error("cannot render `{path}` as DUML: {reason}")]
    Unrenderable { path: String, reason: &'static str },
}
