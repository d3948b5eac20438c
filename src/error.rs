//! Domain errors.
//!
//! Registry and lookup errors abort an invocation. Download and build
//! errors are caught at the reconciliation boundary and reported.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown library '{0}' (see `libstack list`)")]
    NotFound(String),

    #[error("library '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("download of {url} failed: {detail}")]
    Download { url: String, detail: String },

    #[error("build of '{id}' failed: {detail}")]
    Build { id: String, detail: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn yaml(path: impl Into<PathBuf>, source: serde_yaml_ng::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
