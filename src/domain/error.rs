//! Dataset errors.
//!
//! Everything that can go wrong between "a directory on disk" and
//! "a validated `HeteroGraph`" ends up as one of these variants.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Missing table '{}' (looked for .csv.gz and .csv)", path.display())]
    MissingTable { path: PathBuf },

    #[error("Malformed row in '{}' line {line}: {message}", path.display())]
    MalformedRow {
        path:    PathBuf,
        line:    usize,
        message: String,
    },

    #[error("Unknown node type '{node_type}'")]
    UnknownNodeType { node_type: String },

    #[error("{what}: index {index} out of range (bound {bound})")]
    IndexOutOfRange {
        what:  String,
        index: i64,
        bound: usize,
    },

    #[error("{what}: expected {expected} values, found {found}")]
    SizeMismatch {
        what:     String,
        expected: usize,
        found:    usize,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}
