use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving vocabularies or editing annotation batches.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid batch json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("class specifier must be a string or a list of strings, but got {0}")]
    InvalidClassSpec(&'static str),

    #[error("record {id} has annotations but no `labels` field")]
    MissingLabels { id: String },

    #[error("record {id} has label {label}, which is outside the {num_classes} known classes")]
    LabelOutOfRange {
        id: String,
        label: i64,
        num_classes: usize,
    },

    #[error("annotation field `{key}` of kind {kind} is not supported here")]
    UnsupportedField { key: String, kind: &'static str },

    #[error("cannot add annotation field `{key}`: base is {base}, prior is {prior}")]
    IncompatibleFields {
        key: String,
        base: &'static str,
        prior: &'static str,
    },

    #[error("annotation keys of record {id} differ: base has {base:?}, prior has {prior:?}")]
    AnnKeyMismatch {
        id: String,
        base: Vec<String>,
        prior: Vec<String>,
    },

    #[error("annotation field `{key}` of record {id} has {found} objects, expected {expected}")]
    LengthMismatch {
        id: String,
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot concatenate annotation arrays: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
