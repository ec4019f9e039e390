use std::path::PathBuf;

use crate::datenum::DateError;
use crate::labels::LabelError;

/// Errors raised while reading a result record from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input path does not exist
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("failed reading {}: {cause:#}", .path.display())]
    Read { path: PathBuf, cause: anyhow::Error },

    /// The content is not a well-formed result record
    #[error("failed parsing {}: {cause:#}", .path.display())]
    Parse { path: PathBuf, cause: anyhow::Error },
}

/// Errors raised when a record does not match the expected field layout.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing field '{0}'")]
    Missing(String),

    #[error("field '{field}': {message}")]
    Invalid { field: String, message: String },

    #[error("field '{field}' has {found} values, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("field '{field}' is not a {rows}x{cols} grid: {message}")]
    Shape {
        field: String,
        rows: usize,
        cols: usize,
        message: String,
    },

    #[error("record schema version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("no plot family matches the fields of this record")]
    UnknownFamily,

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    Date(#[from] DateError),
}

impl SchemaError {
    pub(crate) fn invalid(field: &str, message: impl std::fmt::Display) -> Self {
        SchemaError::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
