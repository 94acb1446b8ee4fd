//! Error types for the local store

use std::path::PathBuf;

use migrate_model::ModelError;

/// Errors reading or writing the local object store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error on a store path
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is neither `.json` nor `.touched`
    #[error("invalid file extension: {0}")]
    InvalidExtension(String),

    /// File name is not `<type>-<id>.<ext>`
    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    /// Folder name is not an organisation ID
    #[error("invalid org folder {folder}: {source}")]
    InvalidOrg {
        folder: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Object ID is empty
    #[error("invalid object ID: {0:?}")]
    InvalidObjectId(String),

    /// Input ref names neither a monitor nor a dashboard
    #[error("invalid input ref: {0}")]
    InvalidInputRef(String),

    /// Input ref file is not valid JSON
    #[error("failed to unmarshal file {path}: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Stored document could not be decoded or encoded
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
