//! Storage abstractions for the service layer
//!
//! `json_file` reads and writes whole JSON documents; `record_store` is the
//! narrow keyed interface the account store depends on, with a JSON-document
//! backed implementation in `json_table`.

use thiserror::Error;

pub mod json_file;
pub mod json_table;
pub mod record_store;

pub use json_table::JsonTable;
pub use record_store::RecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file path must end with .json: {0}")]
    InvalidPath(String),
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected document shape in {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io { path: path.display().to_string(), source }
    }

    pub(crate) fn schema(path: &std::path::Path, source: serde_json::Error) -> Self {
        Self::Schema { path: path.display().to_string(), source }
    }
}
