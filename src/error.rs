//! Error types for rust-entitygen

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::CatalogQuery;

/// Errors that abort a model extraction run
#[derive(Error, Debug)]
pub enum EntityGenError {
    #[error("Catalog query for {query} failed")]
    CatalogFetchError {
        query: CatalogQuery,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to read catalog snapshot: {path}")]
    SnapshotReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog snapshot: {path}")]
    SnapshotParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid catalog snapshot: {message}")]
    InvalidSnapshot { message: String },

    #[error("Relation graph is not symmetric: {message}")]
    RelationSymmetryError { message: String },

    #[error("Failed to write model to {path}")]
    ModelWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EntityGenError {
    /// Wrap a reader-side failure for one of the catalog queries
    pub fn catalog_fetch(
        query: CatalogQuery,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        EntityGenError::CatalogFetchError {
            query,
            source: source.into(),
        }
    }
}
