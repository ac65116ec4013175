//! Error types for the data layer

use std::path::PathBuf;
use thiserror::Error;

use crate::error::FormError;

/// Errors that can occur while fetching panel data
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read a fixture file.
    #[error("failed to read fixture {path}: {source}")]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fixture content is not valid JSON for the expected shape.
    #[error("invalid fixture {path}: {source}")]
    FixtureParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A stored object names a panel that does not exist.
    #[error("unknown panel '{0}' in stored objects")]
    UnknownPanel(String),

    /// The panel definition could not be built.
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Result type for data layer operations
pub type Result<T> = std::result::Result<T, SourceError>;
