//! # Application Errors
//!
//! Errors raised by the binary around the engine: configuration, file and
//! socket I/O. Engine errors pass through unchanged.

use imgtag_core::CatalogError;
use thiserror::Error;

/// Errors surfaced by the CLI and the server runtime.
#[derive(Debug, Error)]
pub enum AppError {
    /// The engine or the catalog store failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The configuration file or an override is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file or socket operation failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Catalog(CatalogError::InvalidInput(_)) | Self::Config(_) => 2,
            Self::Catalog(CatalogError::NotFound(_)) => 3,
            Self::Catalog(_) | Self::Io(_) => 1,
        }
    }
}
