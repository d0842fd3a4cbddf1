//! Error types for the application.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the application layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// The settings file could not be read, parsed or validated.
    #[error("configuration error in {}: {message}", path.display())]
    Config {
        /// Settings file involved.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Filesystem or process I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The extractor printed a document that is not valid video info.
    #[error("invalid video info: {0}")]
    Json(#[from] serde_json::Error),

    /// The extractor ran but reported a failure.
    #[error("extractor failed: {0}")]
    Extractor(String),

    /// A download was requested before any video info was fetched.
    #[error("no video info has been fetched yet")]
    NoVideoInfo,

    /// A widget operation failed.
    #[error(transparent)]
    Widget(#[from] vidgrab_core::Error),
}

impl AppError {
    pub(crate) fn config(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
