//! Build error types.

use std::path::PathBuf;

/// Errors that can occur while writing a build tree.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A build stage was invoked before the stage it depends on.
    #[error("'{stage}' called out of order (expected '{expected}' first)")]
    OutOfOrder {
        stage: &'static str,
        expected: &'static str,
    },

    /// The build name is not a plain module name, so its build root would not
    /// lie directly inside the build directory.
    #[error("invalid build name '{name}': expected an HDL identifier with an optional extension")]
    InvalidName { name: String },

    /// The build record could not be encoded.
    #[error("build record encoding failed: {0}")]
    Record(#[from] serde_json::Error),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> BuildError {
        let path = path.into();
        move |source| BuildError::Io { path, source }
    }
}

/// Result type alias for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
