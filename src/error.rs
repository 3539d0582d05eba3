//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI and `main` use `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum for file failures
//! - Stage-specific errors ([`EngineError`], [`TagError`],
//!   [`AcquisitionError`], [`ParseError`]) for detailed handling
//! - Per-item failures never surface here; they are recorded on the item
//!   (unmatched reason, reconciliation warning) and the batch continues
//!
//! [`EngineError`]: crate::engine::EngineError
//! [`TagError`]: crate::tags::TagError
//! [`AcquisitionError`]: crate::acquisition::AcquisitionError
//! [`ParseError`]: crate::descriptor::ParseError

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
