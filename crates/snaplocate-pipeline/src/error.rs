//! Error types for scan sessions.
//!
//! The match pipeline itself never fails; these errors cover the pieces
//! around it: building the decoder, exporting the history, and tasks that
//! died unexpectedly.

use snaplocate_decoder::DecoderError;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while running a scan session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The decoder could not be created.
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    /// Writing the CSV export failed.
    #[error("Export to {path} failed: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A session task panicked or was cancelled.
    #[error("Session task '{task}' failed: {message}")]
    TaskFailed { task: &'static str, message: String },
}

impl SessionError {
    /// Create a new export error.
    pub fn export(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Export {
            path: path.into(),
            source,
        }
    }

    /// Create a new task failure error.
    pub fn task_failed(task: &'static str, message: impl Into<String>) -> Self {
        Self::TaskFailed {
            task,
            message: message.into(),
        }
    }
}
