//! Error types for decoder operations.
//!
//! A decoder fails when its frame source goes away, when a replay script is
//! malformed, or when reading the script fails.

/// Result type alias for decoder operations.
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur while pulling frames from a decoder.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    /// Decoder is not connected or its source went away.
    #[error("Decoder disconnected: {decoder}")]
    Disconnected { decoder: String },

    /// Malformed line in a replay script.
    #[error("Script error at line {line}: {message}")]
    Script { line: usize, message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the frame source itself.
    #[error("{0}")]
    Other(String),
}

impl DecoderError {
    /// Create a new disconnected error.
    pub fn disconnected(decoder: impl Into<String>) -> Self {
        Self::Disconnected {
            decoder: decoder.into(),
        }
    }

    /// Create a new script error for a 1-based line number.
    pub fn script(line: usize, message: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: message.into(),
        }
    }

    /// Create an error carrying the frame source's own message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = DecoderError::disconnected("Mock Decoder");
        assert!(matches!(error, DecoderError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Decoder disconnected: Mock Decoder");
    }

    #[test]
    fn test_script_error() {
        let error = DecoderError::script(7, "missing payload column");
        assert!(matches!(error, DecoderError::Script { line: 7, .. }));
        assert_eq!(
            error.to_string(),
            "Script error at line 7: missing payload column"
        );
    }

    #[test]
    fn test_other_error() {
        let error = DecoderError::other("lens covered");
        assert_eq!(error.to_string(), "lens covered");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "frames.tsv");
        let error: DecoderError = io.into();
        assert!(error.to_string().starts_with("I/O error"));
    }
}
