//! Error types for toxigauge

/// Result type alias using toxigauge's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for toxigauge operations
///
/// Encoding and post-processing are total, so every variant here comes from
/// a collaborator boundary: configuration, the vocabulary file, or the
/// inference runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Vocabulary content errors (missing reserved tokens)
    #[error("vocabulary error: {0}")]
    Vocabulary(String),

    /// Model loading or forward pass errors
    #[error("inference error: {0}")]
    Inference(String),

    /// Filesystem errors (unreadable vocabulary)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (malformed vocabulary JSON)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new vocabulary error
    pub fn vocabulary(msg: impl Into<String>) -> Self {
        Self::Vocabulary(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::vocabulary("missing <PAD>").to_string(),
            "vocabulary error: missing <PAD>"
        );
        assert_eq!(
            Error::inference("bad shape").to_string(),
            "inference error: bad shape"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "vocab.json");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: Error = json.into();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().starts_with("serialization error:"));
    }
}
