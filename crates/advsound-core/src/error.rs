//! Error types for advsound.

use thiserror::Error;

use crate::SoundId;

/// Result type alias using advsound's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for advsound.
#[derive(Error, Debug)]
pub enum Error {
    // Handle errors
    #[error("All {capacity} sound handles are in use")]
    AllocationExhausted { capacity: usize },

    #[error("No live sound with id {0}")]
    NotFound(SoundId),

    // Backend lifecycle errors
    #[error("Backend initialization failed: {0}")]
    BackendInit(String),

    #[error("Backend is not initialized")]
    NotInitialized,

    // Resource errors
    #[error("Malformed sound resource: {0}")]
    MalformedResource(String),

    #[error("Failed to fetch sound resource: {0}")]
    Fetch(String),

    // Audio errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("Audio output error: {0}")]
    Output(String),

    #[error("All {max} voices are in use")]
    VoicesExhausted { max: usize },

    #[error("Unknown backend source: {0}")]
    UnknownSource(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if retrying the same request later may succeed.
    ///
    /// Exhausted handles or voices free up as sounds are dequeued; a network
    /// fetch may succeed on the next attempt. Malformed input never will.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AllocationExhausted { .. } | Self::VoicesExhausted { .. } | Self::Fetch(_)
        )
    }

    /// Returns true if this error came from the caller's sound resource.
    pub const fn is_resource_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedResource(_) | Self::Fetch(_) | Self::Decode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverable() {
        assert!(Error::AllocationExhausted { capacity: 2 }.is_recoverable());
        assert!(Error::VoicesExhausted { max: 32 }.is_recoverable());
        assert!(!Error::MalformedResource("bad".into()).is_recoverable());
        assert!(!Error::NotInitialized.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::AllocationExhausted { capacity: 128 };
        assert_eq!(err.to_string(), "All 128 sound handles are in use");

        let err = Error::NotFound(SoundId::new(7));
        assert_eq!(err.to_string(), "No live sound with id 7");
    }

    #[test]
    fn test_resource_errors() {
        assert!(Error::Decode("eof".into()).is_resource_error());
        assert!(!Error::Output("device lost".into()).is_resource_error());
    }
}
