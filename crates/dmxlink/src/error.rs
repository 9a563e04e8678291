//! Error types for the ArtNet client
use thiserror::Error;

/// ArtNet client errors
#[derive(Error, Debug)]
pub enum ArtNetError {
    /// A send for this universe is in flight or still inside its cooldown.
    /// The channel update that triggered it has been applied but not transmitted.
    #[error("universe {universe} is busy")]
    Busy { universe: u16 },

    /// The transport reported a failure while sending a frame
    #[error("transmission error: {0}")]
    Transmission(#[source] std::io::Error),

    /// Rejected configuration change or unreadable configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Universe outside the 15-bit Port-Address space
    #[error("invalid universe: {0} (must be 0-32767)")]
    InvalidUniverse(u16),

    /// Channel write outside 1-512
    #[error("invalid channel range: start {start}, {count} value(s)")]
    InvalidChannel { start: u16, count: usize },

    /// The client has been closed
    #[error("client is closed")]
    Closed,

    /// I/O error (socket setup, config files)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ArtNetError {
    /// Whether this is the throttle backpressure outcome rather than a failure
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Result type for ArtNet operations
pub type Result<T> = std::result::Result<T, ArtNetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_display() {
        let err = ArtNetError::Busy { universe: 3 };
        assert_eq!(err.to_string(), "universe 3 is busy");
        assert!(err.is_busy());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let err: ArtNetError = io.into();
        assert!(matches!(err, ArtNetError::IoError(_)));
        assert!(!err.is_busy());
    }
}
