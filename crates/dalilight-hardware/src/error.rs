//! Error types for transport operations.
//!
//! A DALI exchange can fail in three distinct ways, and callers treat each
//! one differently: an I/O failure means the bus master itself is gone, a
//! protocol failure means a frame arrived but made no sense, and a missing
//! response is a legitimate outcome when no gear answers at an address.

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while exchanging a command with a DALI bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The bus master could not be reached (USB unplugged, write failed).
    #[error("I/O error: {message}")]
    Io { message: String },

    /// A backward frame arrived but was malformed or of the wrong kind.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// No control gear answered.
    #[error("No response")]
    NoResponse,
}

impl TransportError {
    /// Create a new I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Whether the bus master itself failed.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Whether the exchange completed with nobody answering.
    pub fn is_no_response(&self) -> bool {
        matches!(self, Self::NoResponse)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}
