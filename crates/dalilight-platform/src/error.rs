//! Error types for platform setup.
//!
//! Only configuration and setup can fail outright. State queries and
//! commands on entities never return errors; they degrade to an unknown
//! state and log instead.

use dalilight_hardware::TransportError;

use crate::config::ConfigError;

/// Result type alias for platform setup.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Errors that can abort platform setup.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Identifier space or addressing error.
    #[error(transparent)]
    Core(#[from] dalilight_core::Error),

    /// Transport enumeration failed.
    #[error("Transport enumeration failed: {0}")]
    Transport(#[from] TransportError),
}
