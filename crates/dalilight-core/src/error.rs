use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Addressing errors
    #[error("Invalid short address: {0} (must be 0-63)")]
    InvalidShortAddress(u8),

    #[error("Invalid arc power level: {0} (must be 0-254)")]
    InvalidLevel(u8),

    #[error("Bus index {index} out of range for {max_buses} buses")]
    BusIndexOutOfRange { index: usize, max_buses: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
