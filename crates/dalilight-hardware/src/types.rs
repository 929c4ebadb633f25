//! Common types shared across transport implementations.

use serde::{Deserialize, Serialize};

/// Metadata about a DALI bus master.
///
/// Contains the name, model and optional serial number of the interface
/// that carries one physical bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportInfo {
    /// Interface name (e.g., "Hasseb DALI Master", "Mock DALI Bus").
    pub name: String,

    /// Interface model identifier.
    pub model: String,

    /// Optional serial number.
    pub serial_number: Option<String>,
}

impl TransportInfo {
    /// Create a new TransportInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            serial_number: None,
        }
    }

    /// Set the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }
}
