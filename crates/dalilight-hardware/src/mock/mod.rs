//! Mock transport implementations for testing and development.
//!
//! This module provides a simulated bus that can be controlled
//! programmatically without requiring a physical bus master.

pub mod transport;

// Re-export commonly used types
pub use transport::{MockFault, MockTransport, MockTransportHandle};
