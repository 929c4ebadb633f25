//! Enum wrapper for transport dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn DaliTransport>`
//! is not available. [`AnyTransport`] provides concrete dispatch over every
//! transport compiled into the workspace instead.
//!
//! # Examples
//!
//! ```
//! use dalilight_hardware::devices::AnyTransport;
//! use dalilight_hardware::mock::MockTransport;
//!
//! let (transport, _handle) = MockTransport::new();
//! let any = AnyTransport::Mock(transport);
//! ```

use crate::command::{Command, Response};
use crate::mock::MockTransport;
use crate::traits::DaliTransport;
use crate::types::TransportInfo;
use crate::Result;

/// Enum wrapper for transport dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTransport {
    /// Simulated bus for development and testing.
    Mock(MockTransport),
}

impl DaliTransport for AnyTransport {
    async fn send(&mut self, command: Command) -> Result<Response> {
        match self {
            Self::Mock(transport) => transport.send(command).await,
        }
    }

    fn info(&self) -> TransportInfo {
        match self {
            Self::Mock(transport) => transport.info(),
        }
    }
}

impl From<MockTransport> for AnyTransport {
    fn from(transport: MockTransport) -> Self {
        Self::Mock(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalilight_core::ShortAddress;

    #[tokio::test]
    async fn test_any_transport_mock() {
        let (transport, handle) = MockTransport::new();
        handle.add_gear(2, 77);
        let mut any = AnyTransport::from(transport);

        let response = any
            .send(Command::QueryActualLevel(ShortAddress::new(2).unwrap()))
            .await
            .unwrap();

        assert_eq!(response, Response::Level(77));
        assert_eq!(any.info().name, "Mock DALI Bus");
    }
}
