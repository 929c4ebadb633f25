//! Transport trait definitions.
//!
//! This module defines the contract between the lighting logic and whatever
//! physically carries DALI frames. The logic never talks to USB or serial
//! ports directly; it hands a [`Command`] to a [`DaliTransport`] and gets a
//! typed [`Response`] or a [`TransportError`](crate::TransportError) back.
//!
//! The futures returned by transports are required to be `Send` so that
//! buses can be driven from independent Tokio tasks. Implementations can
//! still be written with plain `async fn`.

use std::future::Future;

use crate::command::{Command, Response};
use crate::error::Result;
use crate::types::TransportInfo;

/// One physical DALI bus master.
///
/// A transport is not shared directly. It is owned by a
/// [`SharedBus`](crate::bus::SharedBus), which serializes every exchange
/// behind the per-bus lock.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait is NOT object-safe because `send` returns `impl Future`.
/// Use generic parameters, or the [`AnyTransport`](crate::devices::AnyTransport)
/// enum when the concrete type is chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use dalilight_hardware::traits::DaliTransport;
/// use dalilight_hardware::command::Command;
/// use dalilight_hardware::error::Result;
/// use dalilight_core::ShortAddress;
///
/// async fn level_of<T: DaliTransport>(transport: &mut T, address: ShortAddress) -> Result<u8> {
///     transport.send(Command::QueryActualLevel(address)).await?.level()
/// }
/// ```
pub trait DaliTransport: Send + 'static {
    /// Send one command and wait for its outcome.
    ///
    /// # Errors
    ///
    /// - `TransportError::Io` if the bus master could not be reached
    /// - `TransportError::Protocol` if the answer was garbled
    /// - `TransportError::NoResponse` if a query got no answer
    fn send(&mut self, command: Command) -> impl Future<Output = Result<Response>> + Send;

    /// Describe the bus master.
    fn info(&self) -> TransportInfo;
}

/// Enumerates the bus masters attached to the host.
///
/// Each returned transport is one bus; its position in the returned list is
/// the bus index.
pub trait TransportFactory {
    /// Concrete transport produced by this factory.
    type Transport: DaliTransport;

    /// Take every transport currently attached.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration itself fails.
    fn enumerate(&mut self) -> Result<Vec<Self::Transport>>;
}

/// A fixed list of already-opened transports.
impl<T: DaliTransport> TransportFactory for Vec<T> {
    type Transport = T;

    fn enumerate(&mut self) -> Result<Vec<T>> {
        Ok(std::mem::take(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_vec_factory_drains() {
        let (a, _) = MockTransport::new();
        let (b, _) = MockTransport::new();
        let mut factory = vec![a, b];

        assert_eq!(factory.enumerate().unwrap().len(), 2);
        assert!(factory.enumerate().unwrap().is_empty());
    }
}
