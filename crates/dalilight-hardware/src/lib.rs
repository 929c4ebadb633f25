//! Transport abstraction layer for DALI lighting buses.
//!
//! This crate defines how the lighting logic reaches a physical DALI bus:
//! command descriptors, the transport trait, the per-bus lock and a mock
//! bus for development and testing. The bit-level protocol, collision
//! handling and USB framing all live behind [`DaliTransport`]
//! implementations; nothing in this crate decodes frames.
//!
//! # Design Philosophy
//!
//! - **Async-first**: transports expose `async` methods whose futures are
//!   `Send`, so each bus can be driven from its own Tokio task.
//! - **One lock per bus**: [`SharedBus`] is the only path to a transport and
//!   serializes every exchange on it.
//! - **Typed failures**: every exchange ends in a [`Response`] or one of the
//!   three [`TransportError`] kinds (I/O, protocol, no response).
//!
//! # Example
//!
//! ```no_run
//! use dalilight_hardware::bus::SharedBus;
//! use dalilight_hardware::command::Command;
//! use dalilight_hardware::mock::MockTransport;
//! use dalilight_core::ShortAddress;
//!
//! # async fn example() -> dalilight_hardware::Result<()> {
//! let (transport, handle) = MockTransport::new();
//! handle.add_gear(3, 120);
//!
//! let bus = SharedBus::new(0, "office", transport);
//! let present = bus
//!     .exchange(Command::QueryControlGearPresent(ShortAddress::new(3).unwrap()))
//!     .await?
//!     .yes_no()?;
//! assert!(present);
//! # Ok(())
//! # }
//! ```
//!
//! [`DaliTransport`]: traits::DaliTransport
//! [`SharedBus`]: bus::SharedBus
//! [`Response`]: command::Response

pub mod bus;
pub mod command;
pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use bus::{BusSession, SharedBus};
pub use command::{Command, Response};
pub use devices::AnyTransport;
pub use error::{Result, TransportError};
pub use traits::{DaliTransport, TransportFactory};
pub use types::TransportInfo;
