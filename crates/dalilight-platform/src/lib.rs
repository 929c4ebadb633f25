//! DALI lamps and buses as light entities for a home-automation host.
//!
//! This crate holds the lighting logic that sits between a host platform
//! and the transports from `dalilight-hardware`:
//!
//! - [`discovery`] finds lamps by polling short addresses;
//! - [`lamp`] tracks and controls one lamp;
//! - [`aggregate`] derives a bus-wide state from its lamps and drives the
//!   bus by broadcast;
//! - [`entity`] wraps lamps and buses behind the property set a host reads;
//! - [`platform`] ties it together from configuration to registration.
//!
//! None of the state or command paths return errors. A lighting surface
//! must not take its host down over a glitch on the bus, so failures are
//! logged and surface as unknown or undefined state instead.

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod entity;
pub mod error;
pub mod lamp;
pub mod platform;

pub use aggregate::BusState;
pub use config::{ConfigError, DaliConfig, DriverConfig};
pub use entity::{EntityKind, EntityState, LightEntity, StateSender};
pub use error::{PlatformError, Result};
pub use lamp::LampState;
pub use platform::{EntityCollector, PlatformSink, setup_platform};
