//! State tracking and control of a single lamp.
//!
//! Every operation takes the bus lock for its whole exchange and never
//! returns an error. Failures are logged and folded into the tracked state:
//!
//! | Outcome of the level query | Brightness | On/off |
//! |----------------------------|------------|--------|
//! | level `0..=254` | level | `level > 0` |
//! | level `255` (MASK) | unchanged | unchanged |
//! | no response | unknown | unknown |
//! | malformed answer | unchanged | unchanged |
//! | I/O failure | unknown | unknown |

use chrono::{DateTime, Utc};
use dalilight_core::{Address, ArcLevel, ShortAddress};
use dalilight_hardware::{Command, DaliTransport, SharedBus, TransportError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Last known state of a lamp. `None` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LampState {
    pub brightness: Option<u8>,
    pub on: Option<bool>,
    /// When the lamp last answered a level query with a real level.
    pub last_seen: Option<DateTime<Utc>>,
}

impl LampState {
    pub const UNKNOWN: LampState = LampState {
        brightness: None,
        on: None,
        last_seen: None,
    };

    fn forget(&mut self) {
        self.brightness = None;
        self.on = None;
    }
}

impl Default for LampState {
    /// Off at level zero, until the first read says otherwise.
    fn default() -> Self {
        Self {
            brightness: Some(0),
            on: Some(false),
            last_seen: None,
        }
    }
}

/// One control gear on a shared bus.
#[derive(Debug, Clone)]
pub struct Lamp<T> {
    bus: SharedBus<T>,
    address: ShortAddress,
    state: LampState,
}

impl<T: DaliTransport> Lamp<T> {
    pub fn new(bus: SharedBus<T>, address: ShortAddress) -> Self {
        Self {
            bus,
            address,
            state: LampState::default(),
        }
    }

    pub fn address(&self) -> ShortAddress {
        self.address
    }

    pub fn bus(&self) -> &SharedBus<T> {
        &self.bus
    }

    pub fn state(&self) -> LampState {
        self.state
    }

    /// Read the actual level back from the gear and update the tracked state.
    pub async fn query_state(&mut self) -> LampState {
        let address = self.address;
        let result = self
            .bus
            .exchange(Command::QueryActualLevel(address))
            .await
            .and_then(|response| response.level());

        let state = &mut self.state;
        self.bus.span().in_scope(|| match result {
            Ok(raw) => match ArcLevel::from_reading(raw) {
                Some(level) => {
                    state.brightness = Some(level.as_u8());
                    state.on = Some(level.is_on());
                    state.last_seen = Some(Utc::now());
                }
                None => debug!(%address, "gear reported MASK, keeping previous state"),
            },
            Err(TransportError::NoResponse) => {
                debug!(%address, "no response to QueryActualLevel");
                state.forget();
            }
            Err(TransportError::Protocol { message }) => {
                error!(%address, %message, "response error on QueryActualLevel");
            }
            Err(TransportError::Io { message }) => {
                error!(%address, %message, "can't update lamp");
                state.forget();
            }
        });

        self.state
    }

    /// Set the level directly.
    ///
    /// The requested level is clamped to 0-254. On success the state is set
    /// optimistically; nothing is read back.
    pub async fn set_level(&mut self, requested: u8) -> LampState {
        let level = ArcLevel::clamped(requested);
        let command = Command::DirectArcPower {
            address: Address::Short(self.address),
            level,
        };

        match self.bus.exchange(command).await {
            Ok(_) => {
                self.bus.span().in_scope(|| debug!(address = %self.address, %level, "turn on"));
                self.state.brightness = Some(level.as_u8());
                self.state.on = Some(level.is_on());
            }
            Err(err) => self.bus.span().in_scope(|| {
                error!(address = %self.address, %err, "can't turn on lamp");
            }),
        }

        self.state
    }

    /// Switch the lamp off. Brightness is kept.
    pub async fn set_off(&mut self) -> LampState {
        match self.bus.exchange(Command::Off(Address::Short(self.address))).await {
            Ok(_) => self.state.on = Some(false),
            Err(err) => self.bus.span().in_scope(|| {
                error!(address = %self.address, %err, "can't turn off lamp");
            }),
        }

        self.state
    }
}
