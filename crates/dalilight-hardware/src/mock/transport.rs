//! Mock DALI transport for testing and development.
//!
//! This module provides a simulated bus populated with control gear whose
//! levels, faults and failures can be controlled programmatically without a
//! physical bus master attached.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use dalilight_core::{Address, ShortAddress};

use crate::command::{Command, Response};
use crate::error::{Result, TransportError};
use crate::traits::DaliTransport;
use crate::types::TransportInfo;

/// Scripted misbehaviour of a single gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    /// Queries to the gear get no answer.
    NoResponse,
    /// Queries to the gear get a garbled answer.
    Malformed,
    /// Level queries answer with a yes/no frame instead of a level.
    WrongAnswerKind,
}

#[derive(Debug, Default)]
struct MockBus {
    /// Present gear and their actual level.
    gear: BTreeMap<u8, u8>,
    faults: HashMap<u8, MockFault>,
    /// Exchanges allowed before every send fails with an I/O error.
    io_budget: Option<usize>,
    disconnected: bool,
    /// Every command handed to the transport, failed ones included.
    sent: Vec<Command>,
}

impl MockBus {
    fn exchange(&mut self, command: Command) -> Result<Response> {
        self.sent.push(command);

        if self.disconnected {
            return Err(TransportError::io("mock bus disconnected"));
        }
        if let Some(budget) = self.io_budget.as_mut() {
            if *budget == 0 {
                return Err(TransportError::io("mock bus master stopped responding"));
            }
            *budget -= 1;
        }

        match command {
            Command::QueryControlGearPresent(address) => {
                self.check_fault(address)?;
                Ok(Response::YesNo(self.gear.contains_key(&address.as_u8())))
            }
            Command::QueryActualLevel(address) => {
                if let Some(MockFault::WrongAnswerKind) = self.faults.get(&address.as_u8()) {
                    return Ok(Response::YesNo(true));
                }
                self.check_fault(address)?;
                self.gear
                    .get(&address.as_u8())
                    .map(|level| Response::Level(*level))
                    .ok_or(TransportError::NoResponse)
            }
            Command::DirectArcPower { address, level } => {
                self.apply(address, level.as_u8());
                Ok(Response::Sent)
            }
            Command::Off(address) => {
                self.apply(address, 0);
                Ok(Response::Sent)
            }
        }
    }

    fn check_fault(&self, address: ShortAddress) -> Result<()> {
        match self.faults.get(&address.as_u8()) {
            Some(MockFault::NoResponse) => Err(TransportError::NoResponse),
            Some(MockFault::Malformed) => Err(TransportError::protocol(format!(
                "framing error reading from {address}"
            ))),
            _ => Ok(()),
        }
    }

    fn apply(&mut self, address: Address, level: u8) {
        match address {
            Address::Broadcast => self.gear.values_mut().for_each(|l| *l = level),
            Address::Short(short) => {
                if let Some(l) = self.gear.get_mut(&short.as_u8()) {
                    *l = level;
                }
            }
        }
    }
}

/// Mock DALI transport for testing and development.
///
/// Behaves like a bus master wired to a set of simulated control gear.
/// Gear answer presence and level queries, and follow DAPC and Off commands
/// (including broadcast). A [`MockTransportHandle`] shares the same bus and
/// can populate it, inject faults and inspect the traffic.
///
/// # Examples
///
/// ```
/// use dalilight_hardware::mock::MockTransport;
/// use dalilight_hardware::traits::DaliTransport;
/// use dalilight_hardware::command::{Command, Response};
/// use dalilight_core::ShortAddress;
///
/// #[tokio::main]
/// async fn main() -> dalilight_hardware::Result<()> {
///     let (mut transport, handle) = MockTransport::new();
///     handle.add_gear(3, 120);
///
///     let address = ShortAddress::new(3).unwrap();
///     let response = transport.send(Command::QueryActualLevel(address)).await?;
///     assert_eq!(response, Response::Level(120));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTransport {
    bus: Arc<Mutex<MockBus>>,
    name: String,
}

impl MockTransport {
    /// Create a new empty mock bus with the default name.
    pub fn new() -> (Self, MockTransportHandle) {
        Self::with_name("Mock DALI Bus".to_string())
    }

    /// Create a new empty mock bus with a custom name.
    pub fn with_name(name: String) -> (Self, MockTransportHandle) {
        let bus = Arc::new(Mutex::new(MockBus::default()));

        let transport = Self {
            bus: Arc::clone(&bus),
            name,
        };
        let handle = MockTransportHandle { bus };

        (transport, handle)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new().0
    }
}

impl DaliTransport for MockTransport {
    async fn send(&mut self, command: Command) -> Result<Response> {
        lock(&self.bus).exchange(command)
    }

    fn info(&self) -> TransportInfo {
        TransportInfo::new(self.name.clone(), "Mock DALI Bus v1.0")
    }
}

/// Handle for controlling a mock bus.
///
/// Clones share the same simulated bus.
#[derive(Debug, Clone)]
pub struct MockTransportHandle {
    bus: Arc<Mutex<MockBus>>,
}

impl MockTransportHandle {
    /// Put a gear at `address` with the given actual level.
    ///
    /// Addresses above 63 are ignored.
    pub fn add_gear(&self, address: u8, level: u8) {
        if ShortAddress::new(address).is_ok() {
            lock(&self.bus).gear.insert(address, level);
        }
    }

    /// Remove the gear at `address`.
    pub fn remove_gear(&self, address: u8) {
        lock(&self.bus).gear.remove(&address);
    }

    /// Change the level a present gear reports.
    pub fn set_level(&self, address: u8, level: u8) {
        if let Some(l) = lock(&self.bus).gear.get_mut(&address) {
            *l = level;
        }
    }

    /// Actual level of the gear at `address`, if present.
    pub fn level(&self, address: u8) -> Option<u8> {
        lock(&self.bus).gear.get(&address).copied()
    }

    /// Make queries to `address` misbehave.
    pub fn set_fault(&self, address: u8, fault: MockFault) {
        lock(&self.bus).faults.insert(address, fault);
    }

    pub fn clear_fault(&self, address: u8) {
        lock(&self.bus).faults.remove(&address);
    }

    /// Allow `exchanges` more sends, then fail every send with an I/O error.
    pub fn fail_io_after(&self, exchanges: usize) {
        lock(&self.bus).io_budget = Some(exchanges);
    }

    /// Simulate unplugging the bus master.
    pub fn disconnect(&self) {
        lock(&self.bus).disconnected = true;
    }

    /// Undo `disconnect` and `fail_io_after`.
    pub fn reconnect(&self) {
        let mut bus = lock(&self.bus);
        bus.disconnected = false;
        bus.io_budget = None;
    }

    /// Every command sent so far, failed ones included.
    pub fn sent_commands(&self) -> Vec<Command> {
        lock(&self.bus).sent.clone()
    }

    /// Number of commands sent so far.
    pub fn exchange_count(&self) -> usize {
        lock(&self.bus).sent.len()
    }

    pub fn clear_log(&self) {
        lock(&self.bus).sent.clear();
    }
}

// A poisoned mock means a test already panicked; keep serving the bus state.
fn lock(bus: &Mutex<MockBus>) -> MutexGuard<'_, MockBus> {
    bus.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
