//! Light entities exposed to the host platform.
//!
//! A [`LightEntity`] is either a single lamp or a whole bus. Both variants
//! expose the same property set (name, unique id, brightness, on/off,
//! capability flags, attributes, polling flag) and the same three
//! operations the host calls at its own cadence: turn on, turn off and
//! update.
//!
//! After a turn on/off the entity announces its new state on the optional
//! [`StateSender`] it was built with. Updates do not announce anything; the
//! host asked for them and reads the state itself.

use dalilight_core::{EntityId, ShortAddress, constants::SUPPORT_BRIGHTNESS};
use dalilight_hardware::{DaliTransport, SharedBus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::sync::mpsc;
use tracing::trace;

use crate::aggregate::{self, BusState};
use crate::lamp::Lamp;

/// Channel on which entities announce state changes to the host.
pub type StateSender = mpsc::UnboundedSender<EntityState>;

/// Snapshot of everything the host reads from an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub unique_id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub brightness: Option<u8>,
    pub is_on: Option<bool>,
    pub supported_features: u32,
    pub attributes: Map<String, Value>,
    pub should_poll: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lamp,
    Bus,
}

/// A single lamp, as seen by the host.
#[derive(Debug, Clone)]
pub struct LampEntity<T> {
    id: EntityId,
    name: String,
    lamp: Lamp<T>,
    updates: Option<StateSender>,
}

impl<T: DaliTransport> LampEntity<T> {
    /// Build the entity and read the lamp's initial state.
    pub async fn new(
        id: EntityId,
        controller_name: &str,
        bus: SharedBus<T>,
        address: ShortAddress,
        updates: Option<StateSender>,
    ) -> Self {
        let mut lamp = Lamp::new(bus, address);
        lamp.query_state().await;

        Self {
            id,
            name: format!("{controller_name}_{address}"),
            lamp,
            updates,
        }
    }

    pub fn lamp(&self) -> &Lamp<T> {
        &self.lamp
    }
}

/// A whole bus driven by broadcast, as seen by the host.
#[derive(Debug, Clone)]
pub struct BusEntity<T> {
    id: EntityId,
    name: String,
    bus: SharedBus<T>,
    members: Vec<ShortAddress>,
    state: BusState,
    updates: Option<StateSender>,
}

impl<T: DaliTransport> BusEntity<T> {
    /// Build the entity and compute the bus's initial aggregate.
    pub async fn new(
        id: EntityId,
        controller_name: &str,
        bus: SharedBus<T>,
        members: Vec<ShortAddress>,
        updates: Option<StateSender>,
    ) -> Self {
        let state = aggregate::recompute_bus_state(&bus, &members).await;

        Self {
            id,
            name: format!("{controller_name} bus"),
            bus,
            members,
            state,
            updates,
        }
    }

    pub fn members(&self) -> &[ShortAddress] {
        &self.members
    }

    pub fn bus_state(&self) -> BusState {
        self.state
    }
}

/// Lamp or bus, behind one interface.
#[derive(Debug, Clone)]
pub enum LightEntity<T> {
    Lamp(LampEntity<T>),
    Bus(BusEntity<T>),
}

impl<T: DaliTransport> LightEntity<T> {
    pub fn name(&self) -> &str {
        match self {
            Self::Lamp(entity) => &entity.name,
            Self::Bus(entity) => &entity.name,
        }
    }

    pub fn unique_id(&self) -> EntityId {
        match self {
            Self::Lamp(entity) => entity.id,
            Self::Bus(entity) => entity.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Lamp(_) => EntityKind::Lamp,
            Self::Bus(_) => EntityKind::Bus,
        }
    }

    /// Brightness 0-254, or `None` when unknown/undefined.
    pub fn brightness(&self) -> Option<u8> {
        match self {
            Self::Lamp(entity) => entity.lamp.state().brightness,
            Self::Bus(entity) => entity.state.brightness,
        }
    }

    pub fn is_on(&self) -> Option<bool> {
        match self {
            Self::Lamp(entity) => entity.lamp.state().on,
            Self::Bus(entity) => entity.state.on,
        }
    }

    pub fn supported_features(&self) -> u32 {
        SUPPORT_BRIGHTNESS
    }

    pub fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        match self {
            Self::Lamp(entity) => {
                attributes.insert(
                    "short_address".to_string(),
                    json!(entity.lamp.address().as_u8()),
                );
            }
            Self::Bus(entity) => {
                let addresses: Vec<u8> = entity.members.iter().map(|a| a.as_u8()).collect();
                attributes.insert("short_addresses".to_string(), json!(addresses));
            }
        }
        attributes
    }

    /// DALI has no push notifications, so both lamps and buses are polled.
    pub fn should_poll(&self) -> bool {
        true
    }

    pub fn state(&self) -> EntityState {
        EntityState {
            unique_id: self.unique_id(),
            name: self.name().to_string(),
            kind: self.kind(),
            brightness: self.brightness(),
            is_on: self.is_on(),
            supported_features: self.supported_features(),
            attributes: self.attributes(),
            should_poll: self.should_poll(),
        }
    }

    /// Turn on at `brightness`, or full level when `None`.
    pub async fn turn_on(&mut self, brightness: Option<u8>) {
        let requested = brightness.unwrap_or(dalilight_core::constants::DEFAULT_ON_LEVEL);
        match self {
            Self::Lamp(entity) => {
                entity.lamp.set_level(requested).await;
            }
            Self::Bus(entity) => {
                if let Some(state) = aggregate::broadcast_level(&entity.bus, requested).await {
                    entity.state = state;
                }
            }
        }
        self.announce();
    }

    pub async fn turn_off(&mut self) {
        match self {
            Self::Lamp(entity) => {
                entity.lamp.set_off().await;
            }
            Self::Bus(entity) => {
                if aggregate::broadcast_off(&entity.bus).await {
                    entity.state.on = Some(false);
                }
            }
        }
        self.announce();
    }

    /// Re-read the state from the bus.
    pub async fn update(&mut self) {
        match self {
            Self::Lamp(entity) => {
                entity.lamp.query_state().await;
            }
            Self::Bus(entity) => {
                entity.state = aggregate::recompute_bus_state(&entity.bus, &entity.members).await;
            }
        }
    }

    fn announce(&self) {
        let updates = match self {
            Self::Lamp(entity) => entity.updates.as_ref(),
            Self::Bus(entity) => entity.updates.as_ref(),
        };
        if let Some(updates) = updates {
            if updates.send(self.state()).is_err() {
                trace!(name = self.name(), "state listener gone");
            }
        }
    }
}

impl<T> From<LampEntity<T>> for LightEntity<T> {
    fn from(entity: LampEntity<T>) -> Self {
        Self::Lamp(entity)
    }
}

impl<T> From<BusEntity<T>> for LightEntity<T> {
    fn from(entity: BusEntity<T>) -> Self {
        Self::Bus(entity)
    }
}
