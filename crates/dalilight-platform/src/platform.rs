//! Platform setup: from attached bus masters to registered entities.
//!
//! # Architecture
//!
//! ```text
//! TransportFactory ──► transport 0 ──► SharedBus 0 ──► discover ──► lamps + bus ─┐
//!                  ──► transport 1 ──► SharedBus 1 ──► discover ──► lamps + bus ─┼──► PlatformSink
//!                  ──► ...                                                        ┘
//! ```
//!
//! Each bus is set up in its own task; buses share nothing, so discovery
//! on one does not wait for another. Entities are handed to the sink in bus
//! order once every bus has finished.
//!
//! # Examples
//!
//! ```no_run
//! use dalilight_hardware::mock::MockTransport;
//! use dalilight_platform::config::{DaliConfig, DriverConfig};
//! use dalilight_platform::platform::{EntityCollector, setup_platform};
//!
//! #[tokio::main]
//! async fn main() -> dalilight_platform::Result<()> {
//!     let (transport, handle) = MockTransport::new();
//!     handle.add_gear(0, 254);
//!
//!     let config = DaliConfig {
//!         drivers: vec![DriverConfig::new("office")],
//!         ..DaliConfig::default()
//!     };
//!     let mut sink = EntityCollector::new();
//!     setup_platform(&config, &mut vec![transport], &mut sink).await?;
//!
//!     for entity in sink.entities() {
//!         println!("{} -> {:?}", entity.name(), entity.brightness());
//!     }
//!     Ok(())
//! }
//! ```

use dalilight_core::IdentifierSpace;
use dalilight_hardware::{DaliTransport, SharedBus, TransportFactory};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, warn};

use crate::config::{DaliConfig, DriverConfig};
use crate::discovery::discover;
use crate::entity::{BusEntity, LampEntity, LightEntity, StateSender};
use crate::error::Result;

/// Where set-up entities are handed to the host.
pub trait PlatformSink<T: DaliTransport> {
    /// Register the entities of one bus.
    fn add_entities(&mut self, entities: Vec<LightEntity<T>>);

    /// Channel entities use to announce their own state changes.
    fn state_updates(&self) -> Option<StateSender> {
        None
    }
}

/// A sink that simply keeps every entity, for hosts that drive entities
/// themselves.
#[derive(Debug)]
pub struct EntityCollector<T> {
    entities: Vec<LightEntity<T>>,
    updates: Option<StateSender>,
}

impl<T> EntityCollector<T> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            updates: None,
        }
    }

    /// Hand `updates` to every entity registered through this collector.
    pub fn with_updates(mut self, updates: StateSender) -> Self {
        self.updates = Some(updates);
        self
    }

    pub fn entities(&self) -> &[LightEntity<T>] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [LightEntity<T>] {
        &mut self.entities
    }

    pub fn into_entities(self) -> Vec<LightEntity<T>> {
        self.entities
    }
}

impl<T> Default for EntityCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DaliTransport> PlatformSink<T> for EntityCollector<T> {
    fn add_entities(&mut self, entities: Vec<LightEntity<T>>) {
        self.entities.extend(entities);
    }

    fn state_updates(&self) -> Option<StateSender> {
        self.updates.clone()
    }
}

/// Discover every attached bus and register its lamps and bus entity.
///
/// Transports are paired with `config.drivers` by position. A transport
/// without a matching driver entry, or beyond `config.max_buses`, is
/// skipped. Returns the number of entities registered.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or enumeration fails.
/// Discovery and state reads never fail setup.
pub async fn setup_platform<F, S>(
    config: &DaliConfig,
    factory: &mut F,
    sink: &mut S,
) -> Result<usize>
where
    F: TransportFactory,
    S: PlatformSink<F::Transport>,
{
    config.validate()?;
    let ids = IdentifierSpace::new(config.max_buses)?;
    let transports = factory.enumerate()?;
    info!(count = transports.len(), "found DALI drivers");

    let mut tasks = JoinSet::new();
    for (index, transport) in transports.into_iter().enumerate() {
        let Some(driver) = config.drivers.get(index).cloned() else {
            warn!(index, info = ?transport.info(), "no driver configuration, skipping bus");
            continue;
        };
        if !ids.contains_bus(index) {
            warn!(index, max_buses = ids.max_buses(), "bus beyond max_buses, skipping");
            continue;
        }

        let bus = SharedBus::new(index, driver.name.clone(), transport);
        let updates = sink.state_updates();
        tasks.spawn(async move {
            let entities = setup_bus(&ids, &driver, bus, updates).await;
            (index, entities)
        });
    }

    let mut per_bus = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(done) => per_bus.push(done),
            Err(err) => error!(%err, "bus setup task failed"),
        }
    }
    per_bus.sort_by_key(|(index, _)| *index);

    let mut registered = 0;
    for (_, entities) in per_bus {
        registered += entities.len();
        if !entities.is_empty() {
            sink.add_entities(entities);
        }
    }

    info!(registered, "DALI platform ready");
    Ok(registered)
}

/// Discover one bus and build its entities: lamps in address order, then
/// the bus itself. A bus with no lamps gets no bus entity.
async fn setup_bus<T: DaliTransport>(
    ids: &IdentifierSpace,
    driver: &DriverConfig,
    bus: SharedBus<T>,
    updates: Option<StateSender>,
) -> Vec<LightEntity<T>> {
    let span = bus.span().clone();
    async move {
        let lamps = discover(&bus, driver.max_gears).await;
        let mut entities = Vec::with_capacity(lamps.len() + 1);

        for &address in &lamps {
            match ids.lamp_id(bus.index(), address) {
                Ok(id) => {
                    let lamp =
                        LampEntity::new(id, &driver.name, bus.clone(), address, updates.clone())
                            .await;
                    entities.push(lamp.into());
                }
                Err(err) => error!(%address, %err, "can't allocate lamp identifier"),
            }
        }

        if lamps.is_empty() {
            debug!("no lamps found, bus entity not created");
            return entities;
        }

        match ids.bus_id(bus.index()) {
            Ok(id) => {
                let entity = BusEntity::new(id, &driver.name, bus.clone(), lamps, updates).await;
                entities.push(entity.into());
            }
            Err(err) => error!(%err, "can't allocate bus identifier"),
        }
        entities
    }
    .instrument(span)
    .await
}
