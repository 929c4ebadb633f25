//! Bus-wide state derived from member lamps.
//!
//! A bus only has a brightness when every member lamp reports the same real
//! level. The aggregate is recomputed from scratch on every read; nothing is
//! cached between scans, and a scan never touches the per-lamp state.
//!
//! The scan stops at the first lamp that disagrees, reports MASK or fails
//! to answer. There is no partial aggregate: either the bus is unified or
//! it is undefined.

use std::ops::ControlFlow;

use dalilight_core::{Address, ArcLevel, ShortAddress};
use dalilight_hardware::{Command, DaliTransport, SharedBus};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, error, warn};

/// Aggregate bus state. `None` means undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusState {
    pub brightness: Option<u8>,
    pub on: Option<bool>,
}

impl BusState {
    pub const UNDEFINED: BusState = BusState {
        brightness: None,
        on: None,
    };

    /// State of a bus whose lamps all sit at `level`.
    pub fn unified(level: ArcLevel) -> Self {
        Self {
            brightness: Some(level.as_u8()),
            on: Some(level.is_on()),
        }
    }

    pub fn is_defined(&self) -> bool {
        self.brightness.is_some()
    }
}

/// Running agreement over raw level readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Agreement {
    agreed: Option<ArcLevel>,
}

impl Agreement {
    /// Feed one raw reading. `Break` means the bus cannot be unified.
    pub fn push(&mut self, raw: u8) -> ControlFlow<()> {
        let Some(level) = ArcLevel::from_reading(raw) else {
            return ControlFlow::Break(());
        };
        match self.agreed {
            None => {
                self.agreed = Some(level);
                ControlFlow::Continue(())
            }
            Some(agreed) if agreed == level => ControlFlow::Continue(()),
            Some(_) => ControlFlow::Break(()),
        }
    }

    /// Aggregate after every member agreed. An empty bus is undefined.
    pub fn finish(self) -> BusState {
        self.agreed.map_or(BusState::UNDEFINED, BusState::unified)
    }
}

/// Reduce a sequence of raw readings without touching a bus.
///
/// # Examples
///
/// ```
/// use dalilight_platform::aggregate::{BusState, unify};
///
/// assert_eq!(unify([120, 120, 120]).brightness, Some(120));
/// assert_eq!(unify([120, 90, 120]), BusState::UNDEFINED);
/// assert_eq!(unify([120, 255]), BusState::UNDEFINED);
/// ```
pub fn unify(readings: impl IntoIterator<Item = u8>) -> BusState {
    let mut agreement = Agreement::default();
    for raw in readings {
        if agreement.push(raw).is_break() {
            return BusState::UNDEFINED;
        }
    }
    agreement.finish()
}

/// Query every member lamp, in order, and reduce the readings.
///
/// The bus lock is held for the whole scan. Any failure collapses the
/// result to undefined; nothing is retried.
pub async fn recompute_bus_state<T: DaliTransport>(
    bus: &SharedBus<T>,
    members: &[ShortAddress],
) -> BusState {
    async {
        let mut session = bus.session().await;
        let mut agreement = Agreement::default();

        for &address in members {
            let raw = match session
                .exchange(Command::QueryActualLevel(address))
                .await
                .and_then(|response| response.level())
            {
                Ok(raw) => raw,
                Err(err) => {
                    if err.is_io() {
                        error!(%address, %err, "can't read bus state");
                    } else {
                        debug!(%address, %err, "lamp did not report a level");
                    }
                    return BusState::UNDEFINED;
                }
            };

            if agreement.push(raw).is_break() {
                debug!(%address, level = raw, "bus has no unified level");
                return BusState::UNDEFINED;
            }
        }

        agreement.finish()
    }
    .instrument(bus.span().clone())
    .await
}

/// Set every gear on the bus to `requested` (clamped to 0-254) with one
/// broadcast DAPC. Returns the optimistic bus state, or `None` if the
/// command could not be sent.
pub async fn broadcast_level<T: DaliTransport>(
    bus: &SharedBus<T>,
    requested: u8,
) -> Option<BusState> {
    let level = ArcLevel::clamped(requested);
    let command = Command::DirectArcPower {
        address: Address::Broadcast,
        level,
    };

    match bus.exchange(command).await {
        Ok(_) => Some(BusState::unified(level)),
        Err(err) => {
            bus.span()
                .in_scope(|| warn!(%level, %err, "can't turn on bus"));
            None
        }
    }
}

/// Switch every gear on the bus off with one broadcast command.
/// Returns `false` if the command could not be sent.
pub async fn broadcast_off<T: DaliTransport>(bus: &SharedBus<T>) -> bool {
    match bus.exchange(Command::Off(Address::Broadcast)).await {
        Ok(_) => true,
        Err(err) => {
            bus.span().in_scope(|| warn!(%err, "can't turn off bus"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalilight_hardware::mock::{MockFault, MockTransport, MockTransportHandle};
    use rstest::rstest;

    fn members(addresses: &[u8]) -> Vec<ShortAddress> {
        addresses
            .iter()
            .map(|a| ShortAddress::new(*a).unwrap())
            .collect()
    }

    fn bus_with(gear: &[(u8, u8)]) -> (SharedBus<MockTransport>, MockTransportHandle) {
        let (transport, handle) = MockTransport::new();
        for (address, level) in gear {
            handle.add_gear(*address, *level);
        }
        (SharedBus::new(0, "office", transport), handle)
    }

    #[rstest]
    #[case(&[120, 120, 120], Some(120), Some(true))]
    #[case(&[0, 0], Some(0), Some(false))]
    #[case(&[254], Some(254), Some(true))]
    #[case(&[120, 90, 120], None, None)]
    #[case(&[90, 120, 120], None, None)]
    #[case(&[120, 120, 255], None, None)]
    #[case(&[255, 255], None, None)]
    #[case(&[], None, None)]
    fn test_unify(
        #[case] readings: &[u8],
        #[case] brightness: Option<u8>,
        #[case] on: Option<bool>,
    ) {
        let state = unify(readings.iter().copied());
        assert_eq!(state, BusState { brightness, on });
    }

    #[tokio::test]
    async fn test_unified_bus() {
        let (bus, _handle) = bus_with(&[(1, 120), (4, 120), (9, 120)]);

        let state = recompute_bus_state(&bus, &members(&[1, 4, 9])).await;
        assert_eq!(state.brightness, Some(120));
        assert_eq!(state.on, Some(true));
    }

    #[tokio::test]
    async fn test_divergent_bus_short_circuits() {
        let (bus, handle) = bus_with(&[(1, 120), (4, 90), (9, 120)]);

        let state = recompute_bus_state(&bus, &members(&[1, 4, 9])).await;

        assert_eq!(state, BusState::UNDEFINED);
        // lamp 9 is never queried
        assert_eq!(handle.exchange_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_lamp_collapses_aggregate() {
        let (bus, handle) = bus_with(&[(1, 120), (4, 120), (9, 120)]);
        handle.set_fault(4, MockFault::NoResponse);

        let state = recompute_bus_state(&bus, &members(&[1, 4, 9])).await;
        assert_eq!(state, BusState::UNDEFINED);

        handle.clear_fault(4);
        let state = recompute_bus_state(&bus, &members(&[1, 4, 9])).await;
        assert_eq!(state.brightness, Some(120));
    }

    #[tokio::test]
    async fn test_io_failure_collapses_aggregate() {
        let (bus, handle) = bus_with(&[(1, 120), (4, 120)]);
        handle.fail_io_after(1);

        let state = recompute_bus_state(&bus, &members(&[1, 4])).await;
        assert_eq!(state, BusState::UNDEFINED);
    }

    #[tokio::test]
    async fn test_empty_bus_is_undefined() {
        let (bus, handle) = bus_with(&[]);

        assert_eq!(recompute_bus_state(&bus, &[]).await, BusState::UNDEFINED);
        assert_eq!(handle.exchange_count(), 0);
    }

    #[tokio::test]
    async fn test_broadcast_level() {
        let (bus, handle) = bus_with(&[(1, 10), (4, 200)]);

        let state = broadcast_level(&bus, 255).await;

        assert_eq!(state, Some(BusState::unified(ArcLevel::MAX)));
        assert_eq!(handle.exchange_count(), 1);
        assert_eq!(handle.level(1), Some(254));
        assert_eq!(handle.level(4), Some(254));
    }

    #[tokio::test]
    async fn test_broadcast_off() {
        let (bus, handle) = bus_with(&[(1, 10), (4, 200)]);

        assert!(broadcast_off(&bus).await);
        assert_eq!(handle.sent_commands(), vec![Command::Off(Address::Broadcast)]);
        assert_eq!(handle.level(4), Some(0));

        handle.disconnect();
        assert!(!broadcast_off(&bus).await);
        assert_eq!(broadcast_level(&bus, 100).await, None);
    }
}
