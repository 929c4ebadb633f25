//! Lamp discovery by polling short addresses.
//!
//! Addresses are probed one at a time, in ascending order, each probe under
//! the bus lock. Probing in parallel is not an option on a half-duplex bus.

use dalilight_core::ShortAddress;
use dalilight_hardware::{Command, DaliTransport, Response, SharedBus, TransportError};
use tracing::{Instrument, debug, error, info, trace};

/// Probe addresses `0..max_gears` and return those where gear answered "yes".
///
/// A negative, missing or garbled answer means no gear at that address. An
/// I/O failure means the bus master is unreachable: probing stops and the
/// addresses found so far are returned.
///
/// # Examples
///
/// ```
/// use dalilight_hardware::{SharedBus, mock::MockTransport};
/// use dalilight_platform::discovery::discover;
///
/// #[tokio::main]
/// async fn main() {
///     let (transport, handle) = MockTransport::new();
///     handle.add_gear(3, 0);
///     handle.add_gear(40, 0);
///
///     let bus = SharedBus::new(0, "office", transport);
///     let found = discover(&bus, 64).await;
///     let found: Vec<u8> = found.iter().map(|a| a.as_u8()).collect();
///     assert_eq!(found, vec![3, 40]);
/// }
/// ```
pub async fn discover<T: DaliTransport>(bus: &SharedBus<T>, max_gears: u8) -> Vec<ShortAddress> {
    async {
        let mut found = Vec::new();

        for address in ShortAddress::range(max_gears) {
            trace!(%address, "searching for gear");

            match bus.exchange(Command::QueryControlGearPresent(address)).await {
                Ok(Response::YesNo(true)) => {
                    info!(%address, "found lamp");
                    found.push(address);
                }
                Ok(response) => trace!(%address, ?response, "no gear"),
                Err(TransportError::Io { message }) => {
                    error!(%address, %message, "DALI master not reachable, aborting discovery");
                    break;
                }
                Err(err) => debug!(%address, %err, "no gear"),
            }
        }

        debug!(count = found.len(), "discovery finished");
        found
    }
    .instrument(bus.span().clone())
    .await
}
