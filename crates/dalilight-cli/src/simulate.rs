//! Simulated buses for running without bus-master hardware.

use std::str::FromStr;

use anyhow::{Context, bail};
use dalilight_core::ShortAddress;
use dalilight_hardware::AnyTransport;
use dalilight_hardware::mock::{MockTransport, MockTransportHandle};
use dalilight_platform::DaliConfig;
use tracing::debug;

/// One simulated control gear, parsed from `BUS:ADDRESS=LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GearSpec {
    pub bus: usize,
    pub address: ShortAddress,
    pub level: u8,
}

impl FromStr for GearSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let Some((bus, rest)) = s.split_once(':') else {
            bail!("expected BUS:ADDRESS=LEVEL, got {s:?}");
        };
        let (address, level) = rest.split_once('=').unwrap_or((rest, "0"));

        Ok(Self {
            bus: bus.trim().parse().with_context(|| format!("invalid bus index {bus:?}"))?,
            address: address.trim().parse()?,
            level: level
                .trim()
                .parse()
                .with_context(|| format!("invalid level {level:?}"))?,
        })
    }
}

/// Build one simulated bus per configured driver and seed it with `gear`.
pub fn build_buses(
    config: &DaliConfig,
    gear: &[GearSpec],
) -> anyhow::Result<(Vec<AnyTransport>, Vec<MockTransportHandle>)> {
    let mut transports = Vec::with_capacity(config.drivers.len());
    let mut handles = Vec::with_capacity(config.drivers.len());

    for driver in &config.drivers {
        let (transport, handle) = MockTransport::with_name(format!("simulated {}", driver.name));
        transports.push(transport.into());
        handles.push(handle);
    }

    for entry in gear {
        let handle = handles.get(entry.bus).with_context(|| {
            format!(
                "gear {} is on bus {}, but only {} buses are configured",
                entry.address,
                entry.bus,
                handles.len()
            )
        })?;
        debug!(bus = entry.bus, address = %entry.address, level = entry.level, "simulating gear");
        handle.add_gear(entry.address.as_u8(), entry.level);
    }

    Ok((transports, handles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalilight_platform::DriverConfig;
    use rstest::rstest;

    #[rstest]
    #[case("0:3=120", 0, 3, 120)]
    #[case("1:63=255", 1, 63, 255)]
    #[case("2:7", 2, 7, 0)]
    #[case(" 0 : 1 = 9 ", 0, 1, 9)]
    fn test_parse_gear(
        #[case] input: &str,
        #[case] bus: usize,
        #[case] address: u8,
        #[case] level: u8,
    ) {
        let entry: GearSpec = input.parse().unwrap();
        assert_eq!(entry.bus, bus);
        assert_eq!(entry.address.as_u8(), address);
        assert_eq!(entry.level, level);
    }

    #[rstest]
    #[case("3=120")]
    #[case("x:3=120")]
    #[case("0:64=1")]
    #[case("0:3=256")]
    fn test_parse_gear_invalid(#[case] input: &str) {
        assert!(input.parse::<GearSpec>().is_err());
    }

    #[test]
    fn test_build_buses() {
        let config = DaliConfig {
            drivers: vec![DriverConfig::new("office"), DriverConfig::new("hall")],
            ..DaliConfig::default()
        };
        let gear = ["0:3=120".parse().unwrap(), "1:5=10".parse().unwrap()];

        let (transports, handles) = build_buses(&config, &gear).unwrap();

        assert_eq!(transports.len(), 2);
        assert_eq!(handles[0].level(3), Some(120));
        assert_eq!(handles[1].level(5), Some(10));
        assert_eq!(handles[1].level(3), None);
    }

    #[test]
    fn test_gear_on_unknown_bus() {
        let config = DaliConfig {
            drivers: vec![DriverConfig::new("office")],
            ..DaliConfig::default()
        };
        let gear = ["1:3=120".parse().unwrap()];

        assert!(build_buses(&config, &gear).is_err());
    }
}
