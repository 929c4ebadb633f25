//! Command descriptors and typed responses.
//!
//! Commands are plain descriptors. Turning them into forward frames and
//! decoding backward frames is the transport's business; this layer only
//! cares about which gear is addressed and what kind of answer to expect.

use dalilight_core::{Address, ArcLevel, ShortAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TransportError};

/// A command sent to control gear over a DALI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Command {
    /// Ask whether any control gear answers at the address (yes/no answer).
    QueryControlGearPresent(ShortAddress),

    /// Ask for the actual arc power level (level answer).
    QueryActualLevel(ShortAddress),

    /// Direct Arc Power Control: set the level immediately.
    DirectArcPower { address: Address, level: ArcLevel },

    /// Switch off without fading.
    Off(Address),
}

impl Command {
    /// Destination of the command.
    pub fn address(&self) -> Address {
        match self {
            Self::QueryControlGearPresent(address) | Self::QueryActualLevel(address) => {
                Address::Short(*address)
            }
            Self::DirectArcPower { address, .. } | Self::Off(address) => *address,
        }
    }

    /// Whether a backward frame is expected.
    pub fn expects_answer(&self) -> bool {
        matches!(
            self,
            Self::QueryControlGearPresent(_) | Self::QueryActualLevel(_)
        )
    }

    /// Short mnemonic used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueryControlGearPresent(_) => "QueryControlGearPresent",
            Self::QueryActualLevel(_) => "QueryActualLevel",
            Self::DirectArcPower { .. } => "DAPC",
            Self::Off(_) => "Off",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectArcPower { address, level } => write!(f, "DAPC({address}, {level})"),
            other => write!(f, "{}({})", other.name(), other.address()),
        }
    }
}

/// Typed outcome of a successful exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// A forward-only command was put on the bus.
    Sent,

    /// Answer to a yes/no query.
    YesNo(bool),

    /// Answer carrying a raw 8-bit value (255 included).
    Level(u8),
}

impl Response {
    /// Interpret the response as a yes/no answer.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the gear answered with something else.
    pub fn yes_no(self) -> Result<bool> {
        match self {
            Self::YesNo(value) => Ok(value),
            other => Err(TransportError::protocol(format!(
                "expected yes/no answer, got {other:?}"
            ))),
        }
    }

    /// Interpret the response as a raw level answer.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the gear answered with something else.
    pub fn level(self) -> Result<u8> {
        match self {
            Self::Level(value) => Ok(value),
            other => Err(TransportError::protocol(format!(
                "expected level answer, got {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn short(a: u8) -> ShortAddress {
        ShortAddress::new(a).unwrap()
    }

    #[test]
    fn test_command_address() {
        assert_eq!(
            Command::QueryActualLevel(short(3)).address(),
            Address::Short(short(3))
        );
        assert_eq!(Command::Off(Address::Broadcast).address(), Address::Broadcast);
    }

    #[rstest]
    #[case(Command::QueryControlGearPresent(short(0)), true)]
    #[case(Command::QueryActualLevel(short(0)), true)]
    #[case(Command::Off(Address::Broadcast), false)]
    #[case(Command::DirectArcPower { address: Address::Broadcast, level: ArcLevel::MAX }, false)]
    fn test_expects_answer(#[case] command: Command, #[case] expected: bool) {
        assert_eq!(command.expects_answer(), expected);
    }

    #[test]
    fn test_dapc_rejects_mask_level() {
        let json = r#"{"DirectArcPower":{"address":"Broadcast","level":255}}"#;
        assert!(serde_json::from_str::<Command>(json).is_err());

        let json = r#"{"DirectArcPower":{"address":"Broadcast","level":254}}"#;
        let command: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            command,
            Command::DirectArcPower {
                address: Address::Broadcast,
                level: ArcLevel::MAX
            }
        );
    }

    #[test]
    fn test_command_display() {
        let dapc = Command::DirectArcPower {
            address: short(10).into(),
            level: ArcLevel::clamped(120),
        };
        assert_eq!(dapc.to_string(), "DAPC(A10, 120)");
        assert_eq!(Command::Off(Address::Broadcast).to_string(), "Off(broadcast)");
    }

    #[test]
    fn test_response_accessors() {
        assert_eq!(Response::YesNo(true).yes_no(), Ok(true));
        assert_eq!(Response::Level(255).level(), Ok(255));
        assert!(Response::Sent.level().is_err());
        assert!(matches!(
            Response::Level(1).yes_no(),
            Err(TransportError::Protocol { .. })
        ));
    }
}
