use crate::{
    Result,
    constants::{BROADCAST_ADDRESS, MASK_LEVEL, MAX_LEVEL, SHORT_ADDRESS_COUNT},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Short address of one control gear on a bus (0-63)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ShortAddress(u8);

impl ShortAddress {
    /// Create a new short address with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidShortAddress` if the address is above 63.
    pub fn new(address: u8) -> Result<Self> {
        if address >= SHORT_ADDRESS_COUNT {
            return Err(Error::InvalidShortAddress(address));
        }
        Ok(ShortAddress(address))
    }

    /// Get the raw address as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Iterate over the first `count` short addresses in ascending order.
    ///
    /// `count` is capped at 64.
    pub fn range(count: u8) -> impl Iterator<Item = ShortAddress> {
        (0..count.min(SHORT_ADDRESS_COUNT)).map(ShortAddress)
    }
}

impl fmt::Display for ShortAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for ShortAddress {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        ShortAddress::new(value)
    }
}

impl From<ShortAddress> for u8 {
    fn from(address: ShortAddress) -> Self {
        address.0
    }
}

impl std::str::FromStr for ShortAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let address: u8 = s
            .parse()
            .map_err(|_| Error::Config(format!("Invalid short address: {s}")))?;
        ShortAddress::new(address)
    }
}

/// Destination of a forward command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Address {
    /// A single control gear.
    Short(ShortAddress),
    /// Every control gear on the bus.
    Broadcast,
}

impl Address {
    /// Raw address byte (short address, or 0xFF for broadcast).
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        match self {
            Address::Short(address) => address.as_u8(),
            Address::Broadcast => BROADCAST_ADDRESS,
        }
    }

    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        matches!(self, Address::Broadcast)
    }
}

impl From<ShortAddress> for Address {
    fn from(address: ShortAddress) -> Self {
        Address::Short(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Address::Short(address) => write!(f, "A{address}"),
            Address::Broadcast => write!(f, "broadcast"),
        }
    }
}

/// Arc power level that is safe to transmit (0-254)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ArcLevel(u8);

impl ArcLevel {
    pub const OFF: ArcLevel = ArcLevel(0);
    pub const MAX: ArcLevel = ArcLevel(MAX_LEVEL);

    /// Create a new level with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidLevel` for the reserved MASK value (255).
    pub fn new(level: u8) -> Result<Self> {
        if level > MAX_LEVEL {
            return Err(Error::InvalidLevel(level));
        }
        Ok(ArcLevel(level))
    }

    /// Clamp a requested brightness into the transmittable range.
    ///
    /// 255 maps to 254; every other value is kept.
    #[must_use]
    pub fn clamped(level: u8) -> Self {
        ArcLevel(level.min(MAX_LEVEL))
    }

    /// Interpret a level read back from a gear.
    ///
    /// Returns `None` for MASK, which is not a real level.
    #[must_use]
    pub fn from_reading(raw: u8) -> Option<Self> {
        (raw != MASK_LEVEL).then_some(ArcLevel(raw))
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<u8> for ArcLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        ArcLevel::new(value)
    }
}

impl From<ArcLevel> for u8 {
    fn from(level: ArcLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ArcLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable unique identifier handed to the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collision-free identifier allocation for lamps and buses.
///
/// Lamps on bus `b` occupy `b * 64 .. (b + 1) * 64`. Bus identifiers start
/// right after the last possible lamp identifier, at `max_buses * 64`.
///
/// # Examples
///
/// ```
/// use dalilight_core::{IdentifierSpace, ShortAddress};
///
/// let ids = IdentifierSpace::new(4).unwrap();
/// let lamp = ids.lamp_id(1, ShortAddress::new(5).unwrap()).unwrap();
/// assert_eq!(lamp.as_u32(), 69);
/// assert_eq!(ids.bus_id(0).unwrap().as_u32(), 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSpace {
    max_buses: usize,
}

impl IdentifierSpace {
    /// Create an identifier space sized for `max_buses` buses.
    ///
    /// # Errors
    /// Returns `Error::Config` if `max_buses` is zero or the space would not
    /// fit in a `u32`.
    pub fn new(max_buses: usize) -> Result<Self> {
        if max_buses == 0 {
            return Err(Error::Config("max_buses must be at least 1".to_string()));
        }
        let stride = SHORT_ADDRESS_COUNT as usize;
        let fits = max_buses
            .checked_mul(stride)
            .and_then(|lamps| lamps.checked_add(max_buses))
            .is_some_and(|total| u32::try_from(total).is_ok());
        if !fits {
            return Err(Error::Config(format!(
                "max_buses {max_buses} exceeds the identifier space"
            )));
        }
        Ok(Self { max_buses })
    }

    #[must_use]
    pub fn max_buses(&self) -> usize {
        self.max_buses
    }

    #[must_use]
    pub fn contains_bus(&self, bus_index: usize) -> bool {
        bus_index < self.max_buses
    }

    /// Identifier of the lamp at `address` on bus `bus_index`.
    ///
    /// # Errors
    /// Returns `Error::BusIndexOutOfRange` if the bus is outside the space.
    pub fn lamp_id(&self, bus_index: usize, address: ShortAddress) -> Result<EntityId> {
        self.check_bus(bus_index)?;
        let id = bus_index * SHORT_ADDRESS_COUNT as usize + address.as_u8() as usize;
        Ok(EntityId(id as u32))
    }

    /// Identifier of bus `bus_index` itself.
    ///
    /// # Errors
    /// Returns `Error::BusIndexOutOfRange` if the bus is outside the space.
    pub fn bus_id(&self, bus_index: usize) -> Result<EntityId> {
        self.check_bus(bus_index)?;
        Ok(EntityId((self.lamp_id_end() as usize + bus_index) as u32))
    }

    /// Half-open range of every lamp identifier.
    #[must_use]
    pub fn lamp_ids(&self) -> Range<u32> {
        0..self.lamp_id_end()
    }

    /// Half-open range of every bus identifier.
    #[must_use]
    pub fn bus_ids(&self) -> Range<u32> {
        let start = self.lamp_id_end();
        start..start + self.max_buses as u32
    }

    fn lamp_id_end(&self) -> u32 {
        (self.max_buses * SHORT_ADDRESS_COUNT as usize) as u32
    }

    fn check_bus(&self, bus_index: usize) -> Result<()> {
        if !self.contains_bus(bus_index) {
            return Err(Error::BusIndexOutOfRange {
                index: bus_index,
                max_buses: self.max_buses,
            });
        }
        Ok(())
    }
}

impl Default for IdentifierSpace {
    fn default() -> Self {
        Self {
            max_buses: crate::constants::DEFAULT_MAX_BUSES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("5", 5)]
    #[case("63", 63)]
    fn test_short_address_valid(#[case] input: &str, #[case] expected: u8) {
        let address: ShortAddress = input.parse().unwrap();
        assert_eq!(address.as_u8(), expected);
    }

    #[rstest]
    #[case("64")] // above range
    #[case("255")] // broadcast byte is not a short address
    #[case("x")] // non-numeric
    fn test_short_address_invalid(#[case] input: &str) {
        let result: Result<ShortAddress> = input.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_short_address_range_is_capped() {
        assert_eq!(ShortAddress::range(3).count(), 3);
        assert_eq!(ShortAddress::range(200).count(), 64);
        assert_eq!(ShortAddress::range(200).last().unwrap().as_u8(), 63);
    }

    #[test]
    fn test_short_address_serde_rejects_out_of_range() {
        let ok: ShortAddress = serde_json::from_str("12").unwrap();
        assert_eq!(ok.as_u8(), 12);
        assert!(serde_json::from_str::<ShortAddress>("64").is_err());
    }

    #[test]
    fn test_address_byte() {
        let short = Address::from(ShortAddress::new(7).unwrap());
        assert_eq!(short.as_u8(), 7);
        assert!(!short.is_broadcast());
        assert_eq!(Address::Broadcast.as_u8(), 0xFF);
        assert_eq!(short.to_string(), "A7");
    }

    #[rstest]
    #[case(0, 0)]
    #[case(120, 120)]
    #[case(254, 254)]
    #[case(255, 254)]
    fn test_arc_level_clamped(#[case] requested: u8, #[case] expected: u8) {
        assert_eq!(ArcLevel::clamped(requested).as_u8(), expected);
    }

    #[test]
    fn test_arc_level_validation() {
        assert!(ArcLevel::new(254).is_ok());
        assert_eq!(ArcLevel::new(255), Err(Error::InvalidLevel(255)));
        assert!(!ArcLevel::OFF.is_on());
        assert!(ArcLevel::MAX.is_on());
    }

    #[test]
    fn test_arc_level_serde_rejects_mask() {
        let ok: ArcLevel = serde_json::from_str("254").unwrap();
        assert_eq!(ok, ArcLevel::MAX);
        assert_eq!(serde_json::to_string(&ok).unwrap(), "254");
        assert!(serde_json::from_str::<ArcLevel>("255").is_err());
    }

    #[test]
    fn test_arc_level_from_reading() {
        assert_eq!(ArcLevel::from_reading(255), None);
        assert_eq!(ArcLevel::from_reading(0), Some(ArcLevel::OFF));
        assert_eq!(ArcLevel::from_reading(90).map(|l| l.as_u8()), Some(90));
    }

    #[test]
    fn test_identifier_examples() {
        let ids = IdentifierSpace::new(4).unwrap();
        let lamp = ids.lamp_id(1, ShortAddress::new(5).unwrap()).unwrap();
        assert_eq!(lamp.as_u32(), 69);
        assert_eq!(ids.lamp_ids(), 0..256);
        assert_eq!(ids.bus_ids(), 256..260);
        assert_eq!(ids.bus_id(3).unwrap().as_u32(), 259);
    }

    #[test]
    fn test_identifier_bus_out_of_range() {
        let ids = IdentifierSpace::new(2).unwrap();
        assert_eq!(
            ids.bus_id(2),
            Err(Error::BusIndexOutOfRange {
                index: 2,
                max_buses: 2
            })
        );
        assert!(ids.lamp_id(5, ShortAddress::new(0).unwrap()).is_err());
    }

    #[test]
    fn test_identifier_space_rejects_zero() {
        assert!(IdentifierSpace::new(0).is_err());
        assert_eq!(IdentifierSpace::default().max_buses(), 4);
    }
}
