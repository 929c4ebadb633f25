//! Core constants for DALI addressing and arc power levels.
//!
//! This module defines the protocol-level constants shared by every crate in
//! the workspace. DALI (IEC 62386) addresses up to 64 control gear per bus
//! with a 6-bit short address, and expresses light output as an 8-bit arc
//! power level in which the top value is reserved.
//!
//! # Level Semantics
//!
//! | Value | Meaning |
//! |-------|---------|
//! | `0` | Off |
//! | `1..=254` | Arc power level |
//! | `255` | MASK, "no change" / "not a real level" |
//!
//! # Usage
//!
//! ```
//! use dalilight_core::constants::*;
//!
//! // Short address validation
//! fn is_short_address(addr: u8) -> bool {
//!     addr < SHORT_ADDRESS_COUNT
//! }
//!
//! assert!(is_short_address(63));
//! assert!(!is_short_address(64));
//! assert_eq!(MASK_LEVEL, 255);
//! ```

// ============================================================================
// Addressing
// ============================================================================

/// Number of short addresses available on one DALI bus (0-63).
///
/// Also the stride of the identifier space: every bus owns a contiguous
/// block of this many lamp identifiers.
pub const SHORT_ADDRESS_COUNT: u8 = 64;

/// Highest valid short address.
pub const MAX_SHORT_ADDRESS: u8 = SHORT_ADDRESS_COUNT - 1;

/// Raw address byte used to denote broadcast (all gear on the bus).
pub const BROADCAST_ADDRESS: u8 = 0xFF;

// ============================================================================
// Arc Power Levels
// ============================================================================

/// Highest level that may be sent in a Direct Arc Power Control command.
pub const MAX_LEVEL: u8 = 254;

/// Reserved MASK value.
///
/// Never transmitted as a DAPC level. When returned by a level query it
/// means the gear has no defined actual level.
pub const MASK_LEVEL: u8 = 255;

/// Level used by "turn on" when the caller gives no brightness.
pub const DEFAULT_ON_LEVEL: u8 = MAX_LEVEL;

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Default number of short addresses probed during discovery.
pub const DEFAULT_MAX_GEARS: u8 = SHORT_ADDRESS_COUNT;

/// Default number of buses the identifier space is sized for.
pub const DEFAULT_MAX_BUSES: usize = 4;

// ============================================================================
// Host Capability Flags
// ============================================================================

/// Capability bit advertising dimming support to the host platform.
pub const SUPPORT_BRIGHTNESS: u32 = 1;
