//! Engine configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default receive deadline, measured from the first byte seen
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 100;

/// Extra time granted once a binary frame is recognized
pub const DEFAULT_BINARY_EXTENSION_MS: u32 = 900;

/// Timing parameters for [`SerialComm`](crate::SerialComm)
///
/// Both controllers should agree on these loosely: a sender that trickles
/// bytes slower than the receiver's deadline will see its frames dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommConfig {
    /// Receive deadline (ms)
    pub read_timeout_ms: u32,
    /// Added to the deadline when a binary frame starts (ms)
    pub binary_extension_ms: u32,
}

impl Default for CommConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            binary_extension_ms: DEFAULT_BINARY_EXTENSION_MS,
        }
    }
}

/// Byte order for the fixed-width serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Endianness {
    /// Most significant byte first
    #[default]
    Big,
    /// Least significant byte first
    Little,
}
