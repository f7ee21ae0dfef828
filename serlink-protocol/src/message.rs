//! Message kinds and receive records
//!
//! Four frame types share the link, each selected by its first byte:
//!
//! | Delimiter | Kind   | Payload                                   |
//! |-----------|--------|-------------------------------------------|
//! | `#`       | ASCII  | comma-led decimal parameters              |
//! | `?`       | ACK    | a single `0` / `1`                        |
//! | `!`       | Binary | length-prefixed raw bytes, caller buffer  |
//! | `"`       | String | length-prefixed raw bytes, internal buffer|
//!
//! Every record carries `checksum_valid`. A checksum mismatch does **not**
//! drop the message: the record is returned fully parsed with the flag
//! cleared, and callers that need integrity must check it.

use heapless::Vec;

use crate::params::ParamReader;

/// Starts an ASCII frame
pub const ASCII_DELIMITER: u8 = b'#';
/// Starts an ACK frame
pub const ACK_DELIMITER: u8 = b'?';
/// Starts a binary frame
pub const BINARY_DELIMITER: u8 = b'!';
/// Starts a string frame
pub const STRING_DELIMITER: u8 = b'"';

/// String payload capacity in bytes
pub const STRING_CAPACITY: usize = 127;

/// Result of one [`SerialComm::receive`](crate::SerialComm::receive) call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    /// Nothing complete arrived before the deadline, or the frame was rejected
    #[default]
    None,
    /// [`AsciiMessage`] is populated
    Ascii,
    /// [`AckMessage`] is populated
    Ack,
    /// [`BinaryMessage`] is populated
    Binary,
    /// [`StringMessage`] is populated
    String,
}

impl MessageKind {
    /// Map a frame's first byte to its kind
    pub fn from_delimiter(byte: u8) -> Option<Self> {
        match byte {
            ASCII_DELIMITER => Some(MessageKind::Ascii),
            ACK_DELIMITER => Some(MessageKind::Ack),
            BINARY_DELIMITER => Some(MessageKind::Binary),
            STRING_DELIMITER => Some(MessageKind::String),
            _ => None,
        }
    }

    /// Returns true for anything but `None`
    pub fn is_some(&self) -> bool {
        !matches!(self, MessageKind::None)
    }
}

/// Received ASCII message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AsciiMessage {
    /// Message identifier
    pub id: u8,
    /// Number of `,` separators seen (informational, saturating)
    pub num_params: u8,
    /// Trailer matched the running checksum
    pub checksum_valid: bool,
    pub(crate) params: ParamReader,
}

impl AsciiMessage {
    /// Parameter text and read cursor
    pub fn params(&self) -> &ParamReader {
        &self.params
    }

    /// Parameter reader, for consuming fields
    pub fn params_mut(&mut self) -> &mut ParamReader {
        &mut self.params
    }

    pub(crate) fn reset(&mut self) {
        self.id = 0;
        self.num_params = 0;
        self.checksum_valid = false;
        self.params.clear();
    }
}

/// Received acknowledgement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AckMessage {
    /// Id of the message being acknowledged
    pub id: u8,
    /// ACK (`true`) or NAK (`false`)
    pub value: bool,
    /// Trailer matched the running checksum
    pub checksum_valid: bool,
}

/// Received binary message
///
/// The payload lives in a buffer owned by the application and lent to the
/// engine through
/// [`assign_binary_rx_buffer`](crate::SerialComm::assign_binary_rx_buffer).
/// The engine never copies or allocates it.
#[derive(Debug, Default)]
pub struct BinaryMessage<'buf> {
    /// Message identifier
    pub id: u8,
    /// Payload length; never exceeds the assigned buffer
    pub length: u16,
    /// Trailer matched the running checksum
    pub checksum_valid: bool,
    pub(crate) buffer: Option<&'buf mut [u8]>,
}

impl<'buf> BinaryMessage<'buf> {
    /// Received payload, or `None` if no buffer is assigned
    pub fn payload(&self) -> Option<&[u8]> {
        let buffer = self.buffer.as_deref()?;
        buffer.get(..usize::from(self.length))
    }

    /// Size of the assigned buffer
    pub fn capacity(&self) -> usize {
        self.buffer.as_deref().map_or(0, <[u8]>::len)
    }

    pub(crate) fn reset(&mut self) {
        self.id = 0;
        self.length = 0;
        self.checksum_valid = false;
    }

    pub(crate) fn store(&mut self, index: usize, byte: u8) {
        if let Some(slot) = self
            .buffer
            .as_deref_mut()
            .and_then(|buffer| buffer.get_mut(index))
        {
            *slot = byte;
        }
    }
}

/// Outgoing binary payload, borrowed from the application
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BinaryTx<'buf> {
    pub(crate) buffer: Option<&'buf [u8]>,
    pub(crate) length: u16,
}

impl<'buf> BinaryTx<'buf> {
    pub(crate) fn payload(&self) -> Option<&'buf [u8]> {
        let buffer = self.buffer.filter(|b| !b.is_empty())?;
        buffer.get(..usize::from(self.length))
    }
}

/// Received string message
///
/// Payloads declared longer than [`STRING_CAPACITY`] are truncated: the
/// extra bytes are read off the wire (and checksummed) but not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StringMessage {
    /// Message identifier
    pub id: u8,
    /// Number of payload bytes stored
    pub length: u16,
    /// Trailer matched the running checksum
    pub checksum_valid: bool,
    pub(crate) buffer: Vec<u8, STRING_CAPACITY>,
}

impl StringMessage {
    /// Stored payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Stored payload, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.buffer).ok()
    }

    pub(crate) fn reset(&mut self) {
        self.id = 0;
        self.length = 0;
        self.checksum_valid = false;
        self.buffer.clear();
    }
}
