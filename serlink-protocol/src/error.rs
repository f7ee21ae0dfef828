//! Error types
//!
//! None of these cross the `receive()` boundary: a failed receive surfaces
//! as [`MessageKind::None`](crate::MessageKind::None) and the reason is kept
//! for [`SerialComm::last_error`](crate::SerialComm::last_error).

use core::fmt;

/// Reasons a frame was rejected while receiving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxError {
    /// Deadline passed mid-frame
    Timeout,
    /// Wrong separator, empty field, or non-digit in a numeric field
    Malformed,
    /// Message id does not fit in 8 bits
    IdOutOfRange,
    /// Declared length does not fit in 16 bits
    LengthOutOfRange,
    /// Binary frame arrived with no receive buffer assigned
    NoBinaryBuffer,
    /// Declared binary length exceeds the assigned receive buffer
    BinaryOverflow,
    /// ASCII parameter text exceeds the receive buffer
    PayloadOverflow,
    /// ACK value byte was neither `0` nor `1`
    InvalidAckValue,
}

impl fmt::Display for RxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RxError::Timeout => "receive deadline elapsed",
            RxError::Malformed => "malformed field",
            RxError::IdOutOfRange => "message id out of range",
            RxError::LengthOutOfRange => "declared length out of range",
            RxError::NoBinaryBuffer => "no binary receive buffer assigned",
            RxError::BinaryOverflow => "binary length exceeds receive buffer",
            RxError::PayloadOverflow => "parameter text exceeds receive buffer",
            RxError::InvalidAckValue => "ack value must be 0 or 1",
        };
        f.write_str(msg)
    }
}

/// Errors from the ASCII parameter codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// Field did not start with `,` (or no fields remain)
    MissingSeparator,
    /// Field is wider than the type's maximum width, on either side
    FieldTooWide,
    /// Field text is not a number of the requested type
    Malformed,
    /// Number parsed but does not fit the requested type
    OutOfRange,
    /// Appending would overflow the transmit buffer; the buffer was cleared
    BufferFull,
    /// Text contains a byte that would break framing
    InvalidText,
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParamError::MissingSeparator => "expected leading ','",
            ParamError::FieldTooWide => "field wider than type allows",
            ParamError::Malformed => "field is not a valid number",
            ParamError::OutOfRange => "value out of range for type",
            ParamError::BufferFull => "parameter buffer full",
            ParamError::InvalidText => "text contains framing characters",
        };
        f.write_str(msg)
    }
}

/// Errors from the transmit path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    /// Binary transmit with no buffer assigned
    NoBinaryBuffer,
    /// Declared binary length is larger than the buffer holding it
    LengthExceedsBuffer,
    /// String payload longer than the string buffer
    StringTooLong,
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TxError::NoBinaryBuffer => "no binary transmit buffer assigned",
            TxError::LengthExceedsBuffer => "binary length exceeds buffer",
            TxError::StringTooLong => "string exceeds buffer capacity",
        };
        f.write_str(msg)
    }
}

/// Errors from the fixed-width serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// Not enough room left in the buffer for the value
    BufferTooSmall,
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("buffer too small")
    }
}
