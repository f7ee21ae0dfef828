//! Frame reader (receive state machine)
//!
//! Frames carry no outer length prefix. The reader scans for a delimiter,
//! dispatches to the matching sub-parser, and validates the decimal
//! checksum trailer:
//!
//! ```text
//! #<id>[,<field>...];<checksum>;
//! ?<id>,<0|1>;<checksum>;
//! !<id>,<length>;<raw bytes>;<checksum>;
//! "<id>,<length>;<raw bytes>;<checksum>;
//! ```
//!
//! Every byte from the delimiter through the `;` before the trailer goes
//! through the checksum. Trailer digits are read raw.

use heapless::Vec;
use serlink_hal::{Clock, Deadline, SerialStream};

use crate::comm::SerialComm;
use crate::error::RxError;
use crate::message::{
    MessageKind, ACK_DELIMITER, ASCII_DELIMITER, BINARY_DELIMITER, STRING_DELIMITER,
};
use crate::params::{FIELD_TERMINATOR, PARAM_SEPARATOR};

/// Digits in an id field (`u8`)
const ID_DIGITS: usize = 3;
/// Digits in a length field (`u16`)
const LENGTH_DIGITS: usize = 5;
/// Digits in a checksum trailer (`u16`)
const CHECKSUM_DIGITS: usize = 5;

fn parse_decimal(digits: &[u8]) -> Result<u32, RxError> {
    if digits.is_empty() {
        return Err(RxError::Malformed);
    }
    // At most five digits, cannot overflow u32
    Ok(digits
        .iter()
        .fold(0u32, |acc, &d| acc * 10 + u32::from(d - b'0')))
}

impl<'buf, S: SerialStream, C: Clock> SerialComm<'buf, S, C> {
    /// Receive at most one message
    ///
    /// Returns immediately with [`MessageKind::None`] if no byte is waiting.
    /// Otherwise consumes bytes, skipping noise, until a frame completes,
    /// the input runs dry, or the deadline passes. The populated record is
    /// readable until the next call.
    ///
    /// A checksum mismatch still returns the message kind; check
    /// `checksum_valid` on the record.
    pub fn receive(&mut self) -> MessageKind {
        self.reset_rx();
        self.last_error = None;

        if !self.stream.available() {
            return MessageKind::None;
        }

        let mut deadline = Deadline::after(&self.clock, self.config.read_timeout_ms);
        self.checksum.reset();

        while !deadline.expired(&self.clock) {
            let Some(byte) = self.next_byte() else {
                break;
            };

            let result = match byte {
                ASCII_DELIMITER => self.read_ascii(&deadline).map(|()| MessageKind::Ascii),
                ACK_DELIMITER => self.read_ack(&deadline).map(|()| MessageKind::Ack),
                BINARY_DELIMITER => {
                    // Large payloads on a slow link
                    deadline.extend(self.config.binary_extension_ms);
                    self.read_binary(&deadline).map(|()| MessageKind::Binary)
                }
                STRING_DELIMITER => self.read_string(&deadline).map(|()| MessageKind::String),
                _ => {
                    self.checksum.reset();
                    continue;
                }
            };

            return match result {
                Ok(kind) => {
                    debug!("rx {:?}", kind);
                    kind
                }
                Err(e) => {
                    warn!("rx frame rejected: {:?}", e);
                    self.reset_rx();
                    self.last_error = Some(e);
                    MessageKind::None
                }
            };
        }

        MessageKind::None
    }

    // --- Byte access ---

    /// Consume a byte if one is waiting, updating the checksum
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.stream.try_read_byte()?;
        self.checksum.update(byte);
        Some(byte)
    }

    /// Poll until a byte can be consumed (checksummed) or the deadline passes
    fn wait_byte(&mut self, deadline: &Deadline) -> Result<u8, RxError> {
        let byte = self.wait_raw(deadline)?;
        self.checksum.update(byte);
        Ok(byte)
    }

    /// Poll until a byte can be consumed, bypassing the checksum
    fn wait_raw(&mut self, deadline: &Deadline) -> Result<u8, RxError> {
        loop {
            if let Some(byte) = self.stream.try_read_byte() {
                return Ok(byte);
            }
            if deadline.expired(&self.clock) {
                return Err(RxError::Timeout);
            }
        }
    }

    /// Poll until a byte can be peeked or the deadline passes
    fn wait_peek(&mut self, deadline: &Deadline) -> Result<u8, RxError> {
        loop {
            if let Some(byte) = self.stream.peek_byte() {
                return Ok(byte);
            }
            if deadline.expired(&self.clock) {
                return Err(RxError::Timeout);
            }
        }
    }

    /// Consume one byte that must equal `expected`
    fn expect_byte(&mut self, deadline: &Deadline, expected: u8) -> Result<(), RxError> {
        if self.wait_byte(deadline)? == expected {
            Ok(())
        } else {
            Err(RxError::Malformed)
        }
    }

    /// Consume up to `N` decimal digits, stopping in front of any byte in
    /// `terminators`. The terminator itself is left unread but must be the
    /// next byte.
    fn read_digits<const N: usize>(
        &mut self,
        deadline: &Deadline,
        terminators: &[u8],
        checksummed: bool,
    ) -> Result<Vec<u8, N>, RxError> {
        let mut digits = Vec::new();

        while !digits.is_full() {
            let byte = self.wait_peek(deadline)?;
            if terminators.contains(&byte) {
                break;
            }
            if !byte.is_ascii_digit() {
                return Err(RxError::Malformed);
            }
            if checksummed {
                self.next_byte();
            } else {
                self.stream.try_read_byte();
            }
            // is_full() checked above
            let _ = digits.push(byte);
        }

        if terminators.contains(&self.wait_peek(deadline)?) {
            Ok(digits)
        } else {
            Err(RxError::Malformed)
        }
    }

    fn read_id(&mut self, deadline: &Deadline, terminators: &[u8]) -> Result<u8, RxError> {
        let digits = self.read_digits::<ID_DIGITS>(deadline, terminators, true)?;
        u8::try_from(parse_decimal(&digits)?).map_err(|_| RxError::IdOutOfRange)
    }

    fn read_length(&mut self, deadline: &Deadline) -> Result<u16, RxError> {
        let digits = self.read_digits::<LENGTH_DIGITS>(deadline, &[FIELD_TERMINATOR], true)?;
        u16::try_from(parse_decimal(&digits)?).map_err(|_| RxError::LengthOutOfRange)
    }

    /// Read `<checksum>;` and compare it with the running value
    ///
    /// A missing, malformed, or mismatched trailer only clears the validity
    /// flag; it never fails the frame.
    fn read_trailer(&mut self, deadline: &Deadline) -> bool {
        let expected = self.checksum.combined();
        let received = self
            .read_digits::<CHECKSUM_DIGITS>(deadline, &[FIELD_TERMINATOR], false)
            .and_then(|digits| {
                self.wait_raw(deadline)?;
                parse_decimal(&digits)
            });

        match received {
            Ok(value) if value == u32::from(expected) => true,
            Ok(value) => {
                warn!("checksum mismatch: got {} expected {}", value, expected);
                false
            }
            Err(e) => {
                warn!("checksum trailer unreadable: {:?}", e);
                false
            }
        }
    }

    /// Drain the input after a binary/string failure so the next receive
    /// does not start in the middle of a payload
    fn drain_on(&mut self, err: RxError) -> RxError {
        if matches!(err, RxError::Timeout | RxError::BinaryOverflow) {
            self.stream.discard_input();
        }
        err
    }

    // --- Sub-parsers ---

    fn read_ascii(&mut self, deadline: &Deadline) -> Result<(), RxError> {
        trace!("rx ascii frame");
        self.ascii_rx.id = self.read_id(deadline, &[PARAM_SEPARATOR, FIELD_TERMINATOR])?;

        loop {
            let byte = self.wait_byte(deadline)?;
            if byte == FIELD_TERMINATOR {
                break;
            }
            if byte == PARAM_SEPARATOR {
                self.ascii_rx.num_params = self.ascii_rx.num_params.saturating_add(1);
            }
            if self.ascii_rx.params.push(byte).is_err() {
                self.stream.discard_input();
                return Err(RxError::PayloadOverflow);
            }
        }

        self.ascii_rx.checksum_valid = self.read_trailer(deadline);
        Ok(())
    }

    fn read_ack(&mut self, deadline: &Deadline) -> Result<(), RxError> {
        trace!("rx ack frame");
        self.ack_rx.id = self.read_id(deadline, &[PARAM_SEPARATOR])?;
        self.expect_byte(deadline, PARAM_SEPARATOR)?;

        self.ack_rx.value = match self.wait_byte(deadline)? {
            b'0' => false,
            b'1' => true,
            _ => return Err(RxError::InvalidAckValue),
        };

        self.expect_byte(deadline, FIELD_TERMINATOR)?;
        self.ack_rx.checksum_valid = self.read_trailer(deadline);
        Ok(())
    }

    fn read_binary(&mut self, deadline: &Deadline) -> Result<(), RxError> {
        trace!("rx binary frame");
        if self.binary_rx.capacity() == 0 {
            self.stream.discard_input();
            return Err(RxError::NoBinaryBuffer);
        }

        self.binary_rx.id = self
            .read_id(deadline, &[PARAM_SEPARATOR])
            .map_err(|e| self.drain_on(e))?;
        self.expect_byte(deadline, PARAM_SEPARATOR)
            .map_err(|e| self.drain_on(e))?;

        let length = self.read_length(deadline).map_err(|e| self.drain_on(e))?;
        self.expect_byte(deadline, FIELD_TERMINATOR)
            .map_err(|e| self.drain_on(e))?;

        if usize::from(length) > self.binary_rx.capacity() {
            warn!(
                "binary length {} exceeds buffer {}",
                length,
                self.binary_rx.capacity()
            );
            return Err(self.drain_on(RxError::BinaryOverflow));
        }
        self.binary_rx.length = length;

        for index in 0..usize::from(length) {
            let byte = self.wait_byte(deadline).map_err(|e| self.drain_on(e))?;
            self.binary_rx.store(index, byte);
        }

        self.expect_byte(deadline, FIELD_TERMINATOR)
            .map_err(|e| self.drain_on(e))?;
        self.binary_rx.checksum_valid = self.read_trailer(deadline);
        Ok(())
    }

    fn read_string(&mut self, deadline: &Deadline) -> Result<(), RxError> {
        trace!("rx string frame");
        self.string_rx.id = self
            .read_id(deadline, &[PARAM_SEPARATOR])
            .map_err(|e| self.drain_on(e))?;
        self.expect_byte(deadline, PARAM_SEPARATOR)
            .map_err(|e| self.drain_on(e))?;

        let length = self.read_length(deadline).map_err(|e| self.drain_on(e))?;
        self.expect_byte(deadline, FIELD_TERMINATOR)
            .map_err(|e| self.drain_on(e))?;

        // Bytes past capacity are consumed and checksummed, not stored
        for _ in 0..length {
            let byte = self.wait_byte(deadline).map_err(|e| self.drain_on(e))?;
            let _ = self.string_rx.buffer.push(byte);
        }
        if usize::from(length) > self.string_rx.buffer.len() {
            debug!("string truncated from {} bytes", length);
        }
        self.string_rx.length = self.string_rx.buffer.len() as u16;

        self.expect_byte(deadline, FIELD_TERMINATOR)
            .map_err(|e| self.drain_on(e))?;
        self.string_rx.checksum_valid = self.read_trailer(deadline);
        Ok(())
    }
}
