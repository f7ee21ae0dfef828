//! Frame writer (transmit encoders)
//!
//! Each encoder resets the checksum, writes the delimiter and fields
//! through the checksum, closes the payload with `;`, then appends the
//! decimal trailer and a line break so frames read cleanly on a terminal.

use core::fmt::Write;

use heapless::String;
use serlink_hal::{Clock, SerialStream};

use crate::checksum::Checksum;
use crate::comm::SerialComm;
use crate::error::TxError;
use crate::message::{ACK_DELIMITER, ASCII_DELIMITER, BINARY_DELIMITER, STRING_DELIMITER};
use crate::params::{FIELD_TERMINATOR, PARAM_SEPARATOR};

/// Write bytes to the stream, folding each into the checksum
fn emit<S: SerialStream>(stream: &mut S, checksum: &mut Checksum, bytes: &[u8]) {
    for &byte in bytes {
        stream.write_byte(byte);
        checksum.update(byte);
    }
}

/// Render an unsigned value as decimal text
fn decimal(value: u32) -> String<10> {
    let mut text = String::new();
    // u32::MAX is ten digits
    let _ = write!(text, "{}", value);
    text
}

impl<'buf, S: SerialStream, C: Clock> SerialComm<'buf, S, C> {
    fn put(&mut self, bytes: &[u8]) {
        emit(&mut self.stream, &mut self.checksum, bytes);
    }

    fn put_decimal(&mut self, value: u32) {
        self.put(decimal(value).as_bytes());
    }

    fn begin(&mut self, delimiter: u8, id: u8) {
        self.checksum.reset();
        self.put(&[delimiter]);
        self.put_decimal(u32::from(id));
    }

    /// Close the payload and append `<checksum>;\n`
    fn finish(&mut self) {
        self.put(&[FIELD_TERMINATOR]);
        let trailer = decimal(u32::from(self.checksum.combined()));
        self.stream.write_str(&trailer);
        self.stream.write_byte(FIELD_TERMINATOR);
        self.stream.write_str("\n");
    }

    /// Send an ASCII message carrying the queued parameters
    ///
    /// The parameter buffer is cleared afterwards. With nothing queued the
    /// frame is just `#<id>;<checksum>;`.
    pub fn transmit_ascii(&mut self, id: u8) {
        trace!("tx ascii id={} params={}", id, self.ascii_tx.count());
        self.begin(ASCII_DELIMITER, id);
        emit(&mut self.stream, &mut self.checksum, self.ascii_tx.as_bytes());
        self.finish();
        self.ascii_tx.clear();
    }

    /// Send an acknowledgement for message `id`
    pub fn transmit_ack(&mut self, id: u8, value: bool) {
        trace!("tx ack id={} value={}", id, value);
        self.begin(ACK_DELIMITER, id);
        self.put(&[PARAM_SEPARATOR, if value { b'1' } else { b'0' }]);
        self.finish();
    }

    /// Send the assigned binary payload
    ///
    /// Fails without writing anything if no transmit buffer is assigned.
    pub fn transmit_binary(&mut self, id: u8) -> Result<(), TxError> {
        let payload = self.binary_tx.payload().ok_or(TxError::NoBinaryBuffer)?;
        trace!("tx binary id={} len={}", id, payload.len());

        self.begin(BINARY_DELIMITER, id);
        self.put(&[PARAM_SEPARATOR]);
        self.put_decimal(u32::from(self.binary_tx.length));
        self.put(&[FIELD_TERMINATOR]);
        self.put(payload);
        self.finish();
        Ok(())
    }

    /// Send the loaded string payload
    pub fn transmit_string(&mut self, id: u8) {
        trace!("tx string id={} len={}", id, self.string_tx.len());
        self.begin(STRING_DELIMITER, id);
        self.put(&[PARAM_SEPARATOR]);
        self.put_decimal(self.string_tx.len() as u32);
        self.put(&[FIELD_TERMINATOR]);
        emit(&mut self.stream, &mut self.checksum, &self.string_tx);
        self.finish();
    }

    /// Load `text` and send it as a string message
    ///
    /// Fails without writing anything if `text` exceeds the string buffer.
    pub fn transmit_string_text(&mut self, id: u8, text: &[u8]) -> Result<(), TxError> {
        self.load_string(text)?;
        self.transmit_string(id);
        Ok(())
    }
}
