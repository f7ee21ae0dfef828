//! Protocol engine state
//!
//! [`SerialComm`] owns the transport, the clock, one record per message
//! kind in each direction, and the running checksum. Receive lives in
//! [`crate::reader`], transmit in [`crate::writer`].

use heapless::Vec;
use serlink_hal::{Clock, SerialStream};

use crate::checksum::Checksum;
use crate::config::CommConfig;
use crate::error::{ParamError, RxError, TxError};
use crate::message::{
    AckMessage, AsciiMessage, BinaryMessage, BinaryTx, StringMessage, STRING_CAPACITY,
};
use crate::params::{AsciiParam, ParamReader, ParamWriter};

/// Framed messaging over one serial link
///
/// `'buf` is the lifetime of the application-owned binary buffers lent to
/// the engine. Every mutating call takes `&mut self`; one engine serves one
/// control loop and exchanges one message at a time.
pub struct SerialComm<'buf, S, C> {
    pub(crate) stream: S,
    pub(crate) clock: C,
    pub(crate) config: CommConfig,
    pub(crate) checksum: Checksum,

    pub(crate) ascii_rx: AsciiMessage,
    pub(crate) ascii_tx: ParamWriter,
    pub(crate) ack_rx: AckMessage,
    pub(crate) binary_rx: BinaryMessage<'buf>,
    pub(crate) binary_tx: BinaryTx<'buf>,
    pub(crate) string_rx: StringMessage,
    pub(crate) string_tx: Vec<u8, STRING_CAPACITY>,

    pub(crate) last_error: Option<RxError>,
}

impl<'buf, S: SerialStream, C: Clock> SerialComm<'buf, S, C> {
    /// Create an engine with default timing
    pub fn new(stream: S, clock: C) -> Self {
        Self::with_config(stream, clock, CommConfig::default())
    }

    /// Create an engine with explicit timing
    pub fn with_config(stream: S, clock: C, config: CommConfig) -> Self {
        Self {
            stream,
            clock,
            config,
            checksum: Checksum::new(),
            ascii_rx: AsciiMessage::default(),
            ascii_tx: ParamWriter::new(),
            ack_rx: AckMessage::default(),
            binary_rx: BinaryMessage::default(),
            binary_tx: BinaryTx::default(),
            string_rx: StringMessage::default(),
            string_tx: Vec::new(),
            last_error: None,
        }
    }

    /// Active timing configuration
    pub fn config(&self) -> &CommConfig {
        &self.config
    }

    /// Change timing; takes effect on the next receive
    pub fn set_config(&mut self, config: CommConfig) {
        self.config = config;
    }

    /// Swap the transport (e.g. to a USB console while debugging)
    ///
    /// Returns the previous transport. Message records are untouched.
    pub fn replace_stream(&mut self, stream: S) -> S {
        core::mem::replace(&mut self.stream, stream)
    }

    /// Get access to the underlying transport
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Get mutable access to the underlying transport
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Get access to the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Release the transport and clock
    pub fn into_parts(self) -> (S, C) {
        (self.stream, self.clock)
    }

    // --- Binary buffers ---

    /// Lend a buffer for incoming binary payloads
    ///
    /// Frames declaring more bytes than `buffer.len()` are rejected before
    /// any payload is read. The same buffer is reused by every receive
    /// until replaced or taken back.
    pub fn assign_binary_rx_buffer(&mut self, buffer: &'buf mut [u8]) {
        self.binary_rx.reset();
        self.binary_rx.buffer = Some(buffer);
    }

    /// Take the receive buffer back
    pub fn take_binary_rx_buffer(&mut self) -> Option<&'buf mut [u8]> {
        self.binary_rx.reset();
        self.binary_rx.buffer.take()
    }

    /// Lend the payload for the next binary transmit
    ///
    /// The first `length` bytes of `buffer` are sent.
    pub fn assign_binary_tx_buffer(&mut self, buffer: &'buf [u8], length: u16) -> Result<(), TxError> {
        if usize::from(length) > buffer.len() {
            return Err(TxError::LengthExceedsBuffer);
        }
        self.binary_tx = BinaryTx {
            buffer: Some(buffer),
            length,
        };
        Ok(())
    }

    // --- String payload ---

    /// Load the payload for the next string transmit
    ///
    /// The payload stays loaded across transmits until replaced.
    pub fn load_string(&mut self, text: &[u8]) -> Result<(), TxError> {
        self.string_tx = Vec::from_slice(text).map_err(|_| TxError::StringTooLong)?;
        Ok(())
    }

    // --- Received records ---

    /// Last received ASCII message
    pub fn ascii_rx(&self) -> &AsciiMessage {
        &self.ascii_rx
    }

    /// Last received ASCII message, for consuming parameters
    pub fn ascii_rx_mut(&mut self) -> &mut AsciiMessage {
        &mut self.ascii_rx
    }

    /// Last received acknowledgement
    pub fn ack_rx(&self) -> &AckMessage {
        &self.ack_rx
    }

    /// Last received binary message
    pub fn binary_rx(&self) -> &BinaryMessage<'buf> {
        &self.binary_rx
    }

    /// Last received string message
    pub fn string_rx(&self) -> &StringMessage {
        &self.string_rx
    }

    /// Why the most recent receive returned `None`, if it rejected a frame
    pub fn last_error(&self) -> Option<RxError> {
        self.last_error
    }

    // --- ASCII parameters ---

    /// Parameters of the last received ASCII message
    pub fn rx_params(&mut self) -> &mut ParamReader {
        &mut self.ascii_rx.params
    }

    /// Parameters queued for the next ASCII transmit
    pub fn tx_params(&mut self) -> &mut ParamWriter {
        &mut self.ascii_tx
    }

    /// Consume the next received parameter
    pub fn get<T: AsciiParam>(&mut self) -> Result<T, ParamError> {
        self.ascii_rx.params.get()
    }

    /// Queue a parameter for the next ASCII transmit
    pub fn add<T: AsciiParam>(&mut self, value: T) -> Result<(), ParamError> {
        self.ascii_tx.add(value)
    }

    pub(crate) fn reset_rx(&mut self) {
        self.ascii_rx.reset();
        self.ack_rx = AckMessage::default();
        self.binary_rx.reset();
        self.string_rx.reset();
    }
}
