//! Serial byte stream abstractions
//!
//! Provides the byte-level interface the protocol engine drives. Reads never
//! block: an empty receive FIFO is reported as `None` and the caller decides
//! whether to keep polling against its own deadline.

/// Byte-oriented serial port
///
/// Implemented by chip-specific UART drivers, USB CDC consoles, or the
/// host-side loopback in [`crate::mock`].
pub trait SerialStream {
    /// Take the next received byte, if one is available
    fn try_read_byte(&mut self) -> Option<u8>;

    /// Look at the next received byte without consuming it
    fn peek_byte(&mut self) -> Option<u8>;

    /// Queue a single byte for transmission
    fn write_byte(&mut self, byte: u8);

    /// Queue a string for transmission
    fn write_str(&mut self, s: &str) {
        for &byte in s.as_bytes() {
            self.write_byte(byte);
        }
    }

    /// Drop every byte that has been received but not yet read
    fn discard_input(&mut self);

    /// Returns true if at least one byte is waiting
    fn available(&mut self) -> bool {
        self.peek_byte().is_some()
    }
}

impl<T: SerialStream + ?Sized> SerialStream for &mut T {
    fn try_read_byte(&mut self) -> Option<u8> {
        (**self).try_read_byte()
    }

    fn peek_byte(&mut self) -> Option<u8> {
        (**self).peek_byte()
    }

    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte)
    }

    fn write_str(&mut self, s: &str) {
        (**self).write_str(s)
    }

    fn discard_input(&mut self) {
        (**self).discard_input()
    }

    fn available(&mut self) -> bool {
        (**self).available()
    }
}
