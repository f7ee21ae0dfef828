//! Adapter for `embedded-io` serial peripherals
//!
//! Most embedded HALs expose their UARTs through `embedded-io`. The trait
//! has no lookahead, so [`IoStream`] holds one byte back to serve
//! [`SerialStream::peek_byte`].

use embedded_io::{Read, ReadReady, Write};

use crate::stream::SerialStream;

/// Most bytes dropped by one `discard_input` call on a busy line
pub const DISCARD_LIMIT: usize = 512;

/// Wraps an `embedded-io` port as a [`SerialStream`]
///
/// I/O errors are treated as "no data" on the receive side and dropped on
/// the transmit side; the protocol's checksum and deadlines cover both.
pub struct IoStream<T> {
    inner: T,
    peeked: Option<u8>,
}

impl<T> IoStream<T> {
    /// Wrap a port
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            peeked: None,
        }
    }

    /// Get access to the underlying port
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Release the underlying port, dropping any held-back byte
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + ReadReady> IoStream<T> {
    fn fill_peek(&mut self) -> Option<u8> {
        if self.peeked.is_none() && matches!(self.inner.read_ready(), Ok(true)) {
            let mut buf = [0u8; 1];
            if let Ok(1) = self.inner.read(&mut buf) {
                self.peeked = Some(buf[0]);
            }
        }
        self.peeked
    }
}

impl<T: Read + ReadReady + Write> SerialStream for IoStream<T> {
    fn try_read_byte(&mut self) -> Option<u8> {
        self.fill_peek();
        self.peeked.take()
    }

    fn peek_byte(&mut self) -> Option<u8> {
        self.fill_peek()
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = self.inner.write_all(&[byte]);
    }

    fn write_str(&mut self, s: &str) {
        let _ = self.inner.write_all(s.as_bytes());
    }

    fn discard_input(&mut self) {
        self.peeked = None;
        for _ in 0..DISCARD_LIMIT {
            if self.try_read_byte().is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_io::ErrorType;
    use heapless::Vec;

    struct Port {
        rx: Vec<u8, 16>,
        pos: usize,
        tx: Vec<u8, 16>,
    }

    impl ErrorType for Port {
        type Error = Infallible;
    }

    impl Read for Port {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
            let n = buf.len().min(self.rx.len() - self.pos);
            buf[..n].copy_from_slice(&self.rx[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl ReadReady for Port {
        fn read_ready(&mut self) -> Result<bool, Infallible> {
            Ok(self.pos < self.rx.len())
        }
    }

    impl Write for Port {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            let _ = self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    fn port(rx: &[u8]) -> Port {
        Port {
            rx: Vec::from_slice(rx).unwrap(),
            pos: 0,
            tx: Vec::new(),
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut stream = IoStream::new(port(b"ab"));
        assert_eq!(stream.peek_byte(), Some(b'a'));
        assert_eq!(stream.peek_byte(), Some(b'a'));
        assert_eq!(stream.try_read_byte(), Some(b'a'));
        assert_eq!(stream.try_read_byte(), Some(b'b'));
        assert_eq!(stream.try_read_byte(), None);
    }

    #[test]
    fn test_discard_drops_held_byte() {
        let mut stream = IoStream::new(port(b"xyz"));
        assert_eq!(stream.peek_byte(), Some(b'x'));
        stream.discard_input();
        assert!(!stream.available());
    }

    /// Receiver that always has another byte ready
    struct Chatter {
        reads: usize,
    }

    impl ErrorType for Chatter {
        type Error = Infallible;
    }

    impl Read for Chatter {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
            buf.fill(b'~');
            self.reads += 1;
            Ok(buf.len())
        }
    }

    impl ReadReady for Chatter {
        fn read_ready(&mut self) -> Result<bool, Infallible> {
            Ok(true)
        }
    }

    impl Write for Chatter {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    #[test]
    fn test_discard_is_bounded_on_busy_line() {
        let mut stream = IoStream::new(Chatter { reads: 0 });
        stream.discard_input();
        assert_eq!(stream.inner().reads, DISCARD_LIMIT);
        assert!(stream.available());
    }

    #[test]
    fn test_writes_pass_through() {
        let mut stream = IoStream::new(port(b""));
        stream.write_byte(b'#');
        stream.write_str("7;\n");
        assert_eq!(stream.inner().tx.as_slice(), b"#7;\n");
    }
}
