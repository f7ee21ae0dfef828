//! Host-side test doubles
//!
//! [`MockStream`] is a fixed-capacity in-memory serial port: bytes fed with
//! [`MockStream::feed`] are what the engine reads, and everything the
//! engine writes is captured for inspection or looped back. [`SimClock`]
//! advances on every read so spin-polling code always reaches its deadline.

use core::cell::Cell;

use heapless::{Deque, Vec};

use crate::clock::Clock;
use crate::stream::SerialStream;

/// In-memory serial port
#[derive(Debug)]
pub struct MockStream<const N: usize = 512> {
    rx: Deque<u8, N>,
    tx: Vec<u8, N>,
    discards: usize,
}

impl<const N: usize> MockStream<N> {
    /// Create an empty port
    pub fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Vec::new(),
            discards: 0,
        }
    }

    /// Queue bytes for the engine to receive
    ///
    /// Bytes that do not fit are dropped, like a UART FIFO overrun.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.rx.push_back(byte).is_err() {
                break;
            }
        }
    }

    /// Bytes written by the engine so far
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Forget captured output
    pub fn clear_written(&mut self) {
        self.tx.clear();
    }

    /// Move captured output into the receive queue
    pub fn loop_back(&mut self) {
        let tx = self.tx.clone();
        self.tx.clear();
        self.feed(&tx);
    }

    /// Number of bytes still waiting to be read
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// How many times the engine drained the input
    pub fn discards(&self) -> usize {
        self.discards
    }
}

impl<const N: usize> Default for MockStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SerialStream for MockStream<N> {
    fn try_read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn peek_byte(&mut self) -> Option<u8> {
        self.rx.front().copied()
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = self.tx.push(byte);
    }

    fn discard_input(&mut self) {
        self.discards += 1;
        self.rx.clear();
    }
}

/// Simulated millisecond clock
///
/// Every call to [`Clock::now_ms`] moves time forward by `step_ms`, so a
/// polling loop with nothing to read still runs out its deadline.
#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: Cell<u32>,
    step_ms: u32,
}

impl SimClock {
    /// Clock starting at zero, advancing `step_ms` per reading
    pub fn new(step_ms: u32) -> Self {
        Self::starting_at(0, step_ms)
    }

    /// Clock starting at an arbitrary instant (useful for wrap tests)
    pub fn starting_at(now_ms: u32, step_ms: u32) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
            step_ms,
        }
    }

    /// Jump forward
    pub fn advance(&self, ms: u32) {
        self.now_ms.set(self.now_ms.get().wrapping_add(ms));
    }

    /// Current time without advancing
    pub fn peek_ms(&self) -> u32 {
        self.now_ms.get()
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        let now = self.now_ms.get();
        self.now_ms.set(now.wrapping_add(self.step_ms));
        now
    }
}
