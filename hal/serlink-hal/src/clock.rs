//! Monotonic millisecond time source

/// Millisecond clock used for receive deadlines
///
/// The counter is free-running and allowed to wrap; consumers compare
/// instants with wrapping subtraction.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin
    fn now_ms(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// A deadline measured relative to the instant it was armed
///
/// Stored as a start point plus span so expiry stays correct across the
/// `u32` wrap (~49.7 days).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    start_ms: u32,
    span_ms: u32,
}

impl Deadline {
    /// Arm a deadline `span_ms` from now
    pub fn after<C: Clock + ?Sized>(clock: &C, span_ms: u32) -> Self {
        Self {
            start_ms: clock.now_ms(),
            span_ms,
        }
    }

    /// Push the deadline further out without restarting it
    pub fn extend(&mut self, extra_ms: u32) {
        self.span_ms = self.span_ms.saturating_add(extra_ms);
    }

    /// Returns true once the span has fully elapsed
    pub fn expired<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        clock.now_ms().wrapping_sub(self.start_ms) >= self.span_ms
    }

    /// Total span in milliseconds
    pub fn span_ms(&self) -> u32 {
        self.span_ms
    }
}
