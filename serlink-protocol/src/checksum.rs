//! Running two-accumulator checksum
//!
//! Fletcher-style: `a` sums the bytes and `b` sums the successive values of
//! `a`, both modulo 256. Sender and receiver feed the same bytes in the same
//! order (delimiter through the `;` that closes the payload) and compare the
//! combined value, which travels as decimal text.

/// Checksum accumulator state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum {
    a: u8,
    b: u8,
}

impl Checksum {
    /// Fresh accumulator
    pub const fn new() -> Self {
        Self { a: 0, b: 0 }
    }

    /// Fold one byte into the running sums
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.a = self.a.wrapping_add(byte);
        self.b = self.b.wrapping_add(self.a);
    }

    /// Fold a run of bytes
    pub fn update_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update(byte);
        }
    }

    /// Zero both accumulators
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// `(a << 8) | b`
    pub fn combined(&self) -> u16 {
        (u16::from(self.a) << 8) | u16::from(self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(Checksum::new().combined(), 0);
    }

    #[test]
    fn test_known_sequence() {
        let mut checksum = Checksum::new();
        checksum.update_all(b"?3,1;");
        // a: 63, 114, 158, 207, 0x0A (266 mod 256 = 10)
        // b: 63, 177, 335->79, 286->30, 40
        assert_eq!(checksum.combined(), (10 << 8) | 40);
    }

    #[test]
    fn test_order_sensitive() {
        let mut ab = Checksum::new();
        ab.update_all(b"12");
        let mut ba = Checksum::new();
        ba.update_all(b"21");
        assert_ne!(ab.combined(), ba.combined());
    }

    #[test]
    fn test_reset() {
        let mut checksum = Checksum::new();
        checksum.update_all(b"#7,300;");
        checksum.reset();
        assert_eq!(checksum, Checksum::new());
    }
}
