//! Fixed-width binary serializer
//!
//! Packs integers and floats into a byte slice for use as a binary message
//! payload. Byte order is chosen per writer/reader; both ends of a link
//! must agree on it. Each call checks the remaining room first and only
//! advances the position when the whole value fits.

use crate::config::Endianness;
use crate::error::SerializeError;

/// Sequential writer over a caller-owned buffer
#[derive(Debug)]
pub struct BufferWriter<'a> {
    buf: &'a mut [u8],
    index: usize,
    endianness: Endianness,
}

macro_rules! put_fns {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) -> Result<(), SerializeError> {
                let bytes = match self.endianness {
                    Endianness::Big => value.to_be_bytes(),
                    Endianness::Little => value.to_le_bytes(),
                };
                self.put_bytes(&bytes)
            }
        )*
    };
}

impl<'a> BufferWriter<'a> {
    /// Start writing at the beginning of `buf`
    pub fn new(buf: &'a mut [u8], endianness: Endianness) -> Self {
        Self {
            buf,
            index: 0,
            endianness,
        }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.index
    }

    /// The written prefix of the buffer
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.index]
    }

    /// Bytes of room left
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.index
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), SerializeError> {
        let end = self.index + bytes.len();
        let dest = self
            .buf
            .get_mut(self.index..end)
            .ok_or(SerializeError::BufferTooSmall)?;
        dest.copy_from_slice(bytes);
        self.index = end;
        Ok(())
    }

    put_fns! {
        put_u8: u8,
        put_u16: u16,
        put_u32: u32,
        put_i8: i8,
        put_i16: i16,
        put_i32: i32,
    }

    /// IEEE-754 bit pattern, same byte order as the integers
    pub fn put_f32(&mut self, value: f32) -> Result<(), SerializeError> {
        self.put_u32(value.to_bits())
    }
}

/// Sequential reader over a received payload
#[derive(Debug, Clone)]
pub struct BufferReader<'a> {
    buf: &'a [u8],
    index: usize,
    endianness: Endianness,
}

macro_rules! get_fns {
    ($($name:ident: $ty:ty => $size:literal),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty, SerializeError> {
                let bytes = self.take::<$size>()?;
                Ok(match self.endianness {
                    Endianness::Big => <$ty>::from_be_bytes(bytes),
                    Endianness::Little => <$ty>::from_le_bytes(bytes),
                })
            }
        )*
    };
}

impl<'a> BufferReader<'a> {
    /// Start reading at the beginning of `buf`
    pub fn new(buf: &'a [u8], endianness: Endianness) -> Self {
        Self {
            buf,
            index: 0,
            endianness,
        }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.index
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.index
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SerializeError> {
        let end = self.index + N;
        let src = self
            .buf
            .get(self.index..end)
            .ok_or(SerializeError::BufferTooSmall)?;
        let mut out = [0u8; N];
        out.copy_from_slice(src);
        self.index = end;
        Ok(out)
    }

    get_fns! {
        get_u8: u8 => 1,
        get_u16: u16 => 2,
        get_u32: u32 => 4,
        get_i8: i8 => 1,
        get_i16: i16 => 2,
        get_i32: i32 => 4,
    }

    pub fn get_f32(&mut self) -> Result<f32, SerializeError> {
        self.get_u32().map(f32::from_bits)
    }
}
