//! ASCII parameter codec
//!
//! Parameters of an ASCII message travel as comma-led decimal text:
//! `#7,300,1.500000;...` carries the parameter text `,300,1.500000`.
//! [`ParamWriter`] builds that text for transmit, [`ParamReader`] walks it
//! field by field after receive.

use core::fmt::{self, Write};
use core::num::{IntErrorKind, ParseIntError};
use core::str::FromStr;

use heapless::{String, Vec};

use crate::error::ParamError;

/// Parameter text capacity in visible bytes
///
/// Mirrors a 128-byte C buffer with room for a terminator.
pub const PARAM_CAPACITY: usize = 127;

/// Separator between parameters
pub const PARAM_SEPARATOR: u8 = b',';

/// Closes the parameter section of a frame
pub const FIELD_TERMINATOR: u8 = b';';

/// A value that can travel as one ASCII parameter
pub trait AsciiParam: Sized {
    /// Maximum rendered width accepted on receive, sign included
    const WIDTH: usize;

    /// Parse one field (without the leading comma)
    fn parse_field(field: &str) -> Result<Self, ParamError>;

    /// Render the value (without the leading comma)
    fn render<W: Write>(&self, out: &mut W) -> fmt::Result;
}

fn parse_int<T: FromStr<Err = ParseIntError>>(field: &str) -> Result<T, ParamError> {
    field.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ParamError::OutOfRange,
        _ => ParamError::Malformed,
    })
}

macro_rules! int_param {
    ($($ty:ty => $width:expr),* $(,)?) => {
        $(
            impl AsciiParam for $ty {
                const WIDTH: usize = $width;

                fn parse_field(field: &str) -> Result<Self, ParamError> {
                    parse_int(field)
                }

                fn render<W: Write>(&self, out: &mut W) -> fmt::Result {
                    write!(out, "{}", self)
                }
            }
        )*
    };
}

int_param! {
    u8 => 3,
    u16 => 5,
    u32 => 10,
    i8 => 4,
    i16 => 6,
    i32 => 11,
}

impl AsciiParam for f32 {
    const WIDTH: usize = 15;

    fn parse_field(field: &str) -> Result<Self, ParamError> {
        field.parse::<f32>().map_err(|_| ParamError::Malformed)
    }

    // Six fractional digits, matching printf's `%f`
    fn render<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{:.6}", self)
    }
}

/// Builds the parameter text of an outgoing ASCII message
///
/// Appends are all-or-nothing at the buffer level: an append that does not
/// fit clears everything written so far, so a half-built message can never
/// be sent by mistake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParamWriter {
    text: String<PARAM_CAPACITY>,
    count: u8,
}

impl ParamWriter {
    /// Create an empty writer
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            count: 0,
        }
    }

    /// Append one typed parameter
    ///
    /// A value whose text is wider than [`AsciiParam::WIDTH`] (such as a
    /// large `f32` like 1e10) is refused with `FieldTooWide`, since the
    /// receiver could not read it back. Earlier parameters are kept.
    pub fn add<T: AsciiParam>(&mut self, value: T) -> Result<(), ParamError> {
        let start = self.text.len();
        let written = self
            .text
            .push(PARAM_SEPARATOR as char)
            .map_err(|_| fmt::Error)
            .and_then(|()| value.render(&mut self.text));

        match written {
            Ok(()) if self.text.len() - start - 1 > T::WIDTH => {
                warn!("param wider than {} chars, dropped", T::WIDTH);
                self.text.truncate(start);
                Err(ParamError::FieldTooWide)
            }
            Ok(()) => {
                self.count = self.count.saturating_add(1);
                Ok(())
            }
            Err(_) => {
                warn!("param buffer full at {} bytes, clearing", start);
                self.clear();
                Err(ParamError::BufferFull)
            }
        }
    }

    /// Append a text parameter
    ///
    /// The text may not contain `,`, `;` or line breaks; those would split
    /// the field or end the frame early.
    pub fn add_str(&mut self, text: &str) -> Result<(), ParamError> {
        if text
            .bytes()
            .any(|b| matches!(b, PARAM_SEPARATOR | FIELD_TERMINATOR | b'\n' | b'\r'))
        {
            return Err(ParamError::InvalidText);
        }
        self.add(Text(text))
    }

    /// Parameter text written so far
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parameter text written so far, as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Number of parameters appended
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Returns true if nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bytes of capacity left
    pub fn remaining(&self) -> usize {
        PARAM_CAPACITY - self.text.len()
    }

    /// Drop everything appended
    pub fn clear(&mut self) {
        self.text.clear();
        self.count = 0;
    }

    /// Append a `u8` (up to 3 digits)
    pub fn add_u8(&mut self, value: u8) -> Result<(), ParamError> {
        self.add(value)
    }

    /// Append a `u16` (up to 5 digits)
    pub fn add_u16(&mut self, value: u16) -> Result<(), ParamError> {
        self.add(value)
    }

    /// Append a `u32` (up to 10 digits)
    pub fn add_u32(&mut self, value: u32) -> Result<(), ParamError> {
        self.add(value)
    }

    /// Append an `i8` (up to 4 characters with sign)
    pub fn add_i8(&mut self, value: i8) -> Result<(), ParamError> {
        self.add(value)
    }

    /// Append an `i16` (up to 6 characters with sign)
    pub fn add_i16(&mut self, value: i16) -> Result<(), ParamError> {
        self.add(value)
    }

    /// Append an `i32` (up to 11 characters with sign)
    pub fn add_i32(&mut self, value: i32) -> Result<(), ParamError> {
        self.add(value)
    }

    /// Append an `f32` with six fractional digits (at most 15 characters)
    pub fn add_f32(&mut self, value: f32) -> Result<(), ParamError> {
        self.add(value)
    }
}

/// Borrowed text rendered verbatim; only reachable through `add_str`
struct Text<'a>(&'a str);

impl AsciiParam for Text<'_> {
    const WIDTH: usize = PARAM_CAPACITY;

    fn parse_field(_field: &str) -> Result<Self, ParamError> {
        Err(ParamError::Malformed)
    }

    fn render<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(self.0)
    }
}

/// Walks the parameter text of a received ASCII message
///
/// Each `get` consumes exactly one field on success. A failed `get` leaves
/// the cursor where it was, so the caller may retry the same field as a
/// different type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParamReader {
    text: Vec<u8, PARAM_CAPACITY>,
    cursor: usize,
}

impl ParamReader {
    /// Create an empty reader
    pub const fn new() -> Self {
        Self {
            text: Vec::new(),
            cursor: 0,
        }
    }

    /// Create a reader over existing parameter text
    ///
    /// Returns `None` if the text exceeds [`PARAM_CAPACITY`].
    pub fn from_bytes(text: &[u8]) -> Option<Self> {
        Some(Self {
            text: Vec::from_slice(text).ok()?,
            cursor: 0,
        })
    }

    pub(crate) fn push(&mut self, byte: u8) -> Result<(), u8> {
        self.text.push(byte)
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Full parameter text as received, including leading commas
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Full parameter text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.text).ok()
    }

    /// Returns true if the message carried no parameters
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns true once every field has been consumed
    pub fn at_end(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// Move the cursor back to the first field
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Locate the next field: leading comma, then at most `max_width`
    /// bytes, then a comma or end of text. Returns the field's byte range.
    fn next_field(&self, max_width: usize) -> Result<(usize, usize), ParamError> {
        if self.text.get(self.cursor) != Some(&PARAM_SEPARATOR) {
            return Err(ParamError::MissingSeparator);
        }

        let start = self.cursor + 1;
        let mut end = start;
        while end < self.text.len() && end - start < max_width {
            if self.text[end] == PARAM_SEPARATOR {
                break;
            }
            end += 1;
        }

        match self.text.get(end) {
            None | Some(&PARAM_SEPARATOR) => Ok((start, end)),
            Some(_) => Err(ParamError::FieldTooWide),
        }
    }

    /// Consume one typed parameter
    pub fn get<T: AsciiParam>(&mut self) -> Result<T, ParamError> {
        let (start, end) = self.next_field(T::WIDTH)?;
        let field =
            core::str::from_utf8(&self.text[start..end]).map_err(|_| ParamError::Malformed)?;
        let value = T::parse_field(field)?;
        self.cursor = end;
        Ok(value)
    }

    /// Consume one text parameter, truncated to `N` bytes
    ///
    /// Truncation never splits a UTF-8 character; the whole field is
    /// consumed either way.
    pub fn get_string<const N: usize>(&mut self) -> Result<String<N>, ParamError> {
        let (start, end) = self.next_field(PARAM_CAPACITY)?;
        let field =
            core::str::from_utf8(&self.text[start..end]).map_err(|_| ParamError::Malformed)?;

        let mut cut = field.len().min(N);
        while !field.is_char_boundary(cut) {
            cut -= 1;
        }

        let mut out = String::new();
        // cut <= N, cannot fail
        let _ = out.push_str(&field[..cut]);
        self.cursor = end;
        Ok(out)
    }

    /// Consume a `u8`
    pub fn get_u8(&mut self) -> Result<u8, ParamError> {
        self.get()
    }

    /// Consume a `u16`
    pub fn get_u16(&mut self) -> Result<u16, ParamError> {
        self.get()
    }

    /// Consume a `u32`
    pub fn get_u32(&mut self) -> Result<u32, ParamError> {
        self.get()
    }

    /// Consume an `i8`
    pub fn get_i8(&mut self) -> Result<i8, ParamError> {
        self.get()
    }

    /// Consume an `i16`
    pub fn get_i16(&mut self) -> Result<i16, ParamError> {
        self.get()
    }

    /// Consume an `i32`
    pub fn get_i32(&mut self) -> Result<i32, ParamError> {
        self.get()
    }

    /// Consume an `f32` (at most 15 characters)
    pub fn get_f32(&mut self) -> Result<f32, ParamError> {
        self.get()
    }
}
