//! Serlink framed messaging protocol
//!
//! This crate implements a point-to-point protocol for exchanging typed
//! messages between two controllers over a slow, lossy UART. There is no
//! outer length prefix: frames are found by their delimiter byte, and every
//! frame ends with a running checksum written as decimal text so traffic
//! stays readable on a serial terminal.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌───────┬──────┬──────────────────┬───┬──────────┬───┬────┐
//! │ DELIM │ ID   │ FIELDS / PAYLOAD │ ; │ CHECKSUM │ ; │ \n │
//! │ 1B    │ 1-3  │ kind-specific    │   │ 1-5      │   │    │
//! └───────┴──────┴──────────────────┴───┴──────────┴───┴────┘
//! ```
//!
//! - `#` ASCII: comma-led decimal parameters
//! - `?` ACK: `,0` or `,1`
//! - `!` Binary: `,<length>;` then raw bytes into a caller-lent buffer
//! - `"` String: `,<length>;` then raw bytes into an internal buffer
//!
//! A checksum mismatch does not drop a message; it clears the record's
//! `checksum_valid` flag and leaves the decision to the application.
//!
//! Nothing here allocates. All buffers are fixed-size `heapless` storage or
//! slices borrowed from the caller.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod checksum;
pub mod comm;
pub mod config;
pub mod error;
pub mod message;
pub mod params;
mod reader;
pub mod serialize;
mod writer;

pub use checksum::Checksum;
pub use comm::SerialComm;
pub use config::{CommConfig, Endianness};
pub use error::{ParamError, RxError, SerializeError, TxError};
pub use message::{
    AckMessage, AsciiMessage, BinaryMessage, MessageKind, StringMessage, STRING_CAPACITY,
};
pub use params::{AsciiParam, ParamReader, ParamWriter, PARAM_CAPACITY};
pub use serialize::{BufferReader, BufferWriter};
