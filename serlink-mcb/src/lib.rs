//! Motion controller board (MCB) link
//!
//! Typed messages exchanged between the MCB and the instrument boards
//! (DIB/PIB) over a [`serlink_protocol::SerialComm`]. Every message here is
//! an ASCII frame whose parameters are decimal floats or a text field.
//!
//! ```text
//! MCB  ── MotionFinished, MotionStatus, Error ──▶  DIB/PIB
//! MCB  ◀── CancelMotion, GoLowPower (ACK'd) ─────  DIB/PIB
//! MCB  ◀── ReelOut/In, Dock, *Acc ───────────────  DIB/PIB
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod comm;
pub mod messages;

pub use comm::McbComm;
pub use messages::{
    Acceleration, McbMessage, McbParams, MotionStatus, ReelCommand, ERROR_TEXT_CAPACITY,
};
