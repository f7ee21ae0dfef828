//! Message ids and payloads for the motion controller board
//!
//! Message ids are split by direction:
//! - MCB → DIB/PIB: motion reports and error text
//! - DIB/PIB → MCB: reel commands, acceleration limits, power control
//!
//! Commands without parameters expect an ACK from the MCB.

use serlink_protocol::{ParamError, ParamReader, ParamWriter};

/// Longest error text forwarded by the MCB
pub const ERROR_TEXT_CAPACITY: usize = 100;

/// ASCII message ids on the MCB link
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McbMessage {
    NoMessage = 0,

    // MCB → DIB/PIB, no params
    MotionFinished = 1,

    // MCB → DIB/PIB, with params
    MotionStatus = 2,
    Error = 3,

    // DIB/PIB → MCB, no params (ACK expected)
    CancelMotion = 4,
    GoLowPower = 5,

    // DIB/PIB → MCB, with params
    ReelOut = 6,
    ReelIn = 7,
    Dock = 8,
    OutAcc = 9,
    InAcc = 10,
    DockAcc = 11,
}

impl McbMessage {
    /// Map a wire id to a message, if it is one of ours
    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => McbMessage::NoMessage,
            1 => McbMessage::MotionFinished,
            2 => McbMessage::MotionStatus,
            3 => McbMessage::Error,
            4 => McbMessage::CancelMotion,
            5 => McbMessage::GoLowPower,
            6 => McbMessage::ReelOut,
            7 => McbMessage::ReelIn,
            8 => McbMessage::Dock,
            9 => McbMessage::OutAcc,
            10 => McbMessage::InAcc,
            11 => McbMessage::DockAcc,
            _ => return None,
        })
    }

    /// Wire id
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Returns true for commands the MCB acknowledges
    pub fn expects_ack(self) -> bool {
        matches!(self, McbMessage::CancelMotion | McbMessage::GoLowPower)
    }
}

/// Typed parameters carried by one ASCII message
pub trait McbParams: Sized {
    /// Queue every field for transmit
    fn write(&self, params: &mut ParamWriter) -> Result<(), ParamError>;

    /// Decode every field from the current cursor
    fn read(params: &mut ParamReader) -> Result<Self, ParamError>;
}

/// Periodic motion report from the MCB
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionStatus {
    /// Reel position (revolutions)
    pub reel_pos: f32,
    /// Level wind position (mm)
    pub lw_pos: f32,
    /// Reel motor torque
    pub reel_torque: f32,
    /// Reel motor temperature (°C)
    pub reel_temp: f32,
    /// Level wind motor temperature (°C)
    pub lw_temp: f32,
}

impl McbParams for MotionStatus {
    fn write(&self, params: &mut ParamWriter) -> Result<(), ParamError> {
        params.add_f32(self.reel_pos)?;
        params.add_f32(self.lw_pos)?;
        params.add_f32(self.reel_torque)?;
        params.add_f32(self.reel_temp)?;
        params.add_f32(self.lw_temp)
    }

    fn read(params: &mut ParamReader) -> Result<Self, ParamError> {
        Ok(Self {
            reel_pos: params.get_f32()?,
            lw_pos: params.get_f32()?,
            reel_torque: params.get_f32()?,
            reel_temp: params.get_f32()?,
            lw_temp: params.get_f32()?,
        })
    }
}

/// Reel out, reel in, or dock
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReelCommand {
    /// Revolutions to turn
    pub num_revs: f32,
    /// Reel speed (rpm)
    pub speed: f32,
}

impl McbParams for ReelCommand {
    fn write(&self, params: &mut ParamWriter) -> Result<(), ParamError> {
        params.add_f32(self.num_revs)?;
        params.add_f32(self.speed)
    }

    fn read(params: &mut ParamReader) -> Result<Self, ParamError> {
        Ok(Self {
            num_revs: params.get_f32()?,
            speed: params.get_f32()?,
        })
    }
}

/// Acceleration limit for reel out, reel in, or dock
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acceleration(pub f32);

impl McbParams for Acceleration {
    fn write(&self, params: &mut ParamWriter) -> Result<(), ParamError> {
        params.add_f32(self.0)
    }

    fn read(params: &mut ParamReader) -> Result<Self, ParamError> {
        params.get_f32().map(Acceleration)
    }
}
