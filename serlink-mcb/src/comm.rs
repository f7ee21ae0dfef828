//! Typed send/receive over a borrowed engine

use heapless::String;
use serlink_hal::{Clock, SerialStream};
use serlink_protocol::{MessageKind, ParamError, SerialComm};

use crate::messages::{
    Acceleration, McbMessage, McbParams, MotionStatus, ReelCommand, ERROR_TEXT_CAPACITY,
};

/// MCB message catalog over a [`SerialComm`]
///
/// Borrows the engine for as long as typed access is needed; the engine
/// stays usable for other traffic afterwards.
pub struct McbComm<'c, 'buf, S, C> {
    comm: &'c mut SerialComm<'buf, S, C>,
}

impl<'c, 'buf, S: SerialStream, C: Clock> McbComm<'c, 'buf, S, C> {
    pub fn new(comm: &'c mut SerialComm<'buf, S, C>) -> Self {
        Self { comm }
    }

    /// Underlying engine, for traffic outside the catalog
    pub fn comm(&mut self) -> &mut SerialComm<'buf, S, C> {
        self.comm
    }

    /// Poll the link once
    pub fn receive(&mut self) -> MessageKind {
        self.comm.receive()
    }

    /// Catalog id of the last received ASCII message
    pub fn ascii_message(&self) -> Option<McbMessage> {
        McbMessage::from_id(self.comm.ascii_rx().id)
    }

    /// Acknowledge (or reject) a received command
    pub fn ack(&mut self, msg: McbMessage, value: bool) {
        self.comm.transmit_ack(msg.id(), value);
    }

    fn send(&mut self, msg: McbMessage, params: &impl McbParams) -> Result<(), ParamError> {
        let queued = params.write(self.comm.tx_params());
        if let Err(e) = queued {
            self.comm.tx_params().clear();
            return Err(e);
        }
        self.comm.transmit_ascii(msg.id());
        Ok(())
    }

    /// Decode the last received parameters as `T`
    ///
    /// All fields are decoded before anything is returned. On failure the
    /// read cursor is left where it was.
    fn decode<T: McbParams>(&mut self) -> Result<T, ParamError> {
        let params = self.comm.rx_params();
        let mut probe = params.clone();
        let value = T::read(&mut probe)?;
        *params = probe;
        Ok(value)
    }

    // --- MCB → DIB/PIB ---

    pub fn tx_motion_finished(&mut self) {
        self.comm.transmit_ascii(McbMessage::MotionFinished.id());
    }

    pub fn tx_motion_status(&mut self, status: &MotionStatus) -> Result<(), ParamError> {
        self.send(McbMessage::MotionStatus, status)
    }

    pub fn rx_motion_status(&mut self) -> Result<MotionStatus, ParamError> {
        self.decode()
    }

    /// Send error text; it may not contain `,`, `;` or line breaks
    pub fn tx_error(&mut self, error: &str) -> Result<(), ParamError> {
        if let Err(e) = self.comm.tx_params().add_str(error) {
            self.comm.tx_params().clear();
            return Err(e);
        }
        self.comm.transmit_ascii(McbMessage::Error.id());
        Ok(())
    }

    /// Error text, truncated to [`ERROR_TEXT_CAPACITY`] bytes
    pub fn rx_error(&mut self) -> Result<String<ERROR_TEXT_CAPACITY>, ParamError> {
        self.comm.rx_params().get_string()
    }

    // --- DIB/PIB → MCB ---

    pub fn tx_cancel_motion(&mut self) {
        self.comm.transmit_ascii(McbMessage::CancelMotion.id());
    }

    pub fn tx_go_low_power(&mut self) {
        self.comm.transmit_ascii(McbMessage::GoLowPower.id());
    }

    pub fn tx_reel_out(&mut self, cmd: &ReelCommand) -> Result<(), ParamError> {
        self.send(McbMessage::ReelOut, cmd)
    }

    pub fn rx_reel_out(&mut self) -> Result<ReelCommand, ParamError> {
        self.decode()
    }

    pub fn tx_reel_in(&mut self, cmd: &ReelCommand) -> Result<(), ParamError> {
        self.send(McbMessage::ReelIn, cmd)
    }

    pub fn rx_reel_in(&mut self) -> Result<ReelCommand, ParamError> {
        self.decode()
    }

    pub fn tx_dock(&mut self, cmd: &ReelCommand) -> Result<(), ParamError> {
        self.send(McbMessage::Dock, cmd)
    }

    pub fn rx_dock(&mut self) -> Result<ReelCommand, ParamError> {
        self.decode()
    }

    pub fn tx_out_acc(&mut self, acceleration: f32) -> Result<(), ParamError> {
        self.send(McbMessage::OutAcc, &Acceleration(acceleration))
    }

    pub fn rx_out_acc(&mut self) -> Result<f32, ParamError> {
        self.decode::<Acceleration>().map(|a| a.0)
    }

    pub fn tx_in_acc(&mut self, acceleration: f32) -> Result<(), ParamError> {
        self.send(McbMessage::InAcc, &Acceleration(acceleration))
    }

    pub fn rx_in_acc(&mut self) -> Result<f32, ParamError> {
        self.decode::<Acceleration>().map(|a| a.0)
    }

    pub fn tx_dock_acc(&mut self, acceleration: f32) -> Result<(), ParamError> {
        self.send(McbMessage::DockAcc, &Acceleration(acceleration))
    }

    pub fn rx_dock_acc(&mut self) -> Result<f32, ParamError> {
        self.decode::<Acceleration>().map(|a| a.0)
    }
}
