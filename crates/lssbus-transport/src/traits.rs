use std::io::{self, Read, Write};

/// A byte-level serial port: the stream a [`SerialChannel`] frames.
///
/// Implemented for `serialport` handles. Anything else that can read and
/// write bytes (a pty, an in-memory script in tests) can implement it to
/// reuse the channel's framing.
///
/// [`SerialChannel`]: crate::SerialChannel
pub trait SerialLink: Read + Write + Send {
    /// Change the line speed of the open port.
    fn set_baud_rate(&mut self, baud_rate: u32) -> io::Result<()>;
}

impl SerialLink for Box<dyn serialport::SerialPort> {
    fn set_baud_rate(&mut self, baud_rate: u32) -> io::Result<()> {
        serialport::SerialPort::set_baud_rate(self.as_mut(), baud_rate).map_err(Into::into)
    }
}

#[cfg(unix)]
impl SerialLink for serialport::TTYPort {
    fn set_baud_rate(&mut self, baud_rate: u32) -> io::Result<()> {
        serialport::SerialPort::set_baud_rate(self, baud_rate).map_err(Into::into)
    }
}
