use bytes::BytesMut;
use lssbus_transport::{ChannelConfig, SerialChannel};
use tracing::debug;

use crate::codec::{decode, encode_command};
use crate::error::Result;
use crate::packet::Packet;

/// A serial channel that speaks packets.
///
/// Writes encode commands into frames; reads decode the next frame. One
/// request/reply at a time: write a command, then read its reply before
/// writing the next. Nothing is retried here.
#[derive(Debug)]
pub struct PacketBus {
    channel: SerialChannel,
    buf: BytesMut,
}

impl PacketBus {
    /// Open a serial device and wrap it.
    pub fn open(port: impl Into<String>, config: ChannelConfig) -> Result<Self> {
        Ok(Self::new(SerialChannel::open(port, config)?))
    }

    /// Wrap an already-open channel.
    pub fn new(channel: SerialChannel) -> Self {
        Self {
            channel,
            buf: BytesMut::new(),
        }
    }

    /// Send `#<device_id><command>`; `command` carries kind letter and value
    /// (`QD`, `CLED0`, `D900`).
    pub fn write_command(&mut self, device_id: u32, command: &str) -> Result<()> {
        self.buf.clear();
        encode_command(device_id, command, &mut self.buf);
        self.channel.write(&self.buf)?;
        Ok(())
    }

    /// Send a packet in its wire form.
    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        self.channel.write(&packet.to_frame())?;
        Ok(())
    }

    /// Read and decode the next frame.
    pub fn read(&mut self) -> Result<Packet> {
        let frame = self.channel.read()?;
        let packet = decode(&frame)?;
        if !packet.known {
            debug!(command = %packet.command, "unknown command in reply");
        }
        Ok(packet)
    }

    /// Query one parameter: sends `Q<parameter>` and reads one reply.
    pub fn query(&mut self, device_id: u32, parameter: &str) -> Result<Packet> {
        self.write_command(device_id, &format!("Q{parameter}"))?;
        self.read()
    }

    /// Change the line speed of the underlying port.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.channel.set_baud_rate(baud_rate)?;
        Ok(())
    }

    /// Close the underlying channel.
    pub fn close(&mut self) {
        self.channel.close();
    }

    /// Borrow the underlying channel.
    pub fn channel(&self) -> &SerialChannel {
        &self.channel
    }

    /// Mutably borrow the underlying channel.
    pub fn channel_mut(&mut self) -> &mut SerialChannel {
        &mut self.channel
    }
}
