use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::error::{Result, TransportError};
use crate::latency::LatencyControl;
use crate::traits::SerialLink;

/// Factory line speed of LSS servos.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// How long `read` waits for each byte before giving up.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Frame terminator: a single carriage return, no line feed.
pub const DEFAULT_TERMINATOR: &[u8] = b"\r";

/// Longest inbound frame accepted before the buffer is discarded.
pub const DEFAULT_MAX_FRAME_LEN: usize = 256;

/// Whether the channel should switch the driver into low-latency mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LowLatency {
    /// Leave the driver as it is.
    Disabled,
    /// Try to enable it; log a warning when that fails.
    #[default]
    BestEffort,
    /// Enable it or fail to open.
    Required,
}

/// Configuration for a serial channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Line speed. Default: 115200.
    pub baud_rate: u32,
    /// Per-read timeout. Default: 1 second.
    pub read_timeout: Duration,
    /// Frame terminator. Default: CR.
    pub terminator: Bytes,
    /// Maximum inbound frame length, terminator excluded. Default: 256.
    pub max_frame_len: usize,
    /// Low-latency policy. Default: best effort.
    pub low_latency: LowLatency,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            terminator: Bytes::from_static(DEFAULT_TERMINATOR),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            low_latency: LowLatency::default(),
        }
    }
}

/// A serial port framed by a line terminator.
///
/// Frames go out with the terminator appended and come back with it
/// stripped. The bus is half-duplex: callers write one command and read its
/// reply before writing the next. Every I/O method takes `&mut self`, so a
/// channel shared between threads needs external locking.
pub struct SerialChannel {
    port: String,
    link: Option<Box<dyn SerialLink>>,
    latency: Box<dyn LatencyControl>,
    low_latency_enabled: bool,
    config: ChannelConfig,
    read_buf: BytesMut,
    write_buf: BytesMut,
}

impl SerialChannel {
    /// Open a serial device and apply the configured low-latency policy.
    pub fn open(port: impl Into<String>, config: ChannelConfig) -> Result<Self> {
        let port = port.into();
        let (link, latency) = open_link(&port, &config)?;
        debug!(
            port = %port,
            baud = config.baud_rate,
            timeout = ?config.read_timeout,
            "opened serial port"
        );
        Self::from_link(port, link, latency, config)
    }

    /// Build a channel around an already-open link.
    ///
    /// `port` is only used for diagnostics.
    pub fn from_link(
        port: impl Into<String>,
        link: Box<dyn SerialLink>,
        latency: Box<dyn LatencyControl>,
        config: ChannelConfig,
    ) -> Result<Self> {
        if config.terminator.is_empty() {
            return Err(TransportError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                "frame terminator must not be empty",
            )));
        }

        let mut channel = Self {
            port: port.into(),
            link: Some(link),
            latency,
            low_latency_enabled: false,
            read_buf: BytesMut::with_capacity(config.max_frame_len + config.terminator.len()),
            write_buf: BytesMut::new(),
            config,
        };
        channel.apply_low_latency()?;
        Ok(channel)
    }

    fn apply_low_latency(&mut self) -> Result<()> {
        if self.config.low_latency == LowLatency::Disabled {
            return Ok(());
        }

        match self.latency.set_low_latency(true) {
            Ok(()) => {
                self.low_latency_enabled = true;
                debug!(port = %self.port, capability = self.latency.name(), "low-latency mode enabled");
                Ok(())
            }
            Err(source) if self.config.low_latency == LowLatency::Required => {
                Err(TransportError::LowLatency {
                    enable: true,
                    source,
                })
            }
            Err(err) => {
                warn!(
                    port = %self.port,
                    capability = self.latency.name(),
                    error = %err,
                    "failed to enable low-latency mode, communication will be slow"
                );
                Ok(())
            }
        }
    }

    /// Write one frame, appending the terminator unless it is already there.
    pub fn write(&mut self, frame: &[u8]) -> Result<()> {
        let link = self.link.as_mut().ok_or(TransportError::NotOpen)?;

        self.write_buf.clear();
        self.write_buf.extend_from_slice(frame);
        if !frame.ends_with(&self.config.terminator) {
            self.write_buf.extend_from_slice(&self.config.terminator);
        }
        trace!(frame = ?self.write_buf.as_ref(), "writing frame");

        let read_timeout = self.config.read_timeout;
        let mut offset = 0usize;
        while offset < self.write_buf.len() {
            match link.write(&self.write_buf[offset..]) {
                Ok(0) => return Err(TransportError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Err(TransportError::Timeout(read_timeout)),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match link.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Err(TransportError::Timeout(read_timeout)),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    /// Read the next frame (blocking), terminator stripped.
    ///
    /// Bytes are pulled one at a time so nothing past the terminator is
    /// consumed. If the line goes quiet for the read timeout the bytes seen so
    /// far are dropped and `Timeout` is returned. An oversized frame is
    /// drained through its terminator before `FrameTooLong` is returned, so
    /// the next read starts on a frame boundary.
    pub fn read(&mut self) -> Result<Bytes> {
        let link = self.link.as_mut().ok_or(TransportError::NotOpen)?;
        let terminator = &self.config.terminator;
        let max = self.config.max_frame_len + terminator.len();

        self.read_buf.clear();
        loop {
            let Some(byte) = read_byte(&mut **link)? else {
                if !self.read_buf.is_empty() {
                    debug!(
                        port = %self.port,
                        discarded = self.read_buf.len(),
                        "read timed out mid-frame"
                    );
                }
                self.read_buf.clear();
                return Err(TransportError::Timeout(self.config.read_timeout));
            };

            self.read_buf.put_u8(byte);
            if self.read_buf.ends_with(terminator) {
                let len = self.read_buf.len() - terminator.len();
                self.read_buf.truncate(len);
                let frame = self.read_buf.split().freeze();
                trace!(frame = ?frame.as_ref(), "read frame");
                return Ok(frame);
            }

            if self.read_buf.len() >= max {
                let seen = self.read_buf.len();
                let tail = self.read_buf.split_off(seen + 1 - terminator.len());
                self.read_buf.clear();
                let drained = drain_frame(&mut **link, terminator, tail)?;
                debug!(
                    port = %self.port,
                    discarded = seen + drained,
                    "discarded oversized frame"
                );
                return Err(TransportError::FrameTooLong {
                    len: seen + drained,
                    max: self.config.max_frame_len,
                });
            }
        }
    }

    /// Change the line speed of the open port.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        let link = self.link.as_mut().ok_or(TransportError::NotOpen)?;
        link.set_baud_rate(baud_rate)?;
        self.config.baud_rate = baud_rate;
        debug!(port = %self.port, baud = baud_rate, "baud rate changed");
        Ok(())
    }

    /// Close the channel, reverting low-latency mode if this channel set it.
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };

        if self.low_latency_enabled {
            if let Err(err) = self.latency.set_low_latency(false) {
                debug!(port = %self.port, error = %err, "failed to revert low-latency mode");
            }
            self.low_latency_enabled = false;
        }

        drop(link);
        debug!(port = %self.port, "serial channel closed");
    }

    /// Whether the channel still owns its port.
    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Whether this channel switched the driver into low-latency mode.
    pub fn low_latency_enabled(&self) -> bool {
        self.low_latency_enabled
    }

    /// The device name the channel was opened with.
    pub fn port_name(&self) -> &str {
        &self.port
    }

    /// Current channel configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}

impl Drop for SerialChannel {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("port", &self.port)
            .field("open", &self.is_open())
            .field("low_latency", &self.low_latency_enabled)
            .field("baud_rate", &self.config.baud_rate)
            .finish()
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

/// One byte from the link, or `None` once the line has been quiet for the
/// port timeout.
fn read_byte(link: &mut dyn SerialLink) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match link.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if is_timeout(&err) => return Ok(None),
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
}

/// Consume bytes through the next terminator, or until the line goes quiet.
///
/// `window` holds the last bytes already read, fewer than the terminator
/// length, so a terminator split across the limit is still found. Returns
/// how many bytes were consumed.
fn drain_frame(
    link: &mut dyn SerialLink,
    terminator: &[u8],
    mut window: BytesMut,
) -> Result<usize> {
    let mut drained = 0usize;
    while let Some(byte) = read_byte(link)? {
        drained += 1;
        window.put_u8(byte);
        if window.ends_with(terminator) {
            break;
        }
        if window.len() >= terminator.len() {
            let _ = window.split_to(window.len() + 1 - terminator.len());
        }
    }
    Ok(drained)
}

type OpenedLink = (Box<dyn SerialLink>, Box<dyn LatencyControl>);

#[cfg(target_os = "linux")]
fn open_link(port: &str, config: &ChannelConfig) -> Result<OpenedLink> {
    use std::os::fd::AsRawFd;

    let tty = serialport::new(port, config.baud_rate)
        .timeout(config.read_timeout)
        .open_native()
        .map_err(|source| TransportError::Open {
            port: port.to_string(),
            source,
        })?;
    let latency = crate::latency::AsyncLowLatency::new(tty.as_raw_fd());
    Ok((Box::new(tty), Box::new(latency)))
}

#[cfg(not(target_os = "linux"))]
fn open_link(port: &str, config: &ChannelConfig) -> Result<OpenedLink> {
    let handle = serialport::new(port, config.baud_rate)
        .timeout(config.read_timeout)
        .open()
        .map_err(|source| TransportError::Open {
            port: port.to_string(),
            source,
        })?;
    Ok((Box::new(handle), Box::new(crate::latency::Unsupported)))
}
