use std::time::Duration;

/// Errors that can occur on the serial channel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// An I/O error occurred on the serial port.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No terminated frame arrived before the read timeout elapsed.
    #[error("no data available within {0:?}")]
    Timeout(Duration),

    /// The accumulated frame grew past the configured limit.
    #[error("frame too long ({len} bytes, max {max})")]
    FrameTooLong { len: usize, max: usize },

    /// The channel has been closed.
    #[error("serial channel is not open")]
    NotOpen,

    /// Low-latency mode could not be changed and the caller required it.
    #[error("failed to update low-latency flag to {enable}: {source}")]
    LowLatency {
        enable: bool,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
