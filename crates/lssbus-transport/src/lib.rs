//! Terminator-framed serial channel for the LSS servo bus.
//!
//! This is the lowest layer of lssbus. A [`SerialChannel`] owns one serial
//! port and turns its byte stream into whole frames:
//! - outbound frames get the line terminator (CR) appended
//! - inbound bytes accumulate until the terminator arrives
//! - a silent line fails with [`TransportError::Timeout`], never a partial frame
//!
//! Low-latency mode is a platform capability ([`LatencyControl`]) picked when
//! the channel is built.

pub mod channel;
pub mod error;
pub mod latency;
pub mod traits;

pub use channel::{
    ChannelConfig, LowLatency, SerialChannel, DEFAULT_BAUD_RATE, DEFAULT_MAX_FRAME_LEN,
    DEFAULT_READ_TIMEOUT, DEFAULT_TERMINATOR,
};
pub use error::{Result, TransportError};
pub use latency::{LatencyControl, Unsupported};
pub use traits::SerialLink;

#[cfg(target_os = "linux")]
pub use latency::AsyncLowLatency;
