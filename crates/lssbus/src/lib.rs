//! Codec and serial transport for the Lynxmotion Smart Servo (LSS) bus.
//!
//! LSS servos share one half-duplex serial line and talk in short ASCII
//! frames (`#5QD\r` asks servo 5 for its position, `*5QD1800\r` answers).
//!
//! # Crate Structure
//!
//! - [`transport`]: terminator-framed serial channel with low-latency support
//! - [`packet`]: packet grammar, command table, and the packet-level bus
//!
//! ```no_run
//! use lssbus::packet::PacketBus;
//! use lssbus::transport::ChannelConfig;
//!
//! let mut bus = PacketBus::open("/dev/ttyUSB0", ChannelConfig::default())?;
//! let reply = bus.query(5, "D")?;
//! println!("servo 5 at {:?}", reply.value);
//! # Ok::<(), lssbus::packet::PacketError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use lssbus_transport::*;
}

/// Re-export packet types.
pub mod packet {
    pub use lssbus_packet::*;
}
