//! Packet grammar and command table for the LSS servo protocol.
//!
//! Every frame on the bus is a short ASCII line:
//! - a marker: `#` for requests, `*` for replies
//! - the device id in decimal
//! - an optional kind letter: `Q` (query) or `C` (config)
//! - a command token and an optional signed integer value
//!
//! [`decode`] turns one frame into a [`Packet`]; [`encode`] builds an
//! outbound command. [`PacketBus`] pairs the codec with a serial channel.

pub mod bus;
pub mod codec;
pub mod command;
pub mod error;
pub mod packet;

pub use bus::PacketBus;
pub use codec::{decode, encode, encode_command, REPLY_MARKER, REQUEST_MARKER, TERMINATOR};
pub use command::{describe, describe_modifier, COMMANDS, MODIFIERS, UNKNOWN_DESCRIPTION};
pub use error::{PacketError, Result};
pub use packet::{Direction, Kind, Packet, Value};
