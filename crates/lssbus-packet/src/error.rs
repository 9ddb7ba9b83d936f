use lssbus_transport::TransportError;

/// Errors that can occur while decoding packets or talking to the bus.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// The frame does not match the packet grammar.
    #[error("invalid packet: {0}")]
    InvalidFrame(&'static str),

    /// Unexpected text follows the command and value.
    #[error("garbled packet value: {0:?}")]
    GarbledPayload(String),

    /// The serial channel failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, PacketError>;
