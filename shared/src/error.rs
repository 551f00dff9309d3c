use thiserror::Error;

/// Failures turning packets into datagrams and back.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to encode packet: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode packet: {0}")]
    Decode(#[source] bincode::Error),

    #[error("datagram of {size} bytes exceeds the {max} byte limit")]
    Oversized { size: usize, max: usize },
}
