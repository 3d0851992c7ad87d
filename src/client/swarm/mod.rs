//! A small swarm engine.
//!
//! It is just enough `BitTorrent` to move a content between client
//! instances: SHA-1 verified pieces kept in memory, a framed wire protocol,
//! the simplest piece picker (first missing piece) and an upload throttle.
//! There is no choking and no on-disk storage.
pub mod codec;
pub mod connection;
pub mod metainfo;
pub mod storage;
pub mod throttle;

use thiserror::Error;

use super::admission::Reason;

/// Errors that end a peer connection.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("handshake provided incorrect protocol")]
    IncorrectProtocol,

    #[error("handshake provided incorrect info-hash")]
    IncorrectInfoHash,

    #[error("no session for the info-hash in the handshake")]
    UnknownInfoHash,

    #[error("the connection was closed before the handshake")]
    NoHandshake,

    #[error("the remote peer is this client")]
    SelfConnection,

    #[error("the remote peer did not send its listen port")]
    NoListenPort,

    #[error("invalid message ID: {0}")]
    InvalidMessageId(u8),

    #[error("invalid payload for message ID {id}")]
    InvalidMessage { id: u8 },

    #[error("message of {len} bytes is too large")]
    MessageTooLarge { len: usize },

    #[error("the remote peer requested piece {index} which is not available")]
    PieceNotAvailable { index: u32 },

    #[error("connection timeout")]
    Timeout,

    #[error("connection not admitted: {reason}")]
    NotAdmitted { reason: Reason },
}
