//! Peer wire codecs.
//!
//! A connection starts with a 68-byte handshake:
//!
//! ```text
//! <19><"BitTorrent protocol"><8 reserved bytes><info_hash: 20><peer_id: 20>
//! ```
//!
//! and then switches to length-prefixed messages, `<len: u32><id: u8><payload>`.
//! Pieces travel whole: a `request` names a piece and the `piece` reply
//! carries all its bytes.
//!
//! | id | message | payload |
//! |---|---|---|
//! | - | keep-alive | none, `len = 0` |
//! | 4 | have | `<index: u32>` |
//! | 5 | bitfield | one bit per piece, high bit first |
//! | 6 | request | `<index: u32>` |
//! | 7 | piece | `<index: u32><data>` |
//! | 9 | port | `<listen port: u16>` |
//!
//! Both sides send `port` right after the handshake. It tells an accepting
//! peer which address the dialing peer listens on.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::PeerError;

pub const PROTOCOL: [u8; 19] = *b"BitTorrent protocol";

const HANDSHAKE_LEN: usize = 68;

/// Largest message accepted. It bounds the memory a peer can make us
/// allocate.
pub const MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub protocol: [u8; 19],
    pub reserved: [u8; 8],
    pub info_hash: [u8; 20],
    pub peer_id: [u8; 20],
}

impl Handshake {
    #[must_use]
    pub fn new(info_hash: [u8; 20], peer_id: [u8; 20]) -> Self {
        Self {
            protocol: PROTOCOL,
            reserved: [0; 8],
            info_hash,
            peer_id,
        }
    }
}

pub struct HandshakeCodec;

impl Encoder<Handshake> for HandshakeCodec {
    type Error = PeerError;

    fn encode(&mut self, item: Handshake, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(HANDSHAKE_LEN);
        dst.put_u8(19);
        dst.extend_from_slice(&item.protocol);
        dst.extend_from_slice(&item.reserved);
        dst.extend_from_slice(&item.info_hash);
        dst.extend_from_slice(&item.peer_id);
        Ok(())
    }
}

impl Decoder for HandshakeCodec {
    type Item = Handshake;
    type Error = PeerError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        if src[0] != 19 {
            return Err(PeerError::IncorrectProtocol);
        }

        if src.len() < HANDSHAKE_LEN {
            return Ok(None);
        }

        src.advance(1);

        let mut protocol = [0; 19];
        src.copy_to_slice(&mut protocol);

        if protocol != PROTOCOL {
            return Err(PeerError::IncorrectProtocol);
        }

        let mut reserved = [0; 8];
        src.copy_to_slice(&mut reserved);

        let mut info_hash = [0; 20];
        src.copy_to_slice(&mut info_hash);

        let mut peer_id = [0; 20];
        src.copy_to_slice(&mut peer_id);

        Ok(Some(Handshake {
            protocol,
            reserved,
            info_hash,
            peer_id,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    KeepAlive,
    Have { index: u32 },
    Bitfield(Vec<bool>),
    Request { index: u32 },
    Piece { index: u32, data: Bytes },
    Port { port: u16 },
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::KeepAlive => write!(f, "keep-alive"),
            Message::Have { index } => write!(f, "have {index}"),
            Message::Bitfield(bits) => write!(f, "bitfield with {} pieces", bits.iter().filter(|bit| **bit).count()),
            Message::Request { index } => write!(f, "request {index}"),
            Message::Piece { index, data } => write!(f, "piece {index} ({} bytes)", data.len()),
            Message::Port { port } => write!(f, "port {port}"),
        }
    }
}

pub struct MessageCodec;

impl Encoder<Message> for MessageCodec {
    type Error = PeerError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match msg {
            Message::KeepAlive => dst.put_u32(0),

            Message::Have { index } => {
                dst.put_u32(5);
                dst.put_u8(4);
                dst.put_u32(index);
            }

            Message::Bitfield(bits) => {
                let packed = pack_bitfield(&bits);
                dst.put_u32(payload_len(1 + packed.len())?);
                dst.put_u8(5);
                dst.extend_from_slice(&packed);
            }

            Message::Request { index } => {
                dst.put_u32(5);
                dst.put_u8(6);
                dst.put_u32(index);
            }

            Message::Piece { index, data } => {
                dst.put_u32(payload_len(5 + data.len())?);
                dst.put_u8(7);
                dst.put_u32(index);
                dst.extend_from_slice(&data);
            }

            Message::Port { port } => {
                dst.put_u32(3);
                dst.put_u8(9);
                dst.put_u16(port);
            }
        }

        Ok(())
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = PeerError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 4 {
            return Ok(None);
        }

        let msg_len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

        if msg_len > MAX_MESSAGE_LEN {
            return Err(PeerError::MessageTooLarge { len: msg_len });
        }

        if src.len() < 4 + msg_len {
            src.reserve(4 + msg_len - src.len());
            return Ok(None);
        }

        src.advance(4);

        if msg_len == 0 {
            return Ok(Some(Message::KeepAlive));
        }

        let mut payload = src.split_to(msg_len);
        let id = payload.get_u8();

        let msg = match (id, payload.len()) {
            (4, 4) => Message::Have {
                index: payload.get_u32(),
            },
            (5, _) => Message::Bitfield(unpack_bitfield(&payload)),
            (6, 4) => Message::Request {
                index: payload.get_u32(),
            },
            (7, len) if len >= 4 => {
                let index = payload.get_u32();
                Message::Piece {
                    index,
                    data: payload.freeze(),
                }
            }
            (9, 2) => Message::Port {
                port: payload.get_u16(),
            },
            (4 | 6 | 7 | 9, _) => return Err(PeerError::InvalidMessage { id }),
            (id, _) => return Err(PeerError::InvalidMessageId(id)),
        };

        Ok(Some(msg))
    }
}

fn payload_len(len: usize) -> Result<u32, PeerError> {
    if len > MAX_MESSAGE_LEN {
        return Err(PeerError::MessageTooLarge { len });
    }

    u32::try_from(len).map_err(|_| PeerError::MessageTooLarge { len })
}

fn pack_bitfield(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (bit, has)| if *has { byte | (0x80 >> bit) } else { byte })
        })
        .collect()
}

/// The result has a multiple of 8 entries. Callers truncate it to the piece
/// count.
fn unpack_bitfield(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).map(move |bit| byte & (0x80 >> bit) != 0))
        .collect()
}
