//! Peer connections of a session.
//!
//! Both directions use the same exchange once the handshake is done:
//!
//! 1. The handshake (protocol, info-hash and peer ID).
//! 2. A `port` message with the listen port of each side. The remote listen
//!    address of an inbound connection is the connection IP and that port.
//!    The answering side admits the dialer before it sends its own port, so
//!    a dial only completes once the remote side has admitted it.
//! 3. A `bitfield` message with the verified pieces of each side.
//! 4. `have`, `request` and `piece` messages until either side closes.
//!
//! Only one piece is requested at a time on each connection.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt, StreamExt};
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::peer;
use tokio::net::TcpStream;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::codec::{Framed, FramedParts};
use tracing::{debug, warn};

use super::codec::{Handshake, HandshakeCodec, Message, MessageCodec};
use super::PeerError;
use crate::client::admission::Admission;
use crate::client::session::{Direction, Session, Sessions};

/// A connection after the handshake.
pub type MessageStream = Framed<TcpStream, MessageCodec>;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// What the local side knows about the remote peer.
#[derive(Debug)]
struct PeerState {
    remote_has: Vec<bool>,
    requested: Option<u32>,
}

impl PeerState {
    fn new(piece_count: usize) -> Self {
        Self {
            remote_has: vec![false; piece_count],
            requested: None,
        }
    }

    fn set_has(&mut self, index: u32) {
        if let Some(has) = usize::try_from(index).ok().and_then(|index| self.remote_has.get_mut(index)) {
            *has = true;
        }
    }

    fn set_bitfield(&mut self, bits: &[bool]) {
        for (has, bit) in self.remote_has.iter_mut().zip(bits) {
            *has = *bit;
        }
    }
}

/// It dials `address` and, once the handshake is done, exchanges pieces
/// until either side closes the connection.
///
/// The caller must have admitted the dial. A failure to connect is recorded
/// so that the address is not dialed again for a while.
pub(crate) async fn dial(session: Arc<Session>, address: SocketAddr) {
    let framed = match tokio::time::timeout(session.dial_timeout(), open(&session, address)).await {
        Ok(Ok(framed)) => framed,
        Ok(Err(err)) => {
            debug!(%address, %err, "dial failed");
            session.dial_failed(address);
            return;
        }
        Err(_) => {
            debug!(%address, err = %PeerError::Timeout, "dial failed");
            session.dial_failed(address);
            return;
        }
    };

    if !session.outbound_established(address) {
        debug!(%address, "dial replaced by an inbound connection from the same peer");
        return;
    }

    let mut state = PeerState::new(session.piece_count());
    let result = exchange(&session, address, framed, &mut state).await;
    finish(&session, address, Direction::Outbound, &state, result);
}

/// It answers an inbound connection.
///
/// The session is found from the info-hash in the remote handshake. The
/// connection is dropped if no session matches or the session policy does
/// not admit the remote peer.
pub(crate) async fn accept(sessions: Sessions, stream: TcpStream, remote: SocketAddr, handshake_timeout: Duration) {
    let (session, remote_listen_address, mut framed) =
        match tokio::time::timeout(handshake_timeout, answer(&sessions, stream, remote)).await {
            Ok(Ok(accepted)) => accepted,
            Ok(Err(err)) => {
                debug!(%remote, %err, "inbound connection rejected");
                return;
            }
            Err(_) => {
                debug!(%remote, err = %PeerError::Timeout, "inbound connection rejected");
                return;
            }
        };

    let mut state = PeerState::new(session.piece_count());
    let result = match framed.send(Message::Port { port: session.listen_port() }).await {
        Ok(()) => exchange(&session, remote_listen_address, framed, &mut state).await,
        Err(err) => Err(err),
    };
    finish(&session, remote_listen_address, Direction::Inbound, &state, result);
}

async fn open(session: &Session, address: SocketAddr) -> Result<MessageStream, PeerError> {
    let stream = TcpStream::connect(address).await?;
    let mut framed = Framed::new(stream, HandshakeCodec);

    framed.send(Handshake::new(session.info_hash().0, session.peer_id().0)).await?;

    let handshake = framed.next().await.ok_or(PeerError::NoHandshake)??;
    check_handshake(session, &handshake)?;

    let mut framed = switch_to_messages(framed);

    framed.send(Message::Port { port: session.listen_port() }).await?;
    read_listen_port(&mut framed).await?;

    Ok(framed)
}

async fn answer(
    sessions: &Sessions,
    stream: TcpStream,
    remote: SocketAddr,
) -> Result<(Arc<Session>, SocketAddr, MessageStream), PeerError> {
    let mut framed = Framed::new(stream, HandshakeCodec);

    let handshake = framed.next().await.ok_or(PeerError::NoHandshake)??;
    let session = sessions
        .get(&InfoHash(handshake.info_hash))
        .ok_or(PeerError::UnknownInfoHash)?;
    check_handshake(&session, &handshake)?;

    framed.send(Handshake::new(session.info_hash().0, session.peer_id().0)).await?;

    let mut framed = switch_to_messages(framed);

    let port = read_listen_port(&mut framed).await?;

    let remote_listen_address = SocketAddr::new(remote.ip(), port);

    match session.admit_inbound(remote_listen_address, peer::Id(handshake.peer_id)) {
        Admission::Allow => Ok((session, remote_listen_address, framed)),
        Admission::Deny(reason) => Err(PeerError::NotAdmitted { reason }),
    }
}

fn check_handshake(session: &Session, handshake: &Handshake) -> Result<(), PeerError> {
    if handshake.info_hash != session.info_hash().0 {
        return Err(PeerError::IncorrectInfoHash);
    }

    if handshake.peer_id == session.peer_id().0 {
        return Err(PeerError::SelfConnection);
    }

    Ok(())
}

/// It swaps the handshake codec for the message codec keeping the bytes
/// already buffered.
fn switch_to_messages(framed: Framed<TcpStream, HandshakeCodec>) -> MessageStream {
    let parts = framed.into_parts();

    let mut message_parts = FramedParts::new::<Message>(parts.io, MessageCodec);
    message_parts.read_buf = parts.read_buf;
    message_parts.write_buf = parts.write_buf;

    Framed::from_parts(message_parts)
}

async fn read_listen_port(framed: &mut MessageStream) -> Result<u16, PeerError> {
    match framed.next().await {
        Some(Ok(Message::Port { port })) if port != 0 => Ok(port),
        Some(Ok(_)) | None => Err(PeerError::NoListenPort),
        Some(Err(err)) => Err(err),
    }
}

async fn exchange(session: &Session, remote: SocketAddr, framed: MessageStream, state: &mut PeerState) -> Result<(), PeerError> {
    let (mut sink, mut stream) = framed.split();

    let mut have_rx = session.subscribe_have();
    let mut released_rx = session.subscribe_released();

    let mut keep_alive = tokio::time::interval(KEEP_ALIVE_INTERVAL);
    keep_alive.tick().await;

    sink.send(Message::Bitfield(session.bitfield())).await?;

    loop {
        request_next_piece(session, state, &mut sink).await?;

        tokio::select! {
            () = session.cancellation().cancelled() => return Ok(()),

            message = stream.next() => {
                let Some(message) = message else {
                    return Ok(());
                };

                match message? {
                    Message::KeepAlive | Message::Port { .. } => {}
                    Message::Have { index } => state.set_has(index),
                    Message::Bitfield(bits) => state.set_bitfield(&bits),
                    Message::Request { index } => {
                        let data = session.piece(index).ok_or(PeerError::PieceNotAvailable { index })?;
                        let len = data.len();

                        session.throttle().acquire(len).await;
                        sink.send(Message::Piece { index, data }).await?;
                        session.record_upload(len);
                    }
                    Message::Piece { index, data } => {
                        if let Err(err) = session.receive_piece(index, data) {
                            warn!(%remote, %index, %err, "discarding piece");
                        }

                        if state.requested == Some(index) {
                            state.requested = None;
                            session.release_piece(index);
                        }
                    }
                }
            }

            have = have_rx.recv() => match have {
                Ok(index) => sink.send(Message::Have { index }).await?,
                Err(RecvError::Lagged(_)) => sink.send(Message::Bitfield(session.bitfield())).await?,
                Err(RecvError::Closed) => return Ok(()),
            },

            Ok(()) = released_rx.changed() => {},

            _ = keep_alive.tick() => sink.send(Message::KeepAlive).await?,
        }
    }
}

/// It requests the first piece the remote peer has that nobody is
/// downloading, unless a request is already pending on the connection.
///
/// The reservation is recorded before the request is sent so that
/// [`finish`] releases it when the send fails.
async fn request_next_piece<S>(session: &Session, state: &mut PeerState, sink: &mut S) -> Result<(), PeerError>
where
    S: Sink<Message, Error = PeerError> + Unpin,
{
    if state.requested.is_some() {
        return Ok(());
    }

    if let Some(index) = session.reserve_piece(&state.remote_has) {
        state.requested = Some(index);
        sink.send(Message::Request { index }).await?;
    }

    Ok(())
}

fn finish(session: &Session, remote: SocketAddr, direction: Direction, state: &PeerState, result: Result<(), PeerError>) {
    if let Some(index) = state.requested {
        session.release_piece(index);
    }

    match result {
        Ok(()) => debug!(%remote, "connection closed"),
        Err(err) => debug!(%remote, %err, "connection closed with an error"),
    }

    session.connection_closed(remote, direction);
}
