//! Baseline provider record.
//!
//! For each content the tracker keeps at most one of these. It names a
//! trusted peer that has announced holding the whole content, and that the
//! rest of the swarm can fall back to when ordinary seeders go away.
use std::net::SocketAddr;

use crate::peer;
use crate::DurationSinceUnixEpoch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineProvider {
    /// The announcer's listen address. It is always a trust registry member.
    pub peer_addr: SocketAddr,
    /// The peer id used in the announce that last refreshed the record.
    pub peer_id: peer::Id,
    /// When this address became the provider for the content.
    pub promoted_at: DurationSinceUnixEpoch,
    /// The last complete announce received from this address.
    pub updated: DurationSinceUnixEpoch,
}

impl BaselineProvider {
    #[must_use]
    pub fn new(peer: &peer::Peer) -> Self {
        Self {
            peer_addr: peer.peer_addr,
            peer_id: peer.peer_id,
            promoted_at: peer.updated,
            updated: peer.updated,
        }
    }

    /// Whether the record belongs to the given listen address.
    #[must_use]
    pub fn is_at(&self, addr: &SocketAddr) -> bool {
        self.peer_addr == *addr
    }

    /// A record is stale when it has not been refreshed after `cutoff`.
    #[must_use]
    pub fn is_stale(&self, cutoff: DurationSinceUnixEpoch) -> bool {
        self.updated < cutoff
    }

    /// Refreshes the record from a new complete announce by the same address.
    pub fn refresh(&mut self, peer: &peer::Peer) {
        self.peer_id = peer.peer_id;
        self.updated = peer.updated;
    }
}
