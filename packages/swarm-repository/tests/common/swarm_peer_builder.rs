use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use reliable_swarm_primitives::announce_event::AnnounceEvent;
use reliable_swarm_primitives::peer::fixture::PeerBuilder;
use reliable_swarm_primitives::{peer, DurationSinceUnixEpoch};

pub fn address(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), port)
}

/// A peer that has just joined the swarm and has the whole content left.
#[must_use]
pub fn a_started_peer(port: u16) -> peer::Peer {
    PeerBuilder::leecher()
        .with_peer_id(&peer::Id::from(i32::from(port)))
        .with_peer_addr(&address(port))
        .with_event(AnnounceEvent::Started)
        .build()
}

/// A peer that holds the whole content.
#[must_use]
pub fn a_completed_peer(port: u16) -> peer::Peer {
    PeerBuilder::seeder()
        .with_peer_id(&peer::Id::from(i32::from(port)))
        .with_peer_addr(&address(port))
        .build()
}

/// A complete peer that last announced at `updated`.
#[must_use]
pub fn a_completed_peer_updated_at(port: u16, updated: DurationSinceUnixEpoch) -> peer::Peer {
    PeerBuilder::seeder()
        .with_peer_addr(&address(port))
        .last_updated_on(updated)
        .build()
}

pub const AN_HOUR: Duration = Duration::from_secs(3600);
