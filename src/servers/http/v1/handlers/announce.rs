//! Axum [`handlers`](axum#handlers) for the `announce` requests.
//!
//! Refer to [HTTP server](crate::servers::http) for more information about the
//! `announce` request.
//!
//! The peer IP is always the IP of the connection. Whatever address the
//! client believes it has is ignored.
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::response::{IntoResponse, Response};
use reliable_swarm_clock::clock::Time;
use reliable_swarm_primitives::{peer, NumberOfBytes};
use tracing::debug;

use crate::core::{AnnounceData, AnnounceOptions, Tracker};
use crate::servers::http::v1::extractors::announce_request::ExtractRequest;
use crate::servers::http::v1::requests::announce::Announce;
use crate::servers::http::v1::responses;
use crate::CurrentClock;

/// It handles the `announce` request.
#[allow(clippy::unused_async)]
pub async fn handle(
    State(tracker): State<Arc<Tracker>>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    ExtractRequest(announce_request): ExtractRequest,
) -> Response {
    debug!("http announce request: {:#?}", announce_request);

    let announce_data = handle_announce(&tracker, &announce_request, &remote_addr.ip());

    responses::announce::Announce::from(announce_data).into_response()
}

fn handle_announce(tracker: &Tracker, announce_request: &Announce, remote_client_ip: &IpAddr) -> AnnounceData {
    let mut peer = peer_from_request(announce_request, remote_client_ip);

    tracker.announce(
        &announce_request.info_hash,
        &mut peer,
        remote_client_ip,
        AnnounceOptions {
            small_interval: announce_request.small_interval,
        },
    )
}

/// It builds a `Peer` from the announce request.
///
/// An absent `left` counts as `0` bytes left.
#[must_use]
fn peer_from_request(announce_request: &Announce, peer_ip: &IpAddr) -> peer::Peer {
    peer::Peer {
        peer_id: announce_request.peer_id,
        peer_addr: SocketAddr::new(*peer_ip, announce_request.port),
        updated: CurrentClock::now(),
        uploaded: NumberOfBytes(announce_request.uploaded.unwrap_or(0)),
        downloaded: NumberOfBytes(announce_request.downloaded.unwrap_or(0)),
        left: NumberOfBytes(announce_request.left.unwrap_or(0)),
        event: announce_request.event,
    }
}
