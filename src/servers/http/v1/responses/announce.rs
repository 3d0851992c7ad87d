//! `Announce` response for the HTTP tracker [`announce`](crate::servers::http::v1::requests::announce::Announce) request.
//!
//! Data structures and logic to build the `announce` response.
use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reliable_swarm_primitives::peer;
use serde::Serialize;

use crate::core::AnnounceData;
use crate::servers::http::v1::responses;

/// The bencoded dictionary returned to an `announce` request.
///
/// The `baseline provider` key is left out when there is none to report.
#[derive(Serialize, Debug, PartialEq)]
pub struct Announce {
    pub complete: u32,
    pub incomplete: u32,
    pub interval: u32,
    #[serde(rename = "min interval")]
    pub min_interval: u32,
    pub peers: Vec<DictionaryPeer>,
    #[serde(rename = "baseline provider", skip_serializing_if = "Option::is_none")]
    pub baseline_provider: Option<ProviderAddress>,
}

/// A swarm member in the `peers` list.
#[derive(Serialize, Debug, PartialEq)]
pub struct DictionaryPeer {
    pub ip: String,
    #[serde(rename = "peer id")]
    #[serde(with = "serde_bytes")]
    pub peer_id: Vec<u8>,
    pub port: u16,
}

/// The listen address of the baseline provider.
#[derive(Serialize, Debug, PartialEq)]
pub struct ProviderAddress {
    pub ip: String,
    pub port: u16,
}

impl Announce {
    /// Returns the bencoded body of the response.
    ///
    /// # Errors
    ///
    /// Will return an error if the response can't be bencoded.
    pub fn body(&self) -> Result<Vec<u8>, responses::error::Error> {
        serde_bencode::to_bytes(self).map_err(|err| responses::error::Error {
            failure_reason: format!("Cannot encode announce response: {err}"),
        })
    }
}

impl From<AnnounceData> for Announce {
    fn from(data: AnnounceData) -> Self {
        Self {
            complete: data.stats.complete,
            incomplete: data.stats.incomplete,
            interval: data.policy.interval,
            min_interval: data.policy.interval_min,
            peers: data.peers.iter().map(|peer| DictionaryPeer::from(peer.as_ref())).collect(),
            baseline_provider: data.baseline_provider.as_ref().map(ProviderAddress::from),
        }
    }
}

impl From<&peer::Peer> for DictionaryPeer {
    fn from(peer: &peer::Peer) -> Self {
        DictionaryPeer {
            ip: peer.peer_addr.ip().to_string(),
            peer_id: peer.peer_id.0.to_vec(),
            port: peer.peer_addr.port(),
        }
    }
}

impl From<&SocketAddr> for ProviderAddress {
    fn from(addr: &SocketAddr) -> Self {
        ProviderAddress {
            ip: addr.ip().to_string(),
            port: addr.port(),
        }
    }
}

impl IntoResponse for Announce {
    fn into_response(self) -> Response {
        match self.body() {
            Ok(bytes) => (StatusCode::OK, bytes).into_response(),
            Err(error) => error.into_response(),
        }
    }
}
