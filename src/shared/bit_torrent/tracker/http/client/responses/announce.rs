use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Announce {
    pub complete: u32,
    pub incomplete: u32,
    pub interval: u32,
    #[serde(rename = "min interval")]
    pub min_interval: u32,
    pub peers: Vec<DictionaryPeer>,
    #[serde(rename = "baseline provider", default, skip_serializing_if = "Option::is_none")]
    pub baseline_provider: Option<ProviderAddress>,
}

impl Announce {
    /// Listen addresses of the peers in the response. Entries with an
    /// unparsable IP are skipped.
    #[must_use]
    pub fn peer_addresses(&self) -> Vec<SocketAddr> {
        self.peers.iter().filter_map(DictionaryPeer::socket_addr).collect()
    }

    #[must_use]
    pub fn baseline_provider_address(&self) -> Option<SocketAddr> {
        self.baseline_provider.as_ref().and_then(ProviderAddress::socket_addr)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct DictionaryPeer {
    pub ip: String,
    #[serde(rename = "peer id")]
    #[serde(with = "serde_bytes")]
    pub peer_id: Vec<u8>,
    pub port: u16,
}

impl DictionaryPeer {
    #[must_use]
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.ip.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, self.port))
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ProviderAddress {
    pub ip: String,
    pub port: u16,
}

impl ProviderAddress {
    #[must_use]
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.ip.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, self.port))
    }
}
