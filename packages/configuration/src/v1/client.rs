use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for a client instance.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Client {
    /// Address the client accepts peer connections on. Its port is the one
    /// announced to trackers, so a trusted provider must listen on the exact
    /// address configured in the tracker's trust registry.
    #[serde(default = "Client::default_listen_address")]
    pub listen_address: SocketAddr,

    /// Upper bound for live peer connections, both directions, per content.
    #[serde(default = "Client::default_max_connections")]
    pub max_connections: usize,

    /// Upper bound for dialed peer connections per content.
    #[serde(default = "Client::default_max_outbound_connections")]
    pub max_outbound_connections: usize,

    /// Seconds to wait for a dial and handshake to complete.
    #[serde(default = "Client::default_dial_timeout")]
    pub dial_timeout: u64,

    /// Seconds a peer that refused or timed out is left alone before it is
    /// dialed again.
    #[serde(default = "Client::default_dial_backoff")]
    pub dial_backoff: u64,

    /// Announce interval used until a tracker advertises its own.
    #[serde(default = "Client::default_announce_interval")]
    pub default_announce_interval: u32,

    /// Smallest announce interval honoured, unless the session allows small
    /// intervals.
    #[serde(default = "Client::default_min_announce_interval")]
    pub min_announce_interval: u32,

    /// Seconds to wait for a tracker response.
    #[serde(default = "Client::default_announce_timeout")]
    pub announce_timeout: u64,

    /// Consecutive failed announces to a tracker after which the session
    /// reports the tracker as degraded.
    #[serde(default = "Client::default_max_consecutive_announce_failures")]
    pub max_consecutive_announce_failures: u32,

    /// Upload cap in bytes per second, per content. Unlimited when unset.
    #[serde(default = "Client::default_upload_rate_limit")]
    pub upload_rate_limit: Option<u64>,

    /// Whether new sessions ask trackers for the small announce interval.
    #[serde(default = "Client::default_small_interval_allowed")]
    pub small_interval_allowed: bool,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            listen_address: Self::default_listen_address(),
            max_connections: Self::default_max_connections(),
            max_outbound_connections: Self::default_max_outbound_connections(),
            dial_timeout: Self::default_dial_timeout(),
            dial_backoff: Self::default_dial_backoff(),
            default_announce_interval: Self::default_announce_interval(),
            min_announce_interval: Self::default_min_announce_interval(),
            announce_timeout: Self::default_announce_timeout(),
            max_consecutive_announce_failures: Self::default_max_consecutive_announce_failures(),
            upload_rate_limit: Self::default_upload_rate_limit(),
            small_interval_allowed: Self::default_small_interval_allowed(),
        }
    }
}

impl Client {
    fn default_listen_address() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 6881)
    }

    fn default_max_connections() -> usize {
        50
    }

    fn default_max_outbound_connections() -> usize {
        25
    }

    fn default_dial_timeout() -> u64 {
        5
    }

    fn default_dial_backoff() -> u64 {
        30
    }

    fn default_announce_interval() -> u32 {
        120
    }

    fn default_min_announce_interval() -> u32 {
        30
    }

    fn default_announce_timeout() -> u64 {
        10
    }

    fn default_max_consecutive_announce_failures() -> u32 {
        3
    }

    fn default_upload_rate_limit() -> Option<u64> {
        None
    }

    fn default_small_interval_allowed() -> bool {
        false
    }

    #[must_use]
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout)
    }

    #[must_use]
    pub fn dial_backoff(&self) -> Duration {
        Duration::from_secs(self.dial_backoff)
    }

    #[must_use]
    pub fn announce_timeout(&self) -> Duration {
        Duration::from_secs(self.announce_timeout)
    }
}
