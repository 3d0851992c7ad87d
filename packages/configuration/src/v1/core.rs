use serde::{Deserialize, Serialize};

use super::baseline::Baseline;
use super::network::Network;
use crate::{AnnouncePolicy, TrackerPolicy};

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Core {
    // Announce policy configuration.
    #[serde(default = "Core::default_announce_policy")]
    pub announce_policy: AnnouncePolicy,

    /// Interval in seconds that the cleanup job will run to remove inactive
    /// peers and stale baseline providers.
    #[serde(default = "Core::default_inactive_peer_cleanup_interval")]
    pub inactive_peer_cleanup_interval: u64,

    // Network configuration.
    #[serde(default = "Core::default_network")]
    pub net: Network,

    // Tracker policy configuration.
    #[serde(default = "Core::default_tracker_policy")]
    pub tracker_policy: TrackerPolicy,

    // Trust registry and baseline provider records.
    #[serde(default = "Core::default_baseline")]
    pub baseline: Baseline,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            announce_policy: Self::default_announce_policy(),
            inactive_peer_cleanup_interval: Self::default_inactive_peer_cleanup_interval(),
            net: Self::default_network(),
            tracker_policy: Self::default_tracker_policy(),
            baseline: Self::default_baseline(),
        }
    }
}

impl Core {
    fn default_announce_policy() -> AnnouncePolicy {
        AnnouncePolicy::default()
    }

    fn default_inactive_peer_cleanup_interval() -> u64 {
        600
    }

    fn default_network() -> Network {
        Network::default()
    }

    fn default_tracker_policy() -> TrackerPolicy {
        TrackerPolicy::default()
    }

    fn default_baseline() -> Baseline {
        Baseline::default()
    }
}
