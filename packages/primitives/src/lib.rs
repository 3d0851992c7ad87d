//! Primitive types for the reliable swarm tracker and client.
//!
//! These structures are shared by the tracker server, the swarm repository
//! and the client. They carry no behaviour beyond small helpers, so every
//! package can depend on them without pulling in a runtime.
use std::time::Duration;

use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};

pub mod announce_event;
pub mod baseline_provider;
pub mod info_hash;
pub mod peer;
pub mod swarm_metadata;
pub mod torrent_metrics;

/// Duration since the Unix Epoch.
pub type DurationSinceUnixEpoch = Duration;

/// A signed amount of bytes, as reported by peers in announce requests.
///
/// It is signed because some clients send negative values for `left` when
/// they do not know the size of the content yet.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Constructor)]
pub struct NumberOfBytes(pub i64);

impl NumberOfBytes {
    #[must_use]
    pub fn get(&self) -> i64 {
        self.0
    }
}

/// IP version used by the peer to connect to the tracker: IPv4 or IPv6
#[derive(PartialEq, Eq, Debug)]
pub enum IPVersion {
    /// <https://en.wikipedia.org/wiki/Internet_Protocol_version_4>
    IPv4,
    /// <https://en.wikipedia.org/wiki/IPv6>
    IPv6,
}
