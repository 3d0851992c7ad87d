//! Trust registry.
//!
//! The set of listen addresses the tracker accepts as baseline providers.
//! It is loaded once from the `[core.baseline]` configuration section and
//! never changes while the tracker runs, so it can be shared between
//! request handlers without locking.
//!
//! ```toml
//! [core.baseline]
//! trusted_providers = ["127.0.0.1:4000"]
//! ```
//!
//! Membership is exact: both the IP and the port announced by the peer must
//! match. A peer announcing completion from any other address is treated
//! as an ordinary seeder.
use std::collections::HashSet;
use std::net::SocketAddr;

use reliable_swarm_configuration::Baseline;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustRegistry {
    trusted: HashSet<SocketAddr>,
}

impl TrustRegistry {
    #[must_use]
    pub fn new(trusted: HashSet<SocketAddr>) -> Self {
        Self { trusted }
    }

    #[must_use]
    pub fn is_trusted(&self, addr: &SocketAddr) -> bool {
        self.trusted.contains(addr)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trusted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trusted.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SocketAddr> {
        self.trusted.iter()
    }
}

impl From<&Baseline> for TrustRegistry {
    fn from(config: &Baseline) -> Self {
        config.trusted_providers.iter().copied().collect()
    }
}

impl FromIterator<SocketAddr> for TrustRegistry {
    fn from_iter<T: IntoIterator<Item = SocketAddr>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
