//! Connection admission policy.
//!
//! It decides whether a session dials a peer it knows about and whether it
//! accepts a peer that dialed it. The policy is asymmetric for baseline
//! providers: a `Declared` session never dials anybody but accepts inbound
//! connections from anyone. Its upload bandwidth goes to the peers that come
//! looking for it, not to peers it picked.
//!
//! Outbound rules, in order:
//!
//! | Rule | Decision |
//! |---|---|
//! | already connected to the address | deny `AlreadyConnected` |
//! | the address is our own listen address | deny `SelfConnection` |
//! | the local session is `Declared` | deny `DeclaredProviderNeverDials` |
//! | the address failed recently | deny `BackingOff` |
//! | outbound or total connection limit reached | deny `AtCapacity` |
//! | otherwise | allow |
//!
//! Inbound rules, in order:
//!
//! | Rule | Decision |
//! |---|---|
//! | already connected to the address | deny `AlreadyConnected` |
//! | dialing the address and our dial wins the tie-break | deny `DialInProgress` |
//! | total connection limit reached | deny `AtCapacity` |
//! | otherwise | allow |
//!
//! When two peers dial each other at the same time, the dial opened by the
//! peer with the lower peer ID is kept on both sides.
//!
//! A baseline provider address learned from a tracker is dialed like any
//! other peer. Decisions are never cached: they are evaluated every time
//! the session gets new peer information or its role changes.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use derive_more::{Constructor, Display};
use reliable_swarm_configuration::Client;
use tokio::time::Instant;

use super::promotion::Role;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    AlreadyConnected,
    SelfConnection,
    DeclaredProviderNeverDials,
    BackingOff,
    AtCapacity,
    DialInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny(Reason),
}

impl Admission {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        *self == Admission::Allow
    }
}

/// What the session knows when it considers dialing `remote`.
#[derive(Debug, Clone, Copy)]
pub struct OutboundContext {
    pub remote: SocketAddr,
    pub local_listen_address: SocketAddr,
    pub role: Role,
    pub already_connected: bool,
    pub backing_off: bool,
    pub outbound_connections: usize,
    pub total_connections: usize,
}

/// What the session knows when `remote` dialed it.
#[derive(Debug, Clone, Copy)]
pub struct InboundContext {
    pub remote: SocketAddr,
    /// Only established connections count. A dial in progress is `dialing`.
    pub already_connected: bool,
    pub dialing: bool,
    /// The remote peer ID is lower than the local one.
    pub remote_dial_wins: bool,
    pub total_connections: usize,
}

#[derive(Debug, Clone, Copy, Constructor)]
pub struct AdmissionPolicy {
    max_connections: usize,
    max_outbound_connections: usize,
}

impl From<&Client> for AdmissionPolicy {
    fn from(config: &Client) -> Self {
        Self::new(config.max_connections, config.max_outbound_connections)
    }
}

impl AdmissionPolicy {
    #[must_use]
    pub fn outbound(&self, context: &OutboundContext) -> Admission {
        if context.already_connected {
            return Admission::Deny(Reason::AlreadyConnected);
        }

        if is_own_address(&context.remote, &context.local_listen_address) {
            return Admission::Deny(Reason::SelfConnection);
        }

        if context.role.is_declared() {
            return Admission::Deny(Reason::DeclaredProviderNeverDials);
        }

        if context.backing_off {
            return Admission::Deny(Reason::BackingOff);
        }

        if context.outbound_connections >= self.max_outbound_connections || context.total_connections >= self.max_connections {
            return Admission::Deny(Reason::AtCapacity);
        }

        Admission::Allow
    }

    /// Inbound connections do not depend on the local role.
    #[must_use]
    pub fn inbound(&self, context: &InboundContext) -> Admission {
        if context.already_connected {
            return Admission::Deny(Reason::AlreadyConnected);
        }

        if context.dialing && !context.remote_dial_wins {
            return Admission::Deny(Reason::DialInProgress);
        }

        if context.total_connections >= self.max_connections {
            return Admission::Deny(Reason::AtCapacity);
        }

        Admission::Allow
    }
}

/// A listener bound to an unspecified IP is reachable on every loopback
/// address with the same port.
fn is_own_address(remote: &SocketAddr, local_listen_address: &SocketAddr) -> bool {
    if remote.port() != local_listen_address.port() {
        return false;
    }

    remote.ip() == local_listen_address.ip() || (local_listen_address.ip().is_unspecified() && remote.ip().is_loopback())
}

/// Peers whose last dial failed, with the time of the failure.
#[derive(Debug, Clone)]
pub struct DialBackoff {
    window: Duration,
    failures: HashMap<SocketAddr, Instant>,
}

impl DialBackoff {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            failures: HashMap::new(),
        }
    }

    pub fn record_failure(&mut self, address: SocketAddr) {
        self.failures.insert(address, Instant::now());
    }

    pub fn clear(&mut self, address: &SocketAddr) {
        self.failures.remove(address);
    }

    /// It drops the failures older than the backoff window.
    pub fn prune(&mut self) {
        let window = self.window;

        self.failures.retain(|_, failed_at| failed_at.elapsed() < window);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether `address` failed less than the backoff window ago. Expired
    /// entries are dropped.
    pub fn is_backing_off(&mut self, address: &SocketAddr) -> bool {
        match self.failures.get(address) {
            Some(failed_at) if failed_at.elapsed() < self.window => true,
            Some(_) => {
                self.failures.remove(address);
                false
            }
            None => false,
        }
    }
}
