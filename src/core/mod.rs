//! The core `tracker` module contains the generic `BitTorrent` tracker logic
//! extended with baseline providers.
//!
//! It's a domain layer which does not specify how the end user should connect
//! to the `Tracker`. Typically this module is used by the
//! [HTTP tracker](crate::servers::http) delivery layer.
//!
//! # Baseline providers
//!
//! A baseline provider (BP) is a trusted peer that holds the whole content
//! and that every other member of the swarm can fall back to when ordinary
//! seeders go away. For each content the tracker keeps at most one.
//!
//! The tracker decides who the provider is. A peer cannot name itself: the
//! IP comes from the connection, not from the request, and only listen
//! addresses in the [`TrustRegistry`](crate::core::trust::TrustRegistry)
//! are eligible.
//!
//! | Announce from the peer at `addr`            | Provider slot                     |
//! |---------------------------------------------|-----------------------------------|
//! | `left == 0`, not `stopped`, `addr` trusted  | set to `addr` (last writer wins)  |
//! | `left == 0`, not `stopped`, `addr` untrusted| untouched                         |
//! | `left > 0` from the current provider        | cleared                           |
//! | `stopped` from the current provider         | cleared                           |
//!
//! The record is also cleared when the provider has not refreshed it for
//! `baseline_provider_timeout` seconds, or when the provider is removed from
//! the swarm as an inactive peer.
//!
//! # Announce request
//!
//! ```rust,no_run
//! use std::net::IpAddr;
//! use std::sync::Arc;
//!
//! use reliable_swarm::core::{AnnounceOptions, Tracker};
//! use reliable_swarm_primitives::info_hash::InfoHash;
//! use reliable_swarm_primitives::peer;
//!
//! # fn announce(tracker: &Arc<Tracker>, info_hash: &InfoHash, peer: &mut peer::Peer, ip: &IpAddr) {
//! let announce_data = tracker.announce(info_hash, peer, ip, AnnounceOptions::default());
//! # }
//! ```
//!
//! The returned [`AnnounceData`] holds:
//!
//! - Up to [`TORRENT_PEERS_LIMIT`] other members of the swarm. The requester
//!   is never included.
//! - The current baseline provider, unless it is the requester itself.
//! - The swarm statistics.
//! - The announce policy the peer should follow. A peer that asks for a
//!   small interval gets `announce_policy.small_interval`.
pub mod services;
pub mod trust;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use derive_more::Constructor;
use reliable_swarm_clock::clock::Time;
use reliable_swarm_clock::conv::format_timestamp;
use reliable_swarm_configuration::{AnnouncePolicy, Core, TrackerPolicy, TORRENT_PEERS_LIMIT};
use reliable_swarm_primitives::baseline_provider::BaselineProvider;
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::swarm_metadata::SwarmMetadata;
use reliable_swarm_primitives::torrent_metrics::TorrentsMetrics;
use reliable_swarm_primitives::{peer, DurationSinceUnixEpoch};
use reliable_swarm_repository::entry::{BaselineChange, EntrySync};
use reliable_swarm_repository::repository::{Cutoffs, Repository};
use reliable_swarm_repository::SwarmsSkipMapMutexStd;
use tracing::{debug, info};

use self::trust::TrustRegistry;
use crate::CurrentClock;

pub type Torrents = SwarmsSkipMapMutexStd;

/// The domain layer tracker service.
///
/// Its main responsibility is to handle the `announce` requests and to keep
/// the baseline provider record of every content.
///
/// > **NOTICE**: the `Tracker` is not responsible for handling the network layer.
/// Typically, the `Tracker` is used by a higher application service that handles
/// the network layer.
pub struct Tracker {
    announce_policy: AnnouncePolicy,
    policy: TrackerPolicy,
    baseline_provider_timeout: Duration,
    trust_registry: TrustRegistry,
    pub torrents: Arc<Torrents>,
    external_ip: Option<IpAddr>,
}

/// Options sent by the peer that change the announce response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AnnounceOptions {
    /// The peer wants to be told to come back soon.
    pub small_interval: bool,
}

/// Structure that holds the data returned by the `announce` request.
#[derive(Clone, Debug, PartialEq, Constructor, Default)]
pub struct AnnounceData {
    /// The list of peers that are downloading the same torrent.
    /// It excludes the peer that made the request.
    pub peers: Vec<Arc<peer::Peer>>,
    /// The baseline provider for the content. It's never the requester.
    pub baseline_provider: Option<SocketAddr>,
    /// Swarm statistics
    pub stats: SwarmMetadata,
    pub policy: AnnouncePolicy,
}

impl Tracker {
    /// `Tracker` constructor.
    #[must_use]
    pub fn new(config: &Core) -> Tracker {
        Tracker {
            announce_policy: config.announce_policy,
            policy: config.tracker_policy.clone(),
            baseline_provider_timeout: config.baseline.staleness_window(),
            trust_registry: TrustRegistry::from(&config.baseline),
            torrents: Arc::default(),
            external_ip: config.net.external_ip,
        }
    }

    pub fn get_announce_policy(&self) -> AnnouncePolicy {
        self.announce_policy
    }

    pub fn get_trust_registry(&self) -> &TrustRegistry {
        &self.trust_registry
    }

    /// It handles an announce request.
    ///
    /// The peer IP is replaced with the IP of the connection the request came
    /// from, so a peer can only claim to be a provider from the address it
    /// really uses.
    pub fn announce(
        &self,
        info_hash: &InfoHash,
        peer: &mut peer::Peer,
        remote_client_ip: &IpAddr,
        options: AnnounceOptions,
    ) -> AnnounceData {
        debug!("Before: {peer:?}");
        peer.change_ip(&assign_ip_address_to_peer(remote_client_ip, self.external_ip));
        debug!("After: {peer:?}");

        let trusted = self.trust_registry.is_trusted(&peer.peer_addr);

        let announce = self.torrents.announce(
            info_hash,
            peer,
            trusted,
            Cutoffs {
                baseline_provider: self.baseline_provider_cutoff(),
            },
            Some(TORRENT_PEERS_LIMIT),
        );

        self.log_baseline_change(info_hash, peer, trusted, announce.change);

        AnnounceData {
            peers: announce.peers,
            baseline_provider: announce.baseline_provider.map(|provider| provider.peer_addr),
            stats: announce.stats,
            policy: self.announce_policy_for(options),
        }
    }

    /// It returns the current baseline provider for a content, if any.
    pub fn get_baseline_provider(&self, info_hash: &InfoHash) -> Option<BaselineProvider> {
        self.torrents
            .get_baseline_provider(info_hash, self.baseline_provider_cutoff())
    }

    /// Get all torrent peers for a given torrent
    pub fn get_torrent_peers(&self, info_hash: &InfoHash) -> Vec<Arc<peer::Peer>> {
        match self.torrents.get(info_hash) {
            None => vec![],
            Some(entry) => entry.get_peers(Some(TORRENT_PEERS_LIMIT)),
        }
    }

    /// It returns the swarm statistics for a content.
    pub fn get_swarm_metadata(&self, info_hash: &InfoHash) -> SwarmMetadata {
        self.torrents.get_swarm_metadata(info_hash).unwrap_or_default()
    }

    /// It calculates and returns the general `Tracker` [`TorrentsMetrics`].
    pub fn get_torrents_metrics(&self) -> TorrentsMetrics {
        self.torrents.get_metrics()
    }

    /// Remove inactive peers, stale baseline providers and (optionally)
    /// peerless torrents.
    pub fn cleanup_torrents(&self) {
        let current_cutoff = CurrentClock::cutoff(&Duration::from_secs(u64::from(self.policy.max_peer_timeout)));

        self.torrents.remove_inactive_peers(current_cutoff);

        for (info_hash, provider) in self
            .torrents
            .remove_stale_baseline_providers(self.baseline_provider_cutoff())
        {
            info!(
                %info_hash,
                provider = %provider.peer_addr,
                last_seen = %format_timestamp(provider.updated),
                "baseline provider expired"
            );
        }

        if self.policy.remove_peerless_torrents {
            self.torrents.remove_peerless_torrents(&self.policy);
        }
    }

    fn baseline_provider_cutoff(&self) -> DurationSinceUnixEpoch {
        CurrentClock::cutoff(&self.baseline_provider_timeout)
    }

    fn announce_policy_for(&self, options: AnnounceOptions) -> AnnouncePolicy {
        if options.small_interval {
            AnnouncePolicy {
                interval: self.announce_policy.small_interval,
                interval_min: self.announce_policy.interval_min.min(self.announce_policy.small_interval),
                ..self.announce_policy
            }
        } else {
            self.announce_policy
        }
    }

    fn log_baseline_change(&self, info_hash: &InfoHash, peer: &peer::Peer, trusted: bool, change: BaselineChange) {
        match change {
            BaselineChange::Promoted { previous } => {
                info!(%info_hash, provider = %peer.peer_addr, ?previous, "baseline provider promoted");
            }
            BaselineChange::Withdrawn => {
                info!(%info_hash, provider = %peer.peer_addr, event = %peer.event, "baseline provider withdrawn");
            }
            BaselineChange::Expired { previous } => {
                info!(%info_hash, %previous, "baseline provider expired");
            }
            BaselineChange::Refreshed => {
                debug!(%info_hash, provider = %peer.peer_addr, "baseline provider refreshed");
            }
            BaselineChange::Unchanged => {
                if peer.is_seeder() && !trusted {
                    debug!(%info_hash, peer = %peer.peer_addr, "completion from untrusted address ignored");
                }
            }
        }
    }
}

#[must_use]
fn assign_ip_address_to_peer(remote_client_ip: &IpAddr, tracker_external_ip: Option<IpAddr>) -> IpAddr {
    if let Some(host_ip) = tracker_external_ip.filter(|_| remote_client_ip.is_loopback()) {
        host_ip
    } else {
        *remote_client_ip
    }
}
