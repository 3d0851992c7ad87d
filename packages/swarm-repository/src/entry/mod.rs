use std::collections::BTreeMap;
use std::fmt::Debug;
use std::net::SocketAddr;
use std::sync::Arc;

use reliable_swarm_configuration::TrackerPolicy;
use reliable_swarm_primitives::baseline_provider::BaselineProvider;
use reliable_swarm_primitives::swarm_metadata::SwarmMetadata;
use reliable_swarm_primitives::{peer, DurationSinceUnixEpoch};

pub mod mutex_std;
pub mod single;

pub trait Entry {
    /// It returns the swarm metadata (statistics) as a struct:
    ///
    /// `(seeders, completed, leechers)`
    fn get_swarm_metadata(&self) -> SwarmMetadata;

    /// Returns True if Still a Valid Entry according to the Tracker Policy
    fn is_good(&self, policy: &TrackerPolicy) -> bool;

    /// Returns True if the Peers is Empty
    fn peers_is_empty(&self) -> bool;

    /// Returns the number of Peers
    fn get_peers_len(&self) -> usize;

    /// Get all swarm peers, optionally limiting the result.
    fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>>;

    /// It returns the list of peers for a given peer client, optionally limiting the
    /// result.
    ///
    /// It filters out the input peer, typically because we want to return this
    /// list of peers to that client peer.
    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>>;

    /// It returns the baseline provider if there is one and it was refreshed
    /// after `baseline_cutoff`. A stale record is cleared on the way.
    fn get_baseline_provider(&mut self, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider>;

    /// It applies one announce to the swarm: membership first, then the
    /// baseline provider slot.
    ///
    /// `trusted` tells whether the announcer's listen address is in the
    /// trust registry. Only a trusted announcer holding the whole content
    /// can take the slot. The most recent qualifying announce wins.
    fn upsert_peer(&mut self, peer: &peer::Peer, trusted: bool, baseline_cutoff: DurationSinceUnixEpoch) -> BaselineChange;

    /// It does [`Entry::upsert_peer`] and returns what the announcer should
    /// be told, all while holding the entry.
    fn announce(
        &mut self,
        peer: &peer::Peer,
        trusted: bool,
        baseline_cutoff: DurationSinceUnixEpoch,
        limit: Option<usize>,
    ) -> SwarmAnnounce;

    /// It removes peer from the swarm that have not been updated for more than `current_cutoff` seconds
    ///
    /// A baseline provider whose peer is removed is cleared too.
    fn remove_inactive_peers(&mut self, current_cutoff: DurationSinceUnixEpoch);

    /// It clears the baseline provider if it was not refreshed after `baseline_cutoff`.
    fn remove_stale_baseline_provider(&mut self, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider>;
}

#[allow(clippy::module_name_repetitions)]
pub trait EntrySync {
    fn get_swarm_metadata(&self) -> SwarmMetadata;
    fn is_good(&self, policy: &TrackerPolicy) -> bool;
    fn peers_is_empty(&self) -> bool;
    fn get_peers_len(&self) -> usize;
    fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>>;
    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>>;
    fn get_baseline_provider(&self, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider>;
    fn upsert_peer(&self, peer: &peer::Peer, trusted: bool, baseline_cutoff: DurationSinceUnixEpoch) -> BaselineChange;
    fn announce(
        &self,
        peer: &peer::Peer,
        trusted: bool,
        baseline_cutoff: DurationSinceUnixEpoch,
        limit: Option<usize>,
    ) -> SwarmAnnounce;
    fn remove_inactive_peers(&self, current_cutoff: DurationSinceUnixEpoch);
    fn remove_stale_baseline_provider(&self, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider>;
}

/// A data structure containing all the information about a content in the tracker.
///
/// It holds the swarm, that's the list of all the peers sharing the same
/// content, and the baseline provider slot for that content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Swarm {
    /// The peers sharing the content, keyed by listen address
    pub(crate) peers: PeerList,
    /// The number of peers that have ever completed downloading the content
    pub(crate) downloaded: u32,
    /// At most one trusted, complete peer
    pub(crate) baseline_provider: Option<BaselineProvider>,
}

/// What an announce did to the baseline provider slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaselineChange {
    /// The slot was not touched.
    Unchanged,
    /// The announcer took the slot, replacing `previous` if there was one.
    Promoted { previous: Option<SocketAddr> },
    /// The announcer already held the slot and refreshed it.
    Refreshed,
    /// The announcer held the slot and gave it up, by stopping or by
    /// reporting missing data.
    Withdrawn,
    /// The slot holder went silent for too long and was dropped.
    Expired { previous: SocketAddr },
}

/// The result of an announce, as seen by the announcer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwarmAnnounce {
    /// Other swarm members. The announcer is never in it.
    pub peers: Vec<Arc<peer::Peer>>,
    /// The current baseline provider, unless it is the announcer itself.
    pub baseline_provider: Option<BaselineProvider>,
    /// Swarm statistics after the announce.
    pub stats: SwarmMetadata,
    /// What happened to the baseline provider slot.
    pub change: BaselineChange,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerList {
    peers: BTreeMap<SocketAddr, Arc<peer::Peer>>,
}

impl PeerList {
    fn len(&self) -> usize {
        self.peers.len()
    }

    fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn contains(&self, key: &SocketAddr) -> bool {
        self.peers.contains_key(key)
    }

    fn insert(&mut self, key: SocketAddr, value: Arc<peer::Peer>) -> Option<Arc<peer::Peer>> {
        self.peers.insert(key, value)
    }

    fn remove(&mut self, key: &SocketAddr) -> Option<Arc<peer::Peer>> {
        self.peers.remove(key)
    }

    fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&SocketAddr, &mut Arc<peer::Peer>) -> bool,
    {
        self.peers.retain(f);
    }

    fn seeders_and_leechers(&self) -> (usize, usize) {
        let seeders = self.peers.values().filter(|peer| peer.is_seeder()).count();
        let leechers = self.len() - seeders;

        (seeders, leechers)
    }

    fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.peers.values().take(limit.unwrap_or(usize::MAX)).cloned().collect()
    }

    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.peers
            .iter()
            // Take peers which are not the client peer
            .filter(|(addr, _)| *addr != client)
            // Limit the number of peers on the result
            .take(limit.unwrap_or(usize::MAX))
            .map(|(_, peer)| peer.clone())
            .collect()
    }
}
