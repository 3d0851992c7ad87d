use std::net::SocketAddr;
use std::sync::Arc;

use reliable_swarm_configuration::TrackerPolicy;
use reliable_swarm_primitives::baseline_provider::BaselineProvider;
use reliable_swarm_primitives::swarm_metadata::SwarmMetadata;
use reliable_swarm_primitives::{peer, DurationSinceUnixEpoch};

use super::{BaselineChange, Entry, EntrySync, SwarmAnnounce};
use crate::EntryMutexStd;

impl EntrySync for EntryMutexStd {
    fn get_swarm_metadata(&self) -> SwarmMetadata {
        self.lock().expect("it should get a lock").get_swarm_metadata()
    }

    fn is_good(&self, policy: &TrackerPolicy) -> bool {
        self.lock().expect("it should get a lock").is_good(policy)
    }

    fn peers_is_empty(&self) -> bool {
        self.lock().expect("it should get a lock").peers_is_empty()
    }

    fn get_peers_len(&self) -> usize {
        self.lock().expect("it should get a lock").get_peers_len()
    }

    fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.lock().expect("it should get lock").get_peers(limit)
    }

    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.lock().expect("it should get lock").get_peers_for_client(client, limit)
    }

    fn get_baseline_provider(&self, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider> {
        self.lock()
            .expect("it should lock the entry")
            .get_baseline_provider(baseline_cutoff)
    }

    fn upsert_peer(&self, peer: &peer::Peer, trusted: bool, baseline_cutoff: DurationSinceUnixEpoch) -> BaselineChange {
        self.lock()
            .expect("it should lock the entry")
            .upsert_peer(peer, trusted, baseline_cutoff)
    }

    fn announce(
        &self,
        peer: &peer::Peer,
        trusted: bool,
        baseline_cutoff: DurationSinceUnixEpoch,
        limit: Option<usize>,
    ) -> SwarmAnnounce {
        self.lock()
            .expect("it should lock the entry")
            .announce(peer, trusted, baseline_cutoff, limit)
    }

    fn remove_inactive_peers(&self, current_cutoff: DurationSinceUnixEpoch) {
        self.lock()
            .expect("it should lock the entry")
            .remove_inactive_peers(current_cutoff);
    }

    fn remove_stale_baseline_provider(&self, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider> {
        self.lock()
            .expect("it should lock the entry")
            .remove_stale_baseline_provider(baseline_cutoff)
    }
}
