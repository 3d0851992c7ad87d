use std::net::SocketAddr;
use std::sync::Arc;

use reliable_swarm_configuration::TrackerPolicy;
use reliable_swarm_primitives::announce_event::AnnounceEvent;
use reliable_swarm_primitives::baseline_provider::BaselineProvider;
use reliable_swarm_primitives::peer;
use reliable_swarm_primitives::swarm_metadata::SwarmMetadata;
use reliable_swarm_primitives::DurationSinceUnixEpoch;

use super::{BaselineChange, Entry, SwarmAnnounce};
use crate::EntrySingle;

impl Entry for EntrySingle {
    #[allow(clippy::cast_possible_truncation)]
    fn get_swarm_metadata(&self) -> SwarmMetadata {
        let (seeders, leechers) = self.peers.seeders_and_leechers();

        SwarmMetadata {
            downloaded: self.downloaded,
            complete: seeders as u32,
            incomplete: leechers as u32,
        }
    }

    fn is_good(&self, policy: &TrackerPolicy) -> bool {
        if policy.remove_peerless_torrents && self.peers.is_empty() {
            return false;
        }

        true
    }

    fn peers_is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn get_peers_len(&self) -> usize {
        self.peers.len()
    }

    fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.peers.get_peers(limit)
    }

    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.peers.get_peers_for_client(client, limit)
    }

    fn get_baseline_provider(&mut self, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider> {
        self.remove_stale_baseline_provider(baseline_cutoff);

        self.baseline_provider
    }

    fn upsert_peer(&mut self, peer: &peer::Peer, trusted: bool, baseline_cutoff: DurationSinceUnixEpoch) -> BaselineChange {
        let expired = self.remove_stale_baseline_provider(baseline_cutoff);

        match peer.event {
            AnnounceEvent::Stopped => {
                drop(self.peers.remove(&peer.peer_addr));
            }
            AnnounceEvent::Completed => {
                let previous = self.peers.insert(peer.peer_addr, Arc::new(*peer));
                // Don't count if peer was not previously known and not already completed.
                if previous.is_some_and(|p| p.event != AnnounceEvent::Completed) {
                    self.downloaded += 1;
                }
            }
            _ => {
                drop(self.peers.insert(peer.peer_addr, Arc::new(*peer)));
            }
        }

        match (self.update_baseline_provider(peer, trusted), expired) {
            (BaselineChange::Unchanged, Some(previous)) => BaselineChange::Expired {
                previous: previous.peer_addr,
            },
            (change, _) => change,
        }
    }

    fn announce(
        &mut self,
        peer: &peer::Peer,
        trusted: bool,
        baseline_cutoff: DurationSinceUnixEpoch,
        limit: Option<usize>,
    ) -> SwarmAnnounce {
        let change = self.upsert_peer(peer, trusted, baseline_cutoff);

        SwarmAnnounce {
            peers: self.peers.get_peers_for_client(&peer.peer_addr, limit),
            // A provider is never told about itself.
            baseline_provider: self.baseline_provider.filter(|provider| !provider.is_at(&peer.peer_addr)),
            stats: self.get_swarm_metadata(),
            change,
        }
    }

    fn remove_inactive_peers(&mut self, current_cutoff: DurationSinceUnixEpoch) {
        self.peers.retain(|_, peer| peer.updated > current_cutoff);

        if let Some(provider) = self.baseline_provider {
            if !self.peers.contains(&provider.peer_addr) {
                self.baseline_provider = None;
            }
        }
    }

    fn remove_stale_baseline_provider(&mut self, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider> {
        if self
            .baseline_provider
            .is_some_and(|provider| provider.is_stale(baseline_cutoff))
        {
            return self.baseline_provider.take();
        }

        None
    }
}

impl EntrySingle {
    fn update_baseline_provider(&mut self, peer: &peer::Peer, trusted: bool) -> BaselineChange {
        let holds_slot = self
            .baseline_provider
            .is_some_and(|provider| provider.is_at(&peer.peer_addr));

        if peer.is_seeder() {
            if !trusted {
                return BaselineChange::Unchanged;
            }

            if let Some(provider) = self.baseline_provider.as_mut().filter(|_| holds_slot) {
                provider.refresh(peer);
                return BaselineChange::Refreshed;
            }

            let previous = self
                .baseline_provider
                .replace(BaselineProvider::new(peer))
                .map(|provider| provider.peer_addr);

            return BaselineChange::Promoted { previous };
        }

        if holds_slot {
            self.baseline_provider = None;
            return BaselineChange::Withdrawn;
        }

        BaselineChange::Unchanged
    }
}
