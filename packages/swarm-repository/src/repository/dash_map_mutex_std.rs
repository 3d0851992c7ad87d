use std::sync::Arc;

use dashmap::DashMap;
use reliable_swarm_configuration::TrackerPolicy;
use reliable_swarm_primitives::baseline_provider::BaselineProvider;
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::swarm_metadata::SwarmMetadata;
use reliable_swarm_primitives::torrent_metrics::TorrentsMetrics;
use reliable_swarm_primitives::{peer, DurationSinceUnixEpoch};

use super::{Cutoffs, Repository};
use crate::entry::{Entry, EntrySync, SwarmAnnounce};
use crate::{EntryMutexStd, EntrySingle};

#[derive(Default, Debug)]
pub struct XacrimonDashMap<T> {
    pub torrents: DashMap<InfoHash, T>,
}

impl Repository<EntryMutexStd> for XacrimonDashMap<EntryMutexStd>
where
    EntryMutexStd: EntrySync,
    EntrySingle: Entry,
{
    fn get(&self, key: &InfoHash) -> Option<EntryMutexStd> {
        let maybe_entry = self.torrents.get(key);
        maybe_entry.map(|entry| entry.value().clone())
    }

    fn get_metrics(&self) -> TorrentsMetrics {
        let mut metrics = TorrentsMetrics::default();

        for entry in &self.torrents {
            let swarm = entry.value().lock().expect("it should get a lock");
            let stats = swarm.get_swarm_metadata();
            metrics.seeders += u64::from(stats.complete);
            metrics.completed += u64::from(stats.downloaded);
            metrics.leechers += u64::from(stats.incomplete);
            metrics.torrents += 1;
            metrics.with_baseline_provider += u64::from(swarm.baseline_provider.is_some());
        }

        metrics
    }

    fn get_swarm_metadata(&self, info_hash: &InfoHash) -> Option<SwarmMetadata> {
        self.torrents.get(info_hash).map(|entry| entry.value().get_swarm_metadata())
    }

    fn get_baseline_provider(&self, info_hash: &InfoHash, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider> {
        self.torrents
            .get(info_hash)
            .and_then(|entry| entry.value().get_baseline_provider(baseline_cutoff))
    }

    fn announce(
        &self,
        info_hash: &InfoHash,
        peer: &peer::Peer,
        trusted: bool,
        cutoffs: Cutoffs,
        limit: Option<usize>,
    ) -> SwarmAnnounce {
        let entry = self.torrents.entry(*info_hash).or_insert_with(Arc::default).clone();

        entry.announce(peer, trusted, cutoffs.baseline_provider, limit)
    }

    fn remove(&self, key: &InfoHash) -> Option<EntryMutexStd> {
        self.torrents.remove(key).map(|(_, entry)| entry)
    }

    fn remove_inactive_peers(&self, current_cutoff: DurationSinceUnixEpoch) {
        for entry in &self.torrents {
            entry.value().remove_inactive_peers(current_cutoff);
        }
    }

    fn remove_stale_baseline_providers(&self, baseline_cutoff: DurationSinceUnixEpoch) -> Vec<(InfoHash, BaselineProvider)> {
        self.torrents
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .remove_stale_baseline_provider(baseline_cutoff)
                    .map(|provider| (*entry.key(), provider))
            })
            .collect()
    }

    fn remove_peerless_torrents(&self, policy: &TrackerPolicy) {
        self.torrents.retain(|_, entry| entry.is_good(policy));
    }
}
