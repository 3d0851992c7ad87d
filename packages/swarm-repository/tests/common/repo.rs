use reliable_swarm_configuration::TrackerPolicy;
use reliable_swarm_primitives::baseline_provider::BaselineProvider;
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::swarm_metadata::SwarmMetadata;
use reliable_swarm_primitives::torrent_metrics::TorrentsMetrics;
use reliable_swarm_primitives::{peer, DurationSinceUnixEpoch};
use reliable_swarm_repository::entry::SwarmAnnounce;
use reliable_swarm_repository::repository::{Cutoffs, Repository as _};
use reliable_swarm_repository::{EntrySingle, SwarmsDashMapMutexStd, SwarmsSkipMapMutexStd};

#[derive(Debug)]
pub(crate) enum Repo {
    SkipMapMutexStd(SwarmsSkipMapMutexStd),
    DashMapMutexStd(SwarmsDashMapMutexStd),
}

impl Repo {
    pub(crate) fn get(&self, key: &InfoHash) -> Option<EntrySingle> {
        match self {
            Repo::SkipMapMutexStd(repo) => Some(repo.get(key)?.lock().unwrap().clone()),
            Repo::DashMapMutexStd(repo) => Some(repo.get(key)?.lock().unwrap().clone()),
        }
    }

    pub(crate) fn get_metrics(&self) -> TorrentsMetrics {
        match self {
            Repo::SkipMapMutexStd(repo) => repo.get_metrics(),
            Repo::DashMapMutexStd(repo) => repo.get_metrics(),
        }
    }

    pub(crate) fn get_swarm_metadata(&self, info_hash: &InfoHash) -> Option<SwarmMetadata> {
        match self {
            Repo::SkipMapMutexStd(repo) => repo.get_swarm_metadata(info_hash),
            Repo::DashMapMutexStd(repo) => repo.get_swarm_metadata(info_hash),
        }
    }

    pub(crate) fn get_baseline_provider(
        &self,
        info_hash: &InfoHash,
        baseline_cutoff: DurationSinceUnixEpoch,
    ) -> Option<BaselineProvider> {
        match self {
            Repo::SkipMapMutexStd(repo) => repo.get_baseline_provider(info_hash, baseline_cutoff),
            Repo::DashMapMutexStd(repo) => repo.get_baseline_provider(info_hash, baseline_cutoff),
        }
    }

    pub(crate) fn announce(&self, info_hash: &InfoHash, peer: &peer::Peer, trusted: bool) -> SwarmAnnounce {
        match self {
            Repo::SkipMapMutexStd(repo) => repo.announce(info_hash, peer, trusted, Cutoffs::default(), None),
            Repo::DashMapMutexStd(repo) => repo.announce(info_hash, peer, trusted, Cutoffs::default(), None),
        }
    }

    pub(crate) fn remove(&self, key: &InfoHash) -> Option<EntrySingle> {
        match self {
            Repo::SkipMapMutexStd(repo) => repo.remove(key).map(|e| e.lock().unwrap().clone()),
            Repo::DashMapMutexStd(repo) => repo.remove(key).map(|e| e.lock().unwrap().clone()),
        }
    }

    pub(crate) fn remove_inactive_peers(&self, current_cutoff: DurationSinceUnixEpoch) {
        match self {
            Repo::SkipMapMutexStd(repo) => repo.remove_inactive_peers(current_cutoff),
            Repo::DashMapMutexStd(repo) => repo.remove_inactive_peers(current_cutoff),
        }
    }

    pub(crate) fn remove_stale_baseline_providers(
        &self,
        baseline_cutoff: DurationSinceUnixEpoch,
    ) -> Vec<(InfoHash, BaselineProvider)> {
        match self {
            Repo::SkipMapMutexStd(repo) => repo.remove_stale_baseline_providers(baseline_cutoff),
            Repo::DashMapMutexStd(repo) => repo.remove_stale_baseline_providers(baseline_cutoff),
        }
    }

    pub(crate) fn remove_peerless_torrents(&self, policy: &TrackerPolicy) {
        match self {
            Repo::SkipMapMutexStd(repo) => repo.remove_peerless_torrents(policy),
            Repo::DashMapMutexStd(repo) => repo.remove_peerless_torrents(policy),
        }
    }
}
