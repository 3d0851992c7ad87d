use reliable_swarm_configuration::TrackerPolicy;
use reliable_swarm_primitives::baseline_provider::BaselineProvider;
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::swarm_metadata::SwarmMetadata;
use reliable_swarm_primitives::torrent_metrics::TorrentsMetrics;
use reliable_swarm_primitives::{peer, DurationSinceUnixEpoch};

use crate::entry::SwarmAnnounce;

pub mod dash_map_mutex_std;
pub mod skip_map_mutex_std;

/// Cutoffs used when applying an announce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cutoffs {
    /// Baseline providers not refreshed after this time are stale.
    pub baseline_provider: DurationSinceUnixEpoch,
}

pub trait Repository<T>: Default + 'static {
    fn get(&self, key: &InfoHash) -> Option<T>;
    fn get_metrics(&self) -> TorrentsMetrics;
    fn get_swarm_metadata(&self, info_hash: &InfoHash) -> Option<SwarmMetadata>;
    fn get_baseline_provider(&self, info_hash: &InfoHash, baseline_cutoff: DurationSinceUnixEpoch) -> Option<BaselineProvider>;

    /// It applies an announce to the swarm of `info_hash`, creating the swarm
    /// if needed, and returns the result for the announcer.
    fn announce(
        &self,
        info_hash: &InfoHash,
        peer: &peer::Peer,
        trusted: bool,
        cutoffs: Cutoffs,
        limit: Option<usize>,
    ) -> SwarmAnnounce;

    fn remove(&self, key: &InfoHash) -> Option<T>;
    fn remove_inactive_peers(&self, current_cutoff: DurationSinceUnixEpoch);

    /// It clears stale baseline providers and returns the swarms that lost one.
    fn remove_stale_baseline_providers(&self, baseline_cutoff: DurationSinceUnixEpoch) -> Vec<(InfoHash, BaselineProvider)>;

    fn remove_peerless_torrents(&self, policy: &TrackerPolicy);
}
