use std::sync::Arc;
use std::thread;

use reliable_swarm_configuration::TrackerPolicy;
use reliable_swarm_primitives::announce_event::AnnounceEvent;
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::DurationSinceUnixEpoch;
use reliable_swarm_repository::entry::{BaselineChange, Entry as _};
use reliable_swarm_repository::repository::skip_map_mutex_std::CrossbeamSkipList;
use reliable_swarm_repository::repository::dash_map_mutex_std::XacrimonDashMap;
use rstest::{fixture, rstest};

use crate::common::repo::Repo;
use crate::common::swarm_peer_builder::{a_completed_peer, a_completed_peer_updated_at, a_started_peer, address, AN_HOUR};

#[fixture]
fn skip_list_mutex_std() -> Repo {
    Repo::SkipMapMutexStd(CrossbeamSkipList::default())
}

#[fixture]
fn dash_map_std() -> Repo {
    Repo::DashMapMutexStd(XacrimonDashMap::default())
}

fn sample_info_hash() -> InfoHash {
    "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse().unwrap()
}

#[rstest]
fn it_should_create_the_swarm_on_the_first_announce(#[values(skip_list_mutex_std(), dash_map_std())] repo: Repo) {
    let info_hash = sample_info_hash();

    assert!(repo.get(&info_hash).is_none());

    repo.announce(&info_hash, &a_started_peer(6000), false);

    assert_eq!(repo.get(&info_hash).unwrap().get_peers_len(), 1);
}

#[rstest]
fn it_should_keep_swarms_of_different_contents_apart(#[values(skip_list_mutex_std(), dash_map_std())] repo: Repo) {
    let one = sample_info_hash();
    let other = InfoHash([7u8; 20]);

    repo.announce(&one, &a_completed_peer(4000), true);
    let announce = repo.announce(&other, &a_started_peer(6000), false);

    assert!(announce.baseline_provider.is_none());
    assert!(announce.peers.is_empty());
    assert_eq!(repo.get_metrics().torrents, 2);
}

#[rstest]
fn it_should_return_the_trusted_complete_peer_as_baseline_provider_to_others(
    #[values(skip_list_mutex_std(), dash_map_std())] repo: Repo,
) {
    let info_hash = sample_info_hash();

    let change = repo.announce(&info_hash, &a_completed_peer(4000), true).change;
    let announce = repo.announce(&info_hash, &a_started_peer(6000), false);

    assert_eq!(change, BaselineChange::Promoted { previous: None });
    assert_eq!(announce.baseline_provider.unwrap().peer_addr, address(4000));
    assert_eq!(repo.get_metrics().with_baseline_provider, 1);
}

#[rstest]
fn it_should_not_return_an_untrusted_complete_peer_as_baseline_provider(
    #[values(skip_list_mutex_std(), dash_map_std())] repo: Repo,
) {
    let info_hash = sample_info_hash();

    repo.announce(&info_hash, &a_completed_peer(4500), false);
    let announce = repo.announce(&info_hash, &a_started_peer(6000), false);

    assert!(announce.baseline_provider.is_none());
    assert_eq!(announce.peers.len(), 1);
    assert_eq!(repo.get_swarm_metadata(&info_hash).unwrap().complete, 1);
}

#[rstest]
fn it_should_clear_the_baseline_provider_when_it_stops(#[values(skip_list_mutex_std(), dash_map_std())] repo: Repo) {
    let info_hash = sample_info_hash();
    let mut provider = a_completed_peer(4000);
    repo.announce(&info_hash, &provider, true);

    provider.event = AnnounceEvent::Stopped;
    repo.announce(&info_hash, &provider, true);

    assert!(repo
        .get_baseline_provider(&info_hash, DurationSinceUnixEpoch::ZERO)
        .is_none());
}

#[rstest]
fn it_should_sweep_stale_baseline_providers(#[values(skip_list_mutex_std(), dash_map_std())] repo: Repo) {
    let info_hash = sample_info_hash();
    repo.announce(&info_hash, &a_completed_peer_updated_at(4000, AN_HOUR), true);

    let removed = repo.remove_stale_baseline_providers(AN_HOUR * 2);

    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].0, info_hash);
    assert_eq!(removed[0].1.peer_addr, address(4000));
    assert!(repo
        .get_baseline_provider(&info_hash, DurationSinceUnixEpoch::ZERO)
        .is_none());
}

#[rstest]
fn it_should_remove_inactive_peers_and_then_peerless_swarms(#[values(skip_list_mutex_std(), dash_map_std())] repo: Repo) {
    let info_hash = sample_info_hash();
    repo.announce(&info_hash, &a_completed_peer_updated_at(4000, AN_HOUR), true);

    repo.remove_inactive_peers(AN_HOUR);
    repo.remove_peerless_torrents(&TrackerPolicy::default());

    assert!(repo.get(&info_hash).is_none());
}

#[rstest]
fn it_should_remove_a_swarm(#[values(skip_list_mutex_std(), dash_map_std())] repo: Repo) {
    let info_hash = sample_info_hash();
    repo.announce(&info_hash, &a_started_peer(6000), false);

    assert!(repo.remove(&info_hash).is_some());
    assert!(repo.get(&info_hash).is_none());
}

#[rstest]
fn at_most_one_baseline_provider_should_survive_racing_trusted_announces(
    #[values(skip_list_mutex_std(), dash_map_std())] repo: Repo,
) {
    let info_hash = sample_info_hash();
    let repo = Arc::new(repo);

    let handles: Vec<_> = (4000..4016)
        .map(|port| {
            let repo = repo.clone();
            thread::spawn(move || {
                repo.announce(&info_hash, &a_completed_peer(port), true);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let provider = repo
        .get_baseline_provider(&info_hash, DurationSinceUnixEpoch::ZERO)
        .unwrap();

    assert!((4000..4016).contains(&provider.peer_addr.port()));
    assert_eq!(repo.get_metrics().with_baseline_provider, 1);

    // Every other member sees the same single provider.
    for port in 4000..4016 {
        let seen = repo.announce(&info_hash, &a_completed_peer(port), false);
        if port == provider.peer_addr.port() {
            continue;
        }
        assert_eq!(seen.baseline_provider.unwrap().peer_addr, provider.peer_addr);
    }
}
