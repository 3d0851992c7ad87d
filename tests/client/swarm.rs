use reliable_swarm::client::swarm::storage::Storage;
use reliable_swarm_test_helpers::configuration;
use tracing::level_filters::LevelFilter;

use super::{start_client, wait_until, SCENARIO_TIMEOUT};
use crate::common::fixtures::random_content;
use crate::common::logging::{tracing_stderr_init, INIT};
use crate::servers::http::Started;

#[tokio::test]
async fn a_leecher_should_download_the_exact_content_of_a_seeder() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let env = Started::new(&configuration::ephemeral()).await;

    let (content, metainfo) = random_content(300 * 1024);
    let metainfo = metainfo.with_trackers(vec![env.announce_url()]);

    let seeder = start_client(&configuration::ephemeral_client()).await;
    let leecher = start_client(&configuration::ephemeral_client()).await;

    seeder.add_torrent(metainfo.clone(), Storage::with_content(content.clone())).unwrap();
    let download = leecher.add_torrent(metainfo, Storage::empty()).unwrap();

    tokio::time::timeout(SCENARIO_TIMEOUT, leecher.wait_all())
        .await
        .expect("the leecher should complete the download");

    assert_eq!(download.content().unwrap(), content);
    assert_eq!(download.downloaded_bytes(), content.len() as u64);

    seeder.close().await;
    leecher.close().await;
    env.stop().await;
}

#[tokio::test]
async fn a_session_should_report_a_degraded_tracker_after_consecutive_failures() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    // Nothing listens on the tracker address once the environment is stopped.
    let env = Started::new(&configuration::ephemeral()).await;
    let unreachable_tracker = env.announce_url();
    env.stop().await;

    let (_content, metainfo) = random_content(16 * 1024);

    let client = start_client(&configuration::ephemeral_client()).await;
    let download = client
        .add_torrent(metainfo.with_trackers(vec![unreachable_tracker]), Storage::empty())
        .unwrap();

    assert!(wait_until(SCENARIO_TIMEOUT, || download.is_tracker_degraded()).await);

    client.close().await;
}

#[tokio::test]
async fn two_peers_dialing_each_other_at_the_same_time_should_keep_one_connection() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let (content, metainfo) = random_content(64 * 1024);

    let seeder = start_client(&configuration::ephemeral_client()).await;
    let leecher = start_client(&configuration::ephemeral_client()).await;

    // No trackers: the seeder stays `Verifying` and dials like any other peer.
    let seed = seeder.add_torrent(metainfo.clone(), Storage::with_content(content.clone())).unwrap();
    let download = leecher.add_torrent(metainfo, Storage::empty()).unwrap();

    seed.add_peer_address(leecher.listen_address());
    download.add_peer_address(seeder.listen_address());

    tokio::time::timeout(SCENARIO_TIMEOUT, download.wait_complete())
        .await
        .expect("the leecher should complete the download");

    assert_eq!(download.content().unwrap(), content);
    assert!(wait_until(SCENARIO_TIMEOUT, || download.connections().len() == 1 && seed.connections().len() == 1).await);

    seeder.close().await;
    leecher.close().await;
}
