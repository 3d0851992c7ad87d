use std::time::Duration;

use reliable_swarm::client::promotion::Role;
use reliable_swarm::client::session::Direction;
use reliable_swarm::client::swarm::storage::Storage;
use reliable_swarm_test_helpers::configuration;
use tracing::level_filters::LevelFilter;

use super::{start_client, wait_until, SCENARIO_TIMEOUT};
use crate::common::fixtures::random_content;
use crate::common::logging::{tracing_stderr_init, INIT};
use crate::servers::http::Started;

/// Window in which a declared provider is watched for dials.
const OBSERVATION_WINDOW: Duration = Duration::from_secs(3);

#[tokio::test]
async fn a_trusted_seeder_should_be_declared_and_handed_out_to_leechers_but_not_to_itself() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let provider = start_client(&configuration::ephemeral_client()).await;

    let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[provider.listen_address()])).await;

    let (content, metainfo) = random_content(64 * 1024);
    let metainfo = metainfo.with_trackers(vec![env.announce_url()]);

    let seed = provider.add_torrent(metainfo.clone(), Storage::with_content(content.clone())).unwrap();

    assert!(wait_until(SCENARIO_TIMEOUT, || seed.role() == Role::Declared).await);

    let leecher = start_client(&configuration::ephemeral_client()).await;
    let download = leecher.add_torrent(metainfo, Storage::empty()).unwrap();

    assert!(wait_until(SCENARIO_TIMEOUT, || download.baseline_provider() == Some(provider.listen_address())).await);

    tokio::time::timeout(SCENARIO_TIMEOUT, download.wait_complete())
        .await
        .expect("the leecher should complete the download");

    assert_eq!(download.content().unwrap(), content);
    assert_eq!(seed.baseline_provider(), None);

    provider.close().await;
    leecher.close().await;
    env.stop().await;
}

#[tokio::test]
async fn an_untrusted_seeder_should_never_be_handed_out_as_the_baseline_provider() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let env = Started::new(&configuration::ephemeral()).await;

    let (content, metainfo) = random_content(32 * 1024);
    let metainfo = metainfo.with_trackers(vec![env.announce_url()]);

    let seeder = start_client(&configuration::ephemeral_client()).await;
    let leecher = start_client(&configuration::ephemeral_client()).await;

    seeder.add_torrent(metainfo.clone(), Storage::with_content(content)).unwrap();
    let download = leecher.add_torrent(metainfo.clone(), Storage::empty()).unwrap();

    tokio::time::timeout(SCENARIO_TIMEOUT, download.wait_complete())
        .await
        .expect("the leecher should complete the download");

    assert_eq!(download.baseline_provider(), None);
    assert_eq!(env.tracker.get_baseline_provider(&metainfo.info_hash()), None);

    seeder.close().await;
    leecher.close().await;
    env.stop().await;
}

#[tokio::test]
async fn a_declared_provider_should_never_dial_a_peer_even_when_its_address_is_injected() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let provider = start_client(&configuration::ephemeral_client()).await;

    let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[provider.listen_address()])).await;

    let (content, metainfo) = random_content(32 * 1024);

    let seed = provider
        .add_torrent(metainfo.clone().with_trackers(vec![env.announce_url()]), Storage::with_content(content))
        .unwrap();

    assert!(wait_until(SCENARIO_TIMEOUT, || seed.role() == Role::Declared).await);

    // The leecher has no tracker. It can only get the content if the provider dials it.
    let leecher = start_client(&configuration::ephemeral_client()).await;
    let download = leecher.add_torrent(metainfo, Storage::empty()).unwrap();

    seed.add_peer_address(leecher.listen_address());

    tokio::time::sleep(OBSERVATION_WINDOW).await;

    assert_eq!(seed.dial_attempts(), 0);
    assert!(seed.connections().is_empty());
    assert_eq!(download.downloaded_bytes(), 0);
    assert!(!download.is_complete());

    provider.close().await;
    leecher.close().await;
    env.stop().await;
}

#[tokio::test]
async fn a_declared_provider_should_accept_the_peers_that_dial_it() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let provider = start_client(&configuration::ephemeral_client()).await;

    let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[provider.listen_address()])).await;

    let (content, metainfo) = random_content(32 * 1024);

    let seed = provider
        .add_torrent(metainfo.clone().with_trackers(vec![env.announce_url()]), Storage::with_content(content.clone()))
        .unwrap();

    assert!(wait_until(SCENARIO_TIMEOUT, || seed.role() == Role::Declared).await);

    // The leecher has no tracker and dials the provider directly.
    let leecher = start_client(&configuration::ephemeral_client()).await;
    let download = leecher.add_torrent(metainfo, Storage::empty()).unwrap();

    download.add_peer_address(provider.listen_address());

    assert!(
        wait_until(SCENARIO_TIMEOUT, || seed
            .connections()
            .iter()
            .any(|connection| connection.direction == Direction::Inbound))
        .await
    );

    tokio::time::timeout(SCENARIO_TIMEOUT, download.wait_complete())
        .await
        .expect("the leecher should complete the download");

    assert_eq!(download.content().unwrap(), content);
    assert_eq!(seed.dial_attempts(), 0);
    assert!(seed.uploaded_bytes() >= content.len() as u64);

    provider.close().await;
    leecher.close().await;
    env.stop().await;
}

#[tokio::test]
async fn a_leecher_should_finish_from_the_baseline_provider_when_the_last_seeder_leaves() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let provider = start_client(&configuration::ephemeral_client()).await;

    let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[provider.listen_address()])).await;

    let (content, metainfo) = random_content(256 * 1024);
    let metainfo = metainfo.with_trackers(vec![env.announce_url()]);

    // One piece per second, so the seeder leaves before the leecher completes.
    let seeder = start_client(&configuration::ephemeral_rate_limited_client(16 * 1024)).await;
    let leecher = start_client(&configuration::ephemeral_client()).await;

    seeder.add_torrent(metainfo.clone(), Storage::with_content(content.clone())).unwrap();
    let download = leecher.add_torrent(metainfo.clone(), Storage::empty()).unwrap();

    assert!(wait_until(SCENARIO_TIMEOUT, || download.downloaded_bytes() > 0).await);

    seeder.close().await;

    assert!(!download.is_complete());

    // The provider joins with the whole content but no tracker, then learns about it.
    let seed = provider
        .add_torrent(metainfo.clone().with_trackers(vec![]), Storage::with_content(content.clone()))
        .unwrap();

    assert_eq!(seed.role(), Role::Verifying);

    seed.add_trackers(vec![env.announce_url()]);

    tokio::time::timeout(SCENARIO_TIMEOUT, download.wait_complete())
        .await
        .expect("the leecher should complete the download from the baseline provider");

    assert_eq!(download.content().unwrap(), content);
    assert_eq!(download.baseline_provider(), Some(provider.listen_address()));
    assert_eq!(seed.baseline_provider(), None);
    assert_eq!(seed.role(), Role::Declared);

    provider.close().await;
    leecher.close().await;
    env.stop().await;
}

#[tokio::test]
async fn a_corrupted_provider_should_retract_its_baseline_provider_status() {
    INIT.call_once(|| {
        tracing_stderr_init(LevelFilter::ERROR);
    });

    let provider = start_client(&configuration::ephemeral_client()).await;

    let env = Started::new(&configuration::ephemeral_with_trusted_providers(&[provider.listen_address()])).await;

    let (content, metainfo) = random_content(32 * 1024);
    let info_hash = metainfo.info_hash();

    let seed = provider
        .add_torrent(metainfo.with_trackers(vec![env.announce_url()]), Storage::with_content(content))
        .unwrap();

    assert!(wait_until(SCENARIO_TIMEOUT, || env.tracker.get_baseline_provider(&info_hash).is_some()).await);
    assert!(wait_until(SCENARIO_TIMEOUT, || seed.role() == Role::Declared).await);

    seed.mark_corrupted();

    assert_eq!(seed.role(), Role::Ordinary);
    assert!(wait_until(SCENARIO_TIMEOUT, || env.tracker.get_baseline_provider(&info_hash).is_none()).await);

    provider.close().await;
    env.stop().await;
}
