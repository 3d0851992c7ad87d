//! Reliable Swarm tracker application.
//!
//! The tracker application has a global configuration for multiple jobs.
//! It's basically a container for other services.
//!
//! Jobs executed always:
//!
//! - Torrent cleaner (unless its interval is `0`): it removes inactive peers,
//!   stale baseline providers and (optionally) peerless torrents.
//!
//! Optional jobs:
//!
//! - HTTP trackers: the user can enable multiple HTTP tracker on several ports.
use std::sync::Arc;

use reliable_swarm_configuration::Configuration;
use tokio::task::JoinHandle;

use crate::bootstrap::jobs::{http_tracker, torrent_cleanup};
use crate::core;

/// It starts all the jobs enabled in the configuration.
///
/// # Panics
///
/// Will panic if an enabled HTTP tracker can't be started.
pub async fn start(config: &Configuration, tracker: Arc<core::Tracker>) -> Vec<JoinHandle<()>> {
    let mut jobs: Vec<JoinHandle<()>> = Vec::new();

    // Start the HTTP blocks
    for http_tracker_config in &config.http_trackers {
        if !http_tracker_config.enabled {
            continue;
        }

        if let Some(job) = http_tracker::start_job(http_tracker_config, tracker.clone()).await {
            jobs.push(job);
        };
    }

    // Start runners to remove inactive peers and stale providers, every interval
    if config.core.inactive_peer_cleanup_interval > 0 {
        jobs.push(torrent_cleanup::start_job(&config.core, &tracker));
    }

    jobs
}
