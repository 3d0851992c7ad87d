//! Job that runs a task on intervals to clean up torrents.
//!
//! It removes inactive peers, stale baseline providers and (optionally)
//! peerless torrents.
//!
//! **Inactive peers** are peers that have not been updated for more than
//! `max_peer_timeout` seconds. When the baseline provider of a content is
//! removed as inactive its record goes with it.
//!
//! **Stale baseline providers** are records whose provider has not announced
//! completion for more than `baseline_provider_timeout` seconds.
//!
//! If the core tracker configuration option `remove_peerless_torrents` is
//! true, the cleanup job will also remove **peerless torrents** which are
//! torrents with an empty peer list.
use std::sync::Arc;

use chrono::Utc;
use reliable_swarm_configuration::Core;
use tokio::task::JoinHandle;
use tracing::info;

use crate::core;

/// It starts a jobs for cleaning up the torrent data in the tracker.
///
/// The cleaning task is executed on an `inactive_peer_cleanup_interval`. The
/// job stops when the process gets a `ctrl_c` signal or when the tracker is
/// dropped.
#[must_use]
pub fn start_job(config: &Core, tracker: &Arc<core::Tracker>) -> JoinHandle<()> {
    let weak_tracker = std::sync::Arc::downgrade(tracker);
    let interval = config.inactive_peer_cleanup_interval;

    tokio::spawn(async move {
        let interval = std::time::Duration::from_secs(interval);
        let mut interval = tokio::time::interval(interval);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping torrent cleanup job..");
                    break;
                }
                _ = interval.tick() => {
                    if let Some(tracker) = weak_tracker.upgrade() {
                        let start_time = Utc::now().time();
                        info!("Cleaning up torrents..");
                        tracker.cleanup_torrents();
                        info!("Cleaned up torrents in: {}ms", (Utc::now().time() - start_time).num_milliseconds());
                    } else {
                        break;
                    }
                }
            }
        }
    })
}
