//! HTTP tracker job starter.
//!
//! The function [`http_tracker::start_job`](crate::bootstrap::jobs::http_tracker::start_job)
//! starts a new HTTP tracker server.
//!
//! > **NOTICE**: the application can launch more than one HTTP tracker on
//! > different ports. All of them share the same core tracker, so a baseline
//! > provider recorded through one socket is handed out through every other.
//!
//! The job is the "**launcher**" task. It starts the actual server, waits
//! until the socket is bound and then keeps running until the server stops.
use std::net::SocketAddr;
use std::sync::Arc;

use reliable_swarm_configuration::HttpTracker;
use tokio::task::JoinHandle;
use tracing::info;

use crate::core;
use crate::servers::http::server::{HttpServer, Launcher};

/// It starts a new HTTP server with the provided configuration.
///
/// # Panics
///
/// It would panic if the server can't be started, for example when the bind
/// address is already in use.
pub async fn start_job(config: &HttpTracker, tracker: Arc<core::Tracker>) -> Option<JoinHandle<()>> {
    if config.enabled {
        Some(start_v1(config.bind_address, tracker).await)
    } else {
        info!("Note: Not loading Http Tracker Service, Not Enabled in Configuration.");
        None
    }
}

async fn start_v1(socket: SocketAddr, tracker: Arc<core::Tracker>) -> JoinHandle<()> {
    let server = HttpServer::new(Launcher::new(socket))
        .start(tracker)
        .await
        .expect("it should be able to start to the http tracker");

    tokio::spawn(async move {
        assert!(
            !server.state.halt_task.is_closed(),
            "Halt channel for HTTP tracker should be open"
        );
        server
            .state
            .task
            .await
            .expect("it should be able to join to the http tracker task");
    })
}
