//! End-to-end scenarios: client instances and a running HTTP tracker.
mod baseline_provider;
mod swarm;

use std::time::Duration;

use reliable_swarm::client::Client;
use reliable_swarm_configuration::Configuration;

/// Time a scenario waits for something that takes a few announces.
pub(crate) const SCENARIO_TIMEOUT: Duration = Duration::from_secs(20);

/// It polls `condition` until it holds or `timeout` elapses.
pub(crate) async fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;

    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    condition()
}

pub(crate) async fn start_client(configuration: &Configuration) -> Client {
    Client::new(configuration).await.expect("it should start the client")
}
