//! Tracker and client configurations for tests.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use reliable_swarm_configuration::{Configuration, HttpTracker, Threshold};

/// This configuration is used for testing. Every server binds to an
/// ephemeral port so tests can run in parallel.
#[must_use]
pub fn ephemeral() -> Configuration {
    let mut config = Configuration::default();

    // Change to `debug` for tests debugging
    config.logging.threshold = Threshold::Off;

    config.http_trackers = vec![HttpTracker {
        enabled: true,
        bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
    }];

    config.client.listen_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);

    config
}

/// Ephemeral configuration whose trust registry holds the given addresses.
#[must_use]
pub fn ephemeral_with_trusted_providers(trusted_providers: &[SocketAddr]) -> Configuration {
    let mut config = ephemeral();

    config.core.baseline.trusted_providers = trusted_providers.to_vec();

    config
}

/// Ephemeral configuration for client instances that announce every
/// second and retry refused peers quickly.
#[must_use]
pub fn ephemeral_client() -> Configuration {
    let mut config = ephemeral();

    config.client.small_interval_allowed = true;
    config.client.default_announce_interval = 1;
    config.client.min_announce_interval = 1;
    config.client.announce_timeout = 2;
    config.client.dial_timeout = 2;
    config.client.dial_backoff = 1;

    config
}

/// Like [`ephemeral_client`] but with an upload cap in bytes per second.
#[must_use]
pub fn ephemeral_rate_limited_client(bytes_per_second: u64) -> Configuration {
    let mut config = ephemeral_client();

    config.client.upload_rate_limit = Some(bytes_per_second);

    config
}
