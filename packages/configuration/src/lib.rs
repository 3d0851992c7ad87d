//! Configuration data structures for the reliable swarm tracker and client.
//!
//! The configuration is a TOML document. It can be provided as a file or,
//! with higher priority, as the whole TOML content in an environment
//! variable. Single values can be overridden with environment variables
//! prefixed with [`ENV_VAR_CONFIG_OVERRIDE_PREFIX`], using `__` as the
//! section separator:
//!
//! ```text
//! RELIABLE_SWARM_CONFIG_OVERRIDE_CORE__BASELINE__BASELINE_PROVIDER_TIMEOUT=60
//! ```
//!
//! The current version for configuration is [`v1`].
pub mod v1;

use std::env;
use std::panic::Location;
use std::time::Duration;

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The maximum number of returned peers for a content.
pub const TORRENT_PEERS_LIMIT: usize = 74;

/// Default timeout for sending and receiving tracker requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The whole `reliable-swarm.toml` file content. It has priority over the config file.
pub const ENV_VAR_CONFIG_TOML: &str = "RELIABLE_SWARM_CONFIG_TOML";

/// The `reliable-swarm.toml` file location.
pub const ENV_VAR_CONFIG_TOML_PATH: &str = "RELIABLE_SWARM_CONFIG_TOML_PATH";

/// Prefix for the environment variables overriding single values.
pub const ENV_VAR_CONFIG_OVERRIDE_PREFIX: &str = "RELIABLE_SWARM_CONFIG_OVERRIDE_";

pub type Configuration = v1::Configuration;
pub type Core = v1::core::Core;
pub type Baseline = v1::baseline::Baseline;
pub type HttpTracker = v1::http_tracker::HttpTracker;
pub type Network = v1::network::Network;
pub type Client = v1::client::Client;
pub type Logging = v1::logging::Logging;
pub type Threshold = v1::logging::Threshold;

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Constructor)]
pub struct TrackerPolicy {
    /// Maximum time in seconds that a peer can be inactive before being
    /// considered an inactive peer. If a peer is inactive for more than this
    /// time, it will be removed from the swarm.
    #[serde(default = "TrackerPolicy::default_max_peer_timeout")]
    pub max_peer_timeout: u32,

    /// If enabled, the cleanup job removes swarms that have no peers left.
    #[serde(default = "TrackerPolicy::default_remove_peerless_torrents")]
    pub remove_peerless_torrents: bool,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            max_peer_timeout: Self::default_max_peer_timeout(),
            remove_peerless_torrents: Self::default_remove_peerless_torrents(),
        }
    }
}

impl TrackerPolicy {
    fn default_max_peer_timeout() -> u32 {
        900
    }

    fn default_remove_peerless_torrents() -> bool {
        true
    }
}

/// Announce policy
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct AnnouncePolicy {
    /// Interval in seconds that the client should wait between sending regular
    /// announce requests to the tracker.
    #[serde(default = "AnnouncePolicy::default_interval")]
    pub interval: u32,

    /// Minimum announce interval. Clients must not reannounce more frequently
    /// than this.
    #[serde(default = "AnnouncePolicy::default_interval_min")]
    pub interval_min: u32,

    /// Interval returned to clients that ask for a small interval in the
    /// announce request. Used to speed up swarms in test setups.
    #[serde(default = "AnnouncePolicy::default_small_interval")]
    pub small_interval: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
            interval_min: Self::default_interval_min(),
            small_interval: Self::default_small_interval(),
        }
    }
}

impl AnnouncePolicy {
    fn default_interval() -> u32 {
        120
    }

    fn default_interval_min() -> u32 {
        120
    }

    fn default_small_interval() -> u32 {
        1
    }
}

/// Information required for loading config
#[derive(Debug, Default, Clone)]
pub struct Info {
    config_toml: Option<String>,
    config_toml_path: String,
}

impl Info {
    /// Build Configuration Info from the environment, falling back to
    /// `default_config_toml_path` when no path variable is set.
    #[must_use]
    pub fn new(default_config_toml_path: String) -> Self {
        let config_toml = env::var(ENV_VAR_CONFIG_TOML).ok();

        let config_toml_path = env::var(ENV_VAR_CONFIG_TOML_PATH).unwrap_or(default_config_toml_path);

        Self {
            config_toml,
            config_toml_path,
        }
    }

    #[must_use]
    pub fn from_toml(config_toml: &str) -> Self {
        Self {
            config_toml: Some(config_toml.to_owned()),
            config_toml_path: String::new(),
        }
    }
}

/// Errors that can occur when loading or saving the configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed processing the configuration: {source} {location}")]
    ConfigError {
        location: &'static Location<'static>,
        source: Box<figment::Error>,
    },

    #[error("Unable to encode the configuration as TOML: {source}")]
    UnableToEncode { source: toml::ser::Error },

    #[error("Unable to write the configuration file {path}: {source}")]
    UnableToWriteFile { path: String, source: std::io::Error },
}

impl From<figment::Error> for Error {
    #[track_caller]
    fn from(err: figment::Error) -> Self {
        Self::ConfigError {
            location: Location::caller(),
            source: Box::new(err),
        }
    }
}
