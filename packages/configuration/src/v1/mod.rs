//! Version `1` of the configuration.
//!
//! A full configuration file with every value set to its default:
//!
//! ```toml
//! [logging]
//! threshold = "info"
//!
//! [core]
//! inactive_peer_cleanup_interval = 600
//!
//! [core.announce_policy]
//! interval = 120
//! interval_min = 120
//! small_interval = 1
//!
//! [core.net]
//!
//! [core.tracker_policy]
//! max_peer_timeout = 900
//! remove_peerless_torrents = true
//!
//! [core.baseline]
//! trusted_providers = []
//! baseline_provider_timeout = 900
//!
//! [[http_trackers]]
//! enabled = true
//! bind_address = "0.0.0.0:7070"
//!
//! [client]
//! listen_address = "0.0.0.0:6881"
//! max_connections = 50
//! max_outbound_connections = 25
//! dial_timeout = 5
//! dial_backoff = 30
//! default_announce_interval = 120
//! min_announce_interval = 30
//! announce_timeout = 10
//! max_consecutive_announce_failures = 3
//! small_interval_allowed = false
//! ```
//!
//! Sections can be omitted, missing values take their defaults.
pub mod baseline;
pub mod client;
pub mod core;
pub mod http_tracker;
pub mod logging;
pub mod network;

use std::fs;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use self::client::Client;
use self::core::Core;
use self::http_tracker::HttpTracker;
use self::logging::Logging;
use crate::{Error, Info, ENV_VAR_CONFIG_OVERRIDE_PREFIX};

/// Configuration for the tracker server and for client instances.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Configuration {
    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,

    /// Core configuration.
    #[serde(default)]
    pub core: Core,

    /// The list of HTTP trackers the tracker is running. Each HTTP tracker
    /// represents a HTTP server that the tracker is running and it has its own
    /// configuration.
    #[serde(default = "Configuration::default_http_trackers")]
    pub http_trackers: Vec<HttpTracker>,

    /// Client configuration.
    #[serde(default)]
    pub client: Client,
}

impl Configuration {
    fn default_http_trackers() -> Vec<HttpTracker> {
        vec![HttpTracker::default()]
    }

    /// Loads the configuration from the `Info` struct. The TOML content in
    /// the environment has priority over the configuration file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configuration is not valid.
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        let figment = if let Some(config_toml) = &info.config_toml {
            Figment::from(Serialized::defaults(Configuration::default())).merge(Toml::string(config_toml))
        } else {
            Figment::from(Serialized::defaults(Configuration::default())).merge(Toml::file(&info.config_toml_path))
        };

        let figment = figment.merge(Env::prefixed(ENV_VAR_CONFIG_OVERRIDE_PREFIX).split("__"));

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    /// Loads the configuration from the configuration file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if `path` has a bad configuration.
    pub fn load_from_file(path: &str) -> Result<Configuration, Error> {
        let info = Info {
            config_toml: None,
            config_toml_path: path.to_owned(),
        };

        Self::load(&info)
    }

    /// Saves the configuration to the configuration file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configuration cannot be encoded or the file
    /// cannot be written.
    pub fn save_to_file(&self, path: &str) -> Result<(), Error> {
        let toml = self.to_toml()?;

        fs::write(path, toml).map_err(|source| Error::UnableToWriteFile {
            path: path.to_owned(),
            source,
        })
    }

    /// Encodes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configuration cannot be encoded.
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string(self).map_err(|source| Error::UnableToEncode { source })
    }
}
