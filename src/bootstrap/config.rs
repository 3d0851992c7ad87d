//! Initialize configuration from file or env var.
//!
//! All environment variables are prefixed with `RELIABLE_SWARM_`.
use reliable_swarm_configuration::{Configuration, Info};

// Default values
pub const DEFAULT_PATH_CONFIG: &str = "./share/default/config/tracker.development.toml";

/// It loads the application configuration from the environment.
///
/// There are two methods to inject the configuration:
///
/// 1. By using a config file: `tracker.toml`.
/// 2. Environment variable: `RELIABLE_SWARM_CONFIG_TOML`. The variable contains the same contents as the `tracker.toml` file.
///
/// Environment variable has priority over the config file.
///
/// Refer to the [configuration documentation](reliable_swarm_configuration) for the configuration options.
///
/// # Panics
///
/// Will panic if it can't load the configuration from either the config file
/// or the env var `RELIABLE_SWARM_CONFIG_TOML`.
#[must_use]
pub fn initialize_configuration() -> Configuration {
    let info = Info::new(DEFAULT_PATH_CONFIG.to_string());

    Configuration::load(&info).expect("it should load the tracker configuration")
}
