use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Baseline provider settings for the tracker.
///
/// ```toml
/// [core.baseline]
/// trusted_providers = ["127.0.0.1:4000"]
/// baseline_provider_timeout = 900
/// ```
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Baseline {
    /// Listen addresses allowed to become the baseline provider of a content.
    /// The list is loaded once when the tracker starts.
    #[serde(default = "Baseline::default_trusted_providers")]
    pub trusted_providers: Vec<SocketAddr>,

    /// Seconds without a complete announce after which a baseline provider
    /// record is considered stale and stops being handed out.
    #[serde(default = "Baseline::default_baseline_provider_timeout")]
    pub baseline_provider_timeout: u32,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            trusted_providers: Self::default_trusted_providers(),
            baseline_provider_timeout: Self::default_baseline_provider_timeout(),
        }
    }
}

impl Baseline {
    fn default_trusted_providers() -> Vec<SocketAddr> {
        Vec::new()
    }

    fn default_baseline_provider_timeout() -> u32 {
        900
    }

    #[must_use]
    pub fn staleness_window(&self) -> Duration {
        Duration::from_secs(u64::from(self.baseline_provider_timeout))
    }
}
