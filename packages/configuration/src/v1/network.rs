use std::net::IpAddr;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Network {
    /// The external IP address of the tracker. If a peer announces from a
    /// loopback address, the tracker assumes the peer runs next to it and
    /// records this address instead.
    ///
    /// Leave it unset when trusted providers are configured with loopback
    /// addresses, otherwise their announces would not match the registry.
    #[serde(default = "Network::default_external_ip")]
    pub external_ip: Option<IpAddr>,
}

impl Network {
    fn default_external_ip() -> Option<IpAddr> {
        None
    }
}
