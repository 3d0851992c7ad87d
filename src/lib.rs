//! **Reliable Swarm** is a content distribution system built on a
//! `BitTorrent`-style swarm, extended with a **baseline provider**: a
//! tracker-vetted seeder that keeps a content downloadable after every
//! organic seeder has left.
//!
//! The crate contains both halves of the system:
//!
//! - The [tracker](crate::core) with its [HTTP delivery layer](crate::servers::http).
//!   It keeps swarm membership per content and, when a peer listed in the
//!   trust registry announces it holds the complete content, records it as
//!   the baseline provider for that content. Every other peer in the swarm
//!   learns its address in the announce response.
//! - The [client](crate::client). Each content session announces to its
//!   trackers, promotes itself through `Ordinary`, `Verifying` and `Declared`
//!   as the content completes, and uses the baseline provider as a fallback
//!   source. A declared provider accepts inbound connections from anyone but
//!   never dials out, so its upload bandwidth goes to the peers that need it.
//!
//! # Running the tracker
//!
//! ```text
//! cargo run
//! ```
//!
//! The configuration is loaded from `./share/default/config/tracker.development.toml`
//! unless the `RELIABLE_SWARM_CONFIG_TOML` or `RELIABLE_SWARM_CONFIG_TOML_PATH`
//! environment variables are set. The list of trusted providers lives in the
//! `[core.baseline]` section:
//!
//! ```toml
//! [core.baseline]
//! trusted_providers = ["127.0.0.1:4000"]
//! baseline_provider_timeout = 900
//! ```
//!
//! Refer to the [`reliable-swarm-configuration`](reliable_swarm_configuration)
//! package for the full set of options.
//!
//! # Components
//!
//! From the lowest to the highest level:
//!
//! - `packages/primitives`: info-hashes, peers and baseline provider records.
//! - `packages/clock`: the working and stopped clocks.
//! - `packages/configuration`: the TOML configuration.
//! - `packages/swarm-repository`: swarm membership and the baseline provider slot per content.
//! - [`core`]: the tracker domain.
//! - [`servers`]: the HTTP tracker.
//! - [`shared`]: the HTTP tracker client used by client sessions and tests.
//! - [`client`]: client instances, sessions, admission policy and the announce scheduler.
//! - [`bootstrap`] and [`app`]: the tracker application.
pub mod app;
pub mod bootstrap;
pub mod client;
pub mod core;
pub mod servers;
pub mod shared;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = reliable_swarm_clock::clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = reliable_swarm_clock::clock::Stopped;
