//! Time related functions and types.
//!
//! The tracker never reads the system time directly. Peer timestamps, the
//! inactivity cutoff and baseline provider staleness all go through a clock
//! from this crate so tests can pin the time.
//!
//! Clocks use the type `DurationSinceUnixEpoch` which is a
//! `std::time::Duration` since the Unix Epoch (timestamp).
//!
//! Crates that need a clock declare their own `CurrentClock` alias:
//!
//! ```rust,ignore
//! #[cfg(not(test))]
//! pub(crate) type CurrentClock = reliable_swarm_clock::clock::Working;
//!
//! #[cfg(test)]
//! pub(crate) type CurrentClock = reliable_swarm_clock::clock::Stopped;
//! ```
pub mod clock;
pub mod conv;
pub mod static_time;

#[macro_use]
extern crate lazy_static;

/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
