//! Common code for the `BitTorrent` protocol.
//!
//! The HTTP tracker client in [`tracker::http::client`] is the one client
//! sessions use to announce. Integration tests use it as well to talk to a
//! running tracker.
pub mod tracker;
