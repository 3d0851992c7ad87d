//! Helpers for testing the reliable swarm tracker and client.
pub mod configuration;
pub mod random;
