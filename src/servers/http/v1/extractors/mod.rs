//! Axum [`extractors`](axum::extract) for the HTTP server.
pub mod announce_request;
