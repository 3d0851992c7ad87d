//! Axum [`handlers`](axum#handlers) for the HTTP tracker.
pub mod announce;
pub mod health_check;
