//! HTTP tracker `v1` handlers, request parsing and responses.
pub mod extractors;
pub mod handlers;
pub mod query;
pub mod requests;
pub mod responses;
pub mod routes;
