//! Tracker application bootstrapping.
//!
//! This module includes all the functions to build the application, its
//! dependencies, and run the jobs.
//!
//! Jobs are tasks executed concurrently. The cleanup job runs on an interval
//! and each enabled HTTP tracker is its own job, so the tracker can listen on
//! several sockets at once.
pub mod app;
pub mod config;
pub mod jobs;
pub mod logging;
