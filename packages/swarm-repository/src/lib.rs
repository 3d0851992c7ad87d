//! Swarm repository for the reliable swarm tracker.
//!
//! For every content the tracker keeps one entry holding the swarm members
//! and the baseline provider slot. Both live behind the same mutex, so one
//! announce reads and writes them as a single step and two trusted peers
//! racing to declare completion cannot lose an update.
//!
//! Two concurrent maps are provided for the outer collection:
//!
//! - [`SwarmsSkipMapMutexStd`], a lock-free `crossbeam` skip list (the default).
//! - [`SwarmsDashMapMutexStd`], a sharded `dashmap`.
use std::sync::Arc;

use repository::dash_map_mutex_std::XacrimonDashMap;
use repository::skip_map_mutex_std::CrossbeamSkipList;

pub mod entry;
pub mod repository;

// Swarm entry

pub type EntrySingle = entry::Swarm;
pub type EntryMutexStd = Arc<std::sync::Mutex<EntrySingle>>;

// Repos

pub type SwarmsSkipMapMutexStd = CrossbeamSkipList<EntryMutexStd>;
pub type SwarmsDashMapMutexStd = XacrimonDashMap<EntryMutexStd>;
