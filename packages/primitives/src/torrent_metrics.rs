use std::ops::AddAssign;

/// Aggregate values over every swarm known by the `Tracker`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct TorrentsMetrics {
    /// Total number of seeders for all swarms
    pub seeders: u64,
    /// Total number of peers that have ever completed downloading for all swarms
    pub completed: u64,
    /// Total number of leechers for all swarms
    pub leechers: u64,
    /// Total number of swarms
    pub torrents: u64,
    /// Number of swarms that currently have a baseline provider
    pub with_baseline_provider: u64,
}

impl AddAssign for TorrentsMetrics {
    fn add_assign(&mut self, rhs: Self) {
        self.seeders += rhs.seeders;
        self.completed += rhs.completed;
        self.leechers += rhs.leechers;
        self.torrents += rhs.torrents;
        self.with_baseline_provider += rhs.with_baseline_provider;
    }
}
