//! Upload rate limit of a session.
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// It spaces uploads so that, on average, no more than `bytes_per_second`
/// leave the session. Every upload reserves a slot after the previous one.
#[derive(Debug)]
pub struct Throttle {
    bytes_per_second: Option<u64>,
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    /// `None` means unlimited.
    #[must_use]
    pub fn new(bytes_per_second: Option<u64>) -> Self {
        Self {
            bytes_per_second: bytes_per_second.filter(|rate| *rate > 0),
            next_slot: Mutex::new(None),
        }
    }

    /// It waits until `bytes` can be uploaded.
    pub async fn acquire(&self, bytes: usize) {
        if let Some(slot) = self.reserve(bytes) {
            tokio::time::sleep_until(slot).await;
        }
    }

    fn reserve(&self, bytes: usize) -> Option<Instant> {
        let rate = self.bytes_per_second?;

        #[allow(clippy::cast_precision_loss)]
        let cost = Duration::from_secs_f64(bytes as f64 / rate as f64);

        let mut next_slot = self.next_slot.lock().expect("it should get the throttle lock");

        let now = Instant::now();
        let slot = next_slot.map_or(now, |next| next.max(now));

        *next_slot = Some(slot + cost);

        Some(slot)
    }
}
