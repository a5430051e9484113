// Heartbeat is a ready-made liveness service for periodic sync loops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use super::Service;

/// Alive while the owner keeps calling [`Heartbeat::beat`] at least once per
/// `max_silence`. Creation counts as the first beat.
///
/// Time is read from tokio's clock, which is the system monotonic clock
/// unless a runtime has paused it.
#[derive(Debug)]
pub struct Heartbeat {
    origin: Instant,
    // nanos since origin
    last_beat: AtomicU64,
    max_silence: Duration,
}

impl Heartbeat {
    pub fn new(max_silence: Duration) -> Self {
        Self {
            origin: Instant::now(),
            last_beat: AtomicU64::new(0),
            max_silence,
        }
    }

    /// Records progress.
    pub fn beat(&self) {
        let nanos = self.origin.elapsed().as_nanos().min(u64::MAX as u128) as u64;
        self.last_beat.fetch_max(nanos, Ordering::Relaxed);
    }

    /// Time passed since the last recorded beat.
    pub fn since_last_beat(&self) -> Duration {
        let last = Duration::from_nanos(self.last_beat.load(Ordering::Relaxed));
        self.origin.elapsed().saturating_sub(last)
    }

    pub fn max_silence(&self) -> Duration {
        self.max_silence
    }
}

impl Service for Heartbeat {
    fn is_alive(&self) -> bool {
        self.since_last_beat() <= self.max_silence
    }
}
