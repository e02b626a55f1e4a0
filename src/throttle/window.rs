//! Sliding-window admission control
//!
//! Bounds the number of transfers admitted within a trailing time window,
//! matching the remote service's "no more than K requests per short
//! interval" policy. Short bursts up to capacity pass immediately; once the
//! window fills, callers wait out the oldest slot plus a safety margin.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Bounds admissions within a trailing time window
///
/// Keeps the last `capacity` admission instants in insertion order. The
/// whole check-sleep-record sequence in `admit` runs under one critical
/// section, so concurrent callers serialize, the ring never exceeds
/// `capacity` entries, and each caller's cooldown is computed against the
/// state at the moment it actually runs.
#[derive(Debug)]
pub struct WindowLimiter {
    capacity: usize,
    window: Duration,
    margin: Duration,
    /// Ring of the most recent admission instants, oldest first
    admissions: Mutex<VecDeque<Instant>>,
}

impl WindowLimiter {
    pub fn new(capacity: usize, window: Duration, margin: Duration) -> Self {
        Self {
            capacity,
            window,
            margin,
            admissions: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Blocks until one more admission fits the window, then records it
    ///
    /// If fewer than `capacity` admissions are tracked, returns immediately.
    /// Otherwise the oldest tracked admission must age past the window
    /// before this caller proceeds; the sleep runs to `window + margin`
    /// past that admission, evicting it on wake.
    pub async fn admit(&self) {
        let mut ring = self.admissions.lock().await;

        if ring.len() >= self.capacity {
            if let Some(oldest) = ring.front().copied() {
                let age = oldest.elapsed();
                if age < self.window {
                    let cooldown = self.window + self.margin - age;
                    debug!(
                        cooldown_ms = cooldown.as_millis() as u64,
                        "admission window full, throttling"
                    );
                    sleep(cooldown).await;
                }
            }
            ring.pop_front();
        }

        ring.push_back(Instant::now());
    }
}
