//! Minimum inter-request spacing
//!
//! The remote service specifies a hard minimum gap between requests;
//! violating it risks account suspension. All transfers in the process
//! serialize through a single `Pacer` instance.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Enforces a minimum wall-clock gap between consecutive network transfers
///
/// `wait_turn` blocks until the gap since the previous transfer end has
/// elapsed. A caller leaving `wait_turn` claims the turn by advancing the
/// earliest allowed next start, so no two callers can both observe an open
/// gap and proceed within it. `record_fetch_ended` replaces the claim with
/// the real completion time, which is what the next gap is measured from.
#[derive(Debug)]
pub struct Pacer {
    min_gap: Duration,
    /// Earliest instant the next transfer may start
    earliest_next_start: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            earliest_next_start: Mutex::new(None),
        }
    }

    /// Blocks until this caller may start a transfer, then claims the turn
    ///
    /// Returns immediately if the gap has already elapsed. The state is
    /// re-checked after every sleep: another transfer may have ended in the
    /// meantime and pushed the earliest start further out.
    pub async fn wait_turn(&self) {
        loop {
            let mut earliest = self.earliest_next_start.lock().await;
            let now = Instant::now();
            match *earliest {
                Some(at) if now < at => {
                    let delay = at - now;
                    drop(earliest);
                    debug!(delay_ms = delay.as_millis() as u64, "pacing gap open, delaying transfer");
                    sleep(delay).await;
                }
                _ => {
                    *earliest = Some(now + self.min_gap);
                    return;
                }
            }
        }
    }

    /// Records "now" as the end of the most recent transfer
    ///
    /// Must be called exactly once per concluded transfer, success and
    /// failure alike: a failed attempt still consumed remote-side attention.
    pub async fn record_fetch_ended(&self) {
        let mut earliest = self.earliest_next_start.lock().await;
        let candidate = Instant::now() + self.min_gap;
        let current = *earliest;
        *earliest = Some(current.map_or(candidate, |at| at.max(candidate)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const GAP: Duration = Duration::from_millis(2000);

    #[tokio::test(start_paused = true)]
    async fn test_first_turn_is_immediate() {
        let pacer = Pacer::new(GAP);

        let start = Instant::now();
        pacer.wait_turn().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_turn_honors_gap_after_recorded_end() {
        let pacer = Pacer::new(GAP);
        pacer.record_fetch_ended().await;

        let start = Instant::now();
        pacer.wait_turn().await;

        assert!(
            start.elapsed() >= GAP,
            "Turn granted {}ms after last end, expected at least {}ms",
            start.elapsed().as_millis(),
            GAP.as_millis()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_turn_immediate_once_gap_elapsed() {
        let pacer = Pacer::new(GAP);
        pacer.record_fetch_ended().await;

        sleep(GAP + Duration::from_millis(1)).await;
        let start = Instant::now();
        pacer.wait_turn().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_never_share_a_gap() {
        let pacer = Arc::new(Pacer::new(GAP));
        pacer.record_fetch_ended().await;

        let mut tasks = Vec::new();
        for _ in 0..3 {
            let pacer = Arc::clone(&pacer);
            tasks.push(tokio::spawn(async move {
                pacer.wait_turn().await;
                Instant::now()
            }));
        }

        let mut starts = Vec::new();
        for task in tasks {
            starts.push(task.await.expect("Waiter task should finish"));
        }
        starts.sort();

        for pair in starts.windows(2) {
            assert!(
                pair[1] - pair[0] >= GAP,
                "Two transfers started {}ms apart, expected at least {}ms",
                (pair[1] - pair[0]).as_millis(),
                GAP.as_millis()
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recorded_end_supersedes_start_claim() {
        let pacer = Pacer::new(GAP);

        pacer.wait_turn().await;
        // Transfer runs for a while before its end is recorded
        sleep(Duration::from_millis(500)).await;
        let ended = Instant::now();
        pacer.record_fetch_ended().await;

        pacer.wait_turn().await;
        assert!(
            Instant::now() - ended >= GAP,
            "Next turn must be paced from the recorded end, not the start claim"
        );
    }
}
