//! Sliding-window throttle shared by all outbound classification calls.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use curio_core::defaults;

/// Sliding-window rate limiter.
///
/// `wait_for_slot` suspends the calling task (other tasks keep running)
/// until fewer than `max_requests` admissions remain inside the
/// trailing `window`, then records the new admission. There is no upper
/// bound on the wait: the queue is a background process and may wait
/// indefinitely if slots never free.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            admitted: Mutex::new(VecDeque::new()),
        }
    }

    /// The shared classification limit: 10 requests per minute.
    pub fn with_defaults() -> Self {
        Self::new(
            defaults::RATE_LIMIT_MAX_REQUESTS,
            Duration::from_millis(defaults::RATE_LIMIT_WINDOW_MS),
        )
    }

    /// Wait until a slot is free, then claim it.
    ///
    /// When the window is full the wait is sized so the oldest admission
    /// has expired, plus a small buffer; the condition is then
    /// re-checked rather than assumed, to tolerate interleaved
    /// acquisition between suspension points.
    pub async fn wait_for_slot(&self) {
        loop {
            let wait = {
                let mut admitted = self.admitted.lock().await;
                let now = Instant::now();
                while admitted
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    admitted.pop_front();
                }

                if admitted.len() < self.max_requests {
                    admitted.push_back(now);
                    return;
                }

                let Some(&oldest) = admitted.front() else {
                    admitted.push_back(now);
                    return;
                };
                self.window - now.duration_since(oldest)
                    + Duration::from_millis(defaults::RATE_LIMIT_RECHECK_BUFFER_MS)
            };

            debug!(
                wait_ms = wait.as_millis() as u64,
                "rate limit reached, waiting"
            );
            sleep(wait).await;
        }
    }

    /// Free slots right now, after pruning expired admissions.
    pub async fn available(&self) -> usize {
        let mut admitted = self.admitted.lock().await;
        let now = Instant::now();
        while admitted
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            admitted.pop_front();
        }
        self.max_requests.saturating_sub(admitted.len())
    }
}
