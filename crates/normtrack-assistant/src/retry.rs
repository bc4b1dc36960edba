//! Exponential backoff schedule for transient inference failures.

use std::time::Duration;

use rand::Rng;

/// Retry policy: bounded attempts with exponential backoff between them.
///
/// The delay after the n-th failed attempt doubles from `floor`, clamped to
/// `cap`, so the schedule is non-decreasing and every step stays within
/// `[floor, cap]`. Jitter, when enabled, adds a bounded offset that never
/// pushes a delay past the cap.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub floor: Duration,
    pub cap: Duration,
    pub jitter: bool,
}

/// Largest jitter offset added to a backoff delay.
const MAX_JITTER: Duration = Duration::from_millis(500);

impl RetryPolicy {
    pub fn new(max_attempts: u32, floor: Duration, cap: Duration, jitter: bool) -> Self {
        Self {
            max_attempts,
            floor,
            cap,
            jitter,
        }
    }

    /// The base delay after the given 1-based failed attempt.
    ///
    /// Pure: jitter is applied separately by [`delay_before_next`].
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let doubled = self
            .floor
            .saturating_mul(1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX));
        doubled.min(self.cap)
    }

    /// The delay to sleep before retrying after the given failed attempt,
    /// with jitter applied when enabled.
    pub fn delay_before_next(&self, attempt: u32) -> Duration {
        let base = self.delay_for(attempt);
        if !self.jitter {
            return base;
        }
        let offset = rand::rng().random_range(Duration::ZERO..=MAX_JITTER);
        (base + offset).min(self.cap)
    }
}

impl Default for RetryPolicy {
    /// 3 attempts, 4 s floor, 10 s cap, jitter on.
    fn default() -> Self {
        Self::new(3, Duration::from_secs(4), Duration::from_secs(10), true)
    }
}
