use std::time::Duration;

/// Bounded exponential backoff for optimistic-concurrency retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never zero.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before `attempt` (0-based). The first attempt never waits.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        // 1x, 2x, 4x ... capped at 32x
        self.base_delay * (1u32 << (attempt - 1).min(5))
    }

    pub async fn wait(&self, attempt: u32) {
        let delay = self.delay_for(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(50))
    }
}
