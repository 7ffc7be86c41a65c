use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

type DirectLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

/// Fixed-period pacing for sequential requests against a rate-limited
/// endpoint. The first acquisition passes immediately; every subsequent
/// acquisition waits until a full period has elapsed since the previous one.
pub struct PacingLimiter {
    limiter: DirectLimiter,
    period: Duration,
}

impl PacingLimiter {
    pub fn new(period: Duration) -> Self {
        // Quota rejects a zero period; clamp to the smallest useful interval
        let period = period.max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .expect("non-zero pacing period")
            .allow_burst(NonZeroU32::new(1).expect("non-zero burst"));

        Self {
            limiter: GovernorRateLimiter::direct(quota),
            period,
        }
    }

    /// Suspend until the next request slot is available.
    pub async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }

    /// Check if a request can be made now (for testing/debugging)
    pub fn can_make_request_now(&self) -> bool {
        self.limiter.check().is_ok()
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
