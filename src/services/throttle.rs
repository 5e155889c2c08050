//! Token stream that paces remote API calls during fan-out.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Bounded token stream: `burst` tokens, one refilled every `interval`.
///
/// Workers call [`DispatchThrottle::acquire`] before each remote call, so the
/// aggregate call rate stays bounded however many workers are runnable.
pub struct DispatchThrottle {
    limiter: DefaultDirectRateLimiter,
    burst: u32,
    interval: Duration,
}

impl DispatchThrottle {
    pub fn new(burst: u32, interval: Duration) -> Self {
        let burst_nz = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(interval).map_or_else(
            || Quota::per_second(NonZeroU32::MAX),
            |q| q.allow_burst(burst_nz),
        );
        Self {
            limiter: RateLimiter::direct(quota),
            burst: burst_nz.get(),
            interval,
        }
    }

    /// A throttle that never waits in practice.
    pub fn unlimited() -> Self {
        Self::new(u32::MAX, Duration::ZERO)
    }

    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    pub const fn burst(&self) -> u32 {
        self.burst
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }
}
