//! Per-provider admission control.
//!
//! Every provider owns exactly one [`ProviderRateLimiter`]. Callers wait for a
//! permit instead of being rejected; the wait is bounded by the admission
//! timeout.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::timeout;

use crate::models::Provider;
use crate::utils::http::HttpError;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter settings for one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Permits handed out per period (also the burst size)
    pub permits_per_period: u32,
    /// Length of one refresh period
    pub period: Duration,
    /// How long a caller may wait for a permit before giving up
    pub admission_timeout: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            permits_per_period: 10,
            period: Duration::from_secs(1),
            admission_timeout: Duration::from_secs(5),
        }
    }
}

/// Blocking-style rate limiter shared by every call to one provider
#[derive(Debug)]
pub struct ProviderRateLimiter {
    provider: Provider,
    limiter: DirectLimiter,
    admission_timeout: Duration,
    granted: AtomicU64,
}

impl ProviderRateLimiter {
    /// Create a limiter for `provider`
    ///
    /// Zero permits are clamped to one, and the replenish interval to at least
    /// one nanosecond.
    pub fn new(provider: Provider, config: &RateLimitConfig) -> Self {
        let permits = NonZeroU32::new(config.permits_per_period).unwrap_or(nonzero!(1u32));
        let replenish_interval = (config.period / permits.get()).max(Duration::from_nanos(1));
        let quota = Quota::with_period(replenish_interval)
            .unwrap_or_else(|| Quota::per_second(permits))
            .allow_burst(permits);

        Self {
            provider,
            limiter: RateLimiter::direct(quota),
            admission_timeout: config.admission_timeout,
            granted: AtomicU64::new(0),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Wait for one permit
    pub async fn acquire(&self) -> Result<(), HttpError> {
        match timeout(self.admission_timeout, self.limiter.until_ready()).await {
            Ok(()) => {
                self.granted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(_) => {
                tracing::warn!(
                    "Rate limiter for {} did not admit request within {:?}",
                    self.provider,
                    self.admission_timeout
                );
                Err(HttpError::RateLimitTimeout {
                    provider: self.provider,
                    waited: self.admission_timeout,
                })
            }
        }
    }

    /// Number of permits handed out so far
    pub fn permits_granted(&self) -> u64 {
        self.granted.load(Ordering::Relaxed)
    }
}
