//! Outbound request pacing.
//!
//! The gateway calls [`RateLimiter::acquire`] before every source request, so
//! the politeness delay lives in one injected collaborator instead of sleeps
//! scattered through the pipeline.

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::time::Duration;

pub trait RateLimiter: Send + Sync {
    /// Block until the next request may go out.
    fn acquire(&self);
}

/// At most one request per `interval`, no bursts.
///
/// Backed by a GCRA limiter, so time already spent computing indicators counts
/// toward the gap. A zero interval disables pacing.
pub struct FixedInterval {
    limiter: Option<DefaultDirectRateLimiter>,
    clock: DefaultClock,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval)
            .map(|quota| DefaultDirectRateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));
        Self {
            limiter,
            clock: DefaultClock::default(),
        }
    }
}

impl RateLimiter for FixedInterval {
    fn acquire(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        while let Err(not_until) = limiter.check() {
            std::thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }
}

/// No pacing at all. For tests and offline sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unthrottled;

impl RateLimiter for Unthrottled {
    fn acquire(&self) {}
}
