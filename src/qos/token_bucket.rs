//! Token bucket rate limiter.
//!
//! Tokens accumulate continuously at `refill_rate` per second of simulated time
//! up to `capacity`. Refill is lazy: it happens on every call that takes `now`,
//! using the exact elapsed time, so frequent polling neither gains nor loses
//! budget. Tokens are kept as `f64`; fractional progress carries over between
//! calls.

use super::config::BucketConfig;
use super::error::ConfigError;
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: SimTime,
}

impl TokenBucket {
    /// Creates a bucket for `class`, full unless `initial_tokens` says
    /// otherwise. Zero capacity or zero refill rate is rejected.
    pub fn new(config: &BucketConfig, class: usize, now: SimTime) -> Result<Self, ConfigError> {
        config.validate(class)?;
        let capacity = config.capacity as f64;
        let initial = config.initial_tokens.map_or(capacity, |t| (t as f64).min(capacity));
        Ok(Self {
            tokens: initial,
            capacity,
            refill_rate: config.refill_rate as f64,
            last_refill: now,
        })
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Tokens as of the last refill. Use [`TokenBucket::peek`] for a current
    /// estimate.
    pub fn available(&self) -> f64 {
        self.tokens
    }

    fn refilled(&self, now: SimTime) -> f64 {
        // Time going backwards just means no refill.
        let elapsed = now.saturating_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * self.refill_rate).min(self.capacity)
    }

    fn refill(&mut self, now: SimTime) {
        if now > self.last_refill {
            self.tokens = self.refilled(now);
            self.last_refill = now;
        }
    }

    /// Tokens that would be available at `now`, without mutating the bucket.
    pub fn peek(&self, now: SimTime) -> f64 {
        self.refilled(now)
    }

    /// Refills, then debits `cost` if enough tokens are available. On failure
    /// nothing but the refill is applied.
    pub fn try_consume(&mut self, cost: u64, now: SimTime) -> bool {
        self.refill(now);
        let cost = cost as f64;
        if self.tokens >= cost {
            self.tokens -= cost;
            true
        } else {
            false
        }
    }

    /// How long until `cost` tokens are available, or `None` if `cost` exceeds
    /// the capacity and can never be admitted.
    pub fn wait_time(&self, cost: u64, now: SimTime) -> Option<SimTime> {
        let cost = cost as f64;
        if cost > self.capacity {
            return None;
        }
        let missing = cost - self.peek(now);
        if missing <= 0.0 {
            return Some(SimTime::ZERO);
        }
        let nanos = (missing / self.refill_rate * 1_000_000_000.0).ceil();
        Some(SimTime(nanos.min(u64::MAX as f64) as u64))
    }

    pub fn can_ever_admit(&self, cost: u64) -> bool {
        cost as f64 <= self.capacity
    }
}
