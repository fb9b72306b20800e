//! Per-client admission control.
//!
//! A token bucket per client key, refilled continuously over time and
//! capped at a fixed burst size. The map is process-local mutable state
//! with no cross-instance coordination: in a multi-instance deployment
//! each instance gates independently, so this is a best-effort fairness
//! gate, not a correctness mechanism. An externally shared counter store
//! would be needed for a global limit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Maximum tokens in a bucket (burst capacity).
const MAX_TOKENS: f64 = 10.0;

/// Refill window: a full bucket's worth of tokens per minute.
const WINDOW_SECS: f64 = 60.0;

const REFILL_RATE_PER_SEC: f64 = MAX_TOKENS / WINDOW_SECS;

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(now: Instant) -> Self {
        Self {
            tokens: MAX_TOKENS,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * REFILL_RATE_PER_SEC).min(MAX_TOKENS);
        self.last_refill = now;
    }

    fn take(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token-bucket rate limiter keyed by client identity.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Charge one token against `key`. Returns false when the bucket is
    /// empty and the request should be rejected.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = match self.buckets.lock() {
            Ok(guard) => guard,
            // A poisoned map only ever means a panic mid-check; failing
            // open here would drop the gate entirely, so fail closed.
            Err(_) => return false,
        };
        buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(now))
            .take(now)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_burst_then_rejection() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        for _ in 0..MAX_TOKENS as usize {
            assert!(limiter.check_at("client-a", now));
        }
        assert!(!limiter.check_at("client-a", now));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        for _ in 0..MAX_TOKENS as usize {
            assert!(limiter.check_at("client-a", now));
        }
        assert!(!limiter.check_at("client-a", now));
        assert!(limiter.check_at("client-b", now));
    }

    #[test]
    fn test_continuous_refill() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..MAX_TOKENS as usize {
            assert!(limiter.check_at("client-a", start));
        }
        assert!(!limiter.check_at("client-a", start));

        // One token refills every six seconds at 10 per minute
        let later = start + Duration::from_secs(7);
        assert!(limiter.check_at("client-a", later));
        assert!(!limiter.check_at("client-a", later));
    }

    #[test]
    fn test_bucket_caps_at_burst_size() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        assert!(limiter.check_at("client-a", start));

        // A long idle period must not bank more than the cap
        let much_later = start + Duration::from_secs(3600);
        for _ in 0..MAX_TOKENS as usize {
            assert!(limiter.check_at("client-a", much_later));
        }
        assert!(!limiter.check_at("client-a", much_later));
    }
}
