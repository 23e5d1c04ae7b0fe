use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use actix_web::HttpRequest;
use dashmap::DashMap;
use parking_lot::Mutex;

/// Token bucket with fractional refill.
#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_per_sec: f64) -> Self {
        let now = Instant::now();
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: now,
            last_seen: now,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            self.last_refill = now;
        }
    }

    /// Takes one token, or returns how many seconds until one is available.
    fn try_take(&mut self) -> Result<(), u64> {
        self.last_seen = Instant::now();
        self.refill();

        // Small epsilon to avoid fp surprises
        if self.tokens + 1e-12 >= 1.0 {
            self.tokens -= 1.0;
            return Ok(());
        }

        if self.refill_per_sec <= 0.0 {
            return Err(u64::MAX);
        }
        let missing = 1.0 - self.tokens;
        Err(((missing / self.refill_per_sec).ceil() as u64).max(1))
    }
}

/// Per-client request budget for the routes that allocate memory: opening
/// forms and attaching photos.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    buckets: Arc<DashMap<String, Arc<Mutex<TokenBucket>>>>,
    burst: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    /// `burst` requests at once, refilled at `per_minute`.
    pub fn new(burst: u32, per_minute: u32) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            burst: f64::from(burst.max(1)),
            refill_per_sec: f64::from(per_minute) / 60.0,
        }
    }

    fn bucket(&self, key: &str) -> Arc<Mutex<TokenBucket>> {
        if let Some(existing) = self.buckets.get(key) {
            return Arc::clone(existing.value());
        }

        self.buckets
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(TokenBucket::new(self.burst, self.refill_per_sec))))
            .value()
            .clone()
    }

    /// `Err(retry_after_secs)` when `key` has used up its budget.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let bucket = self.bucket(key);
        let mut bucket = bucket.lock();
        bucket.try_take()
    }

    /// Forgets clients not seen for `ttl`. Returns how many were dropped.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();

        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.lock().last_seen) <= ttl);

        before.saturating_sub(self.buckets.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// The key a request is limited under: the peer address, or the first
/// `X-Forwarded-For` hop when running behind a trusted proxy.
pub fn client_key(req: &HttpRequest, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
