//! Global token-bucket rate limiter (§4.1). Capacity `R`, refill rate `R`/s.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

struct Bucket {
    tokens: f64,
    last_update: Instant,
}

pub struct RateLimiter {
    rate: f64,
    state: Arc<Mutex<Bucket>>,
}

impl RateLimiter {
    pub fn new(rate_per_sec: u16) -> Self {
        let rate = rate_per_sec as f64;
        Self {
            rate,
            state: Arc::new(Mutex::new(Bucket {
                tokens: rate,
                last_update: Instant::now(),
            })),
        }
    }

    /// Blocks until a token is available, then debits one.
    pub async fn acquire(&self) {
        let mut bucket = self.state.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_update).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.rate);
        bucket.last_update = now;

        if bucket.tokens < 1.0 {
            let sleep_secs = 1.0 / self.rate;
            drop(bucket);
            sleep(Duration::from_secs_f64(sleep_secs)).await;
            bucket = self.state.lock().await;
            bucket.tokens = 1.0;
        }
        bucket.tokens -= 1.0;
    }

    /// Restores full capacity and resets the refill epoch.
    pub async fn reset(&self) {
        let mut bucket = self.state.lock().await;
        bucket.tokens = self.rate;
        bucket.last_update = Instant::now();
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            rate: self.rate,
            state: self.state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;

    #[tokio::test]
    async fn admits_burst_up_to_capacity_without_sleep() {
        let limiter = RateLimiter::new(10);
        let start = StdInstant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn reset_restores_capacity() {
        let limiter = RateLimiter::new(5);
        for _ in 0..5 {
            limiter.acquire().await;
        }
        limiter.reset().await;
        let start = StdInstant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(200));
    }
}
