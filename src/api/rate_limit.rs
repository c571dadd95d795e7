use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Minimum spacing between calls, tracked per collaborator key.
#[derive(Debug, Default)]
pub struct RateLimiter {
    limits: HashMap<String, (Duration, Instant)>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            limits: HashMap::new(),
        }
    }

    pub fn shared() -> Arc<Mutex<RateLimiter>> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Records a call and returns true if `key` has been idle for at least `limit`.
    pub fn check(&mut self, key: &str, limit: Duration) -> bool {
        if let Some((duration, last_call)) = self.limits.get(key) {
            if last_call.elapsed() < *duration {
                return false;
            }
        }

        self.limits.insert(key.to_string(), (limit, Instant::now()));
        true
    }
}

/// Waits until `key` may be called again. The lock is released between polls so
/// other collaborators are not held up.
pub async fn wait_until_ready(limiter: &Mutex<RateLimiter>, key: &str, limit: Duration) {
    loop {
        if limiter.lock().await.check(key, limit) {
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_per_key() {
        let mut limiter = RateLimiter::new();
        let limit = Duration::from_secs(60);

        assert!(limiter.check("binance", limit));
        assert!(!limiter.check("binance", limit));
        assert!(limiter.check("etherscan", limit));
    }

    #[tokio::test]
    async fn test_wait_until_ready() {
        let limiter = RateLimiter::shared();
        let limit = Duration::from_millis(100);

        let start = Instant::now();
        wait_until_ready(&limiter, "coingecko", limit).await;
        wait_until_ready(&limiter, "coingecko", limit).await;
        assert!(start.elapsed() >= limit);
    }
}
