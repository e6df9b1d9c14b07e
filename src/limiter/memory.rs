//! In-process sliding window limiter.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::{LimiterError, RateLimiter};

/// Sliding window log kept per key in a concurrent map.
///
/// The window for a key is mutated under its DashMap shard lock, so the
/// count-and-record step is atomic per key.
pub struct SlidingWindowLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    window: Duration,
    max_requests: u32,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            max_requests,
        }
    }

    fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_default();
        let hits = entry.value_mut();

        while let Some(&oldest) = hits.front() {
            if now.duration_since(oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= self.max_requests as usize {
            return true;
        }
        hits.push_back(now);
        false
    }

    /// Drop keys whose windows have emptied out.
    pub fn purge_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, hits| {
            hits.back()
                .is_some_and(|&newest| now.duration_since(newest) < self.window)
        });
        before - self.windows.len()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn limit(&self, key: &str) -> Result<bool, LimiterError> {
        Ok(self.check(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_budget_then_reject() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(1), 3);
        for _ in 0..3 {
            assert!(!limiter.limit("ip-limiter:10.0.0.1").await.unwrap());
        }
        assert!(limiter.limit("ip-limiter:10.0.0.1").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(1), 1);
        assert!(!limiter.limit("ip-limiter:a").await.unwrap());
        assert!(limiter.limit("ip-limiter:a").await.unwrap());
        assert!(!limiter.limit("ip-limiter:b").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(1), 2);
        assert!(!limiter.limit("k").await.unwrap());
        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(!limiter.limit("k").await.unwrap());
        assert!(limiter.limit("k").await.unwrap());

        // First hit leaves the window, second is still inside it.
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(!limiter.limit("k").await.unwrap());
        assert!(limiter.limit("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_requests_do_not_extend_window() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(1), 1);
        assert!(!limiter.limit("k").await.unwrap());
        for _ in 0..10 {
            assert!(limiter.limit("k").await.unwrap());
        }
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!limiter.limit("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_idle() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(1), 5);
        limiter.limit("a").await.unwrap();
        limiter.limit("b").await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        limiter.limit("b").await.unwrap();

        assert_eq!(limiter.purge_idle(), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_budget() {
        let limiter = std::sync::Arc::new(SlidingWindowLimiter::new(Duration::from_secs(60), 50));
        let mut tasks = Vec::new();
        for _ in 0..100 {
            let limiter = limiter.clone();
            tasks.push(tokio::spawn(async move { limiter.limit("shared").await.unwrap() }));
        }
        let mut admitted = 0;
        for t in tasks {
            if !t.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 50);
    }
}
