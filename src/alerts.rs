//! Fixed-window call alerting
//!
//! Each reported call increments a counter keyed by phone number. The first
//! increment of a window starts its expiry, so the count drops back to zero
//! once the window has passed.

use crate::store::{with_timeout, CacheStore, StoreResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct AlertPolicy {
    pub key_prefix: String,
    pub window: Duration,
    /// Counts strictly above this raise an alert
    pub threshold: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            key_prefix: "alert:".to_string(),
            window: Duration::from_secs(60),
            threshold: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAlert {
    pub number: String,
    pub call_count: i64,
    pub high_alert: bool,
}

pub struct CallCounter {
    cache: Arc<dyn CacheStore>,
    policy: AlertPolicy,
    timeout: Duration,
}

impl CallCounter {
    pub fn new(cache: Arc<dyn CacheStore>, policy: AlertPolicy, timeout: Duration) -> Self {
        Self { cache, policy, timeout }
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Count one call to `number` in the current window
    pub async fn record(&self, number: &str) -> StoreResult<CallAlert> {
        let key = format!("{}{}", self.policy.key_prefix, number);
        let call_count = with_timeout(self.timeout, self.cache.incr(&key)).await?;

        if call_count == 1 && !with_timeout(self.timeout, self.cache.expire(&key, self.policy.window)).await? {
            warn!(%key, "counter vanished before its window was set");
        }

        let high_alert = call_count > self.policy.threshold;
        if high_alert {
            info!(number, call_count, "high call volume");
        }
        Ok(CallAlert {
            number: number.to_string(),
            call_count,
            high_alert,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCache;

    fn counter(cache: Arc<MemoryCache>) -> CallCounter {
        CallCounter::new(cache, AlertPolicy::default(), Duration::from_secs(3))
    }

    #[tokio::test]
    async fn test_sixth_call_raises_alert() {
        let cache = Arc::new(MemoryCache::new());
        let counter = counter(Arc::clone(&cache));

        for expected in 1..=5 {
            let alert = counter.record("0600000000").await.unwrap();
            assert_eq!(alert.call_count, expected);
            assert!(!alert.high_alert);
        }
        let sixth = counter.record("0600000000").await.unwrap();
        assert_eq!(sixth.call_count, 6);
        assert!(sixth.high_alert);

        let ttl = cache.ttl("alert:0600000000").await.unwrap();
        assert!(ttl <= Duration::from_secs(60) && ttl > Duration::from_secs(55));
    }

    #[tokio::test]
    async fn test_window_resets() {
        let policy = AlertPolicy {
            window: Duration::from_millis(100),
            ..AlertPolicy::default()
        };
        let counter = CallCounter::new(Arc::new(MemoryCache::new()), policy, Duration::from_secs(3));
        for _ in 0..6 {
            counter.record("0611").await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(150)).await;
        let alert = counter.record("0611").await.unwrap();
        assert_eq!(alert.call_count, 1);
        assert!(!alert.high_alert);
    }

    #[tokio::test]
    async fn test_numbers_are_counted_separately() {
        let counter = counter(Arc::new(MemoryCache::new()));
        counter.record("a").await.unwrap();
        counter.record("a").await.unwrap();
        assert_eq!(counter.record("b").await.unwrap().call_count, 1);
    }

    #[test]
    fn test_wire_format() {
        let alert = CallAlert {
            number: "0600".into(),
            call_count: 6,
            high_alert: true,
        };
        assert_eq!(
            serde_json::to_value(&alert).unwrap(),
            serde_json::json!({"number": "0600", "callCount": 6, "highAlert": true})
        );
    }
}
