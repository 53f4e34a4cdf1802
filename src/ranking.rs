//! Cached influence ranking
//!
//! [`RankingGateway::serve`] answers from the cache when it can. Otherwise it
//! opens one graph session, tries PageRank, and falls back to out-degree when
//! PageRank fails. Only PageRank results are cached.

use crate::store::{with_timeout, CacheStore, GraphBackend, GraphSession, RankQuery, StoreError};
use casegraph_algorithms::Orientation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// One ranked person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub given_name: String,
    pub family_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingMethod {
    #[serde(rename = "pageRank")]
    PageRank,
    #[serde(rename = "fallback")]
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub data: Vec<RankingEntry>,
    pub method: RankingMethod,
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub cache_key: String,
    pub cache_ttl: Duration,
    pub limit: usize,
    pub node_label: String,
    pub rel_type: String,
    pub orientation: Orientation,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            cache_key: "ranking:page_rank".to_string(),
            cache_ttl: Duration::from_secs(600),
            limit: 5,
            node_label: "Person".to_string(),
            rel_type: "DIRECTS".to_string(),
            orientation: Orientation::Reverse,
        }
    }
}

impl RankingConfig {
    fn query(&self) -> RankQuery {
        RankQuery {
            node_label: self.node_label.clone(),
            rel_type: self.rel_type.clone(),
            orientation: self.orientation,
            limit: self.limit,
        }
    }
}

#[derive(Error, Debug)]
pub enum RankingError {
    #[error("could not open graph session: {0}")]
    Session(StoreError),

    #[error("ranking failed: {primary}; fallback failed: {fallback}")]
    Exhausted { primary: StoreError, fallback: StoreError },
}

impl RankingError {
    pub fn is_unavailable(&self) -> bool {
        match self {
            RankingError::Session(e) => e.is_unavailable(),
            RankingError::Exhausted { fallback, .. } => fallback.is_unavailable(),
        }
    }
}

pub struct RankingGateway {
    cache: Arc<dyn CacheStore>,
    graph: Arc<dyn GraphBackend>,
    config: RankingConfig,
    timeout: Duration,
}

impl RankingGateway {
    pub fn new(cache: Arc<dyn CacheStore>, graph: Arc<dyn GraphBackend>, config: RankingConfig, timeout: Duration) -> Self {
        Self {
            cache,
            graph,
            config,
            timeout,
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub async fn serve(&self) -> Result<RankedResult, RankingError> {
        if let Some(data) = self.cached().await {
            debug!(key = %self.config.cache_key, "ranking served from cache");
            return Ok(RankedResult {
                data,
                method: RankingMethod::PageRank,
                cached: true,
            });
        }

        let mut session = with_timeout(self.timeout, self.graph.session())
            .await
            .map_err(RankingError::Session)?;
        let outcome = self.compute(session.as_mut()).await;
        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close graph session");
        }
        outcome
    }

    /// Cached ranking, if present and readable. Cache faults count as a miss.
    async fn cached(&self) -> Option<Vec<RankingEntry>> {
        let raw = match with_timeout(self.timeout, self.cache.get(&self.config.cache_key)).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "ranking cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(error = %e, "discarding unreadable cached ranking");
                None
            }
        }
    }

    async fn compute(&self, session: &mut dyn GraphSession) -> Result<RankedResult, RankingError> {
        let query = self.config.query();

        let primary = match with_timeout(self.timeout, session.page_rank(&query)).await {
            Ok(data) => {
                self.store(&data).await;
                info!(entries = data.len(), "ranking computed with PageRank");
                return Ok(RankedResult {
                    data,
                    method: RankingMethod::PageRank,
                    cached: false,
                });
            }
            Err(e) => e,
        };

        warn!(error = %primary, "PageRank unavailable, using degree fallback");
        match with_timeout(self.timeout, session.degree_ranking(&query)).await {
            Ok(data) => Ok(RankedResult {
                data,
                method: RankingMethod::Fallback,
                cached: false,
            }),
            Err(fallback) => Err(RankingError::Exhausted { primary, fallback }),
        }
    }

    /// Best-effort cache write
    async fn store(&self, data: &[RankingEntry]) {
        let payload = match serde_json::to_string(data) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "could not serialize ranking");
                return;
            }
        };
        let write = self.cache.set_ex(&self.config.cache_key, &payload, self.config.cache_ttl);
        if let Err(e) = with_timeout(self.timeout, write).await {
            warn!(error = %e, "ranking cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Segment;
    use crate::store::{MemoryCache, StoreResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls {
        sessions: AtomicUsize,
        closed: AtomicUsize,
        page_rank: AtomicUsize,
        degree: AtomicUsize,
    }

    struct StubGraph {
        calls: Arc<Calls>,
        page_rank_ok: bool,
        degree_ok: bool,
    }

    struct StubSession {
        calls: Arc<Calls>,
        page_rank_ok: bool,
        degree_ok: bool,
    }

    fn entry(name: &str, score: f64) -> RankingEntry {
        RankingEntry {
            given_name: name.to_string(),
            family_name: name.to_uppercase(),
            score,
        }
    }

    #[async_trait]
    impl GraphBackend for StubGraph {
        async fn session(&self) -> StoreResult<Box<dyn GraphSession>> {
            self.calls.sessions.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubSession {
                calls: Arc::clone(&self.calls),
                page_rank_ok: self.page_rank_ok,
                degree_ok: self.degree_ok,
            }))
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl GraphSession for StubSession {
        async fn shortest_path(&mut self, _: &str, _: &str) -> StoreResult<Option<Vec<Segment>>> {
            Ok(None)
        }

        async fn relationships(&mut self, _: usize) -> StoreResult<Vec<Segment>> {
            Ok(Vec::new())
        }

        async fn page_rank(&mut self, _: &RankQuery) -> StoreResult<Vec<RankingEntry>> {
            self.calls.page_rank.fetch_add(1, Ordering::SeqCst);
            if self.page_rank_ok {
                Ok(vec![entry("Amine", 0.38), entry("Hassan", 0.27)])
            } else {
                Err(StoreError::OperationFailed("no such procedure".into()))
            }
        }

        async fn degree_ranking(&mut self, _: &RankQuery) -> StoreResult<Vec<RankingEntry>> {
            self.calls.degree.fetch_add(1, Ordering::SeqCst);
            if self.degree_ok {
                Ok(vec![entry("Amine", 3.0)])
            } else {
                Err(StoreError::Unavailable("graph down".into()))
            }
        }

        async fn close(self: Box<Self>) -> StoreResult<()> {
            self.calls.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn gateway(cache: Arc<MemoryCache>, page_rank_ok: bool, degree_ok: bool) -> (RankingGateway, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let graph = StubGraph {
            calls: Arc::clone(&calls),
            page_rank_ok,
            degree_ok,
        };
        let gateway = RankingGateway::new(cache, Arc::new(graph), RankingConfig::default(), Duration::from_secs(3));
        (gateway, calls)
    }

    #[tokio::test]
    async fn test_warm_cache_skips_graph() {
        let cache = Arc::new(MemoryCache::new());
        let cached = serde_json::to_string(&vec![entry("Sofia", 0.5)]).unwrap();
        cache.set_ex("ranking:page_rank", &cached, Duration::from_secs(600)).await.unwrap();

        let (gateway, calls) = gateway(Arc::clone(&cache), true, true);
        let result = gateway.serve().await.unwrap();
        assert!(result.cached);
        assert_eq!(result.method, RankingMethod::PageRank);
        assert_eq!(result.data, vec![entry("Sofia", 0.5)]);
        assert_eq!(calls.sessions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cold_cache_computes_and_stores() {
        let cache = Arc::new(MemoryCache::new());
        let (gateway, calls) = gateway(Arc::clone(&cache), true, true);

        let first = gateway.serve().await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.method, RankingMethod::PageRank);
        let ttl = cache.ttl("ranking:page_rank").await.unwrap();
        assert!(ttl <= Duration::from_secs(600) && ttl > Duration::from_secs(590));

        let second = gateway.serve().await.unwrap();
        assert!(second.cached);
        assert_eq!(second.data, first.data);
        assert_eq!(calls.page_rank.load(Ordering::SeqCst), 1);
        assert_eq!(calls.closed.load(Ordering::SeqCst), 1);
    }

    /// A cache whose every call outlives the gateway's timeout
    struct StalledCache;

    #[async_trait]
    impl CacheStore for StalledCache {
        async fn get(&self, _: &str) -> StoreResult<Option<String>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Some("[]".to_string()))
        }

        async fn set_ex(&self, _: &str, _: &str, _: Duration) -> StoreResult<()> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }

        async fn incr(&self, _: &str) -> StoreResult<i64> {
            Ok(1)
        }

        async fn expire(&self, _: &str, _: Duration) -> StoreResult<bool> {
            Ok(true)
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_cache_is_a_miss() {
        let calls = Arc::new(Calls::default());
        let graph = StubGraph {
            calls: Arc::clone(&calls),
            page_rank_ok: true,
            degree_ok: true,
        };
        let gateway = RankingGateway::new(
            Arc::new(StalledCache),
            Arc::new(graph),
            RankingConfig::default(),
            Duration::from_secs(3),
        );

        let result = gateway.serve().await.unwrap();
        assert!(!result.cached);
        assert_eq!(result.method, RankingMethod::PageRank);
        assert_eq!(result.data.len(), 2);
        assert_eq!(calls.page_rank.load(Ordering::SeqCst), 1);
        assert_eq!(calls.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_is_not_cached() {
        let cache = Arc::new(MemoryCache::new());
        let (gateway, calls) = gateway(Arc::clone(&cache), false, true);

        let result = gateway.serve().await.unwrap();
        assert_eq!(result.method, RankingMethod::Fallback);
        assert!(!result.cached);
        assert_eq!(result.data, vec![entry("Amine", 3.0)]);
        assert!(cache.get("ranking:page_rank").await.unwrap().is_none());

        gateway.serve().await.unwrap();
        assert_eq!(calls.page_rank.load(Ordering::SeqCst), 2);
        assert_eq!(calls.closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_both_strategies_failing() {
        let cache = Arc::new(MemoryCache::new());
        let (gateway, calls) = gateway(cache, false, false);

        let err = gateway.serve().await.unwrap_err();
        assert!(matches!(err, RankingError::Exhausted { .. }));
        assert!(err.is_unavailable());
        assert_eq!(calls.degree.load(Ordering::SeqCst), 1);
        assert_eq!(calls.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_is_a_miss() {
        let cache = Arc::new(MemoryCache::new());
        cache.set_ex("ranking:page_rank", "not json", Duration::from_secs(600)).await.unwrap();
        let (gateway, _) = gateway(Arc::clone(&cache), true, true);

        let result = gateway.serve().await.unwrap();
        assert!(!result.cached);
        assert_eq!(result.data.len(), 2);
    }

    #[test]
    fn test_wire_format() {
        let result = RankedResult {
            data: vec![entry("Amine", 1.0)],
            method: RankingMethod::Fallback,
            cached: false,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "data": [{"givenName": "Amine", "familyName": "AMINE", "score": 1.0}],
                "method": "fallback",
                "cached": false
            })
        );
    }
}
