//! Shared request state

use crate::alerts::CallCounter;
use crate::projection::ProjectionOptions;
use crate::ranking::RankingGateway;
use crate::store::{CacheStore, DocumentStore, GraphBackend};
use std::sync::Arc;
use std::time::Duration;

/// Number of relationships returned by the full-network view
pub const NETWORK_LIMIT: usize = 200;

/// Capabilities built once at start-up and cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn DocumentStore>,
    pub graph: Arc<dyn GraphBackend>,
    pub cache: Arc<dyn CacheStore>,
    pub ranking: Arc<RankingGateway>,
    pub alerts: Arc<CallCounter>,
    pub projection: Arc<ProjectionOptions>,
    pub store_timeout: Duration,
}

impl AppState {
    /// Wire the ranking gateway and call counter over the given stores
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        graph: Arc<dyn GraphBackend>,
        cache: Arc<dyn CacheStore>,
        store_timeout: Duration,
    ) -> Self {
        let ranking = RankingGateway::new(Arc::clone(&cache), Arc::clone(&graph), Default::default(), store_timeout);
        let alerts = CallCounter::new(Arc::clone(&cache), Default::default(), store_timeout);
        Self {
            documents,
            graph,
            cache,
            ranking: Arc::new(ranking),
            alerts: Arc::new(alerts),
            projection: Arc::new(ProjectionOptions::default()),
            store_timeout,
        }
    }
}
