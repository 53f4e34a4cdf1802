//! Store capabilities
//!
//! Each backing store is reached through a trait object built once at start-up
//! and handed to request handlers through shared state:
//!
//! - [`DocumentStore`]: case files by name and full-text search
//! - [`GraphBackend`] / [`GraphSession`]: traversal and ranking, one session per request
//! - [`CacheStore`]: string values with expiry and atomic counters
//!
//! Embedded in-memory implementations ship for all three; [`RedisCache`]
//! speaks RESP to an external Redis-compatible server.

pub mod cache;
pub mod document;
pub mod error;
pub mod graph;
pub mod redis;

use crate::projection::Segment;
use crate::ranking::RankingEntry;
use async_trait::async_trait;
use casegraph_algorithms::Orientation;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub use cache::MemoryCache;
pub use document::{MemoryDocumentStore, SearchHit};
pub use error::{StoreError, StoreResult};
pub use graph::EmbeddedGraph;
pub use redis::RedisCache;

/// Document lookup and relevance-ranked text search
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Exact match on the store's name field
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Value>>;

    /// Documents matching any query term, most relevant first
    async fn text_search(&self, query: &str) -> StoreResult<Vec<SearchHit>>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Parameters of a ranking computation over a relationship projection
#[derive(Debug, Clone)]
pub struct RankQuery {
    pub node_label: String,
    pub rel_type: String,
    pub orientation: Orientation,
    pub limit: usize,
}

/// Opens request-scoped sessions against the graph store
#[async_trait]
pub trait GraphBackend: Send + Sync {
    async fn session(&self) -> StoreResult<Box<dyn GraphSession>>;

    async fn ping(&self) -> StoreResult<()>;
}

/// A graph session. Never shared between requests; released by [`GraphSession::close`]
/// or, failing that, on drop.
#[async_trait]
pub trait GraphSession: Send {
    /// Shortest path between the people named `from` and `to`, ignoring
    /// direction. `None` when either is unknown or they are not connected.
    async fn shortest_path(&mut self, from: &str, to: &str) -> StoreResult<Option<Vec<Segment>>>;

    /// The first `limit` relationships in store order
    async fn relationships(&mut self, limit: usize) -> StoreResult<Vec<Segment>>;

    /// Centrality ranking (PageRank) over the projection described by `query`
    async fn page_rank(&mut self, query: &RankQuery) -> StoreResult<Vec<RankingEntry>>;

    /// Out-degree ranking over relationships of `query.rel_type`
    async fn degree_ranking(&mut self, query: &RankQuery) -> StoreResult<Vec<RankingEntry>>;

    async fn close(self: Box<Self>) -> StoreResult<()>;
}

/// Key-value cache with expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Atomically increment the integer under `key`, starting from 0
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Set the expiry of an existing key. Returns false when the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Bound a store call; expiry is reported as [`StoreError::Timeout`]
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
