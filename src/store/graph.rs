//! Embedded graph backend over the in-memory property graph

use super::{GraphBackend, GraphSession, RankQuery, StoreError, StoreResult};
use crate::algo::{self, Orientation, PageRankConfig};
use crate::graph::property::to_json_map;
use crate::graph::{Edge, GraphStore, Label, Node, NodeId};
use crate::projection::{Entity, Relationship, Segment};
use crate::ranking::RankingEntry;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Graph backend holding a shared [`GraphStore`].
///
/// Path lookup matches people by `givenName`. PageRank is only offered when
/// analytics are enabled, mirroring a server without the analytics plugin.
#[derive(Debug, Clone)]
pub struct EmbeddedGraph {
    store: Arc<RwLock<GraphStore>>,
    analytics_enabled: bool,
    open_sessions: Arc<AtomicUsize>,
    person_label: Label,
    name_property: String,
}

impl EmbeddedGraph {
    pub fn new(store: GraphStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            analytics_enabled: true,
            open_sessions: Arc::new(AtomicUsize::new(0)),
            person_label: Label::new("Person"),
            name_property: "givenName".to_string(),
        }
    }

    pub fn with_analytics(mut self, enabled: bool) -> Self {
        self.analytics_enabled = enabled;
        self
    }

    pub fn store(&self) -> Arc<RwLock<GraphStore>> {
        Arc::clone(&self.store)
    }

    /// Sessions opened and not yet released
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphBackend for EmbeddedGraph {
    async fn session(&self) -> StoreResult<Box<dyn GraphSession>> {
        let open = self.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(open, "graph session opened");
        Ok(Box::new(EmbeddedSession {
            graph: self.clone(),
            _lease: SessionLease(Arc::clone(&self.open_sessions)),
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Decrements the open-session count when the session goes away
#[derive(Debug)]
struct SessionLease(Arc<AtomicUsize>);

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct EmbeddedSession {
    graph: EmbeddedGraph,
    _lease: SessionLease,
}

fn entity(node: &Node) -> Entity {
    Entity {
        identity: node.id.as_u64().into(),
        labels: node.labels.iter().map(|l| l.as_str().to_string()).collect(),
        properties: to_json_map(&node.properties),
    }
}

fn relationship(edge: &Edge) -> Relationship {
    Relationship {
        rel_type: edge.edge_type.as_str().to_string(),
        properties: to_json_map(&edge.properties),
    }
}

fn segment(store: &GraphStore, edge: &Edge, from: NodeId, to: NodeId) -> StoreResult<Segment> {
    let node = |id: NodeId| {
        store
            .get_node(id)
            .map(entity)
            .ok_or_else(|| StoreError::OperationFailed(format!("dangling relationship endpoint {id}")))
    };
    Ok(Segment::new(node(from)?, relationship(edge), node(to)?))
}

fn ranking_entry(node: &Node, score: f64) -> RankingEntry {
    let text = |key: &str| {
        node.get_property(key)
            .and_then(|v| v.as_string())
            .unwrap_or_default()
            .to_string()
    };
    RankingEntry {
        given_name: text("givenName"),
        family_name: text("familyName"),
        score,
    }
}

fn ranked(store: &GraphStore, scores: Vec<(u64, f64)>, limit: usize) -> Vec<RankingEntry> {
    algo::top_k(scores, limit)
        .into_iter()
        .filter_map(|(id, score)| store.get_node(NodeId::new(id)).map(|n| ranking_entry(n, score)))
        .collect()
}

#[async_trait]
impl GraphSession for EmbeddedSession {
    async fn shortest_path(&mut self, from: &str, to: &str) -> StoreResult<Option<Vec<Segment>>> {
        let store = self.graph.store.read().await;
        let label = &self.graph.person_label;
        let name = &self.graph.name_property;

        let (Some(source), Some(target)) = (store.find_node(label, name, from), store.find_node(label, name, to)) else {
            return Ok(None);
        };

        let view = algo::build_view(&store, None, None, Orientation::Undirected);
        let Some(found) = algo::bfs(&view, source.id.as_u64(), target.id.as_u64()) else {
            return Ok(None);
        };

        found
            .path
            .windows(2)
            .map(|pair| {
                let (a, b) = (NodeId::new(pair[0]), NodeId::new(pair[1]));
                let edge = store
                    .edge_between(a, b)
                    .ok_or_else(|| StoreError::OperationFailed(format!("no relationship between {a} and {b}")))?;
                segment(&store, edge, a, b)
            })
            .collect::<StoreResult<Vec<_>>>()
            .map(Some)
    }

    async fn relationships(&mut self, limit: usize) -> StoreResult<Vec<Segment>> {
        let store = self.graph.store.read().await;
        store
            .all_edges()
            .take(limit)
            .map(|edge| segment(&store, edge, edge.source, edge.target))
            .collect()
    }

    async fn page_rank(&mut self, query: &RankQuery) -> StoreResult<Vec<RankingEntry>> {
        if !self.graph.analytics_enabled {
            return Err(StoreError::OperationFailed(
                "graph analytics procedures are not installed".to_string(),
            ));
        }
        let store = self.graph.store.read().await;
        let view = algo::build_view(&store, Some(&query.node_label), Some(&query.rel_type), query.orientation);
        let scores = algo::page_rank(&view, &PageRankConfig::default());
        Ok(ranked(&store, scores, query.limit))
    }

    async fn degree_ranking(&mut self, query: &RankQuery) -> StoreResult<Vec<RankingEntry>> {
        let store = self.graph.store.read().await;
        let label = Label::new(query.node_label.as_str());
        // targets of any label count towards a person's degree
        let view = algo::build_view(&store, None, Some(&query.rel_type), Orientation::Natural);
        let degrees = algo::out_degree_centrality(&view)
            .into_iter()
            .filter(|(id, _)| store.get_node(NodeId::new(*id)).is_some_and(|n| n.has_label(&label)))
            .collect();
        Ok(ranked(&store, degrees, query.limit))
    }

    async fn close(self: Box<Self>) -> StoreResult<()> {
        debug!("graph session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::normalize_identity;

    fn person(store: &mut GraphStore, given: &str, family: &str) -> NodeId {
        let id = store.create_node("Person");
        store.set_node_property(id, "givenName", given).unwrap();
        store.set_node_property(id, "familyName", family).unwrap();
        id
    }

    /// boss -DIRECTS-> lieutenant -DIRECTS-> runner, hacker -KNOWS-> lieutenant, loner
    fn network() -> GraphStore {
        let mut store = GraphStore::new();
        let boss = person(&mut store, "Amine", "CHARRO");
        let lieutenant = person(&mut store, "Hassan", "EL-FASSI");
        let runner = person(&mut store, "Said", "OUALI");
        let hacker = person(&mut store, "Karim", "DAOUDI");
        person(&mut store, "Rachid", "TALEB");
        store.create_edge(boss, lieutenant, "DIRECTS").unwrap();
        store.create_edge(lieutenant, runner, "DIRECTS").unwrap();
        store.create_edge(hacker, lieutenant, "KNOWS").unwrap();
        store
    }

    fn query() -> RankQuery {
        RankQuery {
            node_label: "Person".to_string(),
            rel_type: "DIRECTS".to_string(),
            orientation: Orientation::Reverse,
            limit: 5,
        }
    }

    #[tokio::test]
    async fn test_shortest_path_ignores_direction() {
        let graph = EmbeddedGraph::new(network());
        let mut session = graph.session().await.unwrap();
        let segments = session.shortest_path("Karim", "Said").await.unwrap().unwrap();
        session.close().await.unwrap();

        let hops: Vec<(String, String, String)> = segments
            .iter()
            .map(|s| {
                (
                    normalize_identity(&s.start.identity),
                    s.relationship.rel_type.clone(),
                    normalize_identity(&s.end.identity),
                )
            })
            .collect();
        assert_eq!(
            hops,
            vec![
                ("4".to_string(), "KNOWS".to_string(), "2".to_string()),
                ("2".to_string(), "DIRECTS".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(segments[0].start.properties["givenName"], "Karim");
    }

    #[tokio::test]
    async fn test_shortest_path_unknown_or_unreachable() {
        let graph = EmbeddedGraph::new(network());
        let mut session = graph.session().await.unwrap();
        assert!(session.shortest_path("Amine", "Nobody").await.unwrap().is_none());
        assert!(session.shortest_path("Amine", "Rachid").await.unwrap().is_none());
        assert_eq!(session.shortest_path("Amine", "Amine").await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_relationships_respect_limit() {
        let graph = EmbeddedGraph::new(network());
        let mut session = graph.session().await.unwrap();
        assert_eq!(session.relationships(200).await.unwrap().len(), 3);
        let first = session.relationships(1).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].relationship.rel_type, "DIRECTS");
        assert_eq!(first[0].start.labels, vec!["Person".to_string()]);
    }

    #[tokio::test]
    async fn test_page_rank_puts_boss_first() {
        let graph = EmbeddedGraph::new(network());
        let mut session = graph.session().await.unwrap();
        let ranking = session.page_rank(&query()).await.unwrap();
        assert_eq!(ranking.len(), 5);
        assert_eq!(ranking[0].family_name, "CHARRO");
        assert!(ranking.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_page_rank_unavailable_without_analytics() {
        let graph = EmbeddedGraph::new(network()).with_analytics(false);
        let mut session = graph.session().await.unwrap();
        assert!(matches!(session.page_rank(&query()).await, Err(StoreError::OperationFailed(_))));

        let fallback = session.degree_ranking(&query()).await.unwrap();
        let names: Vec<&str> = fallback.iter().map(|e| e.given_name.as_str()).collect();
        assert_eq!(names, vec!["Amine", "Hassan"]);
        assert_eq!(fallback[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_degree_counts_edges_to_any_target() {
        let mut store = network();
        let lieutenant = NodeId::new(2);
        let car = store.create_node("Vehicle");
        let depot = store.create_node("Place");
        store.create_edge(lieutenant, car, "DIRECTS").unwrap();
        store.create_edge(lieutenant, depot, "DIRECTS").unwrap();
        store.create_edge(car, depot, "DIRECTS").unwrap();

        let graph = EmbeddedGraph::new(store).with_analytics(false);
        let mut session = graph.session().await.unwrap();
        let fallback = session.degree_ranking(&query()).await.unwrap();
        let ranked: Vec<(&str, f64)> = fallback.iter().map(|e| (e.given_name.as_str(), e.score)).collect();
        assert_eq!(ranked, vec![("Hassan", 3.0), ("Amine", 1.0)]);
    }

    #[tokio::test]
    async fn test_sessions_are_released() {
        let graph = EmbeddedGraph::new(network());
        let first = graph.session().await.unwrap();
        let second = graph.session().await.unwrap();
        assert_eq!(graph.open_sessions(), 2);

        first.close().await.unwrap();
        assert_eq!(graph.open_sessions(), 1);
        drop(second);
        assert_eq!(graph.open_sessions(), 0);
    }
}
