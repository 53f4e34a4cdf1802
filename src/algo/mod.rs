//! Graph algorithms module
//!
//! Algorithms live in the `casegraph-algorithms` crate; this module projects
//! the store into the view those algorithms run on.

use crate::graph::{EdgeType, GraphStore, Label};
use casegraph_algorithms::NodeId as AlgoNodeId;

pub use casegraph_algorithms::{
    bfs, out_degree_centrality, page_rank, top_k, GraphView, Orientation, PageRankConfig, PathResult,
};

/// Build a GraphView from the store for algorithm execution.
///
/// `node_label` restricts the projection to nodes carrying that label and
/// `edge_type` to relationships of that type; edges leaving the projected
/// node set are dropped. Node order follows store order.
pub fn build_view(
    store: &GraphStore,
    node_label: Option<&str>,
    edge_type: Option<&str>,
    orientation: Orientation,
) -> GraphView {
    let nodes: Vec<AlgoNodeId> = match node_label {
        Some(label) => store
            .get_nodes_by_label(&Label::new(label))
            .iter()
            .map(|n| n.id.as_u64())
            .collect(),
        None => store.all_nodes().map(|n| n.id.as_u64()).collect(),
    };

    let edges: Vec<(AlgoNodeId, AlgoNodeId)> = match edge_type {
        Some(edge_type) => store
            .get_edges_by_type(&EdgeType::new(edge_type))
            .iter()
            .map(|e| (e.source.as_u64(), e.target.as_u64()))
            .collect(),
        None => store
            .all_edges()
            .map(|e| (e.source.as_u64(), e.target.as_u64()))
            .collect(),
    };

    GraphView::from_edges(&nodes, &edges, orientation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_view_filters_label_and_type() {
        let mut store = GraphStore::new();
        let boss = store.create_node("Person");
        let aide = store.create_node("Person");
        let car = store.create_node("Vehicle");
        store.create_edge(boss, aide, "DIRECTS").unwrap();
        store.create_edge(boss, aide, "KNOWS").unwrap();
        store.create_edge(aide, car, "DIRECTS").unwrap();

        let view = build_view(&store, Some("Person"), Some("DIRECTS"), Orientation::Natural);
        assert_eq!(view.node_count, 2);
        assert_eq!(view.edge_count(), 1);

        let all = build_view(&store, None, None, Orientation::Undirected);
        assert_eq!(all.node_count, 3);
        assert_eq!(all.edge_count(), 6);
    }

    #[test]
    fn test_reverse_pagerank_ranks_the_boss_first() {
        let mut store = GraphStore::new();
        let boss = store.create_node("Person");
        let a = store.create_node("Person");
        let b = store.create_node("Person");
        store.create_edge(boss, a, "DIRECTS").unwrap();
        store.create_edge(boss, b, "DIRECTS").unwrap();

        let view = build_view(&store, Some("Person"), Some("DIRECTS"), Orientation::Reverse);
        let ranked = top_k(page_rank(&view, &PageRankConfig::default()), 1);
        assert_eq!(ranked[0].0, boss.as_u64());
    }
}
