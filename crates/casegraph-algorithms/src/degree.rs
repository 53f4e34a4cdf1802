//! Degree centrality and top-k selection

use super::common::{GraphView, NodeId};

/// Out-degree of every node that has at least one outgoing edge, in view order.
///
/// Nodes without outgoing edges are omitted, matching a pattern match that
/// requires the relationship to exist.
pub fn out_degree_centrality(view: &GraphView) -> Vec<(NodeId, f64)> {
    (0..view.node_count)
        .filter_map(|idx| {
            let degree = view.out_degree(idx);
            (degree > 0).then(|| (view.index_to_node[idx], degree as f64))
        })
        .collect()
}

/// Keep the `k` highest scores.
///
/// The sort is stable, so equal scores keep their incoming order.
pub fn top_k(mut scores: Vec<(NodeId, f64)>, k: usize) -> Vec<(NodeId, f64)> {
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    scores.truncate(k);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Orientation;

    #[test]
    fn test_out_degree_skips_sinks() {
        let view = GraphView::from_edges(&[1, 2, 3], &[(1, 2), (1, 3), (2, 3)], Orientation::Natural);
        assert_eq!(out_degree_centrality(&view), vec![(1, 2.0), (2, 1.0)]);
    }

    #[test]
    fn test_top_k_is_stable() {
        let scores = vec![(1, 1.0), (2, 3.0), (3, 1.0), (4, 3.0), (5, 0.5)];
        assert_eq!(top_k(scores, 3), vec![(2, 3.0), (4, 3.0), (1, 1.0)]);
    }

    #[test]
    fn test_top_k_shorter_than_k() {
        assert_eq!(top_k(vec![(7, 2.0)], 5), vec![(7, 2.0)]);
    }
}
