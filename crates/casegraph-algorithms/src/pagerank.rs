//! PageRank algorithm implementation

use super::common::{GraphView, NodeId};

/// PageRank configuration
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (usually 0.85)
    pub damping_factor: f64,
    /// Maximum number of iterations
    pub iterations: usize,
    /// Stop once the summed score change drops below this value
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            iterations: 20,
            tolerance: 0.0000001,
        }
    }
}

/// Calculate PageRank for the graph view.
///
/// Scores are returned in view index order. Every node starts at 1.0 and
/// receives `(1 - d) + d * sum(score(src) / out_degree(src))` per iteration.
pub fn page_rank(view: &GraphView, config: &PageRankConfig) -> Vec<(NodeId, f64)> {
    let n = view.node_count;

    if n == 0 {
        return Vec::new();
    }

    let mut scores = vec![1.0; n];
    let mut next_scores = vec![0.0; n];

    let d = config.damping_factor;
    let base_score = 1.0 - d;

    for _ in 0..config.iterations {
        let mut total_diff = 0.0;

        for i in 0..n {
            let mut sum_incoming = 0.0;
            for &source_idx in view.predecessors(i) {
                let out_degree = view.out_degree(source_idx);
                if out_degree > 0 {
                    sum_incoming += scores[source_idx] / out_degree as f64;
                }
            }

            next_scores[i] = base_score + d * sum_incoming;
            total_diff += (next_scores[i] - scores[i]).abs();
        }

        std::mem::swap(&mut scores, &mut next_scores);

        if total_diff < config.tolerance {
            break;
        }
    }

    view.index_to_node.iter().copied().zip(scores).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Orientation;

    #[test]
    fn test_empty_view() {
        let view = GraphView::from_edges(&[], &[], Orientation::Natural);
        assert!(page_rank(&view, &PageRankConfig::default()).is_empty());
    }

    #[test]
    fn test_star_center_wins() {
        // 2, 3, 4 all point at 1
        let view = GraphView::from_edges(&[1, 2, 3, 4], &[(2, 1), (3, 1), (4, 1)], Orientation::Natural);
        let scores = page_rank(&view, &PageRankConfig::default());
        assert_eq!(scores.len(), 4);
        assert_eq!(scores[0].0, 1);
        assert!(scores[0].1 > scores[1].1);
        assert!((scores[1].1 - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_reverse_orientation_favours_the_source() {
        // boss -> a, boss -> b; reversed, the boss collects the rank
        let view = GraphView::from_edges(&[1, 2, 3], &[(1, 2), (1, 3)], Orientation::Reverse);
        let scores = page_rank(&view, &PageRankConfig::default());
        assert!(scores[0].1 > scores[1].1);
        assert!(scores[0].1 > scores[2].1);
    }
}
