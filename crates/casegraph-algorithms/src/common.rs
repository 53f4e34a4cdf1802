//! Shared utilities for graph algorithms
//!
//! Provides a read-only view of a graph projection for algorithm execution.

use std::collections::HashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// Edge direction applied when a projection is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Keep stored direction
    #[default]
    Natural,
    /// Flip every edge
    Reverse,
    /// Store each edge in both directions
    Undirected,
}

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// Node indices follow the order in which node ids were supplied, so algorithms
/// that need a deterministic tie-break can rely on index order.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,

    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,
}

impl GraphView {
    /// Build a view from a node list and a list of directed edges.
    ///
    /// Edges that reference a node outside `nodes` are dropped. Duplicate
    /// node ids keep their first position.
    pub fn from_edges(nodes: &[NodeId], edges: &[(NodeId, NodeId)], orientation: Orientation) -> Self {
        let mut index_to_node = Vec::with_capacity(nodes.len());
        let mut node_to_index = HashMap::with_capacity(nodes.len());
        for &id in nodes {
            if !node_to_index.contains_key(&id) {
                node_to_index.insert(id, index_to_node.len());
                index_to_node.push(id);
            }
        }

        let node_count = index_to_node.len();
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];

        for &(source, target) in edges {
            let (Some(&u), Some(&v)) = (node_to_index.get(&source), node_to_index.get(&target)) else {
                continue;
            };
            match orientation {
                Orientation::Natural => {
                    outgoing[u].push(v);
                    incoming[v].push(u);
                }
                Orientation::Reverse => {
                    outgoing[v].push(u);
                    incoming[u].push(v);
                }
                Orientation::Undirected => {
                    outgoing[u].push(v);
                    incoming[v].push(u);
                    if u != v {
                        outgoing[v].push(u);
                        incoming[u].push(v);
                    }
                }
            }
        }

        Self::from_adjacency_list(index_to_node, node_to_index, outgoing, incoming)
    }

    /// Flatten adjacency lists into CSR arrays
    pub fn from_adjacency_list(
        index_to_node: Vec<NodeId>,
        node_to_index: HashMap<NodeId, usize>,
        outgoing: Vec<Vec<usize>>,
        incoming: Vec<Vec<usize>>,
    ) -> Self {
        let node_count = index_to_node.len();
        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();

        out_offsets.push(0);
        for neighbors in outgoing {
            out_targets.extend(neighbors);
            out_offsets.push(out_targets.len());
        }

        in_offsets.push(0);
        for sources in incoming {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
        }
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.out_targets[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        &self.in_sources[self.in_offsets[idx]..self.in_offsets[idx + 1]]
    }

    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }
}
