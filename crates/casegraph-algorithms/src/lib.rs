pub mod common;
pub mod degree;
pub mod pagerank;
pub mod pathfinding;

pub use common::{GraphView, NodeId, Orientation};
pub use degree::{out_degree_centrality, top_k};
pub use pagerank::{page_rank, PageRankConfig};
pub use pathfinding::{bfs, PathResult};
