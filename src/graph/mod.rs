//! In-memory property graph
//!
//! - Nodes with ordered labels and properties
//! - Directed, typed edges with properties; multiple edges per node pair
//! - Insertion-ordered storage with adjacency, label and edge-type indices

pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeType, Label, NodeId};
