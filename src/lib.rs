//! CaseGraph
//!
//! Crime-analytics API over three stores: suspect case files (document
//! store), the people graph (graph store) and a key-value cache.
//!
//! - [`projection`]: graph segments to the `{nodes, links}` drawing model
//! - [`ranking`]: cached influence ranking with a degree fallback
//! - [`alerts`]: fixed-window call counters
//! - [`store`]: store capabilities and their embedded implementations
//! - [`http`]: the axum API
//!
//! ## Example Usage
//!
//! ```rust
//! use casegraph::projection::{project, Entity, ProjectionOptions, Relationship, Segment};
//!
//! let amine = Entity::new(1u64).with_label("Person").with_property("givenName", "Amine");
//! let hassan = Entity::new(2u64).with_label("Person").with_property("givenName", "Hassan");
//! let segments = vec![Segment::new(amine, Relationship::new("DIRECTS"), hassan)];
//!
//! let projection = project(&segments, &ProjectionOptions::default());
//! assert_eq!(projection.nodes.len(), 2);
//! assert_eq!(projection.links[0].label, "DIRECTS");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod alerts;
pub mod algo;
pub mod config;
pub mod graph;
pub mod http;
pub mod projection;
pub mod protocol;
pub mod ranking;
pub mod seed;
pub mod store;

pub use alerts::{AlertPolicy, CallAlert, CallCounter};
pub use config::{CacheBackend, ServerConfig};
pub use graph::{Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStore, Label, Node, NodeId, PropertyMap, PropertyValue};
pub use http::{router, ApiError, AppState, HttpServer};
pub use projection::{normalize_identity, project, GraphProjection, ProjectionOptions, RawIdentity, Segment};
pub use ranking::{RankedResult, RankingConfig, RankingEntry, RankingGateway, RankingMethod};
pub use store::{CacheStore, DocumentStore, GraphBackend, GraphSession, StoreError, StoreResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
