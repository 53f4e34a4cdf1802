//! CaseGraph SDK, the client library for the CaseGraph API
//!
//! [`RemoteClient`] talks to a running server over HTTP and implements the
//! [`CaseGraphClient`] trait.
//!
//! # Quick Start
//!
//! ```no_run
//! use casegraph_sdk::{CaseGraphClient, RemoteClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = RemoteClient::new("http://localhost:5000");
//!     let ranking = client.ranking().await.unwrap();
//!     for entry in &ranking.data {
//!         println!("{} {}: {:.3}", entry.given_name, entry.family_name, entry.score);
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod remote;

pub use client::CaseGraphClient;
pub use error::{CaseGraphError, CaseGraphResult};
pub use models::{
    CallAlert, ErrorBody, GraphLink, GraphNode, HealthStatus, Network, PathData, PathResponse, RankingEntry,
    RankingResponse, StoreHealth, SuspectRecord,
};
pub use remote::RemoteClient;
