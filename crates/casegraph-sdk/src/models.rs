//! Data models for the CaseGraph SDK
//!
//! Mirrors of the JSON bodies served by the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A suspect case file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuspectRecord {
    pub family_name: String,
    pub given_name: String,
    pub address: String,
    pub crimes: Vec<String>,
    pub biography: String,
    pub description: String,
    /// Relevance, present on search results only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// `{nodes, links}` drawing model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    /// Raw `(start, relationship, end)` segments
    pub segments: Vec<Value>,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResponse {
    #[serde(rename = "pathFound")]
    pub path_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PathData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub given_name: String,
    pub family_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    pub data: Vec<RankingEntry>,
    /// `pageRank` or `fallback`
    pub method: String,
    pub cached: bool,
}

impl RankingResponse {
    /// Whether the server fell back to degree counting
    pub fn is_degraded(&self) -> bool {
        self.method == "fallback"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAlert {
    pub number: String,
    pub call_count: i64,
    pub high_alert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHealth {
    pub document: String,
    pub graph: String,
    pub cache: String,
}

/// Server health information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub stores: StoreHealth,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}
