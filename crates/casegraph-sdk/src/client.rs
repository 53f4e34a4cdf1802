//! CaseGraphClient trait, the interface of the case API

use crate::error::CaseGraphResult;
use crate::models::{CallAlert, HealthStatus, Network, PathResponse, RankingResponse, SuspectRecord};
use async_trait::async_trait;

#[async_trait]
pub trait CaseGraphClient: Send + Sync {
    /// Case file by exact family name
    async fn record(&self, family_name: &str) -> CaseGraphResult<SuspectRecord>;

    /// Full-text search over biographies and crimes, most relevant first
    async fn search(&self, query: &str) -> CaseGraphResult<Vec<SuspectRecord>>;

    /// Shortest connection between two people, by given name
    async fn path(&self, from: &str, to: &str) -> CaseGraphResult<PathResponse>;

    /// The relationship network
    async fn network(&self) -> CaseGraphResult<Network>;

    /// Top influencers
    async fn ranking(&self) -> CaseGraphResult<RankingResponse>;

    /// Report one call to `number`
    async fn report_call(&self, number: &str) -> CaseGraphResult<CallAlert>;

    async fn health(&self) -> CaseGraphResult<HealthStatus>;
}
