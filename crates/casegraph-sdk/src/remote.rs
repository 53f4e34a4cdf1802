//! RemoteClient, the HTTP client for a running CaseGraph server

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::client::CaseGraphClient;
use crate::error::{CaseGraphError, CaseGraphResult};
use crate::models::{CallAlert, ErrorBody, HealthStatus, Network, PathResponse, RankingResponse, SuspectRecord};

/// Network client for the CaseGraph HTTP API.
pub struct RemoteClient {
    http_base_url: String,
    http_client: Client,
}

impl RemoteClient {
    /// Create a new RemoteClient for the given HTTP base URL.
    ///
    /// # Example
    /// ```no_run
    /// # use casegraph_sdk::RemoteClient;
    /// let client = RemoteClient::new("http://localhost:5000");
    /// ```
    pub fn new(http_base_url: &str) -> Self {
        Self {
            http_base_url: http_base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.http_base_url
    }

    /// Build `{base}/{segments...}?{params}`, escaping every segment
    fn endpoint(&self, segments: &[&str], params: &[(&str, &str)]) -> CaseGraphResult<Url> {
        let mut url = Url::parse(&self.http_base_url)
            .map_err(|e| CaseGraphError::ConnectionError(format!("invalid base URL {}: {}", self.http_base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| CaseGraphError::ConnectionError(format!("base URL cannot be a base: {}", self.http_base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str], params: &[(&str, &str)]) -> CaseGraphResult<T> {
        let url = self.endpoint(segments, params)?;
        let response = self.http_client.get(url).send().await?;
        Self::decode(response).await
    }

    /// Deserialize a success body, or turn the error body into a typed error
    async fn decode<T: DeserializeOwned>(response: Response) -> CaseGraphResult<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        let body: ErrorBody = response.json().await.unwrap_or_else(|_| ErrorBody {
            code: "UNKNOWN".to_string(),
            message: "Unknown error".to_string(),
            details: None,
        });
        Err(match status {
            StatusCode::NOT_FOUND => CaseGraphError::NotFound(body.message),
            StatusCode::BAD_REQUEST => CaseGraphError::InvalidRequest(body.message),
            _ => CaseGraphError::ServerError {
                status: status.as_u16(),
                code: body.code,
                message: match body.details {
                    Some(details) => format!("{} ({})", body.message, details),
                    None => body.message,
                },
            },
        })
    }
}

#[async_trait]
impl CaseGraphClient for RemoteClient {
    async fn record(&self, family_name: &str) -> CaseGraphResult<SuspectRecord> {
        self.get(&["records", family_name], &[]).await
    }

    async fn search(&self, query: &str) -> CaseGraphResult<Vec<SuspectRecord>> {
        self.get(&["records", "search"], &[("q", query)]).await
    }

    async fn path(&self, from: &str, to: &str) -> CaseGraphResult<PathResponse> {
        self.get(&["graph", "path"], &[("from", from), ("to", to)]).await
    }

    async fn network(&self) -> CaseGraphResult<Network> {
        self.get(&["graph", "all"], &[]).await
    }

    async fn ranking(&self) -> CaseGraphResult<RankingResponse> {
        self.get(&["graph", "ranking"], &[]).await
    }

    async fn report_call(&self, number: &str) -> CaseGraphResult<CallAlert> {
        let url = self.endpoint(&["alerts", "call"], &[])?;
        let response = self.http_client.post(url).json(&json!({ "number": number })).send().await?;
        Self::decode(response).await
    }

    async fn health(&self) -> CaseGraphResult<HealthStatus> {
        self.get(&["health"], &[]).await
    }
}
