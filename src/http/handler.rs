//! HTTP handlers for the case API

use super::error::{ApiError, ApiResult};
use super::state::{AppState, NETWORK_LIMIT};
use crate::alerts::CallAlert;
use crate::projection::{project, GraphProjection, ProjectedLink, ProjectedNode, Segment};
use crate::ranking::RankedResult;
use crate::store::{with_timeout, GraphSession, StoreResult};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// A phone number sent either as text or as a bare JSON number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PhoneNumber {
    Text(String),
    Digits(serde_json::Number),
}

impl PhoneNumber {
    pub fn into_text(self) -> String {
        match self {
            PhoneNumber::Text(text) => text,
            PhoneNumber::Digits(digits) => digits.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallReport {
    pub number: Option<PhoneNumber>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PathData {
    pub segments: Vec<Segment>,
    pub nodes: Vec<ProjectedNode>,
    pub links: Vec<ProjectedLink>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PathResponse {
    #[serde(rename = "pathFound")]
    pub path_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathData>,
}

/// A present, non-blank parameter
fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::missing(field)),
    }
}

/// Run `op` on a fresh graph session and release the session afterwards
async fn in_session<T, F, Fut>(state: &AppState, op: F) -> ApiResult<T>
where
    F: FnOnce(Box<dyn GraphSession>, Duration) -> Fut,
    Fut: Future<Output = (Box<dyn GraphSession>, StoreResult<T>)>,
{
    let session = with_timeout(state.store_timeout, state.graph.session()).await?;
    let (session, result) = op(session, state.store_timeout).await;
    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close graph session");
    }
    Ok(result?)
}

/// GET /records/{name}
pub async fn record_handler(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Value>> {
    debug!(%name, "record lookup");
    with_timeout(state.store_timeout, state.documents.find_by_name(&name))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Suspect {name} not found")))
}

/// GET /records/search?q=
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Value>>> {
    let q = required(params.q, "q")?;
    let hits = with_timeout(state.store_timeout, state.documents.text_search(&q)).await?;
    debug!(query = %q, hits = hits.len(), "record search");
    Ok(Json(hits.into_iter().map(|h| h.into_scored_document()).collect()))
}

/// GET /graph/path?from=&to=
pub async fn path_handler(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> ApiResult<Json<PathResponse>> {
    let from = required(params.from, "from")?;
    let to = required(params.to, "to")?;

    let found = in_session(&state, |mut session, limit| async move {
        let result = with_timeout(limit, session.shortest_path(&from, &to)).await;
        (session, result)
    })
    .await?;

    let response = match found {
        Some(segments) => {
            let GraphProjection { nodes, links } = project(&segments, &state.projection);
            PathResponse {
                path_found: true,
                data: Some(PathData { segments, nodes, links }),
            }
        }
        None => PathResponse {
            path_found: false,
            data: None,
        },
    };
    Ok(Json(response))
}

/// GET /graph/all
pub async fn network_handler(State(state): State<AppState>) -> ApiResult<Json<GraphProjection>> {
    let segments = in_session(&state, |mut session, limit| async move {
        let result = with_timeout(limit, session.relationships(NETWORK_LIMIT)).await;
        (session, result)
    })
    .await?;
    Ok(Json(project(&segments, &state.projection)))
}

/// GET /graph/ranking
pub async fn ranking_handler(State(state): State<AppState>) -> ApiResult<Json<RankedResult>> {
    Ok(Json(state.ranking.serve().await?))
}

/// POST /alerts/call
pub async fn call_alert_handler(
    State(state): State<AppState>,
    payload: Result<Json<CallReport>, JsonRejection>,
) -> ApiResult<Json<CallAlert>> {
    let Json(report) = payload.map_err(|rejection| ApiError::ValidationFailed {
        field: "body".to_string(),
        reason: rejection.body_text(),
    })?;
    let number = required(report.number.map(PhoneNumber::into_text), "number")?;
    Ok(Json(state.alerts.record(number.trim()).await?))
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let limit = state.store_timeout;
    let status = |result: StoreResult<()>| match result {
        Ok(()) => "up",
        Err(e) => {
            warn!(error = %e, "store ping failed");
            "down"
        }
    };
    let document = status(with_timeout(limit, state.documents.ping()).await);
    let graph = status(with_timeout(limit, state.graph.ping()).await);
    let cache = status(with_timeout(limit, state.cache.ping()).await);

    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "stores": {
            "document": document,
            "graph": graph,
            "cache": cache,
        }
    }))
}
