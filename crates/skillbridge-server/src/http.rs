//! HTTP read surface for the audit log.
//!
//! Uses axum to expose `/audit/recent`, `/audit/query`, and
//! `/audit/summary` as JSON endpoints for the monitoring dashboard. Reads
//! are diagnostic: storage failures surface as HTTP errors rather than
//! being swallowed.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use skillbridge_audit::{AuditSummary, InvocationRecord, QueryApi, QueryParams};
use skillbridge_types::BridgeError;

/// Shared state for HTTP handlers.
struct AppState {
    query: QueryApi,
}

/// Build the audit read router.
pub fn router(query: QueryApi, cors: CorsLayer) -> Router {
    let state = Arc::new(AppState { query });

    Router::new()
        .route("/audit/recent", get(recent_handler))
        .route("/audit/query", get(query_handler))
        .route("/audit/summary", get(summary_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server. Binds to the given address and serves until the
/// `shutdown` receiver flips to true.
pub async fn serve(
    listen_addr: &str,
    query: QueryApi,
    cors: CorsLayer,
    shutdown: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = listen_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address {listen_addr:?}: {e}"))?;

    let app = router(query, cors);

    info!(addr = %addr, "starting audit read surface");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    let mut shutdown = shutdown;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|&v| v).await;
        })
        .await
        .map_err(|e| anyhow::anyhow!("http server error: {e}"))
}

/// Build the CORS layer from configured origins. An empty list allows all
/// origins (development mode).
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        warn!("CORS: allowing all origins; set cors_origins in production");
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// A read failure rendered as an HTTP response: bad input is the caller's
/// fault, everything else is a storage-side 500.
struct ApiError(BridgeError);

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BridgeError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct RecentParams {
    limit: Option<usize>,
}

async fn recent_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<InvocationRecord>>, ApiError> {
    Ok(Json(state.query.recent(params.limit).await?))
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<InvocationRecord>>, ApiError> {
    Ok(Json(state.query.query(params).await?))
}

async fn summary_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AuditSummary>, ApiError> {
    Ok(Json(state.query.summary().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use skillbridge_audit::{AuditLogger, NewInvocation};
    use tempfile::NamedTempFile;
    use tower::util::ServiceExt;

    async fn seeded_router() -> (NamedTempFile, Router) {
        let tmp = NamedTempFile::new().unwrap();
        let logger = AuditLogger::new(tmp.path());
        logger
            .record(NewInvocation::success("browse_skills", None, 12.0))
            .await;
        logger
            .record(NewInvocation::failure("search_talent", None, "boom", 40.0))
            .await;

        let router = router(QueryApi::new(logger), cors_layer(&[]));
        (tmp, router)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn recent_returns_records_newest_first() {
        let (_tmp, router) = seeded_router().await;
        let (status, body) = get_json(router, "/audit/recent?limit=10").await;

        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["tool_name"], "search_talent");
        assert_eq!(records[1]["tool_name"], "browse_skills");
    }

    #[tokio::test]
    async fn query_filters_errors_only() {
        let (_tmp, router) = seeded_router().await;
        let (status, body) = get_json(router, "/audit/query?errors_only=true").await;

        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["tool_name"], "search_talent");
        assert_eq!(records[0]["success"], false);
    }

    #[tokio::test]
    async fn query_rejects_bad_timestamp_with_400() {
        let (_tmp, router) = seeded_router().await;
        let (status, body) = get_json(router, "/audit/query?since=yesterday").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("invalid query parameter"));
    }

    #[tokio::test]
    async fn summary_reports_overall_and_per_tool() {
        let (_tmp, router) = seeded_router().await;
        let (status, body) = get_json(router, "/audit/summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall"]["total_calls"], 2);
        assert_eq!(body["overall"]["error_rate_pct"], 50.0);
        assert_eq!(body["per_tool"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn read_failure_surfaces_as_500() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("missing").join("audit.db");
        let router = router(QueryApi::new(AuditLogger::new(&bogus)), cors_layer(&[]));

        let (status, body) = get_json(router, "/audit/recent").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("initialization failed"));
    }
}
