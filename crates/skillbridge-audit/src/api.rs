//! Validated read-side API over the audit log.
//!
//! [`QueryApi`] is what the boundary adapters (HTTP handlers, audit tools)
//! consume. It owns input validation and clamping -- the store executes
//! whatever it is given -- and returns `serde`-ready types for whichever
//! transport is asking.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use skillbridge_types::BridgeError;

use crate::filter::AuditFilter;
use crate::logger::AuditLogger;
use crate::record::InvocationRecord;
use crate::stats::AuditSummary;

/// Hard cap on result set size for any read.
pub const MAX_LIMIT: usize = 500;
/// Default for `recent` when the caller names no limit.
pub const DEFAULT_RECENT_LIMIT: usize = 50;
/// Default for filtered queries when the caller names no limit.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Raw filter parameters as they arrive from a transport (query string,
/// tool arguments). Timestamps are unparsed strings at this point.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryParams {
    pub tool_name: Option<String>,
    pub session_id: Option<String>,
    pub client_name: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` date, inclusive lower bound.
    pub since: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` date, inclusive upper bound.
    pub until: Option<String>,
    pub errors_only: Option<bool>,
    pub limit: Option<usize>,
}

/// The validated read surface over an [`AuditLogger`].
#[derive(Clone)]
pub struct QueryApi {
    logger: AuditLogger,
}

impl QueryApi {
    pub fn new(logger: AuditLogger) -> Self {
        Self { logger }
    }

    /// The most recent records, newest first. `limit` defaults to
    /// [`DEFAULT_RECENT_LIMIT`] and is clamped to `1..=MAX_LIMIT`.
    pub async fn recent(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<InvocationRecord>, BridgeError> {
        self.logger
            .recent(clamp_limit(limit, DEFAULT_RECENT_LIMIT))
            .await
    }

    /// Filtered search. Invalid timestamps are rejected before the store is
    /// touched; `limit` defaults to [`DEFAULT_QUERY_LIMIT`].
    pub async fn query(
        &self,
        params: QueryParams,
    ) -> Result<Vec<InvocationRecord>, BridgeError> {
        let limit = clamp_limit(params.limit, DEFAULT_QUERY_LIMIT);
        let filter = build_filter(params)?;
        self.logger.query(&filter, limit).await
    }

    /// Summary statistics, overall and per tool.
    pub async fn summary(&self) -> Result<AuditSummary, BridgeError> {
        self.logger.summary().await
    }
}

fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

fn build_filter(params: QueryParams) -> Result<AuditFilter, BridgeError> {
    Ok(AuditFilter {
        tool_name: params.tool_name,
        session_id: params.session_id,
        client_name: params.client_name,
        since: params.since.as_deref().map(parse_timestamp).transpose()?,
        until: params.until.as_deref().map(parse_timestamp).transpose()?,
        errors_only: params.errors_only.unwrap_or(false),
    })
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as
/// midnight UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, BridgeError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.into());
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(BridgeError::InvalidQuery(format!(
        "cannot parse timestamp {raw:?}: expected RFC 3339 or YYYY-MM-DD"
    )))
}
