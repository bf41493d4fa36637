//! Integration tests for the validated read surface: clamping, filter
//! forwarding, and transport-neutral serialization.

mod common;

use skillbridge_audit::{NewInvocation, QueryParams};
use skillbridge_types::BridgeError;

use common::{query_api, seed_records, temp_db, test_logger};

#[tokio::test]
async fn recent_defaults_and_clamps() {
    let tmp = temp_db();
    let logger = test_logger(&tmp);
    for _ in 0..60 {
        logger
            .record(NewInvocation::success("t", None, 1.0))
            .await;
    }

    let api = query_api(&logger);
    assert_eq!(api.recent(None).await.unwrap().len(), 50);
    assert_eq!(api.recent(Some(3)).await.unwrap().len(), 3);
    assert_eq!(api.recent(Some(0)).await.unwrap().len(), 1);
    // Oversized limits clamp to the cap rather than erroring.
    assert_eq!(api.recent(Some(1_000_000)).await.unwrap().len(), 60);
}

#[tokio::test]
async fn query_forwards_filters_conjunctively() {
    let tmp = temp_db();
    let logger = test_logger(&tmp);
    seed_records(&logger).await;

    let api = query_api(&logger);

    // tool_name + errors_only: "A" never fails, so nothing matches.
    let none = api
        .query(QueryParams {
            tool_name: Some("A".to_string()),
            errors_only: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(none.is_empty());

    // "B" + errors_only matches the single failure.
    let failures = api
        .query(QueryParams {
            tool_name: Some("B".to_string()),
            errors_only: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error_msg.as_deref(), Some("boom"));
}

#[tokio::test]
async fn malformed_timestamps_are_invalid_query_errors() {
    let tmp = temp_db();
    let logger = test_logger(&tmp);
    let api = query_api(&logger);

    for bad in ["yesterday", "2026-13-40", "12:00"] {
        let err = api
            .query(QueryParams {
                since: Some(bad.to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err, BridgeError::InvalidQuery(_)),
            "expected InvalidQuery for {bad:?}"
        );
    }
}

#[tokio::test]
async fn records_serialize_to_the_wire_shape() {
    let tmp = temp_db();
    let logger = test_logger(&tmp);
    seed_records(&logger).await;

    let api = query_api(&logger);
    let records = api.recent(Some(1)).await.unwrap();
    let json = serde_json::to_value(&records).unwrap();

    let first = &json[0];
    for key in [
        "id",
        "timestamp",
        "request_id",
        "session_id",
        "client_name",
        "client_version",
        "tool_name",
        "parameters",
        "success",
        "error_msg",
        "duration_ms",
    ] {
        assert!(first.get(key).is_some(), "missing field: {key}");
    }
    assert_eq!(first["tool_name"], "A");
    assert_eq!(first["success"], true);
}

#[tokio::test]
async fn summary_serializes_overall_and_per_tool() {
    let tmp = temp_db();
    let logger = test_logger(&tmp);
    seed_records(&logger).await;

    let api = query_api(&logger);
    let json = serde_json::to_value(api.summary().await.unwrap()).unwrap();

    assert_eq!(json["overall"]["total_calls"], 3);
    assert_eq!(json["overall"]["unique_tools"], 2);
    assert_eq!(json["overall"]["error_rate_pct"], 33.3);
    assert_eq!(json["overall"]["max_duration_ms"], 40.0);
    assert_eq!(json["per_tool"][0]["tool_name"], "A");
    assert_eq!(json["per_tool"][0]["calls"], 2);
}
