//! Tests for operation module

use super::*;
use crate::error::Error;
use crate::pagination::{Cursor, JsonRequest, PageRequest, PageResponse};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn list_services() -> OperationDescriptor {
    OperationDescriptor::new("ListServices", "NextToken")
        .with_page_size_field("MaxResults")
        .with_result_field("ServiceSummaryList")
}

// ============================================================================
// OperationDescriptor Tests
// ============================================================================

#[test]
fn test_descriptor_defaults() {
    let desc = OperationDescriptor::new("ListStreams", "NextToken");
    assert_eq!(desc.cursor_field, "NextToken");
    assert_eq!(desc.next_cursor_field, "NextToken");
    assert!(desc.page_size_field.is_none());
    assert!(desc.result_field.is_none());
}

#[test]
fn test_descriptor_known_fields() {
    let desc = OperationDescriptor::new("ListWebACLs", "NextMarker")
        .with_next_cursor_field("NextMarker")
        .with_page_size_field("Limit")
        .with_result_field("WebACLs")
        .with_parameter("Scope")
        .with_response_field("Extra");

    assert!(desc.has_response_field("WebACLs"));
    assert!(desc.has_response_field("NextMarker"));
    assert!(desc.has_response_field("Extra"));
    assert!(!desc.has_response_field("Scope"));

    assert!(desc.has_parameter("Scope"));
    assert!(desc.has_parameter("Limit"));
    assert!(desc.has_parameter("NextMarker"));
    assert!(!desc.has_parameter("WebACLs"));
}

// ============================================================================
// HttpOperation construction
// ============================================================================

#[test]
fn test_http_operation_requires_target_for_json_protocol() {
    let config = HttpOperationConfig::builder()
        .endpoint("https://apprunner.us-east-1.amazonaws.com")
        .protocol(Protocol::AwsJson10)
        .build();
    let err = HttpOperation::new(list_services(), config).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { ref field } if field == "target"));
}

#[test]
fn test_http_operation_rejects_bad_endpoint() {
    let config = HttpOperationConfig::builder()
        .endpoint("not a url")
        .target("AppRunner.ListServices")
        .build();
    let err = HttpOperation::new(list_services(), config).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[test]
fn test_protocol_yaml_names() {
    let p: Protocol = serde_yaml::from_str("aws_json_1_0").unwrap();
    assert_eq!(p, Protocol::AwsJson10);
    let p: Protocol = serde_yaml::from_str("rest_json").unwrap();
    assert_eq!(p, Protocol::RestJson);
    assert_eq!(Protocol::default(), Protocol::AwsJson11);
}

// ============================================================================
// AWS JSON protocol
// ============================================================================

#[tokio::test]
async fn test_aws_json_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Amz-Target", "AppRunner.ListServices"))
        .and(header("Content-Type", "application/x-amz-json-1.0"))
        .and(body_json(json!({"MaxResults": 2, "NextToken": "A"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ServiceSummaryList": [{"ServiceName": "web"}],
            "NextToken": "B"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .protocol(Protocol::AwsJson10)
        .target("AppRunner.ListServices")
        .build();
    let op = HttpOperation::new(list_services(), config).unwrap();

    let request = JsonRequest::new("NextToken")
        .with_page_size("MaxResults", 2)
        .with_cursor(Some(&Cursor::new("A")));

    let response = op
        .invoke(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.next_cursor(), Some("B"));
    assert_eq!(
        response.field("ServiceSummaryList"),
        Some(json!([{"ServiceName": "web"}]))
    );
}

#[tokio::test]
async fn test_static_headers_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Custom", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .target("Kinesis_20131202.ListStreams")
        .header("X-Custom", "yes")
        .build();
    let op = HttpOperation::new(OperationDescriptor::new("ListStreams", "NextToken"), config)
        .unwrap();

    let response = op
        .invoke(&JsonRequest::new("NextToken"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.next_cursor(), None);
}

#[tokio::test]
async fn test_empty_body_is_empty_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .target("Shield.ListProtections")
        .build();
    let op = HttpOperation::new(
        OperationDescriptor::new("ListProtections", "NextToken"),
        config,
    )
    .unwrap();

    let response = op
        .invoke(&JsonRequest::new("NextToken"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.into_value(), json!({}));
}

// ============================================================================
// REST JSON protocol
// ============================================================================

#[tokio::test]
async fn test_rest_json_get_uses_query_and_labels() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/apis/api-1/types"))
        .and(query_param("format", "SDL"))
        .and(query_param("nextToken", "T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "types": [{"name": "Query"}],
            "nextToken": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .protocol(Protocol::RestJson)
        .method(reqwest::Method::GET)
        .path("/v1/apis/{apiId}/types")
        .build();
    let op = HttpOperation::new(
        OperationDescriptor::new("ListTypes", "nextToken").with_result_field("types"),
        config,
    )
    .unwrap();

    let request = JsonRequest::new("nextToken")
        .set("apiId", "api-1")
        .set("format", "SDL")
        .with_cursor(Some(&Cursor::new("T1")));

    let response = op
        .invoke(&request, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.next_cursor(), None);
    assert_eq!(response.field("types"), Some(json!([{"name": "Query"}])));
}

#[tokio::test]
async fn test_rest_json_post_sends_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/list-enabled-controls"))
        .and(body_json(json!({"targetIdentifier": "ou-1", "maxResults": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabledControls": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .protocol(Protocol::RestJson)
        .method(reqwest::Method::POST)
        .path("/list-enabled-controls")
        .build();
    let op = HttpOperation::new(
        OperationDescriptor::new("ListEnabledControls", "nextToken"),
        config,
    )
    .unwrap();

    let request = JsonRequest::new("nextToken")
        .set("targetIdentifier", "ou-1")
        .with_page_size("maxResults", 10);

    op.invoke(&request, &CancellationToken::new())
        .await
        .unwrap();
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_service_error_from_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "com.amazonaws.dms#InvalidParameterValueException",
            "message": "Marker is invalid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .target("AmazonDMSv20160101.DescribeEndpoints")
        .build();
    let op = HttpOperation::new(
        OperationDescriptor::new("DescribeEndpoints", "Marker"),
        config,
    )
    .unwrap();

    let err = op
        .invoke(&JsonRequest::new("Marker"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Service {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(code, "InvalidParameterValueException");
            assert_eq!(message, "Marker is invalid");
        }
        other => panic!("Expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_service_error_from_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-amzn-ErrorType", "AccessDeniedException:http://internal/")
                .set_body_string("denied"),
        )
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .protocol(Protocol::RestJson)
        .method(reqwest::Method::GET)
        .path("/collaborations")
        .build();
    let op = HttpOperation::new(
        OperationDescriptor::new("ListCollaborations", "nextToken"),
        config,
    )
    .unwrap();

    let err = op
        .invoke(&JsonRequest::new("nextToken"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_call_failure());
    assert_eq!(
        err.to_string(),
        "Service error (HTTP 403) AccessDeniedException: denied"
    );
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "__type": "InternalFailure",
            "message": "boom"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .target("SWBExternalService.ListInstances")
        .build();
    let op = HttpOperation::new(OperationDescriptor::new("ListInstances", "NextToken"), config)
        .unwrap();

    let err = op
        .invoke(&JsonRequest::new("NextToken"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Service { status: 500, .. }));
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .target("Kinesis_20131202.ListStreams")
        .timeout(Duration::from_millis(100))
        .build();
    let op = HttpOperation::new(OperationDescriptor::new("ListStreams", "NextToken"), config)
        .unwrap();

    let err = op
        .invoke(&JsonRequest::new("NextToken"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = HttpOperationConfig::builder()
        .endpoint(server.uri())
        .target("Kinesis_20131202.ListStreams")
        .build();
    let op = HttpOperation::new(OperationDescriptor::new("ListStreams", "NextToken"), config)
        .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = op
        .invoke(&JsonRequest::new("NextToken"), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}
