//! HTTP operation
//!
//! Performs exactly one AWS-style call per invocation:
//! - `aws_json_1_0` / `aws_json_1_1`: `POST /` with `X-Amz-Target` and a JSON body
//! - `rest_json`: configurable method and path, `{Label}` path segments bound
//!   from request parameters, the rest sent as query string (GET) or JSON body
//!
//! Failures are returned as-is. There is no retry and no backoff here; the
//! invoker treats every failure as terminal.

use super::types::{Operation, OperationDescriptor};
use crate::error::{Error, Result};
use crate::pagination::{JsonRequest, JsonResponse};
use crate::types::{JsonObject, JsonValue, StringMap};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Matches `{Label}` segments in REST paths
static PATH_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid label regex"));

/// Wire protocol of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Protocol {
    /// AWS JSON 1.0 (`application/x-amz-json-1.0`)
    #[serde(rename = "aws_json_1_0")]
    AwsJson10,
    /// AWS JSON 1.1 (`application/x-amz-json-1.1`)
    #[default]
    #[serde(rename = "aws_json_1_1")]
    AwsJson11,
    /// REST with JSON bodies
    #[serde(rename = "rest_json")]
    RestJson,
}

impl Protocol {
    /// Content type for JSON protocols
    fn content_type(self) -> &'static str {
        match self {
            Protocol::AwsJson10 => "application/x-amz-json-1.0",
            Protocol::AwsJson11 => "application/x-amz-json-1.1",
            Protocol::RestJson => "application/json",
        }
    }
}

/// Configuration for an HTTP operation
#[derive(Debug, Clone)]
pub struct HttpOperationConfig {
    /// Service endpoint (scheme and host, optionally a base path)
    pub endpoint: String,
    /// Wire protocol
    pub protocol: Protocol,
    /// `X-Amz-Target` value for AWS JSON protocols
    pub target: Option<String>,
    /// HTTP method for REST-JSON
    pub method: Method,
    /// Request path for REST-JSON
    pub path: String,
    /// Static headers added to every call
    pub headers: StringMap,
    /// Per-call timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpOperationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            protocol: Protocol::default(),
            target: None,
            method: Method::POST,
            path: "/".to_string(),
            headers: StringMap::new(),
            timeout: Duration::from_secs(30),
            user_agent: format!("solidafy-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpOperationConfig {
    /// Create a new config builder
    pub fn builder() -> HttpOperationConfigBuilder {
        HttpOperationConfigBuilder::default()
    }
}

/// Builder for HTTP operation config
#[derive(Default)]
pub struct HttpOperationConfigBuilder {
    config: HttpOperationConfig,
}

impl HttpOperationConfigBuilder {
    /// Set the endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the protocol
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Set the `X-Amz-Target` header value
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.config.target = Some(target.into());
        self
    }

    /// Set the REST method
    pub fn method(mut self, method: Method) -> Self {
        self.config.method = method;
        self
    }

    /// Set the REST path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Add a static header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Set the per-call timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpOperationConfig {
        self.config
    }
}

/// A paginated operation reached over HTTP
pub struct HttpOperation {
    client: Client,
    config: HttpOperationConfig,
    descriptor: OperationDescriptor,
}

impl HttpOperation {
    /// Create an HTTP operation
    pub fn new(descriptor: OperationDescriptor, config: HttpOperationConfig) -> Result<Self> {
        url::Url::parse(&config.endpoint)?;
        if matches!(config.protocol, Protocol::AwsJson10 | Protocol::AwsJson11)
            && config.target.is_none()
        {
            return Err(Error::missing_field("target"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            descriptor,
        })
    }

    /// Get the config
    pub fn config(&self) -> &HttpOperationConfig {
        &self.config
    }

    /// Build the HTTP request for one call
    fn build_request(&self, request: &JsonRequest) -> Result<RequestBuilder> {
        let base = self.config.endpoint.trim_end_matches('/');

        let mut req = match self.config.protocol {
            Protocol::AwsJson10 | Protocol::AwsJson11 => {
                let body = serde_json::to_vec(&request.to_value())?;
                let mut req = self
                    .client
                    .post(format!("{base}/"))
                    .header("Content-Type", self.config.protocol.content_type())
                    .body(body);
                if let Some(target) = &self.config.target {
                    req = req.header("X-Amz-Target", target.as_str());
                }
                req
            }
            Protocol::RestJson => {
                let (path, remaining) =
                    expand_path(&self.descriptor.name, &self.config.path, request.params())?;
                let url = format!("{base}/{}", path.trim_start_matches('/'));
                let req = self.client.request(self.config.method.clone(), url);
                if self.config.method == Method::GET {
                    req.query(&query_pairs(&remaining))
                } else {
                    req.header("Content-Type", self.config.protocol.content_type())
                        .body(serde_json::to_vec(&JsonValue::Object(remaining))?)
                }
            }
        };

        for (key, value) in &self.config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        Ok(req)
    }

    /// Send one request and turn the reply into a response or a call failure
    async fn send(&self, req: RequestBuilder) -> Result<JsonResponse> {
        let response = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        debug!("{} returned HTTP {}", self.descriptor.name, status.as_u16());

        if !status.is_success() {
            return Err(service_error(response).await);
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let body = if text.trim().is_empty() {
            JsonValue::Object(JsonObject::new())
        } else {
            serde_json::from_str(&text).map_err(|e| {
                Error::call(
                    &self.descriptor.name,
                    format!("response is not valid JSON: {e}"),
                )
            })?
        };

        Ok(JsonResponse::new(
            body,
            self.descriptor.next_cursor_field.clone(),
        ))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            Error::Http(e)
        }
    }
}

#[async_trait]
impl Operation for HttpOperation {
    type Request = JsonRequest;
    type Response = JsonResponse;

    fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        request: &JsonRequest,
        cancel: &CancellationToken,
    ) -> Result<JsonResponse> {
        let req = self.build_request(request)?;
        debug!(
            "Calling {} (cursor: {})",
            self.descriptor.name,
            request.cursor().unwrap_or("<none>")
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.send(req) => result,
        }
    }
}

impl std::fmt::Debug for HttpOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOperation")
            .field("descriptor", &self.descriptor)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Substitute `{Label}` segments from params; returns the path and unused params
fn expand_path(
    operation: &str,
    path: &str,
    params: &JsonObject,
) -> Result<(String, JsonObject)> {
    let mut remaining = params.clone();
    let mut expanded = path.to_string();

    for cap in PATH_LABEL_REGEX.captures_iter(path) {
        let (full, [label]) = cap.extract();
        let value = remaining.remove(label).ok_or_else(|| {
            Error::call(
                operation,
                format!("request parameter '{label}' is required by path {path}"),
            )
        })?;
        let encoded: String =
            url::form_urlencoded::byte_serialize(scalar_to_string(&value).as_bytes()).collect();
        expanded = expanded.replace(full, &encoded);
    }

    Ok((expanded, remaining))
}

/// Flatten params into query pairs; arrays repeat the key
fn query_pairs(params: &JsonObject) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            JsonValue::Null => {}
            JsonValue::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar_to_string(item)));
                }
            }
            other => pairs.push((key.clone(), scalar_to_string(other))),
        }
    }
    pairs
}

fn scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Build a service error from a non-2xx response
async fn service_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let header_code = error_type_header(response.headers());
    let text = response.text().await.unwrap_or_default();
    let body: JsonValue = serde_json::from_str(&text).unwrap_or(JsonValue::Null);

    let code = ["__type", "code", "Code"]
        .iter()
        .find_map(|k| body.get(*k).and_then(JsonValue::as_str))
        .map(|c| c.rsplit('#').next().unwrap_or(c).to_string())
        .or(header_code)
        .unwrap_or_else(|| "UnknownError".to_string());

    let message = ["message", "Message"]
        .iter()
        .find_map(|k| body.get(*k).and_then(JsonValue::as_str))
        .map_or(text.clone(), str::to_string);

    Error::service(status, code, message)
}

/// `x-amzn-ErrorType: Code:http://...` -> `Code`
fn error_type_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(':').next())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: JsonValue) -> JsonObject {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_expand_path_binds_labels() {
        let params = object(json!({"apiId": "abc", "maxResults": 5}));
        let (path, remaining) =
            expand_path("ListTypes", "/v1/apis/{apiId}/types", &params).unwrap();
        assert_eq!(path, "/v1/apis/abc/types");
        assert_eq!(JsonValue::Object(remaining), json!({"maxResults": 5}));
    }

    #[test]
    fn test_expand_path_encodes_arns() {
        let params = object(json!({"arn": "arn:aws:x:us-east-1:1:a/b"}));
        let (path, _) = expand_path("ListTags", "/tags/{arn}", &params).unwrap();
        assert_eq!(path, "/tags/arn%3Aaws%3Ax%3Aus-east-1%3A1%3Aa%2Fb");
    }

    #[test]
    fn test_expand_path_missing_label() {
        let err = expand_path("GetGraphqlApi", "/v1/apis/{apiId}", &JsonObject::new())
            .unwrap_err();
        assert!(err.is_call_failure());
        assert_eq!(
            err.to_string(),
            "Operation 'GetGraphqlApi' failed: \
             request parameter 'apiId' is required by path /v1/apis/{apiId}"
        );
    }

    #[test]
    fn test_query_pairs() {
        let params = object(json!({"a": "x", "b": 2, "c": [1, "y"], "d": null}));
        let mut pairs = query_pairs(&params);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "x".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "1".to_string()),
                ("c".to_string(), "y".to_string()),
            ]
        );
    }
}
