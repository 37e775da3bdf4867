//! Loader types
//!
//! Declarative operation definition types for YAML parsing.

use crate::error::{Error, Result, ResultExt};
use crate::operation::{HttpOperation, HttpOperationConfig, OperationDescriptor, Protocol};
use crate::pagination::{CursorPolicy, JsonRequest};
use crate::template::{self, TemplateContext};
use crate::types::{JsonValue, StringMap};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Operation Definition
// ============================================================================

/// Top-level operation definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OperationDefinition {
    /// Definition name (e.g. `apprunner-list-services`)
    pub name: String,
    /// Service name, informational
    #[serde(default)]
    pub service: Option<String>,
    /// API operation name (e.g. `ListServices`)
    pub operation: String,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Endpoint template (e.g. `https://apprunner.{{ region }}.amazonaws.com`)
    pub endpoint: String,
    /// Wire protocol
    #[serde(default)]
    pub protocol: Protocol,
    /// `X-Amz-Target` for AWS JSON protocols
    #[serde(default)]
    pub target: Option<String>,
    /// HTTP method for REST-JSON
    #[serde(default = "default_method")]
    pub method: String,
    /// Request path for REST-JSON
    #[serde(default = "default_path")]
    pub path: String,
    /// Pagination fields
    pub pagination: PaginationDefinition,
    /// Response field delivered by default
    #[serde(default)]
    pub result: Option<String>,
    /// Other response fields that may be selected
    #[serde(default)]
    pub response_fields: Vec<String>,
    /// Request parameters
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    /// Static headers (templates allowed)
    #[serde(default)]
    pub headers: StringMap,
    /// HTTP settings
    #[serde(default)]
    pub http: HttpDefinition,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

// ============================================================================
// Pagination Definition
// ============================================================================

/// Cursor and page-size field names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaginationDefinition {
    /// Request field carrying the cursor (`NextToken`, `Marker`, ...)
    pub cursor: String,
    /// Response field carrying the next cursor; defaults to `cursor`
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Request field carrying the page size (`MaxResults`, `Limit`, ...)
    #[serde(default)]
    pub page_size: Option<String>,
    /// How to read an empty cursor
    #[serde(default)]
    pub empty_cursor: CursorPolicy,
}

// ============================================================================
// Parameter Definition
// ============================================================================

/// A request parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ParameterDefinition {
    /// Wire name
    pub name: String,
    /// Must be bound before the call
    #[serde(default)]
    pub required: bool,
    /// Value used when not bound
    #[serde(default)]
    pub default: Option<JsonValue>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// HTTP Definition
// ============================================================================

/// HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpDefinition {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpDefinition {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

// ============================================================================
// Conversions
// ============================================================================

impl OperationDefinition {
    /// Static description used by the invoker
    pub fn descriptor(&self) -> OperationDescriptor {
        let mut desc = OperationDescriptor::new(&self.operation, &self.pagination.cursor)
            .with_cursor_policy(self.pagination.empty_cursor);

        if let Some(next) = &self.pagination.next_cursor {
            desc = desc.with_next_cursor_field(next);
        }
        if let Some(size) = &self.pagination.page_size {
            desc = desc.with_page_size_field(size);
        }
        if let Some(result) = &self.result {
            desc = desc.with_result_field(result);
        }
        for field in &self.response_fields {
            desc = desc.with_response_field(field);
        }
        for param in &self.parameters {
            desc = desc.with_parameter(&param.name);
        }
        desc
    }

    /// HTTP settings with endpoint and headers rendered
    pub fn http_config(&self, ctx: &TemplateContext) -> Result<HttpOperationConfig> {
        let method = reqwest::Method::from_bytes(self.method.to_uppercase().as_bytes())
            .map_err(|_| Error::invalid_value("method", self.method.clone()))?;

        let mut builder = HttpOperationConfig::builder()
            .endpoint(
                template::render(&self.endpoint, ctx)
                    .with_context(|| format!("Operation '{}' endpoint", self.name))?,
            )
            .protocol(self.protocol)
            .method(method)
            .path(&self.path)
            .timeout(Duration::from_secs(self.http.timeout_secs));

        if let Some(target) = &self.target {
            builder = builder.target(target);
        }
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }
        let headers = template::render_map(&self.headers, ctx)
            .with_context(|| format!("Operation '{}' headers", self.name))?;
        for (key, value) in headers {
            builder = builder.header(key, value);
        }

        Ok(builder.build())
    }

    /// Build a ready-to-invoke HTTP operation
    pub fn build(&self, ctx: &TemplateContext) -> Result<HttpOperation> {
        HttpOperation::new(self.descriptor(), self.http_config(ctx)?)
    }

    /// Bind caller input into a request
    ///
    /// Applies defaults and checks required parameters. The cursor field may
    /// not be bound here; a starting cursor is a paging control.
    pub fn bind_request(&self, input: JsonValue) -> Result<JsonRequest> {
        let mut request = JsonRequest::from_value(&self.pagination.cursor, input)?;

        if request.params().contains_key(&self.pagination.cursor) {
            return Err(Error::invalid_value(
                &self.pagination.cursor,
                "the cursor is a paging control; pass it as the starting cursor",
            ));
        }

        for param in &self.parameters {
            if request.params().contains_key(&param.name) {
                continue;
            }
            if let Some(default) = &param.default {
                request.insert(&param.name, default.clone());
            } else if param.required {
                return Err(Error::missing_field(&param.name));
            }
        }

        Ok(request)
    }

    /// Template variables the endpoint and headers need
    pub fn required_variables(&self) -> Vec<String> {
        let mut vars = template::extract_variables(&self.endpoint);
        for value in self.headers.values() {
            vars.extend(template::extract_variables(value));
        }
        vars.sort();
        vars.dedup();
        vars
    }
}
