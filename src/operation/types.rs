//! Operation trait and descriptor

use crate::error::Result;
use crate::pagination::{CursorPolicy, PageRequest, PageResponse};
use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Static description of a paginated operation
///
/// Projections are validated against this before the first call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    /// Operation name (e.g. `ListServices`)
    pub name: String,
    /// Request field carrying the cursor
    pub cursor_field: String,
    /// Response field (dotted path allowed) carrying the next cursor
    pub next_cursor_field: String,
    /// Request field carrying the page size, if the operation has one
    pub page_size_field: Option<String>,
    /// Response field delivered by default
    pub result_field: Option<String>,
    /// Declared response fields
    pub response_fields: Vec<String>,
    /// Declared request parameters
    pub parameters: Vec<String>,
    /// Interpretation of empty cursors
    pub cursor_policy: CursorPolicy,
}

impl OperationDescriptor {
    /// Create a descriptor whose request and response cursor fields share a name
    pub fn new(name: impl Into<String>, cursor_field: impl Into<String>) -> Self {
        let cursor_field = cursor_field.into();
        Self {
            name: name.into(),
            next_cursor_field: cursor_field.clone(),
            cursor_field,
            page_size_field: None,
            result_field: None,
            response_fields: Vec::new(),
            parameters: Vec::new(),
            cursor_policy: CursorPolicy::default(),
        }
    }

    /// Set the response cursor field (e.g. `NextMarker` for a `Marker` request field)
    #[must_use]
    pub fn with_next_cursor_field(mut self, field: impl Into<String>) -> Self {
        self.next_cursor_field = field.into();
        self
    }

    /// Set the page-size field
    #[must_use]
    pub fn with_page_size_field(mut self, field: impl Into<String>) -> Self {
        self.page_size_field = Some(field.into());
        self
    }

    /// Set the default result field
    #[must_use]
    pub fn with_result_field(mut self, field: impl Into<String>) -> Self {
        self.result_field = Some(field.into());
        self
    }

    /// Declare a response field
    #[must_use]
    pub fn with_response_field(mut self, field: impl Into<String>) -> Self {
        self.response_fields.push(field.into());
        self
    }

    /// Declare a request parameter
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }

    /// Set the empty-cursor policy
    #[must_use]
    pub fn with_cursor_policy(mut self, policy: CursorPolicy) -> Self {
        self.cursor_policy = policy;
        self
    }

    /// Check whether a response field is known
    pub fn has_response_field(&self, name: &str) -> bool {
        self.result_field.as_deref() == Some(name)
            || self.next_cursor_field == name
            || self.response_fields.iter().any(|f| f == name)
    }

    /// Check whether a request parameter is known
    pub fn has_parameter(&self, name: &str) -> bool {
        self.cursor_field == name
            || self.page_size_field.as_deref() == Some(name)
            || self.parameters.iter().any(|p| p == name)
    }
}

/// One bound service call
///
/// Implementations perform exactly one call per `invoke`, never retry,
/// and should return [`crate::Error::Cancelled`] promptly once `cancel` fires.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Request shape
    type Request: PageRequest;
    /// Response shape
    type Response: PageResponse;

    /// Static description of the operation
    fn descriptor(&self) -> &OperationDescriptor;

    /// Perform one call
    async fn invoke(
        &self,
        request: &Self::Request,
        cancel: &CancellationToken,
    ) -> Result<Self::Response>;
}
