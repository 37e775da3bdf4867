//! Request and response seams
//!
//! The invoker never mutates a caller's request. It keeps the base request
//! and derives each call's request from it with only the cursor changed.

use super::types::Cursor;
use crate::error::{Error, Result};
use crate::types::{lookup_path, JsonObject, JsonValue};

/// A request shape the invoker can page through
pub trait PageRequest: Clone + Send + Sync {
    /// Copy of this request with the cursor field set, or cleared for `None`
    fn with_cursor(&self, cursor: Option<&Cursor>) -> Self;

    /// Copy of this request with the named page-size field set
    fn with_page_size(&self, field: &str, page_size: u32) -> Self;

    /// A bound input parameter, by name
    fn param(&self, name: &str) -> Option<JsonValue>;
}

/// A response shape the invoker can read a continuation from
pub trait PageResponse: Send {
    /// Raw next-cursor field as returned by the service
    fn next_cursor(&self) -> Option<&str>;

    /// A named top-level (or dotted) field
    fn field(&self, name: &str) -> Option<JsonValue>;

    /// The whole response
    fn into_value(self) -> JsonValue;
}

// ============================================================================
// JSON Request
// ============================================================================

/// Schema-less request over a JSON object
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRequest {
    params: JsonObject,
    cursor_field: String,
}

impl JsonRequest {
    /// Create an empty request with the given cursor field name
    pub fn new(cursor_field: impl Into<String>) -> Self {
        Self {
            params: JsonObject::new(),
            cursor_field: cursor_field.into(),
        }
    }

    /// Create a request from a JSON object
    pub fn from_value(cursor_field: impl Into<String>, value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(params) => Ok(Self {
                params,
                cursor_field: cursor_field.into(),
            }),
            JsonValue::Null => Ok(Self::new(cursor_field)),
            other => Err(Error::invalid_value(
                "input",
                format!("request parameters must be a JSON object, got {other}"),
            )),
        }
    }

    /// Bind a parameter
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Bind a parameter in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.params.insert(name.into(), value.into());
    }

    /// All bound parameters
    pub fn params(&self) -> &JsonObject {
        &self.params
    }

    /// Cursor field name
    pub fn cursor_field(&self) -> &str {
        &self.cursor_field
    }

    /// Current cursor value, if bound
    pub fn cursor(&self) -> Option<&str> {
        self.params.get(&self.cursor_field).and_then(JsonValue::as_str)
    }

    /// The request as a JSON object
    pub fn to_value(&self) -> JsonValue {
        JsonValue::Object(self.params.clone())
    }
}

impl PageRequest for JsonRequest {
    fn with_cursor(&self, cursor: Option<&Cursor>) -> Self {
        let mut next = self.clone();
        match cursor {
            Some(cursor) => {
                next.params.insert(
                    self.cursor_field.clone(),
                    JsonValue::String(cursor.as_str().to_string()),
                );
            }
            None => {
                next.params.remove(&self.cursor_field);
            }
        }
        next
    }

    fn with_page_size(&self, field: &str, page_size: u32) -> Self {
        let mut next = self.clone();
        next.params
            .insert(field.to_string(), JsonValue::from(page_size));
        next
    }

    fn param(&self, name: &str) -> Option<JsonValue> {
        self.params.get(name).cloned()
    }
}

// ============================================================================
// JSON Response
// ============================================================================

/// Schema-less response over a JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    body: JsonValue,
    next_cursor_path: String,
}

impl JsonResponse {
    /// Wrap a response body; `next_cursor_path` may be dotted
    pub fn new(body: JsonValue, next_cursor_path: impl Into<String>) -> Self {
        Self {
            body,
            next_cursor_path: next_cursor_path.into(),
        }
    }

    /// Borrow the body
    pub fn body(&self) -> &JsonValue {
        &self.body
    }
}

impl PageResponse for JsonResponse {
    fn next_cursor(&self) -> Option<&str> {
        lookup_path(&self.body, &self.next_cursor_path).and_then(JsonValue::as_str)
    }

    fn field(&self, name: &str) -> Option<JsonValue> {
        lookup_path(&self.body, name).cloned()
    }

    fn into_value(self) -> JsonValue {
        self.body
    }
}
