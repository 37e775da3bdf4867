//! Page projection
//!
//! Chooses what each page delivers to the output sink:
//! - `*` - the whole response
//! - `FieldName` - one named response field
//! - `^ParamName` - a bound input parameter, echoed once after the loop
//!
//! Selectors are parsed and checked against the operation descriptor
//! before the first call, never per page.

use crate::error::{Error, Result};
use crate::operation::OperationDescriptor;
use crate::pagination::{PageRequest, PageResponse};
use crate::types::JsonValue;
use std::fmt;

/// What part of a response (or input) becomes output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// The full response document
    WholeResponse,
    /// One named field of the response
    NamedField(String),
    /// A bound input parameter, delivered once
    EchoInput(String),
}

impl Projection {
    /// Parse a selector string
    pub fn parse(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        match selector {
            "" => Err(Error::projection(selector, "", "selector cannot be empty")),
            "*" => Ok(Self::WholeResponse),
            _ => match selector.strip_prefix('^') {
                Some("") => Err(Error::projection(
                    selector,
                    "",
                    "'^' must be followed by a parameter name",
                )),
                Some(param) => Ok(Self::EchoInput(param.to_string())),
                None => Ok(Self::NamedField(selector.to_string())),
            },
        }
    }

    /// Default projection for an operation: its result field, or the whole response
    pub fn default_for(descriptor: &OperationDescriptor) -> Self {
        descriptor
            .result_field
            .clone()
            .map_or(Self::WholeResponse, Self::NamedField)
    }

    /// Check the selector against the operation's declared shape
    pub fn resolve(self, descriptor: &OperationDescriptor) -> Result<PageProjection> {
        match &self {
            Self::WholeResponse => {}
            Self::NamedField(name) => {
                if !descriptor.has_response_field(name) {
                    return Err(Error::projection(
                        self.to_string(),
                        &descriptor.name,
                        format!("'{name}' is not a response field"),
                    ));
                }
            }
            Self::EchoInput(name) => {
                if !descriptor.has_parameter(name) {
                    return Err(Error::projection(
                        self.to_string(),
                        &descriptor.name,
                        format!("'{name}' is not a request parameter"),
                    ));
                }
            }
        }
        Ok(PageProjection(self))
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeResponse => f.write_str("*"),
            Self::NamedField(name) => f.write_str(name),
            Self::EchoInput(name) => write!(f, "^{name}"),
        }
    }
}

/// A projection validated against an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProjection(Projection);

impl PageProjection {
    /// The underlying selector
    pub fn selector(&self) -> &Projection {
        &self.0
    }

    /// Whether this projection echoes an input instead of delivering pages
    pub fn is_echo(&self) -> bool {
        matches!(self.0, Projection::EchoInput(_))
    }

    /// Project one page; `None` for echo projections
    ///
    /// A declared field absent from a response projects to `null`.
    pub fn project<R: PageResponse>(&self, response: R) -> Option<JsonValue> {
        match &self.0 {
            Projection::WholeResponse => Some(response.into_value()),
            Projection::NamedField(name) => Some(response.field(name).unwrap_or(JsonValue::Null)),
            Projection::EchoInput(_) => None,
        }
    }

    /// The echoed input value; `None` unless this is an echo projection
    pub fn echo<Q: PageRequest>(&self, request: &Q) -> Option<JsonValue> {
        match &self.0 {
            Projection::EchoInput(name) => Some(request.param(name).unwrap_or(JsonValue::Null)),
            _ => None,
        }
    }
}
