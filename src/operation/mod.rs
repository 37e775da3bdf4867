//! Operation module
//!
//! The single-call contract the invoker drives, and an HTTP implementation.
//!
//! # Overview
//!
//! - `Operation` - one bound service call: `(request, cancel) -> response | error`
//! - `OperationDescriptor` - field names and declared shape of an operation
//! - `HttpOperation` - AWS JSON / REST-JSON call over `reqwest`, no retries

mod http;
mod types;

pub use http::{HttpOperation, HttpOperationConfig, HttpOperationConfigBuilder, Protocol};
pub use types::{Operation, OperationDescriptor};

#[cfg(test)]
mod tests;
