//! YAML Loader module
//!
//! Parse operation definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `OperationDefinition` - Declarative description of one paginated API call
//! - `PaginationDefinition` - Cursor, next-cursor and page-size field names
//! - YAML parsing with validation
//!
//! A definition turns into an `HttpOperation` once its endpoint template has
//! been rendered, and binds caller input into a `JsonRequest`.

mod parser;
mod types;

pub use parser::{load_operation, load_operation_from_str};
pub use types::{HttpDefinition, OperationDefinition, PaginationDefinition, ParameterDefinition};
