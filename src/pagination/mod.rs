//! Pagination module
//!
//! Cursor handling and the request/response seams the invoker drives.
//!
//! # Overview
//!
//! - `Cursor` - an opaque continuation token, normalized through `CursorPolicy`
//! - `PageControls` - the caller-facing controls (starting cursor, manual page, page size)
//! - `IterationControl` - auto vs manual iteration, decided once per invocation
//! - `PageRequest` / `PageResponse` - what the invoker needs from an operation's shapes
//! - `JsonRequest` / `JsonResponse` - schema-less shapes over JSON objects

mod request;
mod types;

pub use request::{JsonRequest, JsonResponse, PageRequest, PageResponse};
pub use types::{Cursor, CursorPolicy, IterationControl, PageControls};
