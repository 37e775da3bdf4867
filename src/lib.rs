// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Pager
//!
//! Cursor-driven auto-pagination for AWS list/describe operations.
//! One loop, any operation: call, deliver the page, follow the cursor.
//!
//! ## Features
//!
//! - **Auto-iteration**: Follow `NextToken`/`Marker` cursors until the last page
//! - **Manual paging**: Fetch one page and hand back the resume cursor
//! - **Projections**: Emit the whole response, one field, or an echoed input
//! - **Cancellation**: Stop between calls or abandon an in-flight call
//! - **Declarative operations**: Describe an operation in YAML, no code needed
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_pager::{load_operation, PageControls, PaginatedInvoker, Projection, VecSink};
//! use solidafy_pager::template::TemplateContext;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> solidafy_pager::Result<()> {
//!     let definition = load_operation("kinesis-list-streams")?;
//!
//!     let mut ctx = TemplateContext::new();
//!     ctx.set_var("region", "us-east-1");
//!     let operation = definition.build(&ctx)?;
//!     let request = definition.bind_request(serde_json::json!({}))?;
//!
//!     let mut sink = VecSink::new();
//!     let outcome = PaginatedInvoker::new(operation)
//!         .invoke(
//!             request,
//!             &PageControls::new(),
//!             Projection::NamedField("StreamSummaries".into()),
//!             &mut sink,
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!
//!     println!("{} pages", outcome.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       PaginatedInvoker                          │
//! │  request + controls + projection → pages → OutputSink           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬───────────────┬─────────┐
//! │  Pagination  │      Operation        │  Projection   │ Output  │
//! ├──────────────┼───────────────────────┼───────────────┼─────────┤
//! │ Cursor       │ Operation trait       │ *             │ VecSink │
//! │ CursorPolicy │ HttpOperation         │ Field         │ Channel │
//! │ PageControls │ AWS JSON / REST-JSON  │ ^Parameter    │ Writer  │
//! └──────────────┴───────────────────────┴───────────────┴─────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document error variants and CLI args, then drop this allow

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Cursors, paging controls and request/response seams
pub mod pagination;

/// Operation trait and the HTTP implementation
pub mod operation;

/// Page projections
pub mod projection;

/// The paginated invoker
pub mod engine;

/// Streaming output sinks
pub mod output;

/// YAML loader for operation definitions
pub mod loader;

/// Built-in operation definitions
pub mod operations;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use engine::{
    ChannelSink, InvocationOutcome, InvokerConfig, Output, OutputSink, PaginatedInvoker,
    StopReason, VecSink,
};
pub use loader::{load_operation, load_operation_from_str, OperationDefinition};
pub use operation::{HttpOperation, Operation, OperationDescriptor};
pub use pagination::{Cursor, CursorPolicy, JsonRequest, JsonResponse, PageControls};
pub use projection::Projection;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
