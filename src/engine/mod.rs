//! Execution engine module
//!
//! The paginated invoker: one operation, called repeatedly, cursor by cursor.
//!
//! # Overview
//!
//! The engine module provides:
//! - `PaginatedInvoker` - drives an `Operation` until the cursor runs out,
//!   a manual page is done, or a call fails
//! - `OutputSink` - where projected pages and the terminal error go
//! - `InvokerConfig` / `InvocationOutcome` - configuration and summary
//!
//! Pages are delivered strictly in call order, one call in flight at a time.
//! A failed call is delivered once and ends the invocation; nothing is retried.

mod types;

pub use types::{
    output_stream, ChannelSink, InvocationOutcome, InvokerConfig, Output, OutputSink, StopReason,
    VecSink,
};

use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::pagination::{Cursor, IterationControl, PageControls, PageRequest, PageResponse};
use crate::projection::Projection;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drives a single paginated operation
pub struct PaginatedInvoker<O: Operation> {
    /// The bound operation
    operation: O,
    /// Invoker configuration
    config: InvokerConfig,
}

impl<O: Operation> PaginatedInvoker<O> {
    /// Create a new invoker
    pub fn new(operation: O) -> Self {
        Self {
            operation,
            config: InvokerConfig::default(),
        }
    }

    /// Set invoker configuration
    #[must_use]
    pub fn with_config(mut self, config: InvokerConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the operation
    pub fn operation(&self) -> &O {
        &self.operation
    }

    /// Get the configuration
    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Run one invocation
    ///
    /// `request` carries every bound parameter except the cursor. Setup
    /// problems (bad selector, page size on an operation without one) are
    /// returned as `Err` before any call. Call failures and cancellation are
    /// delivered to `sink` once and reported through the outcome's
    /// [`StopReason`]. An `Err` after setup only comes from the sink.
    pub async fn invoke<S>(
        &self,
        request: O::Request,
        controls: &PageControls,
        projection: Projection,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<InvocationOutcome>
    where
        S: OutputSink + ?Sized,
    {
        let descriptor = self.operation.descriptor();
        let projection = projection.resolve(descriptor)?;


        let iteration = controls.iteration();
        let policy = descriptor.cursor_policy;
        let base = match (controls.page_size, descriptor.page_size_field.as_deref()) {
            (Some(size), Some(field)) => request.with_page_size(field, size),
            (Some(_), None) => {
                return Err(Error::invalid_value(
                    "page_size",
                    format!("operation '{}' has no page-size parameter", descriptor.name),
                ));
            }
            (None, _) => request,
        };
        let initial = controls.initial_cursor(policy);
        let mut cursor = initial.clone();
        let mut calls = 0;
        let mut pages = 0;

        info!(
            "Invoking {} ({}, select: {})",
            descriptor.name,
            if iteration.is_auto() {
                "auto-iterate"
            } else {
                "single page"
            },
            projection.selector()
        );

        let stop = loop {
            if cancel.is_cancelled() {
                sink.deliver(Output::Error(Error::Cancelled)).await?;
                break StopReason::Cancelled;
            }

            let call_request = base.with_cursor(cursor.as_ref());
            calls += 1;

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(Error::Cancelled),
                result = self.operation.invoke(&call_request, cancel) => result,
            };

            let response = match result {
                Ok(_) if cancel.is_cancelled() => {
                    sink.deliver(Output::Error(Error::Cancelled)).await?;
                    break StopReason::Cancelled;
                }
                Ok(response) => response,
                Err(e) => {
                    let reason = if e.is_cancelled() {
                        StopReason::Cancelled
                    } else {
                        StopReason::Failed
                    };
                    warn!("{} call {} failed: {}", descriptor.name, calls, e);
                    sink.deliver(Output::Error(e)).await?;
                    break reason;
                }
            };

            let next = Cursor::normalize(response.next_cursor(), policy);
            if let Some(value) = projection.project(response) {
                sink.deliver(Output::page(pages, value)).await?;
            }
            pages += 1;
            cursor = next;

            debug!(
                "{} page {} done, next cursor: {}",
                descriptor.name,
                pages,
                cursor.as_ref().map_or("<none>", Cursor::as_str)
            );

            match (iteration, &cursor) {
                (_, None) => break StopReason::Exhausted,
                (IterationControl::Manual, Some(_)) => break StopReason::ManualPage,
                (IterationControl::Auto, Some(_))
                    if self.config.max_pages > 0 && pages >= self.config.max_pages =>
                {
                    break StopReason::PageLimit;
                }
                (IterationControl::Auto, Some(_)) => {}
            }
        };

        if stop.is_clean() {
            if let Some(value) = projection.echo(&base.with_cursor(initial.as_ref())) {
                sink.deliver(Output::echo(value)).await?;
            }
        }

        let next_cursor = match stop {
            StopReason::ManualPage | StopReason::PageLimit => cursor,
            _ => None,
        };

        info!(
            "{} finished: {} pages in {} calls ({})",
            descriptor.name, pages, calls, stop
        );

        Ok(InvocationOutcome {
            calls,
            pages,
            next_cursor,
            stop,
        })
    }
}
