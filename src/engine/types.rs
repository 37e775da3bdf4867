//! Engine types
//!
//! Output messages, sinks and configuration for the paginated invoker.

use crate::error::{Error, Result};
use crate::pagination::Cursor;
use crate::types::JsonValue;
use async_trait::async_trait;
use futures::Stream;
use std::fmt;
use tokio::sync::mpsc;

/// A value delivered to an output sink
#[derive(Debug)]
pub enum Output {
    /// One projected page
    Page {
        /// Zero-based page index within the invocation
        index: usize,
        /// Projected value
        value: JsonValue,
    },
    /// An echoed input parameter, delivered once after the loop
    Echo {
        /// Bound parameter value
        value: JsonValue,
    },
    /// Terminal error; nothing follows it
    Error(Error),
}

impl Output {
    /// Create a page output
    pub fn page(index: usize, value: JsonValue) -> Self {
        Self::Page { index, value }
    }

    /// Create an echo output
    pub fn echo(value: JsonValue) -> Self {
        Self::Echo { value }
    }

    /// Check if this is a page
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page { .. })
    }

    /// Check if this is an echo
    pub fn is_echo(&self) -> bool {
        matches!(self, Self::Echo { .. })
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The carried value, for pages and echoes
    pub fn value(&self) -> Option<&JsonValue> {
        match self {
            Self::Page { value, .. } | Self::Echo { value } => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The carried error
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Receives invoker output as it is produced
///
/// Returning an error aborts the invocation.
#[async_trait]
pub trait OutputSink: Send {
    /// Accept one output
    async fn deliver(&mut self, output: Output) -> Result<()>;
}

/// Collects every output in memory
#[derive(Debug, Default)]
pub struct VecSink {
    /// Everything delivered so far, in order
    pub outputs: Vec<Output>,
}

impl VecSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered page values, in order
    pub fn pages(&self) -> Vec<&JsonValue> {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Page { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Delivered errors
    pub fn errors(&self) -> Vec<&Error> {
        self.outputs.iter().filter_map(Output::error).collect()
    }
}

#[async_trait]
impl OutputSink for VecSink {
    async fn deliver(&mut self, output: Output) -> Result<()> {
        self.outputs.push(output);
        Ok(())
    }
}

/// Forwards outputs over a bounded channel
///
/// The bound gives back-pressure: the invoker waits for the consumer before
/// requesting the next page.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Output>,
}

impl ChannelSink {
    /// Wrap an existing sender
    pub fn new(tx: mpsc::Sender<Output>) -> Self {
        Self { tx }
    }

    /// Create a sink and its receiving end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Output>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

/// Turn the receiving end of a `ChannelSink` into a `Stream`
///
/// The stream ends when the invoker drops its sink.
pub fn output_stream(rx: mpsc::Receiver<Output>) -> impl Stream<Item = Output> {
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|output| (output, rx))
    })
}

#[async_trait]
impl OutputSink for ChannelSink {
    async fn deliver(&mut self, output: Output) -> Result<()> {
        self.tx
            .send(output)
            .await
            .map_err(|_| Error::output("output channel closed"))
    }
}

/// Configuration for the invoker
#[derive(Debug, Clone, Default)]
pub struct InvokerConfig {
    /// Maximum pages per invocation when auto-iterating (0 = unlimited)
    pub max_pages: usize,
}

impl InvokerConfig {
    /// Create a new invoker config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max pages
    #[must_use]
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = max;
        self
    }
}

/// Why an invocation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cursor ran out
    Exhausted,
    /// Manual paging: one page fetched, more remain
    ManualPage,
    /// `max_pages` reached with more remaining
    PageLimit,
    /// A call failed
    Failed,
    /// The caller cancelled
    Cancelled,
}

impl StopReason {
    /// Check if the invocation ended without a terminal error
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Exhausted | Self::ManualPage | Self::PageLimit)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exhausted => "exhausted",
            Self::ManualPage => "manual page",
            Self::PageLimit => "page limit",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Summary of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    /// Operation calls issued
    pub calls: usize,
    /// Successful pages fetched
    pub pages: usize,
    /// Cursor to resume from, when pages remain
    pub next_cursor: Option<Cursor>,
    /// Why the loop stopped
    pub stop: StopReason,
}

impl InvocationOutcome {
    /// Check if the invocation ended without a terminal error
    pub fn is_success(&self) -> bool {
        self.stop.is_clean()
    }

    /// Check if more pages remain
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}
