//! Streaming writer sink
//!
//! Each page is written and flushed before the invoker asks for the next one.
//! Terminal errors are kept aside rather than written, so the data stream
//! stays parseable; the caller reports them separately.

use crate::engine::{Output, OutputSink};
use crate::error::{Error, Result};
use crate::types::{JsonValue, OutputFormat};
use async_trait::async_trait;
use std::io::Write;

/// Writes projected values to a `Write`
pub struct WriterSink<W: Write + Send> {
    writer: W,
    format: OutputFormat,
    unroll_arrays: bool,
    written: usize,
    error: Option<Error>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Create a sink; arrays are unrolled by default
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            unroll_arrays: true,
            written: 0,
            error: None,
        }
    }

    /// Enable or disable array unrolling
    #[must_use]
    pub fn with_unroll_arrays(mut self, unroll: bool) -> Self {
        self.unroll_arrays = unroll;
        self
    }

    /// Number of documents written
    pub fn written(&self) -> usize {
        self.written
    }

    /// The terminal error delivered to this sink, if any
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Take the terminal error
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Get the underlying writer back
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_value(&mut self, value: &JsonValue) -> Result<()> {
        match value {
            JsonValue::Array(items) if self.unroll_arrays => {
                for item in items {
                    self.write_document(item)?;
                }
            }
            JsonValue::Null if self.unroll_arrays => {}
            other => self.write_document(other)?,
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_document(&mut self, value: &JsonValue) -> Result<()> {
        match self.format {
            OutputFormat::Json => serde_json::to_writer(&mut self.writer, value)?,
            OutputFormat::Pretty => serde_json::to_writer_pretty(&mut self.writer, value)?,
        }
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> OutputSink for WriterSink<W> {
    async fn deliver(&mut self, output: Output) -> Result<()> {
        match output {
            Output::Page { value, .. } | Output::Echo { value } => self.write_value(&value),
            Output::Error(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
                Ok(())
            }
        }
    }
}

impl<W: Write + Send> std::fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterSink")
            .field("format", &self.format)
            .field("unroll_arrays", &self.unroll_arrays)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}
