//! Output module
//!
//! Writes projected pages to a byte stream as they arrive.
//!
//! # Overview
//!
//! - `WriterSink` - an `OutputSink` over any `std::io::Write`
//! - JSON lines or pretty JSON, with optional array unrolling so that a page of
//!   items becomes one line per item

mod writer;

pub use writer::WriterSink;

#[cfg(test)]
mod tests;
