//! CLI module
//!
//! Command-line interface for paginated operations.
//!
//! # Commands
//!
//! - `invoke` - Call an operation and stream every page to stdout
//! - `validate` - Load and validate an operation definition
//! - `list` - List built-in operations
//! - `describe` - Show the descriptor the invoker works from

mod commands;
mod runner;

pub use commands::{parse_key_value, Cli, Commands, InvokeArgs};
pub use runner::Runner;
