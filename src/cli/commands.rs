//! CLI commands and argument parsing

use crate::types::OutputFormat;
use clap::{Args, Parser, Subcommand};

/// Solidafy Pager CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Operation to run: a built-in name or a YAML definition file
    #[arg(short, long, global = true)]
    pub operation: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call the operation, following the cursor until the last page
    Invoke(InvokeArgs),

    /// Validate an operation definition
    Validate,

    /// List built-in operations
    List,

    /// Show the resolved operation descriptor
    Describe,
}

/// Arguments for `invoke`
#[derive(Args, Debug, Clone, Default)]
pub struct InvokeArgs {
    /// Request parameter (repeatable); values are parsed as JSON when possible
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Request parameters as a JSON object (`--param` wins on conflicts)
    #[arg(long)]
    pub input_json: Option<String>,

    /// Template variable for the endpoint and headers (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// AWS region used to render the endpoint
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Start from this cursor; implies a single page
    #[arg(long)]
    pub starting_cursor: Option<String>,

    /// Fetch one page and print the cursor to resume from
    #[arg(long)]
    pub no_auto_iteration: bool,

    /// Page size sent with every call
    #[arg(long)]
    pub page_size: Option<u32>,

    /// What to emit per page: `*`, a response field, or `^Parameter`
    #[arg(long)]
    pub select: Option<String>,

    /// Stop after this many pages (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_pages: usize,

    /// Emit array values as a single document instead of one per line
    #[arg(long)]
    pub no_unroll: bool,
}

/// Parse a `KEY=VALUE` pair
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
