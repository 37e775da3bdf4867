//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, InvokeArgs};
use crate::engine::{InvokerConfig, PaginatedInvoker};
use crate::error::{Error, Result};
use crate::loader::{load_operation, OperationDefinition};
use crate::operation::Operation;
use crate::operations;
use crate::output::WriterSink;
use crate::pagination::{JsonRequest, PageControls};
use crate::projection::Projection;
use crate::template::TemplateContext;
use crate::types::{JsonObject, JsonValue, OutputFormat, StringMap};
use serde_json::json;
use std::io::BufWriter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Invoke(args) => self.invoke(args).await,
            Commands::Validate => self.validate(),
            Commands::List => self.list_operations(),
            Commands::Describe => self.describe(),
        }
    }

    /// Load operation definition
    fn load_operation(&self) -> Result<OperationDefinition> {
        let name = self
            .cli
            .operation
            .as_ref()
            .ok_or_else(|| Error::config("Operation not specified (use -o flag)"))?;
        load_operation(name)
    }

    /// Invoke the operation and stream pages to stdout
    async fn invoke(&self, args: &InvokeArgs) -> Result<()> {
        let definition = self.load_operation()?;
        let request = definition.bind_request(build_input(args)?)?;
        let ctx = build_context(args, &request);
        let operation = definition.build(&ctx)?;

        let projection = match &args.select {
            Some(selector) => Projection::parse(selector)?,
            None => Projection::default_for(operation.descriptor()),
        };
        let controls = build_controls(args);

        let invoker = PaginatedInvoker::new(operation)
            .with_config(InvokerConfig::new().with_max_pages(args.max_pages));

        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling invocation");
                    cancel.cancel();
                }
            })
        };

        let mut sink = WriterSink::new(BufWriter::new(std::io::stdout()), self.cli.format)
            .with_unroll_arrays(!args.no_unroll);

        let outcome = invoker
            .invoke(request, &controls, projection, &mut sink, &cancel)
            .await;
        interrupt.abort();
        let outcome = outcome?;

        info!(
            operation = %definition.name,
            calls = outcome.calls,
            pages = outcome.pages,
            written = sink.written(),
            stop = %outcome.stop,
            "Invocation finished"
        );

        if let Some(cursor) = &outcome.next_cursor {
            eprintln!("Next cursor: {cursor}");
        }

        match sink.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Validate operation definition
    fn validate(&self) -> Result<()> {
        let definition = self.load_operation()?;

        self.output_message(&json!({
            "status": "valid",
            "name": definition.name,
            "operation": definition.operation,
            "protocol": definition.protocol,
            "variables": definition.required_variables(),
            "message": format!(
                "Operation '{}' is valid with {} parameters",
                definition.name,
                definition.parameters.len()
            )
        }));

        Ok(())
    }

    /// Show the descriptor the invoker works from
    fn describe(&self) -> Result<()> {
        let definition = self.load_operation()?;
        let descriptor = definition.descriptor();

        let parameters: Vec<JsonValue> = definition
            .parameters
            .iter()
            .map(|param| {
                json!({
                    "name": param.name,
                    "required": param.required,
                    "default": param.default,
                    "description": param.description
                })
            })
            .collect();

        self.output_message(&json!({
            "name": definition.name,
            "service": definition.service,
            "description": definition.description,
            "endpoint": definition.endpoint,
            "protocol": definition.protocol,
            "descriptor": descriptor,
            "default_selector": Projection::default_for(&descriptor).to_string(),
            "parameters": parameters
        }));

        Ok(())
    }

    /// List built-in operations
    fn list_operations(&self) -> Result<()> {
        let mut listed = Vec::new();
        for name in operations::list_builtin() {
            let definition = load_operation(name)?;
            listed.push(json!({
                "name": name,
                "service": definition.service,
                "operation": definition.operation,
                "description": definition.description
            }));
        }

        self.output_message(&json!({ "operations": listed }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Merge `--input-json` and `--param` values into one request object
pub(crate) fn build_input(args: &InvokeArgs) -> Result<JsonValue> {
    let mut input = match &args.input_json {
        Some(raw) => match serde_json::from_str::<JsonValue>(raw)
            .map_err(|e| Error::config(format!("Invalid input JSON: {e}")))?
        {
            JsonValue::Object(map) => map,
            JsonValue::Null => JsonObject::new(),
            other => {
                return Err(Error::invalid_value(
                    "input-json",
                    format!("expected a JSON object, got {other}"),
                ))
            }
        },
        None => JsonObject::new(),
    };

    for (key, raw) in &args.params {
        let value = serde_json::from_str::<JsonValue>(raw)
            .unwrap_or_else(|_| JsonValue::String(raw.clone()));
        debug!(param = %key, value = %value, "Binding parameter");
        input.insert(key.clone(), value);
    }

    Ok(JsonValue::Object(input))
}

/// Template context from `--var`, `--region` and the bound request
pub(crate) fn build_context(args: &InvokeArgs, request: &JsonRequest) -> TemplateContext {
    let vars: StringMap = args.vars.iter().cloned().collect();
    let mut ctx = TemplateContext::with_vars(&vars);
    if let Some(region) = &args.region {
        ctx.set_var("region", region.clone());
    }
    ctx.set_params(request.to_value());
    ctx
}

/// Paging controls from the invoke flags
pub(crate) fn build_controls(args: &InvokeArgs) -> PageControls {
    let mut controls = PageControls::new().with_manual_page(args.no_auto_iteration);
    if let Some(cursor) = &args.starting_cursor {
        controls = controls.with_starting_cursor(cursor.clone());
    }
    if let Some(size) = args.page_size {
        controls = controls.with_page_size(size);
    }
    controls
}
