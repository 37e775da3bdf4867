//! YAML parser for operation definitions
//!
//! Parses and validates operation YAML files.
//! Supports both built-in operations (by name) and custom YAML files (by path).

use crate::error::{Error, Result, ResultExt};
use crate::loader::types::OperationDefinition;
use crate::operation::Protocol;
use crate::operations;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load an operation definition from a name or file path
///
/// Built-in names (e.g. `apprunner-list-services`) are checked first, then
/// the input is read as a file path.
///
/// # Examples
///
/// ```ignore
/// let op = load_operation("kinesis-list-streams")?;
/// let op = load_operation("./my-operation.yaml")?;
/// ```
pub fn load_operation(path: impl AsRef<Path>) -> Result<OperationDefinition> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = operations::get_builtin(&path_str) {
            return load_operation_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!(
                "Operation '{}' not found. Built-in operations: {}. Or provide a path to a YAML file.",
                path.display(),
                operations::list_builtin().join(", ")
            ))
        } else {
            Error::config(format!(
                "Failed to read operation file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_operation_from_str(&content)
}

/// Load an operation definition from a YAML string
pub fn load_operation_from_str(yaml: &str) -> Result<OperationDefinition> {
    let def: OperationDefinition =
        serde_yaml::from_str(yaml).context("Failed to parse operation YAML")?;

    validate_operation(&def)?;
    Ok(def)
}

/// Validate an operation definition
fn validate_operation(def: &OperationDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Operation name cannot be empty"));
    }

    if def.operation.is_empty() {
        return Err(Error::config(format!(
            "Operation '{}' must name the API operation",
            def.name
        )));
    }

    if def.endpoint.is_empty() {
        return Err(Error::config(format!(
            "Operation '{}' endpoint cannot be empty",
            def.name
        )));
    }

    match def.protocol {
        Protocol::AwsJson10 | Protocol::AwsJson11 => {
            if def.target.as_deref().map_or(true, str::is_empty) {
                return Err(Error::config(format!(
                    "Operation '{}' uses {:?} and needs a target",
                    def.name, def.protocol
                )));
            }
        }
        Protocol::RestJson => {
            if !def.path.starts_with('/') {
                return Err(Error::config(format!(
                    "Operation '{}' path must start with '/': {}",
                    def.name, def.path
                )));
            }
        }
    }

    let valid_methods = ["GET", "POST", "PUT", "PATCH", "DELETE"];
    if !valid_methods.contains(&def.method.to_uppercase().as_str()) {
        return Err(Error::config(format!(
            "Operation '{}' has invalid HTTP method: {}",
            def.name, def.method
        )));
    }

    validate_pagination(def)?;
    validate_parameters(def)?;

    Ok(())
}

fn validate_pagination(def: &OperationDefinition) -> Result<()> {
    let pagination = &def.pagination;

    if pagination.cursor.is_empty() {
        return Err(Error::config(format!(
            "Operation '{}' pagination cursor cannot be empty",
            def.name
        )));
    }

    if pagination.next_cursor.as_deref() == Some("") {
        return Err(Error::config(format!(
            "Operation '{}' pagination next_cursor cannot be empty",
            def.name
        )));
    }

    if let Some(size) = &pagination.page_size {
        if size.is_empty() || *size == pagination.cursor {
            return Err(Error::config(format!(
                "Operation '{}' pagination page_size must be a distinct field",
                def.name
            )));
        }
    }

    if def.result.as_deref() == Some("") {
        return Err(Error::config(format!(
            "Operation '{}' result field cannot be empty",
            def.name
        )));
    }

    Ok(())
}

fn validate_parameters(def: &OperationDefinition) -> Result<()> {
    let mut seen = HashSet::new();

    for param in &def.parameters {
        if param.name.is_empty() {
            return Err(Error::config(format!(
                "Operation '{}' has a parameter with no name",
                def.name
            )));
        }
        if param.name == def.pagination.cursor {
            return Err(Error::config(format!(
                "Operation '{}' declares the cursor field '{}' as a parameter",
                def.name, param.name
            )));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(Error::config(format!(
                "Operation '{}' has duplicate parameter: {}",
                def.name, param.name
            )));
        }
    }

    Ok(())
}
