//! Template interpolation for operation definitions
//!
//! Handles `{{ variable }}` interpolation in endpoints and headers.
//! Supports `{{ region }}`, `{{ vars.account }}` and `{{ params.Scope }}`.

use crate::error::{Error, Result};
use crate::types::{JsonValue, StringMap};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap()
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Free variables (`region`, `--var` values)
    pub vars: JsonValue,
    /// Bound request parameters
    pub params: JsonValue,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context from string variables
    pub fn with_vars(vars: &StringMap) -> Self {
        let map = vars
            .iter()
            .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
            .collect();
        Self {
            vars: JsonValue::Object(map),
            ..Default::default()
        }
    }

    /// Set a single variable
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        if !self.vars.is_object() {
            self.vars = JsonValue::Object(serde_json::Map::new());
        }
        if let JsonValue::Object(map) = &mut self.vars {
            map.insert(name.into(), value.into());
        }
        self
    }

    /// Set request parameters
    pub fn set_params(&mut self, params: JsonValue) -> &mut Self {
        self.params = params;
        self
    }

    /// Get a value by path (e.g., "vars.region" or just "region")
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.is_empty() {
            return None;
        }

        let root = match parts[0] {
            "vars" => &self.vars,
            "params" => &self.params,
            // Bare names resolve against vars first, then params
            _ => {
                return get_nested_value(&self.vars, &parts)
                    .or_else(|| get_nested_value(&self.params, &parts));
            }
        };

        if parts.len() == 1 {
            Some(root)
        } else {
            get_nested_value(root, &parts[1..])
        }
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let mut current = value;
    for part in path {
        match current {
            JsonValue::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut result = template.to_string();
    let mut errors = Vec::new();

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let (full_match, [var_path]) = cap.extract();

        match ctx.get(var_path) {
            Some(value) => {
                result = result.replace(full_match, &value_to_string(value));
            }
            None => errors.push(var_path.to_string()),
        }
    }

    if errors.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Render every value of a string map
pub fn render_map(map: &StringMap, ctx: &TemplateContext) -> Result<StringMap> {
    map.iter()
        .map(|(k, v)| render(v, ctx).map(|rendered| (k.clone(), rendered)))
        .collect()
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap.extract::<1>().1[0].to_string())
        .collect()
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_region_substitution() {
        let mut ctx = TemplateContext::new();
        ctx.set_var("region", "eu-west-1");

        let result = render("https://apprunner.{{ region }}.amazonaws.com", &ctx).unwrap();
        assert_eq!(result, "https://apprunner.eu-west-1.amazonaws.com");

        let result = render("https://kinesis.{{ vars.region }}.amazonaws.com", &ctx).unwrap();
        assert_eq!(result, "https://kinesis.eu-west-1.amazonaws.com");
    }

    #[test]
    fn test_with_vars() {
        let mut vars = StringMap::new();
        vars.insert("stage".to_string(), "beta".to_string());
        let ctx = TemplateContext::with_vars(&vars);

        assert_eq!(render("{{ stage }}", &ctx).unwrap(), "beta");
    }

    #[test]
    fn test_params_context() {
        let mut ctx = TemplateContext::new();
        ctx.set_var("region", "us-east-1");
        ctx.set_params(json!({"Scope": "CLOUDFRONT", "MaxResults": 10}));

        assert_eq!(
            render("{{ params.Scope }}/{{ MaxResults }}", &ctx).unwrap(),
            "CLOUDFRONT/10"
        );
    }

    #[test]
    fn test_vars_shadow_params() {
        let mut ctx = TemplateContext::new();
        ctx.set_var("name", "from-vars");
        ctx.set_params(json!({"name": "from-params"}));

        assert_eq!(render("{{ name }}", &ctx).unwrap(), "from-vars");
        assert_eq!(render("{{ params.name }}", &ctx).unwrap(), "from-params");
    }

    #[test]
    fn test_undefined_variable() {
        let ctx = TemplateContext::new();
        let result = render("https://x.{{ region }}.amazonaws.com", &ctx);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("region"));
    }

    #[test]
    fn test_render_map() {
        let mut ctx = TemplateContext::new();
        ctx.set_var("token", "abc");

        let mut headers = StringMap::new();
        headers.insert("X-Amz-Security-Token".to_string(), "{{ token }}".to_string());
        headers.insert("X-Static".to_string(), "plain".to_string());

        let rendered = render_map(&headers, &ctx).unwrap();
        assert_eq!(rendered["X-Amz-Security-Token"], "abc");
        assert_eq!(rendered["X-Static"], "plain");
    }

    #[test]
    fn test_extract_variables() {
        let vars = extract_variables("https://{{ service }}.{{ vars.region }}.amazonaws.com");
        assert_eq!(vars, vec!["service", "vars.region"]);
    }

    #[test]
    fn test_whitespace_in_template() {
        let mut ctx = TemplateContext::new();
        ctx.set_var("key", "value");

        assert_eq!(render("{{key}}", &ctx).unwrap(), "value");
        assert_eq!(render("{{ key }}", &ctx).unwrap(), "value");
        assert_eq!(render("{{  key  }}", &ctx).unwrap(), "value");
    }
}
