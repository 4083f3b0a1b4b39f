//! Solve a single expression against a JSON context

use crate::{Context, ExpressionService};
use super::{CliError, json_to_value, value_to_json};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The expression to solve
    pub expression: String,
    /// JSON object mapping root names (`this`, `metadata`, ...) to values
    pub input: Option<String>,
}

/// Execute a dataview eval operation
pub fn execute_eval(options: &EvalOptions) -> Result<serde_json::Value, CliError> {
    let service = ExpressionService::new(&options.expression)?;

    let context = match options.input.as_deref().map(str::trim) {
        None | Some("") => Context::new(),
        Some(json) => {
            let json_value: serde_json::Value = serde_json::from_str(json)?;
            match json_to_value(json_value) {
                crate::Value::Object(roots) => Context::from(roots),
                crate::Value::Null => Context::new(),
                other => return Err(CliError::InvalidContext(other.type_name())),
            }
        }
    };

    let result = service.solve(&context)?;
    Ok(value_to_json(result))
}
