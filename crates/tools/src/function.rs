//! A single callable tool and its two-phase builder.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use agentry_llm::ToolCall;
use agentry_schema::Schema;

use crate::error::{ToolCallError, ToolParameterError};
use crate::extract::ParameterExtractor;

// ── requests ─────────────────────────────────────────────────────────────────

/// One model-produced request to invoke a tool by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub tool_name: String,
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

impl From<&ToolCall> for ToolCallRequest {
    fn from(call: &ToolCall) -> Self {
        Self {
            tool_name: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
        }
    }
}

// ── handlers ─────────────────────────────────────────────────────────────────

/// How a handler reports failure: a plain message from the legacy
/// string-error flavor, or the structured list from the typed flavor.
enum HandlerFailure {
    Message(String),
    Parameters(Vec<ToolParameterError>),
}

type Handler = Arc<dyn Fn(&ParameterExtractor<'_>) -> Result<Value, HandlerFailure> + Send + Sync>;

// ── ToolFunction ─────────────────────────────────────────────────────────────

/// A named function advertised to the model via JSON Schema and invoked with
/// JSON arguments.  Cloning shares the handler.
#[derive(Clone)]
pub struct ToolFunction {
    name: String,
    description: String,
    schema: Schema,
    handler: Handler,
}

impl fmt::Debug for ToolFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolFunction")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl ToolFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The OpenAI function-calling advertisement for this tool.
    pub fn to_openai_tool(&self, strict: bool) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.schema.to_json_schema(strict),
                "strict": strict,
            },
        })
    }

    /// Invoke the stored handler.
    ///
    /// `null` arguments are rejected unless the tool declares no parameters,
    /// in which case they read as an empty object.  A panicking handler is
    /// caught and reported as an execution failure rather than unwinding
    /// through the registry.
    pub fn execute(&self, arguments: &Value) -> Result<Value, ToolCallError> {
        let empty = Value::Object(Map::new());
        let arguments = match self.check_null_arguments(arguments, &empty)? {
            Some(substitute) => substitute,
            None => arguments,
        };
        let extractor = ParameterExtractor::new(arguments);
        self.dispatch(|| (self.handler)(&extractor))
    }

    /// Invoke a caller-supplied typed handler against `arguments`, with the
    /// same null-argument and panic policy as [`execute`](Self::execute).
    /// Parameter errors aggregate into one `InvalidArguments`.
    pub fn execute_enhanced<F>(&self, arguments: &Value, handler: F) -> Result<Value, ToolCallError>
    where
        F: Fn(&ParameterExtractor<'_>) -> Result<Value, Vec<ToolParameterError>>,
    {
        let empty = Value::Object(Map::new());
        let arguments = match self.check_null_arguments(arguments, &empty)? {
            Some(substitute) => substitute,
            None => arguments,
        };
        let extractor = ParameterExtractor::new(arguments);
        self.dispatch(|| handler(&extractor).map_err(HandlerFailure::Parameters))
    }

    /// Zero-parameter tools accept `null` as `{}`; anything else with `null`
    /// arguments is a call error.
    fn check_null_arguments<'v>(
        &self,
        arguments: &Value,
        empty: &'v Value,
    ) -> Result<Option<&'v Value>, ToolCallError> {
        if !arguments.is_null() {
            return Ok(None);
        }
        let parameterless = self
            .schema
            .as_object()
            .is_some_and(|o| o.properties.is_empty());
        if parameterless {
            Ok(Some(empty))
        } else {
            Err(ToolCallError::NullArguments(self.name.clone()))
        }
    }

    fn dispatch<F>(&self, run: F) -> Result<Value, ToolCallError>
    where
        F: FnOnce() -> Result<Value, HandlerFailure>,
    {
        match catch_unwind(AssertUnwindSafe(run)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(HandlerFailure::Message(message))) => {
                Err(ToolCallError::HandlerError(self.name.clone(), message))
            }
            Ok(Err(HandlerFailure::Parameters(errors))) => {
                Err(ToolCallError::InvalidArguments(self.name.clone(), errors))
            }
            Err(payload) => Err(ToolCallError::ExecutionError(
                self.name.clone(),
                panic_message(payload),
            )),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

// ── ToolBuilder ──────────────────────────────────────────────────────────────

/// Two-phase builder: identity and schema first, then a handler, then
/// [`build`](ToolBuilder::build).  Building without a handler is a
/// programmer error and fails fast.
pub struct ToolBuilder {
    name: String,
    description: String,
    schema: Schema,
    handler: Option<Handler>,
}

impl ToolBuilder {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: impl Into<Schema>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: schema.into(),
            handler: None,
        }
    }

    /// String-error handler, for handlers composing over `Result<_, String>`.
    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&ParameterExtractor<'_>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(move |extractor| {
            f(extractor).map_err(HandlerFailure::Message)
        }));
        self
    }

    /// Structured handler: parameter errors surface as `InvalidArguments`
    /// with the full list intact.
    pub fn typed_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&ParameterExtractor<'_>) -> Result<Value, Vec<ToolParameterError>>
            + Send
            + Sync
            + 'static,
    {
        self.handler = Some(Arc::new(move |extractor| {
            f(extractor).map_err(HandlerFailure::Parameters)
        }));
        self
    }

    pub fn build(self) -> Result<ToolFunction> {
        if !is_valid_tool_name(&self.name) {
            bail!(
                "tool name '{}' must match ^[A-Za-z_][A-Za-z0-9_]*$",
                self.name
            );
        }
        if self.schema.as_object().is_none() {
            bail!(
                "tool '{}' must declare an object schema at the top level",
                self.name
            );
        }
        let Some(handler) = self.handler else {
            bail!("tool '{}' built without a handler", self.name);
        };
        Ok(ToolFunction {
            name: self.name,
            description: self.description,
            schema: self.schema,
            handler,
        })
    }
}

fn is_valid_tool_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ── tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use agentry_schema::{NumberSchema, ObjectSchema, StringSchema};

    use super::*;

    fn add_tool() -> ToolFunction {
        ToolBuilder::new(
            "add",
            "Add two numbers.",
            ObjectSchema::new("Operands.")
                .required("a", NumberSchema::new("First operand."))
                .required("b", NumberSchema::new("Second operand.")),
        )
        .typed_handler(|extractor| {
            let a = extractor.require_double("a");
            let b = extractor.require_double("b");
            match (a, b) {
                (Ok(a), Ok(b)) => Ok(json!({"result": a + b})),
                (a, b) => Err(a.err().into_iter().chain(b.err()).collect()),
            }
        })
        .build()
        .expect("valid tool")
    }

    fn ping_tool() -> ToolFunction {
        ToolBuilder::new("ping", "Report liveness.", ObjectSchema::new("No parameters."))
            .handler(|_| Ok(json!({"status": "ok"})))
            .build()
            .expect("valid tool")
    }

    #[test]
    fn execute_runs_the_handler() {
        let result = add_tool().execute(&json!({"a": 2, "b": 3})).unwrap();
        assert_eq!(result, json!({"result": 5.0}));
    }

    #[test]
    fn null_arguments_with_required_params_are_rejected() {
        let error = add_tool().execute(&Value::Null).unwrap_err();
        assert_eq!(error, ToolCallError::NullArguments("add".into()));
        assert_eq!(
            error.to_string(),
            "Tool call 'add' received null arguments - expected an object with required parameters"
        );
    }

    #[test]
    fn null_arguments_for_parameterless_tool_read_as_empty_object() {
        let result = ping_tool().execute(&Value::Null).unwrap();
        assert_eq!(result, json!({"status": "ok"}));
    }

    #[test]
    fn typed_handler_aggregates_parameter_errors() {
        let error = add_tool().execute(&json!({"a": 5, "b": "3"})).unwrap_err();
        assert_eq!(
            error,
            ToolCallError::InvalidArguments(
                "add".into(),
                vec![ToolParameterError::TypeMismatch {
                    path: "b".into(),
                    expected: "number".into(),
                    actual: "string".into(),
                }],
            )
        );
    }

    #[test]
    fn string_error_handler_becomes_handler_error() {
        let tool = ToolBuilder::new("probe", "Always fails.", ObjectSchema::new("None."))
            .handler(|_| Err("backend unavailable".to_string()))
            .build()
            .unwrap();
        assert_eq!(
            tool.execute(&json!({})).unwrap_err(),
            ToolCallError::HandlerError("probe".into(), "backend unavailable".into())
        );
    }

    #[test]
    fn panicking_handler_becomes_execution_error() {
        let tool = ToolBuilder::new("brittle", "Panics.", ObjectSchema::new("None."))
            .handler(|_| panic!("index out of bounds"))
            .build()
            .unwrap();
        assert_eq!(
            tool.execute(&json!({})).unwrap_err(),
            ToolCallError::ExecutionError("brittle".into(), "index out of bounds".into())
        );
    }

    #[test]
    fn execute_enhanced_uses_the_supplied_handler() {
        let tool = add_tool();
        let error = tool
            .execute_enhanced(&json!({}), |extractor| {
                let mut errors = Vec::new();
                let a = extractor.require_double("a").map_err(|e| errors.push(e));
                let b = extractor.require_double("b").map_err(|e| errors.push(e));
                match (a, b) {
                    (Ok(a), Ok(b)) => Ok(json!({"result": a + b})),
                    _ => Err(errors),
                }
            })
            .unwrap_err();
        match error {
            ToolCallError::InvalidArguments(name, errors) => {
                assert_eq!(name, "add");
                assert_eq!(errors.len(), 2);
            }
            other => panic!("expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn build_without_handler_fails_fast() {
        let result = ToolBuilder::new("bare", "No handler.", ObjectSchema::new("None.")).build();
        assert!(result.is_err());
    }

    #[test]
    fn build_rejects_invalid_names() {
        for name in ["", "9lives", "has space", "dash-ed"] {
            let result = ToolBuilder::new(name, "Bad name.", ObjectSchema::new("None."))
                .handler(|_| Ok(Value::Null))
                .build();
            assert!(result.is_err(), "name {name:?} should be rejected");
        }
        let ok = ToolBuilder::new("_ok_2", "Fine name.", ObjectSchema::new("None."))
            .handler(|_| Ok(Value::Null))
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn build_rejects_non_object_schemas() {
        let result = ToolBuilder::new("scalar", "Bad schema.", StringSchema::new("Not an object."))
            .handler(|_| Ok(Value::Null))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn openai_advertisement_carries_strict_schema() {
        let advertised = add_tool().to_openai_tool(true);
        assert_eq!(advertised["type"], "function");
        assert_eq!(advertised["function"]["name"], "add");
        assert_eq!(advertised["function"]["strict"], json!(true));
        assert_eq!(
            advertised["function"]["parameters"]["required"],
            json!(["a", "b"])
        );
    }
}
