//! Typed, path-addressed extraction from a JSON arguments value.
//!
//! Handlers never touch raw JSON: they read parameters through a
//! [`ParameterExtractor`] using dot-delimited paths with optional `[i]`
//! indexing (`user.profile.theme`, `items[1]`).  Every getter is total:
//! any JSON input yields either a value or one of the four
//! [`ToolParameterError`] variants, never a panic.
//!
//! Two flavors coexist: `require_*`/`optional_*` return structured errors
//! for aggregation at the dispatch boundary, while the `get_*` getters
//! return plain strings so simple handlers can compose over
//! `Result<_, String>`.

use serde_json::{Map, Value};

use crate::error::ToolParameterError;

// ── path model ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Key(String),
    Index(usize),
}

/// Split one dot-delimited piece into a key plus trailing `[i]` indexes.
/// Malformed bracket syntax degrades to a literal key lookup so traversal
/// stays total.
fn parse_piece(piece: &str) -> Vec<Step> {
    let Some(pos) = piece.find('[') else {
        return vec![Step::Key(piece.to_string())];
    };
    let (name, mut rest) = piece.split_at(pos);
    let mut steps = Vec::new();
    if !name.is_empty() {
        steps.push(Step::Key(name.to_string()));
    }
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(end) = inner.find(']') else {
            return vec![Step::Key(piece.to_string())];
        };
        let Ok(index) = inner[..end].parse::<usize>() else {
            return vec![Step::Key(piece.to_string())];
        };
        steps.push(Step::Index(index));
        rest = &inner[end + 1..];
    }
    if rest.is_empty() {
        steps
    } else {
        vec![Step::Key(piece.to_string())]
    }
}

fn parse_path(path: &str) -> Vec<Step> {
    path.split('.').flat_map(parse_piece).collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── extractor ────────────────────────────────────────────────────────────────

/// Read-only view over a tool's JSON arguments.
#[derive(Debug, Clone, Copy)]
pub struct ParameterExtractor<'a> {
    root: &'a Value,
}

impl<'a> ParameterExtractor<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The wrapped arguments value.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Walk `path` down from the root and return the addressed value.
    ///
    /// A missing key reports the keys of the object it was looked up in,
    /// never the root's.  `null` and type errors on the *final* value are
    /// left to the typed getters; this only rejects values that cannot be
    /// descended through.
    fn resolve(&self, path: &str, expected: &str) -> Result<&'a Value, ToolParameterError> {
        let steps = parse_path(path);
        let mut current = self.root;
        let mut walked = String::new();

        for step in &steps {
            let next = match step {
                Step::Key(key) => match current {
                    Value::Object(map) => match map.get(key) {
                        Some(value) => value,
                        None => {
                            return Err(ToolParameterError::MissingParameter {
                                path: path.to_string(),
                                expected: expected.to_string(),
                                available: map.keys().cloned().collect(),
                            });
                        }
                    },
                    other => {
                        return Err(ToolParameterError::InvalidNesting {
                            segment: key.clone(),
                            parent: parent_label(&walked),
                            actual: json_type_name(other).to_string(),
                        });
                    }
                },
                Step::Index(index) => match current {
                    Value::Array(items) => match items.get(*index) {
                        Some(value) => value,
                        None => {
                            return Err(ToolParameterError::MissingParameter {
                                path: path.to_string(),
                                expected: expected.to_string(),
                                available: vec![],
                            });
                        }
                    },
                    other => {
                        return Err(ToolParameterError::InvalidNesting {
                            segment: format!("[{index}]"),
                            parent: parent_label(&walked),
                            actual: json_type_name(other).to_string(),
                        });
                    }
                },
            };
            match step {
                Step::Key(key) => {
                    if !walked.is_empty() {
                        walked.push('.');
                    }
                    walked.push_str(key);
                }
                Step::Index(index) => {
                    walked.push_str(&format!("[{index}]"));
                }
            }
            current = next;
        }

        Ok(current)
    }

    // ── structured getters ───────────────────────────────────────────────────

    pub fn require_string(&self, path: &str) -> Result<String, ToolParameterError> {
        match self.resolve(path, "string")? {
            Value::Null => Err(null_parameter(path, "string")),
            Value::String(s) => Ok(s.clone()),
            other => Err(type_mismatch(path, "string", other)),
        }
    }

    /// Integer getter.  JSON numbers with a fractional part are a type
    /// mismatch, not a truncation.
    pub fn require_int(&self, path: &str) -> Result<i64, ToolParameterError> {
        let value = self.resolve(path, "integer")?;
        match value {
            Value::Null => Err(null_parameter(path, "integer")),
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| type_mismatch(path, "integer", value)),
            other => Err(type_mismatch(path, "integer", other)),
        }
    }

    /// Floating-point getter.  Accepts any JSON number, integer or not.
    pub fn require_double(&self, path: &str) -> Result<f64, ToolParameterError> {
        let value = self.resolve(path, "number")?;
        match value {
            Value::Null => Err(null_parameter(path, "number")),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| type_mismatch(path, "number", value)),
            other => Err(type_mismatch(path, "number", other)),
        }
    }

    pub fn require_bool(&self, path: &str) -> Result<bool, ToolParameterError> {
        match self.resolve(path, "boolean")? {
            Value::Null => Err(null_parameter(path, "boolean")),
            Value::Bool(b) => Ok(*b),
            other => Err(type_mismatch(path, "boolean", other)),
        }
    }

    pub fn require_array(&self, path: &str) -> Result<Vec<Value>, ToolParameterError> {
        match self.resolve(path, "array")? {
            Value::Null => Err(null_parameter(path, "array")),
            Value::Array(items) => Ok(items.clone()),
            other => Err(type_mismatch(path, "array", other)),
        }
    }

    pub fn require_object(&self, path: &str) -> Result<Map<String, Value>, ToolParameterError> {
        match self.resolve(path, "object")? {
            Value::Null => Err(null_parameter(path, "object")),
            Value::Object(map) => Ok(map.clone()),
            other => Err(type_mismatch(path, "object", other)),
        }
    }

    // ── optional getters ─────────────────────────────────────────────────────
    //
    // Missing and null both collapse to `Ok(None)`; nesting and type errors
    // still surface.

    pub fn optional_string(&self, path: &str) -> Result<Option<String>, ToolParameterError> {
        optional(self.require_string(path))
    }

    pub fn optional_int(&self, path: &str) -> Result<Option<i64>, ToolParameterError> {
        optional(self.require_int(path))
    }

    pub fn optional_double(&self, path: &str) -> Result<Option<f64>, ToolParameterError> {
        optional(self.require_double(path))
    }

    pub fn optional_bool(&self, path: &str) -> Result<Option<bool>, ToolParameterError> {
        optional(self.require_bool(path))
    }

    pub fn optional_array(&self, path: &str) -> Result<Option<Vec<Value>>, ToolParameterError> {
        optional(self.require_array(path))
    }

    pub fn optional_object(
        &self,
        path: &str,
    ) -> Result<Option<Map<String, Value>>, ToolParameterError> {
        optional(self.require_object(path))
    }

    // ── legacy string-error getters ──────────────────────────────────────────

    pub fn get_string(&self, path: &str) -> Result<String, String> {
        self.require_string(path).map_err(|e| e.to_string())
    }

    pub fn get_int(&self, path: &str) -> Result<i64, String> {
        self.require_int(path).map_err(|e| e.to_string())
    }

    pub fn get_double(&self, path: &str) -> Result<f64, String> {
        self.require_double(path).map_err(|e| e.to_string())
    }

    pub fn get_bool(&self, path: &str) -> Result<bool, String> {
        self.require_bool(path).map_err(|e| e.to_string())
    }

    pub fn get_array(&self, path: &str) -> Result<Vec<Value>, String> {
        self.require_array(path).map_err(|e| e.to_string())
    }

    pub fn get_object(&self, path: &str) -> Result<Map<String, Value>, String> {
        self.require_object(path).map_err(|e| e.to_string())
    }
}

fn parent_label(walked: &str) -> String {
    if walked.is_empty() {
        "root".to_string()
    } else {
        walked.to_string()
    }
}

fn null_parameter(path: &str, expected: &str) -> ToolParameterError {
    ToolParameterError::NullParameter {
        path: path.to_string(),
        expected: expected.to_string(),
    }
}

fn type_mismatch(path: &str, expected: &str, actual: &Value) -> ToolParameterError {
    ToolParameterError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: json_type_name(actual).to_string(),
    }
}

fn optional<T>(result: Result<T, ToolParameterError>) -> Result<Option<T>, ToolParameterError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(
            ToolParameterError::MissingParameter { .. } | ToolParameterError::NullParameter { .. },
        ) => Ok(None),
        Err(other) => Err(other),
    }
}

// ── tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn nested_user() -> Value {
        json!({
            "user": {
                "profile": {
                    "firstName": "A",
                    "lastName": "B",
                    "settings": {"theme": "x"},
                },
            },
        })
    }

    #[test]
    fn scalar_getters_read_nested_paths() {
        let args = nested_user();
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(
            extractor.require_string("user.profile.firstName").unwrap(),
            "A"
        );
        assert_eq!(
            extractor
                .require_string("user.profile.settings.theme")
                .unwrap(),
            "x"
        );
    }

    #[test]
    fn missing_key_reports_keys_of_the_enclosing_object() {
        let args = nested_user();
        let extractor = ParameterExtractor::new(&args);
        let error = extractor.require_int("user.profile.age").unwrap_err();
        assert_eq!(
            error,
            ToolParameterError::MissingParameter {
                path: "user.profile.age".into(),
                expected: "integer".into(),
                available: vec!["firstName".into(), "lastName".into(), "settings".into()],
            }
        );
    }

    #[test]
    fn missing_intermediate_key_reports_that_level() {
        let args = nested_user();
        let extractor = ParameterExtractor::new(&args);
        let error = extractor.require_string("user.account.id").unwrap_err();
        match error {
            ToolParameterError::MissingParameter {
                path, available, ..
            } => {
                assert_eq!(path, "user.account.id");
                assert_eq!(available, vec!["profile".to_string()]);
            }
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn descending_through_a_scalar_is_invalid_nesting() {
        let args = nested_user();
        let extractor = ParameterExtractor::new(&args);
        let error = extractor
            .require_string("user.profile.firstName.initial")
            .unwrap_err();
        assert_eq!(
            error,
            ToolParameterError::InvalidNesting {
                segment: "initial".into(),
                parent: "user.profile.firstName".into(),
                actual: "string".into(),
            }
        );
    }

    #[test]
    fn descending_through_null_is_invalid_nesting() {
        let args = json!({"user": {"profile": null}});
        let extractor = ParameterExtractor::new(&args);
        let error = extractor.require_string("user.profile.name").unwrap_err();
        assert_eq!(
            error,
            ToolParameterError::InvalidNesting {
                segment: "name".into(),
                parent: "user.profile".into(),
                actual: "null".into(),
            }
        );
    }

    #[test]
    fn probing_a_non_object_root_is_invalid_nesting() {
        let args = json!("just a string");
        let extractor = ParameterExtractor::new(&args);
        let error = extractor.require_string("query").unwrap_err();
        assert_eq!(
            error,
            ToolParameterError::InvalidNesting {
                segment: "query".into(),
                parent: "root".into(),
                actual: "string".into(),
            }
        );
    }

    #[test]
    fn null_leaf_is_null_parameter_not_missing() {
        let args = json!({"limit": null});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(
            extractor.require_int("limit").unwrap_err(),
            ToolParameterError::NullParameter {
                path: "limit".into(),
                expected: "integer".into(),
            }
        );
    }

    #[test]
    fn wrong_leaf_type_is_type_mismatch() {
        let args = json!({"b": "3"});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(
            extractor.require_double("b").unwrap_err(),
            ToolParameterError::TypeMismatch {
                path: "b".into(),
                expected: "number".into(),
                actual: "string".into(),
            }
        );
    }

    #[test]
    fn int_getter_rejects_fractional_numbers() {
        let args = json!({"count": 2.5});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(
            extractor.require_int("count").unwrap_err(),
            ToolParameterError::TypeMismatch {
                path: "count".into(),
                expected: "integer".into(),
                actual: "number".into(),
            }
        );
    }

    #[test]
    fn double_getter_accepts_integer_numbers() {
        let args = json!({"count": 3});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(extractor.require_double("count").unwrap(), 3.0);
    }

    #[test]
    fn array_indexing_reads_elements() {
        let args = json!({"items": [{"id": 1}, {"id": 2}]});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(extractor.require_int("items[1].id").unwrap(), 2);
    }

    #[test]
    fn array_index_out_of_range_is_missing_with_no_keys() {
        let args = json!({"items": [1, 2]});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(
            extractor.require_int("items[5]").unwrap_err(),
            ToolParameterError::MissingParameter {
                path: "items[5]".into(),
                expected: "integer".into(),
                available: vec![],
            }
        );
    }

    #[test]
    fn indexing_a_non_array_is_invalid_nesting() {
        let args = json!({"items": {"0": "zero"}});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(
            extractor.require_string("items[0]").unwrap_err(),
            ToolParameterError::InvalidNesting {
                segment: "[0]".into(),
                parent: "items".into(),
                actual: "object".into(),
            }
        );
    }

    #[test]
    fn malformed_brackets_fall_back_to_literal_keys() {
        let args = json!({"a[x]": 1, "b[": 2});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(extractor.require_int("a[x]").unwrap(), 1);
        assert_eq!(extractor.require_int("b[").unwrap(), 2);
    }

    #[test]
    fn optional_collapses_missing_and_null() {
        let args = json!({"present": "v", "nothing": null});
        let extractor = ParameterExtractor::new(&args);
        assert_eq!(
            extractor.optional_string("present").unwrap(),
            Some("v".to_string())
        );
        assert_eq!(extractor.optional_string("nothing").unwrap(), None);
        assert_eq!(extractor.optional_string("absent").unwrap(), None);
    }

    #[test]
    fn optional_still_reports_type_and_nesting_errors() {
        let args = json!({"count": "three", "leaf": 5});
        let extractor = ParameterExtractor::new(&args);
        assert!(matches!(
            extractor.optional_int("count").unwrap_err(),
            ToolParameterError::TypeMismatch { .. }
        ));
        assert!(matches!(
            extractor.optional_int("leaf.deeper").unwrap_err(),
            ToolParameterError::InvalidNesting { .. }
        ));
    }

    #[test]
    fn legacy_getters_stringify_the_structured_error() {
        let args = nested_user();
        let extractor = ParameterExtractor::new(&args);
        let structured = extractor.require_int("user.profile.age").unwrap_err();
        let legacy = extractor.get_int("user.profile.age").unwrap_err();
        assert_eq!(legacy, structured.to_string());
    }

    #[test]
    fn every_getter_is_total_over_arbitrary_inputs() {
        let inputs = [
            json!(null),
            json!(true),
            json!(3.25),
            json!("text"),
            json!([1, [2], {"k": null}]),
            json!({"a": {"b": [{"c": null}]}, "": 0}),
        ];
        let paths = [
            "", "a", "a.b", "a.b[0].c", "a..b", "[0]", "x[9]", "a[", "a]b", ".",
        ];
        for input in &inputs {
            let extractor = ParameterExtractor::new(input);
            for path in &paths {
                // Each call must return, never panic.
                let _ = extractor.require_string(path);
                let _ = extractor.require_int(path);
                let _ = extractor.require_double(path);
                let _ = extractor.require_bool(path);
                let _ = extractor.require_array(path);
                let _ = extractor.require_object(path);
                let _ = extractor.optional_string(path);
                let _ = extractor.get_string(path);
            }
        }
    }

    #[test]
    fn empty_segments_are_literal_keys() {
        let args = json!({"": {"x": 1}});
        let extractor = ParameterExtractor::new(&args);
        // A leading dot yields an empty first segment, looked up verbatim.
        assert_eq!(extractor.require_int(".x").unwrap(), 1);
    }
}
