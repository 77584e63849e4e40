//! JSON-Schema emission.
//!
//! One entry point, [`Schema::to_json_schema`].  `strict` reproduces OpenAI
//! strict function calling: every declared object property is listed under
//! `required`, whatever its declared flag.

use serde_json::{Map, Value, json};

use crate::schema::Schema;

impl Schema {
    /// Emit this schema as a JSON-Schema object.
    ///
    /// Optional constraints appear only when set.  `strict` is threaded
    /// through nested schemas so inner objects obey the same required-set
    /// rule as the top level.
    pub fn to_json_schema(&self, strict: bool) -> Value {
        match self {
            Schema::String(s) => {
                let mut out = Map::new();
                out.insert("type".into(), json!("string"));
                out.insert("description".into(), json!(s.description));
                if let Some(values) = &s.enum_values {
                    out.insert("enum".into(), json!(values));
                }
                if let Some(pattern) = &s.pattern {
                    out.insert("pattern".into(), json!(pattern));
                }
                if let Some(n) = s.min_length {
                    out.insert("minLength".into(), json!(n));
                }
                if let Some(n) = s.max_length {
                    out.insert("maxLength".into(), json!(n));
                }
                Value::Object(out)
            }
            Schema::Number(s) => {
                let kind = if s.integer { "integer" } else { "number" };
                let mut out = Map::new();
                out.insert("type".into(), json!(kind));
                out.insert("description".into(), json!(s.description));
                if let Some(v) = s.minimum {
                    out.insert("minimum".into(), numeric(v));
                }
                if let Some(v) = s.maximum {
                    out.insert("maximum".into(), numeric(v));
                }
                if let Some(v) = s.exclusive_minimum {
                    out.insert("exclusiveMinimum".into(), numeric(v));
                }
                if let Some(v) = s.exclusive_maximum {
                    out.insert("exclusiveMaximum".into(), numeric(v));
                }
                if let Some(v) = s.multiple_of {
                    out.insert("multipleOf".into(), numeric(v));
                }
                Value::Object(out)
            }
            Schema::Boolean(s) => json!({
                "type": "boolean",
                "description": s.description,
            }),
            Schema::Array(s) => {
                let mut out = Map::new();
                out.insert("type".into(), json!("array"));
                out.insert("description".into(), json!(s.description));
                out.insert("items".into(), s.items.to_json_schema(strict));
                if let Some(n) = s.min_items {
                    out.insert("minItems".into(), json!(n));
                }
                if let Some(n) = s.max_items {
                    out.insert("maxItems".into(), json!(n));
                }
                if s.unique_items {
                    out.insert("uniqueItems".into(), json!(true));
                }
                Value::Object(out)
            }
            Schema::Object(s) => {
                let mut properties = Map::new();
                for property in &s.properties {
                    properties.insert(property.name.clone(), property.schema.to_json_schema(strict));
                }
                let required: Vec<&str> = s
                    .properties
                    .iter()
                    .filter(|p| strict || p.required)
                    .map(|p| p.name.as_str())
                    .collect();
                json!({
                    "type": "object",
                    "description": s.description,
                    "properties": properties,
                    "required": required,
                    "additionalProperties": s.additional_properties,
                })
            }
            Schema::Nullable(inner) => {
                let mut out = inner.to_json_schema(strict);
                admit_null(&mut out);
                out
            }
        }
    }
}

/// Render a bound without a spurious fraction: `0.0` emits as `0`.
fn numeric(v: f64) -> Value {
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        json!(v as i64)
    } else {
        json!(v)
    }
}

/// Rewrite the `type` field so the schema also admits `null`.  A scalar
/// `"T"` becomes `["T","null"]`; an existing array gains `"null"` at most
/// once.
fn admit_null(schema: &mut Value) {
    let Some(object) = schema.as_object_mut() else {
        return;
    };
    match object.get("type").cloned() {
        Some(Value::String(t)) => {
            object.insert("type".into(), json!([t, "null"]));
        }
        Some(Value::Array(mut types)) => {
            if !types.iter().any(|t| t == "null") {
                types.push(json!("null"));
            }
            object.insert("type".into(), Value::Array(types));
        }
        _ => {}
    }
}

// ── tests ────────────────────────────────────────────────────────────────────
