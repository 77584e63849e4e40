//! Parameter schema model for LLM-callable tools.
//!
//! A [`Schema`] is an immutable, recursive description of a tool's
//! parameters.  Tools build one with the fluent variant constructors
//! ([`ObjectSchema`], [`StringSchema`], …) and the registry emits it to the
//! model as JSON Schema via [`Schema::to_json_schema`], which supports both
//! the plain form and OpenAI strict function calling.

mod emit;
mod schema;

pub use schema::{
    ArraySchema, BooleanSchema, NumberSchema, ObjectSchema, PropertySchema, Schema, StringSchema,
};
