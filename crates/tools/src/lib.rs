//! Tool definition, typed argument extraction, and dispatch.
//!
//! A [`ToolFunction`] couples a name, a parameter [`Schema`], and a native
//! handler defined over a [`ParameterExtractor`].  Tools are bundled in a
//! [`ToolRegistry`], which advertises them to the model in JSON-Schema form
//! and dispatches model-produced tool-call requests synchronously, on the
//! background task system, or in order-preserving batches under an
//! [`ExecutionStrategy`].
//!
//! [`Schema`]: agentry_schema::Schema

mod error;
mod extract;
mod function;
mod registry;

pub use error::{ToolCallError, ToolParameterError};
pub use extract::ParameterExtractor;
pub use function::{ToolBuilder, ToolCallRequest, ToolFunction};
pub use registry::{ExecutionStrategy, ToolRegistry};
