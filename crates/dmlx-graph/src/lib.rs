//! Tensor compute-graph builder and compiler.
//!
//! A [`GraphBuilder`] accumulates input, operator, reinterpret and constant nodes. Operator
//! builders in [`ops`] infer every output descriptor as they go, and
//! [`GraphBuilder::compile`] flattens the result into an index-addressed [`GraphDescription`]
//! for a downstream runtime compiler.

pub mod compile;
pub mod config;
mod env;
pub mod error;
pub mod graph;
pub mod hashing;
pub mod logging;
pub mod ops;
pub mod schema;
pub mod tensor;

pub use compile::GraphDescription;
pub use config::BuilderConfig;
pub use error::{ErrorCategory, GraphError, GraphResult};
pub use graph::{Expression, GraphBuilder};
pub use schema::{Capabilities, FeatureLevel, OperatorKind};
pub use tensor::{DataType, LayoutPolicy, TensorDesc};
