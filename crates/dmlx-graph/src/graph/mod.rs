//! Build-time DAG: four node arenas, their addressable outputs, and the builder that appends to
//! them.

mod builder;
mod expression;
mod node;
mod scope;

pub use builder::GraphBuilder;
pub use expression::Expression;
pub use node::{BuilderId, NodeId, NodeType};

pub(crate) use node::{NodeOutput, OperatorNode, OutputId};
