//! Node variants stored by the builder, addressed by `(NodeType, index)`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::ops::OperatorAttributes;
use crate::schema::OperatorKind;
use crate::tensor::TensorDesc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    Input,
    Operator,
    Reinterpret,
    Constant,
}

/// Position of a node inside the arena for its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId {
    pub node_type: NodeType,
    pub index: u32,
}

impl NodeId {
    pub(crate) fn new(node_type: NodeType, index: u32) -> Self {
        Self { node_type, index }
    }
}

/// Index into the builder's node-output arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct OutputId(pub(crate) u32);

/// Process-unique identity of a [`GraphBuilder`](super::GraphBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderId(u64);

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(1);

impl BuilderId {
    pub(crate) fn next() -> Self {
        BuilderId(NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InputNode {
    pub(crate) input_index: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct OperatorNode {
    pub(crate) kind: OperatorKind,
    pub(crate) attributes: OperatorAttributes,
    /// Fixed argument order; `None` marks an absent optional input.
    pub(crate) inputs: Vec<Option<OutputId>>,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ReinterpretNode {
    pub(crate) input: OutputId,
}

#[derive(Debug, Clone)]
pub(crate) struct ConstantNode<'data> {
    pub(crate) data: &'data [u8],
    pub(crate) name: Option<String>,
}

/// One addressable output slot of a node.
#[derive(Debug, Clone)]
pub(crate) struct NodeOutput {
    pub(crate) node: NodeId,
    pub(crate) output_index: u32,
    pub(crate) desc: TensorDesc,
}
