use super::node::{BuilderId, OutputId};

/// Copyable handle to one output slot of one node.
///
/// An expression only carries indices; every query goes through the
/// [`GraphBuilder`](super::GraphBuilder) that produced it, which rejects handles minted by a
/// different builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expression {
    pub(crate) builder: BuilderId,
    pub(crate) output: OutputId,
}

impl Expression {
    pub(crate) fn new(builder: BuilderId, output: OutputId) -> Self {
        Self { builder, output }
    }

    pub fn builder_id(&self) -> BuilderId {
        self.builder
    }

    /// Position of the referenced output in creation order.
    pub fn output_position(&self) -> u32 {
        self.output.0
    }
}
