//! Flattens a builder's DAG into a [`GraphDescription`].
//!
//! Operator nodes keep their creation order and occupy merged indices `0..operators`; constant
//! nodes follow. Reinterpret nodes never reach the description: every reference is followed
//! through them to the node that actually produces the bytes.

mod description;

use tracing::info;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Expression, GraphBuilder, NodeId, NodeType, OutputId};

pub use description::{
    ConstantNodeDesc, GraphDescription, InputEdge, IntermediateEdge, MergedNode, OperatorNodeDesc,
    OutputEdge,
};

/// Real producer of a node output once reinterpret views are stripped.
struct Origin {
    node: NodeId,
    output_index: u32,
}

impl<'data> GraphBuilder<'data> {
    /// Compiles the graph with `outputs` as graph outputs, by position.
    ///
    /// `None` entries reserve an output position without an edge. The builder is not modified,
    /// so compiling the same state twice yields identical descriptions.
    pub fn compile(&self, outputs: &[Option<Expression>]) -> GraphResult<GraphDescription<'data>> {
        self.compile_with_input_count(outputs, 0)
    }

    /// Like [`compile`](Self::compile) but declares `input_count` graph inputs.
    ///
    /// Zero means one per input node. A larger count leaves trailing inputs unused; a smaller one
    /// is rejected.
    pub fn compile_with_input_count(
        &self,
        outputs: &[Option<Expression>],
        input_count: u32,
    ) -> GraphResult<GraphDescription<'data>> {
        const OP: &str = "Compile";
        let graph_inputs = self.input_nodes().len() as u32;
        if input_count != 0 && input_count < graph_inputs {
            return Err(GraphError::contract(
                OP,
                format!("requested {input_count} inputs but the graph declares {graph_inputs}"),
            ));
        }
        let base_constant = self.operator_nodes().len() as u32;

        let mut operator_nodes = Vec::with_capacity(self.operator_nodes().len());
        let mut input_edges = Vec::new();
        let mut intermediate_edges = Vec::new();
        for (node_index, node) in self.operator_nodes().iter().enumerate() {
            let node_index = node_index as u32;
            for (input_index, input) in node.inputs.iter().enumerate() {
                let Some(input) = input else {
                    continue;
                };
                let origin = self.origin(*input)?;
                let to_node_input_index = input_index as u32;
                match origin.node.node_type {
                    NodeType::Input => {
                        let graph_input_index = self
                            .input_nodes()
                            .get(origin.node.index as usize)
                            .map(|input| input.input_index)
                            .ok_or_else(|| {
                                GraphError::structure(format!(
                                    "operator {node_index} reads unknown input node {}",
                                    origin.node.index
                                ))
                            })?;
                        input_edges.push(InputEdge {
                            graph_input_index,
                            to_node_index: node_index,
                            to_node_input_index,
                        });
                    }
                    NodeType::Operator => intermediate_edges.push(IntermediateEdge {
                        from_node_index: origin.node.index,
                        from_node_output_index: origin.output_index,
                        to_node_index: node_index,
                        to_node_input_index,
                    }),
                    NodeType::Constant => intermediate_edges.push(IntermediateEdge {
                        from_node_index: base_constant + origin.node.index,
                        from_node_output_index: origin.output_index,
                        to_node_index: node_index,
                        to_node_input_index,
                    }),
                    NodeType::Reinterpret => {
                        return Err(GraphError::structure(format!(
                            "operator {node_index} input {input_index} still resolves to a reinterpret node"
                        )))
                    }
                }
            }
            operator_nodes.push(OperatorNodeDesc {
                kind: node.kind,
                name: node.name.clone(),
                attributes: node.attributes.clone(),
            });
        }

        let constant_nodes = self
            .constant_nodes()
            .iter()
            .map(|node| ConstantNodeDesc::new(node.data, node.name.clone()))
            .collect::<Vec<_>>();

        let mut output_edges = Vec::with_capacity(outputs.len());
        for (graph_output_index, output) in outputs.iter().enumerate() {
            let Some(output) = output else {
                continue;
            };
            let origin = self.origin(self.output_id(OP, *output)?)?;
            if origin.node.node_type != NodeType::Operator {
                return Err(GraphError::structure(format!(
                    "graph output {graph_output_index} is produced by a {:?} node; route it through an identity operator",
                    origin.node.node_type
                )));
            }
            output_edges.push(OutputEdge {
                from_node_index: origin.node.index,
                from_node_output_index: origin.output_index,
                graph_output_index: graph_output_index as u32,
            });
        }

        let description = GraphDescription {
            input_count: if input_count == 0 {
                graph_inputs
            } else {
                input_count
            },
            output_count: outputs.len() as u32,
            operator_nodes,
            constant_nodes,
            input_edges,
            intermediate_edges,
            output_edges,
        };
        check_ranges(&description)?;
        info!(
            operators = description.operator_nodes.len(),
            constants = description.constant_nodes.len(),
            inputs = description.input_count,
            outputs = description.output_count,
            input_edges = description.input_edges.len(),
            intermediate_edges = description.intermediate_edges.len(),
            output_edges = description.output_edges.len(),
            "compiled graph"
        );
        Ok(description)
    }

    fn origin(&self, mut output: OutputId) -> GraphResult<Origin> {
        loop {
            let entry = self.node_output(output).ok_or_else(|| {
                GraphError::structure(format!("dangling node output {}", output.0))
            })?;
            if entry.node.node_type != NodeType::Reinterpret {
                return Ok(Origin {
                    node: entry.node,
                    output_index: entry.output_index,
                });
            }
            output = self
                .reinterpret_nodes()
                .get(entry.node.index as usize)
                .map(|node| node.input)
                .ok_or_else(|| {
                    GraphError::structure(format!(
                        "unknown reinterpret node {}",
                        entry.node.index
                    ))
                })?;
        }
    }
}

fn check_ranges(description: &GraphDescription<'_>) -> GraphResult<()> {
    let node_count = description.node_count() as u32;
    let operator_count = description.base_constant_node_index();
    for edge in &description.input_edges {
        if edge.graph_input_index >= description.input_count || edge.to_node_index >= operator_count
        {
            return Err(GraphError::structure(format!(
                "input edge {edge:?} is out of range"
            )));
        }
    }
    for edge in &description.intermediate_edges {
        if edge.from_node_index >= node_count || edge.to_node_index >= operator_count {
            return Err(GraphError::structure(format!(
                "intermediate edge {edge:?} is out of range"
            )));
        }
    }
    for edge in &description.output_edges {
        if edge.from_node_index >= operator_count || edge.graph_output_index >= description.output_count
        {
            return Err(GraphError::structure(format!(
                "output edge {edge:?} is out of range"
            )));
        }
    }
    Ok(())
}
