use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{DescriptionIoError, DescriptionSerdeError};
use crate::hashing::Fingerprint;
use crate::ops::OperatorAttributes;
use crate::schema::OperatorKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorNodeDesc {
    pub kind: OperatorKind,
    pub name: Option<String>,
    pub attributes: OperatorAttributes,
}

/// Constant bytes are referenced, never copied; serialized forms carry only their length and hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantNodeDesc<'data> {
    #[serde(skip)]
    pub data: &'data [u8],
    pub byte_len: usize,
    pub byte_hash: Fingerprint,
    pub name: Option<String>,
}

impl<'data> ConstantNodeDesc<'data> {
    pub(crate) fn new(data: &'data [u8], name: Option<String>) -> Self {
        Self {
            data,
            byte_len: data.len(),
            byte_hash: Fingerprint::of_bytes(data),
            name,
        }
    }
}

/// Graph input feeding one operator argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InputEdge {
    pub graph_input_index: u32,
    pub to_node_index: u32,
    pub to_node_input_index: u32,
}

/// Output slot of a merged node feeding one operator argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IntermediateEdge {
    pub from_node_index: u32,
    pub from_node_output_index: u32,
    pub to_node_index: u32,
    pub to_node_input_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OutputEdge {
    pub from_node_index: u32,
    pub from_node_output_index: u32,
    pub graph_output_index: u32,
}

/// Entry of the merged node list: operators first, then constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergedNode<'a, 'data> {
    Operator(&'a OperatorNodeDesc),
    Constant(&'a ConstantNodeDesc<'data>),
}

/// Flattened, index-addressed graph handed to the downstream compiler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphDescription<'data> {
    pub input_count: u32,
    pub output_count: u32,
    pub operator_nodes: Vec<OperatorNodeDesc>,
    pub constant_nodes: Vec<ConstantNodeDesc<'data>>,
    pub input_edges: Vec<InputEdge>,
    pub intermediate_edges: Vec<IntermediateEdge>,
    pub output_edges: Vec<OutputEdge>,
}

impl<'data> GraphDescription<'data> {
    pub const fn base_operator_node_index(&self) -> u32 {
        0
    }

    pub fn base_constant_node_index(&self) -> u32 {
        self.operator_nodes.len() as u32
    }

    pub fn node_count(&self) -> usize {
        self.operator_nodes.len() + self.constant_nodes.len()
    }

    pub fn merged_nodes(&self) -> Vec<MergedNode<'_, 'data>> {
        self.operator_nodes
            .iter()
            .map(MergedNode::Operator)
            .chain(self.constant_nodes.iter().map(MergedNode::Constant))
            .collect()
    }

    pub fn to_json_string(&self) -> Result<String, DescriptionSerdeError> {
        serde_json::to_string_pretty(self).map_err(DescriptionSerdeError::from)
    }

    pub fn to_bincode_bytes(&self) -> Result<Vec<u8>, DescriptionSerdeError> {
        bincode::serialize(self).map_err(DescriptionSerdeError::from)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), DescriptionIoError> {
        let contents = self.to_json_string()?;
        fs::write(path, contents).map_err(DescriptionIoError::from)
    }

    /// Fingerprint of the JSON form; equal fingerprints mean byte-identical descriptions.
    pub fn fingerprint(&self) -> Result<Fingerprint, DescriptionSerdeError> {
        Ok(Fingerprint::of_json(self)?)
    }

    pub fn to_text(&self) -> String {
        format!("{self}")
    }
}

impl fmt::Display for GraphDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_line(
            f,
            0,
            &format!(
                "graph (inputs = {}, outputs = {}) {{",
                self.input_count, self.output_count
            ),
        )?;
        if !self.operator_nodes.is_empty() {
            write_line(f, 1, "operators:")?;
            for (index, node) in self.operator_nodes.iter().enumerate() {
                let name = node
                    .name
                    .as_deref()
                    .map(|name| format!(" \"{name}\""))
                    .unwrap_or_default();
                write_line(
                    f,
                    2,
                    &format!(
                        "#{} {}{name} {:?}",
                        self.base_operator_node_index() + index as u32,
                        node.kind,
                        node.attributes
                    ),
                )?;
            }
        }
        if !self.constant_nodes.is_empty() {
            write_line(f, 1, "constants:")?;
            for (index, node) in self.constant_nodes.iter().enumerate() {
                write_line(
                    f,
                    2,
                    &format!(
                        "#{} {} bytes{}",
                        self.base_constant_node_index() + index as u32,
                        node.byte_len,
                        node.name
                            .as_deref()
                            .map(|name| format!(" \"{name}\""))
                            .unwrap_or_default()
                    ),
                )?;
            }
        }
        if !self.input_edges.is_empty() {
            write_line(f, 1, "input edges:")?;
            for edge in &self.input_edges {
                write_line(
                    f,
                    2,
                    &format!(
                        "in{} -> #{}.{}",
                        edge.graph_input_index, edge.to_node_index, edge.to_node_input_index
                    ),
                )?;
            }
        }
        if !self.intermediate_edges.is_empty() {
            write_line(f, 1, "intermediate edges:")?;
            for edge in &self.intermediate_edges {
                write_line(
                    f,
                    2,
                    &format!(
                        "#{}:{} -> #{}.{}",
                        edge.from_node_index,
                        edge.from_node_output_index,
                        edge.to_node_index,
                        edge.to_node_input_index
                    ),
                )?;
            }
        }
        if !self.output_edges.is_empty() {
            write_line(f, 1, "output edges:")?;
            for edge in &self.output_edges {
                write_line(
                    f,
                    2,
                    &format!(
                        "#{}:{} -> out{}",
                        edge.from_node_index, edge.from_node_output_index, edge.graph_output_index
                    ),
                )?;
            }
        }
        write_line(f, 0, "}")
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, indent: usize, line: &str) -> fmt::Result {
    for _ in 0..indent {
        f.write_str("  ")?;
    }
    f.write_str(line)?;
    f.write_str("\n")
}
