use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::BuilderConfig;
use crate::error::{GraphError, GraphResult};
use crate::ops::OperatorAttributes;
use crate::schema::{
    operator_schemas, FeatureLevel, FieldKind, OperatorFieldSpec, OperatorKind, OperatorSchemas,
};
use crate::tensor::{buffer_tensor_size, DataType, LayoutPolicy, TensorDesc};

use super::expression::Expression;
use super::node::{
    BuilderId, ConstantNode, InputNode, NodeId, NodeOutput, NodeType, OperatorNode, OutputId,
    ReinterpretNode,
};
use super::scope::NameScope;

/// Append-only DAG under construction.
///
/// Nodes live in one arena per variant and are never removed, so every [`Expression`] handed out
/// stays valid for the lifetime of the builder. Constant nodes borrow caller bytes for `'data`.
pub struct GraphBuilder<'data> {
    id: BuilderId,
    config: BuilderConfig,
    layout: LayoutPolicy,
    schemas: Arc<OperatorSchemas>,
    inputs: Vec<InputNode>,
    operators: Vec<OperatorNode>,
    reinterprets: Vec<ReinterpretNode>,
    constants: Vec<ConstantNode<'data>>,
    outputs: Vec<NodeOutput>,
    names: NameScope,
}

impl<'data> Default for GraphBuilder<'data> {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

impl<'data> GraphBuilder<'data> {
    pub fn new(config: BuilderConfig) -> Self {
        let schemas = operator_schemas(&config.capabilities);
        let id = BuilderId::next();
        debug!(
            builder = ?id,
            feature_level = %config.capabilities.feature_level,
            layout = ?config.layout,
            kinds = schemas.len(),
            "created graph builder"
        );
        Self {
            id,
            layout: LayoutPolicy::from(config.layout),
            config,
            schemas,
            inputs: Vec::new(),
            operators: Vec::new(),
            reinterprets: Vec::new(),
            constants: Vec::new(),
            outputs: Vec::new(),
            names: NameScope::default(),
        }
    }

    /// Replaces the configured layout before any node is created.
    pub fn with_layout(mut self, layout: LayoutPolicy) -> Self {
        self.layout = layout;
        self
    }

    pub fn id(&self) -> BuilderId {
        self.id
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn schemas(&self) -> &OperatorSchemas {
        &self.schemas
    }

    pub fn layout(&self) -> &LayoutPolicy {
        &self.layout
    }

    /// Affects descriptors inferred after the call; existing outputs keep their layout.
    pub fn set_layout(&mut self, layout: LayoutPolicy) {
        self.layout = layout;
    }

    pub fn push_name(&mut self, segment: &str) {
        self.names.push(segment);
    }

    pub fn pop_name(&mut self) {
        self.names.pop();
    }

    /// Runs `body` with `segment` pushed onto the name scope.
    pub fn with_name_scope<R>(&mut self, segment: &str, body: impl FnOnce(&mut Self) -> R) -> R {
        self.names.push(segment);
        let result = body(self);
        self.names.pop();
        result
    }

    pub fn current_name(&self) -> Option<&str> {
        self.names.current()
    }

    /// Declares graph input `index` with descriptor `desc`.
    pub fn input(&mut self, index: u32, desc: TensorDesc) -> Expression {
        let node = NodeId::new(NodeType::Input, self.inputs.len() as u32);
        self.inputs.push(InputNode { input_index: index });
        trace!(index, %desc, "declared graph input");
        self.push_output(node, 0, desc)
    }

    /// Declares a graph input whose descriptor follows the builder layout.
    pub fn input_tensor(
        &mut self,
        index: u32,
        data_type: DataType,
        sizes: &[u32],
    ) -> GraphResult<Expression> {
        let desc = self.output_desc(data_type, sizes)?;
        Ok(self.input(index, desc))
    }

    /// Embeds `data` as a constant node. The bytes are borrowed, not copied.
    pub fn constant(&mut self, data: &'data [u8], desc: TensorDesc) -> GraphResult<Expression> {
        let level = self.config.capabilities.feature_level;
        if level < FeatureLevel::V6_2 {
            return Err(GraphError::unsupported(
                "Constant",
                format!("constant nodes need feature level 6.2, target is {level}"),
            ));
        }
        let node = NodeId::new(NodeType::Constant, self.constants.len() as u32);
        self.constants.push(ConstantNode {
            data,
            name: self.names.current().map(str::to_owned),
        });
        Ok(self.push_output(node, 0, desc))
    }

    /// Views the bytes behind `input` through `desc`.
    ///
    /// The new view must not need more bytes than the source provides; the source total byte
    /// size and alignment are kept.
    pub fn reinterpret(&mut self, input: Expression, desc: TensorDesc) -> GraphResult<Expression> {
        let source = self.operand("Reinterpret", input)?;
        let required = buffer_tensor_size(desc.data_type(), desc.sizes(), desc.strides());
        if required > source.total_bytes() {
            return Err(GraphError::contract(
                "Reinterpret",
                format!(
                    "view {desc} needs {required} bytes but the source provides {}",
                    source.total_bytes()
                ),
            ));
        }
        let desc = TensorDesc::with_layout(
            desc.data_type(),
            source.flags(),
            desc.sizes(),
            desc.strides(),
            source.total_bytes(),
            source.alignment(),
        )?;
        let node = NodeId::new(NodeType::Reinterpret, self.reinterprets.len() as u32);
        self.reinterprets.push(ReinterpretNode {
            input: input.output,
        });
        Ok(self.push_output(node, 0, desc))
    }

    pub fn reinterpret_as(
        &mut self,
        input: Expression,
        data_type: DataType,
        sizes: &[u32],
        strides: Option<&[u32]>,
    ) -> GraphResult<Expression> {
        let source = self.operand("Reinterpret", input)?;
        let desc = TensorDesc::with_layout(
            data_type,
            source.flags(),
            sizes,
            strides,
            source.total_bytes(),
            source.alignment(),
        )?;
        self.reinterpret(input, desc)
    }

    pub fn reinterpret_sizes(
        &mut self,
        input: Expression,
        sizes: &[u32],
        strides: Option<&[u32]>,
    ) -> GraphResult<Expression> {
        let data_type = self.operand("Reinterpret", input)?.data_type();
        self.reinterpret_as(input, data_type, sizes, strides)
    }

    pub fn reinterpret_type(
        &mut self,
        input: Expression,
        data_type: DataType,
    ) -> GraphResult<Expression> {
        let source = self.operand("Reinterpret", input)?;
        self.reinterpret_as(input, data_type, source.sizes(), source.strides())
    }

    /// Descriptor of the tensor `expr` refers to.
    pub fn desc(&self, expr: Expression) -> GraphResult<&TensorDesc> {
        Ok(&self.resolve("desc", expr)?.desc)
    }

    /// Inputs, operators, reinterprets and constants created so far.
    pub fn node_count(&self) -> usize {
        self.inputs.len() + self.operators.len() + self.reinterprets.len() + self.constants.len()
    }

    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Number of addressable node outputs.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Descriptor for a freshly inferred tensor under the active layout.
    pub(crate) fn output_desc(&self, data_type: DataType, sizes: &[u32]) -> GraphResult<TensorDesc> {
        TensorDesc::new(data_type, sizes, &self.layout)
    }

    /// Owned copy of the descriptor behind an operator argument.
    pub(crate) fn operand(&self, op: &'static str, expr: Expression) -> GraphResult<TensorDesc> {
        Ok(self.resolve(op, expr)?.desc.clone())
    }

    pub(crate) fn optional_operand(
        &self,
        op: &'static str,
        expr: Option<Expression>,
    ) -> GraphResult<Option<TensorDesc>> {
        expr.map(|expr| self.operand(op, expr)).transpose()
    }

    fn resolve(&self, op: &'static str, expr: Expression) -> GraphResult<&NodeOutput> {
        if expr.builder != self.id {
            return Err(GraphError::contract(
                op,
                format!(
                    "expression belongs to builder {:?}, not {:?}",
                    expr.builder, self.id
                ),
            ));
        }
        self.outputs.get(expr.output.0 as usize).ok_or_else(|| {
            GraphError::contract(op, format!("unknown node output {}", expr.output.0))
        })
    }

    pub(crate) fn emit_single(
        &mut self,
        kind: OperatorKind,
        attributes: OperatorAttributes,
        inputs: &[Option<Expression>],
        output: TensorDesc,
    ) -> GraphResult<Expression> {
        let outputs = self.emit(kind, attributes, inputs, vec![Some(output)])?;
        outputs
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| GraphError::structure(format!("{kind} produced no output")))
    }

    /// Appends one operator node and its outputs.
    ///
    /// `outputs` is indexed by output slot; a `None` slot is not materialised. Nothing is
    /// appended unless every check passes.
    pub(crate) fn emit(
        &mut self,
        kind: OperatorKind,
        attributes: OperatorAttributes,
        inputs: &[Option<Expression>],
        outputs: Vec<Option<TensorDesc>>,
    ) -> GraphResult<Vec<Option<Expression>>> {
        let mut resolved = Vec::with_capacity(inputs.len());
        for input in inputs {
            resolved.push(match input {
                Some(expr) => Some((expr.output, self.resolve(kind.name(), *expr)?.desc.clone())),
                None => None,
            });
        }
        let level = self.config.capabilities.feature_level;
        if kind.min_feature_level() > level {
            return Err(GraphError::unsupported(
                kind.name(),
                format!(
                    "needs feature level {}, target is {level}",
                    kind.min_feature_level()
                ),
            ));
        }
        if self.config.validate_schemas {
            self.validate(
                kind,
                resolved.iter().map(|entry| entry.as_ref().map(|(_, desc)| desc)),
                outputs.iter().map(Option::as_ref),
            )?;
        }

        let index = self.operators.len() as u32;
        let node = NodeId::new(NodeType::Operator, index);
        self.operators.push(OperatorNode {
            kind,
            attributes,
            inputs: resolved
                .into_iter()
                .map(|entry| entry.map(|(output, _)| output))
                .collect(),
            name: self.names.current().map(str::to_owned),
        });
        let expressions = outputs
            .into_iter()
            .enumerate()
            .map(|(slot, desc)| desc.map(|desc| self.push_output(node, slot as u32, desc)))
            .collect::<Vec<_>>();
        debug!(
            kind = %kind,
            node = index,
            outputs = expressions.iter().flatten().count(),
            name = self.names.current().unwrap_or(""),
            "emitted operator"
        );
        Ok(expressions)
    }

    fn validate<'a>(
        &self,
        kind: OperatorKind,
        inputs: impl Iterator<Item = Option<&'a TensorDesc>>,
        outputs: impl Iterator<Item = Option<&'a TensorDesc>>,
    ) -> GraphResult<()> {
        let Some(info) = self.schemas.get(kind) else {
            return Err(GraphError::unsupported(
                kind.name(),
                "operator kind is not available for the configured capabilities",
            ));
        };
        let input_fields = info.inputs().collect::<Vec<_>>();
        for (position, desc) in inputs.enumerate() {
            check_field(kind, "input", &input_fields, position, desc)?;
        }
        let output_fields = info.outputs().collect::<Vec<_>>();
        for (position, desc) in outputs.enumerate() {
            check_field(kind, "output", &output_fields, position, desc)?;
        }
        Ok(())
    }

    fn push_output(&mut self, node: NodeId, output_index: u32, desc: TensorDesc) -> Expression {
        let output = OutputId(self.outputs.len() as u32);
        self.outputs.push(NodeOutput {
            node,
            output_index,
            desc,
        });
        Expression::new(self.id, output)
    }

    pub(crate) fn input_nodes(&self) -> &[InputNode] {
        &self.inputs
    }

    pub(crate) fn operator_nodes(&self) -> &[OperatorNode] {
        &self.operators
    }

    pub(crate) fn reinterpret_nodes(&self) -> &[ReinterpretNode] {
        &self.reinterprets
    }

    pub(crate) fn constant_nodes(&self) -> &[ConstantNode<'data>] {
        &self.constants
    }

    pub(crate) fn node_output(&self, output: OutputId) -> Option<&NodeOutput> {
        self.outputs.get(output.0 as usize)
    }

    /// Maps a caller expression to its arena slot after the ownership check.
    pub(crate) fn output_id(&self, op: &'static str, expr: Expression) -> GraphResult<OutputId> {
        self.resolve(op, expr).map(|_| expr.output)
    }
}

/// Positional lookup; a trailing tensor-array field absorbs every remaining position.
fn field_at<'a>(
    fields: &[&'a OperatorFieldSpec],
    position: usize,
) -> Option<&'a OperatorFieldSpec> {
    match fields.last() {
        Some(last) if last.kind == FieldKind::TensorArray && position + 1 >= fields.len() => {
            Some(*last)
        }
        _ => fields.get(position).copied(),
    }
}

fn check_field(
    kind: OperatorKind,
    role: &str,
    fields: &[&OperatorFieldSpec],
    position: usize,
    desc: Option<&TensorDesc>,
) -> GraphResult<()> {
    let field = field_at(fields, position).ok_or_else(|| {
        GraphError::unsupported(
            kind.name(),
            format!("{role} #{position} has no matching operator field"),
        )
    })?;
    let Some(desc) = desc else {
        if field.flags.is_optional() || field.kind == FieldKind::TensorArray {
            return Ok(());
        }
        return Err(GraphError::contract(
            kind.name(),
            format!("required {role} {} is missing", field.name),
        ));
    };
    if !field.allowed_data_types.contains(desc.data_type()) {
        return Err(GraphError::unsupported(
            kind.name(),
            format!(
                "{} does not accept {} (allowed: {:?})",
                field.name,
                desc.data_type(),
                field.allowed_data_types
            ),
        ));
    }
    if !field.accepts_rank(desc.rank()) {
        return Err(GraphError::unsupported(
            kind.name(),
            format!(
                "{} does not accept rank {} (allowed: {:?})",
                field.name,
                desc.rank(),
                field.dimension_counts
            ),
        ));
    }
    Ok(())
}
