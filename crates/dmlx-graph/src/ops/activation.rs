//! Activation operators.

use crate::ensure_contract;
use crate::error::GraphResult;
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;

use super::attributes::{Activation, OperatorAttributes};
use super::common::{ensure_same_sizes, ensure_same_type};

/// Applies `activation` to every element; output descriptor mirrors the input.
pub fn activation(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    activation: Activation,
) -> GraphResult<Expression> {
    let kind = activation.kind();
    let input_desc = builder.operand(kind.name(), input)?;
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        kind,
        OperatorAttributes::Activation(activation),
        &[Some(input)],
        output,
    )
}

pub fn relu(builder: &mut GraphBuilder<'_>, input: Expression) -> GraphResult<Expression> {
    activation(builder, input, Activation::Relu)
}

pub fn sigmoid(builder: &mut GraphBuilder<'_>, input: Expression) -> GraphResult<Expression> {
    activation(builder, input, Activation::Sigmoid)
}

pub fn tanh(builder: &mut GraphBuilder<'_>, input: Expression) -> GraphResult<Expression> {
    activation(builder, input, Activation::TanH)
}

pub fn gelu(builder: &mut GraphBuilder<'_>, input: Expression) -> GraphResult<Expression> {
    activation(builder, input, Activation::Gelu)
}

pub fn softmax(builder: &mut GraphBuilder<'_>, input: Expression) -> GraphResult<Expression> {
    activation(builder, input, Activation::SoftMax)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoftMaxFamily {
    SoftMax,
    LogSoftMax,
    HardMax,
}

impl SoftMaxFamily {
    fn kind(self) -> OperatorKind {
        match self {
            SoftMaxFamily::SoftMax => OperatorKind::ActivationSoftMax1,
            SoftMaxFamily::LogSoftMax => OperatorKind::ActivationLogSoftMax1,
            SoftMaxFamily::HardMax => OperatorKind::ActivationHardMax1,
        }
    }
}

/// Normalises over an explicit set of axes instead of the trailing one.
pub fn softmax_over_axes(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    family: SoftMaxFamily,
    axes: &[u32],
) -> GraphResult<Expression> {
    let kind = family.kind();
    let input_desc = builder.operand(kind.name(), input)?;
    ensure_contract!(!axes.is_empty(), kind.name(), "at least one axis is required");
    let rank = input_desc.rank();
    for (position, axis) in axes.iter().enumerate() {
        ensure_contract!(
            (*axis as usize) < rank,
            kind.name(),
            "axis {axis} is out of range for rank {rank}"
        );
        ensure_contract!(
            !axes[..position].contains(axis),
            kind.name(),
            "axis {axis} is listed twice"
        );
    }
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        kind,
        OperatorAttributes::Axes {
            axes: axes.to_vec(),
        },
        &[Some(input)],
        output,
    )
}

pub fn parameterized_relu(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    slope: Expression,
) -> GraphResult<Expression> {
    const OP: &str = "ActivationParameterizedReLU";
    let input_desc = builder.operand(OP, input)?;
    let slope_desc = builder.operand(OP, slope)?;
    ensure_same_type(OP, &input_desc, &slope_desc)?;
    ensure_same_sizes(OP, &input_desc, &slope_desc)?;
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ActivationParameterizedRelu,
        OperatorAttributes::None,
        &[Some(input), Some(slope)],
        output,
    )
}

pub fn relu_grad(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    input_gradient: Expression,
) -> GraphResult<Expression> {
    const OP: &str = "ActivationReLUGrad";
    let input_desc = builder.operand(OP, input)?;
    let gradient_desc = builder.operand(OP, input_gradient)?;
    ensure_same_sizes(OP, &input_desc, &gradient_desc)?;
    let output = builder.output_desc(gradient_desc.data_type(), gradient_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ActivationReluGrad,
        OperatorAttributes::None,
        &[Some(input), Some(input_gradient)],
        output,
    )
}
