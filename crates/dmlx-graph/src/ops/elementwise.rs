//! Element-wise unary, binary, comparison and quantization operators.
//!
//! Outputs keep the sizes of the first operand. Binary operands must already agree on sizes;
//! broadcasting is expressed by reinterpreting an operand with zero strides.

use crate::ensure_contract;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::DataType;

use super::attributes::{
    FusedActivation, IsInfinityMode, OperatorAttributes, QuantizationType, RoundingMode, ScaleBias,
};
use super::common::{ensure_data_type, ensure_same_sizes, ensure_same_type};

fn unary(
    builder: &mut GraphBuilder<'_>,
    kind: OperatorKind,
    input: Expression,
    output_type: Option<DataType>,
    attributes: OperatorAttributes,
) -> GraphResult<Expression> {
    let input_desc = builder.operand(kind.name(), input)?;
    let output_type = output_type.unwrap_or(input_desc.data_type());
    let output = builder.output_desc(output_type, input_desc.sizes())?;
    builder.emit_single(kind, attributes, &[Some(input)], output)
}

fn binary(
    builder: &mut GraphBuilder<'_>,
    kind: OperatorKind,
    a: Expression,
    b: Expression,
    output_type: Option<DataType>,
    attributes: OperatorAttributes,
) -> GraphResult<Expression> {
    let a_desc = builder.operand(kind.name(), a)?;
    let b_desc = builder.operand(kind.name(), b)?;
    ensure_same_sizes(kind.name(), &a_desc, &b_desc)?;
    ensure_same_type(kind.name(), &a_desc, &b_desc)?;
    let output_type = output_type.unwrap_or(a_desc.data_type());
    let output = builder.output_desc(output_type, a_desc.sizes())?;
    builder.emit_single(kind, attributes, &[Some(a), Some(b)], output)
}

macro_rules! unary_with_scale_bias {
    ($($(#[$meta:meta])* $name:ident => $kind:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(
                builder: &mut GraphBuilder<'_>,
                input: Expression,
                scale_bias: Option<ScaleBias>,
            ) -> GraphResult<Expression> {
                unary(
                    builder,
                    OperatorKind::$kind,
                    input,
                    None,
                    OperatorAttributes::ScaleBias { scale_bias },
                )
            }
        )+
    };
}

macro_rules! plain_unary {
    ($($name:ident => $kind:ident),+ $(,)?) => {
        $(
            pub fn $name(builder: &mut GraphBuilder<'_>, input: Expression) -> GraphResult<Expression> {
                unary(builder, OperatorKind::$kind, input, None, OperatorAttributes::None)
            }
        )+
    };
}

macro_rules! plain_binary {
    ($($name:ident => $kind:ident),+ $(,)?) => {
        $(
            pub fn $name(
                builder: &mut GraphBuilder<'_>,
                a: Expression,
                b: Expression,
            ) -> GraphResult<Expression> {
                binary(builder, OperatorKind::$kind, a, b, None, OperatorAttributes::None)
            }
        )+
    };
}

unary_with_scale_bias! {
    /// Copies the input, optionally applying `x * scale + bias`.
    identity => ElementWiseIdentity,
    abs => ElementWiseAbs,
    acos => ElementWiseACos,
    asin => ElementWiseASin,
    atan => ElementWiseATan,
    ceil => ElementWiseCeil,
    cos => ElementWiseCos,
    exp => ElementWiseExp,
    floor => ElementWiseFloor,
    log => ElementWiseLog,
    reciprocal => ElementWiseReciprocal,
    sin => ElementWiseSin,
    sqrt => ElementWiseSqrt,
    tan => ElementWiseTan,
    erf => ElementWiseErf,
    sinh => ElementWiseSinH,
    cosh => ElementWiseCosH,
    tanh => ElementWiseTanH,
    asinh => ElementWiseASinH,
    acosh => ElementWiseACosH,
    atanh => ElementWiseATanH,
}

plain_unary! {
    sign => ElementWiseSign,
    negate => ElementWiseNegate,
    bit_not => ElementWiseBitNot,
    logical_not => ElementWiseLogicalNot,
}

plain_binary! {
    add => ElementWiseAdd,
    subtract => ElementWiseSubtract,
    multiply => ElementWiseMultiply,
    divide => ElementWiseDivide,
    max => ElementWiseMax,
    min => ElementWiseMin,
    mean => ElementWiseMean,
    logical_and => ElementWiseLogicalAnd,
    logical_or => ElementWiseLogicalOr,
    logical_xor => ElementWiseLogicalXor,
    bit_and => ElementWiseBitAnd,
    bit_or => ElementWiseBitOr,
    bit_xor => ElementWiseBitXor,
    bit_shift_left => ElementWiseBitShiftLeft,
    bit_shift_right => ElementWiseBitShiftRight,
    modulus_truncate => ElementWiseModulusTruncate,
    modulus_floor => ElementWiseModulusFloor,
    atan_yx => ElementWiseATanYX,
    difference_square => ElementWiseDifferenceSquare,
}

pub fn clip(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    min: f32,
    max: f32,
    scale_bias: Option<ScaleBias>,
) -> GraphResult<Expression> {
    ensure_contract!(min <= max, "ElementWiseClip", "min {min} exceeds max {max}");
    unary(
        builder,
        OperatorKind::ElementWiseClip,
        input,
        None,
        OperatorAttributes::Clip {
            min,
            max,
            scale_bias,
        },
    )
}

pub fn threshold(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    min: f32,
    scale_bias: Option<ScaleBias>,
) -> GraphResult<Expression> {
    unary(
        builder,
        OperatorKind::ElementWiseThreshold,
        input,
        None,
        OperatorAttributes::Threshold { min, scale_bias },
    )
}

/// Raises every element to a scalar `exponent`.
pub fn constant_pow(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    exponent: f32,
    scale_bias: Option<ScaleBias>,
) -> GraphResult<Expression> {
    unary(
        builder,
        OperatorKind::ElementWiseConstantPow,
        input,
        None,
        OperatorAttributes::ConstantPow {
            exponent,
            scale_bias,
        },
    )
}

pub fn round(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    mode: RoundingMode,
) -> GraphResult<Expression> {
    unary(
        builder,
        OperatorKind::ElementWiseRound,
        input,
        None,
        OperatorAttributes::Round { mode },
    )
}

/// Flags NaN elements; the output type defaults to `UInt8`.
pub fn is_nan(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    output_type: Option<DataType>,
) -> GraphResult<Expression> {
    unary(
        builder,
        OperatorKind::ElementWiseIsNaN,
        input,
        Some(output_type.unwrap_or(DataType::UInt8)),
        OperatorAttributes::None,
    )
}

pub fn is_infinity(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    mode: IsInfinityMode,
    output_type: Option<DataType>,
) -> GraphResult<Expression> {
    unary(
        builder,
        OperatorKind::ElementWiseIsInfinity,
        input,
        Some(output_type.unwrap_or(DataType::UInt8)),
        OperatorAttributes::IsInfinity { mode },
    )
}

pub fn bit_count(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    output_type: Option<DataType>,
) -> GraphResult<Expression> {
    unary(
        builder,
        OperatorKind::ElementWiseBitCount,
        input,
        Some(output_type.unwrap_or(DataType::UInt8)),
        OperatorAttributes::None,
    )
}

/// Sum of `a` and `b` followed by a fused activation.
pub fn add_with_activation(
    builder: &mut GraphBuilder<'_>,
    a: Expression,
    b: Expression,
    activation: Option<FusedActivation>,
) -> GraphResult<Expression> {
    binary(
        builder,
        OperatorKind::ElementWiseAdd1,
        a,
        b,
        None,
        OperatorAttributes::Fused { activation },
    )
}

/// Raises `input` to the matching element of `exponent`.
pub fn pow(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    exponent: Expression,
    scale_bias: Option<ScaleBias>,
) -> GraphResult<Expression> {
    binary(
        builder,
        OperatorKind::ElementWisePow,
        input,
        exponent,
        None,
        OperatorAttributes::ScaleBias { scale_bias },
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Comparison {
    fn kind(self) -> OperatorKind {
        match self {
            Comparison::Equals => OperatorKind::ElementWiseLogicalEquals,
            Comparison::GreaterThan => OperatorKind::ElementWiseLogicalGreaterThan,
            Comparison::GreaterThanOrEqual => {
                OperatorKind::ElementWiseLogicalGreaterThanOrEqual
            }
            Comparison::LessThan => OperatorKind::ElementWiseLogicalLessThan,
            Comparison::LessThanOrEqual => OperatorKind::ElementWiseLogicalLessThanOrEqual,
        }
    }
}

/// Element-wise comparison producing `output_type` (`UInt8` when `None`).
pub fn compare(
    builder: &mut GraphBuilder<'_>,
    comparison: Comparison,
    a: Expression,
    b: Expression,
    output_type: Option<DataType>,
) -> GraphResult<Expression> {
    binary(
        builder,
        comparison.kind(),
        a,
        b,
        Some(output_type.unwrap_or(DataType::UInt8)),
        OperatorAttributes::None,
    )
}

pub fn equals(builder: &mut GraphBuilder<'_>, a: Expression, b: Expression) -> GraphResult<Expression> {
    compare(builder, Comparison::Equals, a, b, None)
}

pub fn greater_than(
    builder: &mut GraphBuilder<'_>,
    a: Expression,
    b: Expression,
) -> GraphResult<Expression> {
    compare(builder, Comparison::GreaterThan, a, b, None)
}

pub fn less_than(
    builder: &mut GraphBuilder<'_>,
    a: Expression,
    b: Expression,
) -> GraphResult<Expression> {
    compare(builder, Comparison::LessThan, a, b, None)
}

/// Selects `a` where `condition` is non-zero and `b` elsewhere.
pub fn if_then_else(
    builder: &mut GraphBuilder<'_>,
    condition: Expression,
    a: Expression,
    b: Expression,
) -> GraphResult<Expression> {
    const OP: &str = "ElementWiseIf";
    let condition_desc = builder.operand(OP, condition)?;
    let a_desc = builder.operand(OP, a)?;
    let b_desc = builder.operand(OP, b)?;
    ensure_data_type(OP, "condition", &condition_desc, DataType::UInt8)?;
    ensure_same_type(OP, &a_desc, &b_desc)?;
    ensure_same_sizes(OP, &a_desc, &b_desc)?;
    ensure_same_sizes(OP, &condition_desc, &a_desc)?;
    let output = builder.output_desc(a_desc.data_type(), a_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ElementWiseIf,
        OperatorAttributes::None,
        &[Some(condition), Some(a), Some(b)],
        output,
    )
}

/// Gradient of [`clip`]; the output follows `input_gradient`.
pub fn clip_grad(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    input_gradient: Expression,
    min: f32,
    max: f32,
) -> GraphResult<Expression> {
    const OP: &str = "ElementWiseClipGrad";
    let input_desc = builder.operand(OP, input)?;
    let gradient_desc = builder.operand(OP, input_gradient)?;
    ensure_same_sizes(OP, &input_desc, &gradient_desc)?;
    ensure_contract!(min <= max, OP, "min {min} exceeds max {max}");
    let output = builder.output_desc(gradient_desc.data_type(), gradient_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ElementWiseClipGrad,
        OperatorAttributes::ClipGrad { min, max },
        &[Some(input), Some(input_gradient)],
        output,
    )
}

pub fn quantize_linear(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    scale: Expression,
    zero_point: Expression,
    output_type: DataType,
) -> GraphResult<Expression> {
    const OP: &str = "ElementWiseQuantizeLinear";
    let input_desc = builder.operand(OP, input)?;
    let zero_point_desc = builder.operand(OP, zero_point)?;
    builder.operand(OP, scale)?;
    ensure_data_type(OP, "zero point", &zero_point_desc, output_type)?;
    let output = builder.output_desc(output_type, input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ElementWiseQuantizeLinear,
        OperatorAttributes::None,
        &[Some(input), Some(scale), Some(zero_point)],
        output,
    )
}

/// Output takes the data type of `scale`.
pub fn dequantize_linear(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    scale: Expression,
    zero_point: Expression,
) -> GraphResult<Expression> {
    const OP: &str = "ElementWiseDequantizeLinear";
    let input_desc = builder.operand(OP, input)?;
    let scale_desc = builder.operand(OP, scale)?;
    let zero_point_desc = builder.operand(OP, zero_point)?;
    ensure_same_type(OP, &input_desc, &zero_point_desc)?;
    let output = builder.output_desc(scale_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ElementWiseDequantizeLinear,
        OperatorAttributes::None,
        &[Some(input), Some(scale), Some(zero_point)],
        output,
    )
}

/// Dequantizes `input` with `parameters` ordered as scale then zero point.
///
/// The output data type is the scale's.
pub fn dequantize(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    parameters: &[Expression],
    quantization_type: QuantizationType,
) -> GraphResult<Expression> {
    const OP: &str = "Dequantize";
    let input_desc = builder.operand(OP, input)?;
    let Some(scale) = parameters.first() else {
        return Err(GraphError::contract(
            OP,
            "at least one quantization parameter is required",
        ));
    };
    ensure_contract!(
        parameters.len() == quantization_type.parameter_count(),
        OP,
        "{quantization_type:?} takes {} parameters, got {}",
        quantization_type.parameter_count(),
        parameters.len()
    );
    for parameter in parameters {
        builder.operand(OP, *parameter)?;
    }
    let scale_desc = builder.operand(OP, *scale)?;
    let output = builder.output_desc(scale_desc.data_type(), input_desc.sizes())?;
    let inputs = std::iter::once(Some(input))
        .chain(parameters.iter().copied().map(Some))
        .collect::<Vec<_>>();
    builder.emit_single(
        OperatorKind::Dequantize,
        OperatorAttributes::Dequantize { quantization_type },
        &inputs,
        output,
    )
}
