//! Operators that synthesise tensors: fills, sequences, scans, random bits and index listings.

use half::f16;
use serde::Serialize;

use crate::ensure_contract;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::shape::checked_element_count_or_error;
use crate::tensor::DataType;

use super::attributes::{AxisDirection, OperatorAttributes, RandomGeneratorType};
use super::common::{ensure_axis, ensure_data_type, required_output};

/// A typed scalar; its variant fixes the data type of the filled tensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum ScalarValue {
    Float32(f32),
    Float16(f16),
    Float64(f64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
}

impl ScalarValue {
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarValue::Float32(_) => DataType::Float32,
            ScalarValue::Float16(_) => DataType::Float16,
            ScalarValue::Float64(_) => DataType::Float64,
            ScalarValue::Int8(_) => DataType::Int8,
            ScalarValue::Int16(_) => DataType::Int16,
            ScalarValue::Int32(_) => DataType::Int32,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::UInt8(_) => DataType::UInt8,
            ScalarValue::UInt16(_) => DataType::UInt16,
            ScalarValue::UInt32(_) => DataType::UInt32,
            ScalarValue::UInt64(_) => DataType::UInt64,
        }
    }
}

impl From<f32> for ScalarValue {
    fn from(value: f32) -> Self {
        ScalarValue::Float32(value)
    }
}

impl From<f16> for ScalarValue {
    fn from(value: f16) -> Self {
        ScalarValue::Float16(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int32(value)
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        ScalarValue::UInt32(value)
    }
}

/// Tensor of `sizes` with every element equal to `value`.
pub fn fill_value_constant(
    builder: &mut GraphBuilder<'_>,
    sizes: &[u32],
    value: ScalarValue,
) -> GraphResult<Expression> {
    let output = builder.output_desc(value.data_type(), sizes)?;
    builder.emit_single(
        OperatorKind::FillValueConstant,
        OperatorAttributes::FillValueConstant { value },
        &[],
        output,
    )
}

/// Tensor of `sizes` holding `start, start + delta, ...` in row-major order.
pub fn fill_value_sequence(
    builder: &mut GraphBuilder<'_>,
    sizes: &[u32],
    start: ScalarValue,
    delta: ScalarValue,
) -> GraphResult<Expression> {
    const OP: &str = "FillValueSequence";
    ensure_contract!(
        start.data_type() == delta.data_type(),
        OP,
        "start is {} but delta is {}",
        start.data_type(),
        delta.data_type()
    );
    let output = builder.output_desc(start.data_type(), sizes)?;
    builder.emit_single(
        OperatorKind::FillValueSequence,
        OperatorAttributes::FillValueSequence { start, delta },
        &[],
        output,
    )
}

fn cumulative(
    builder: &mut GraphBuilder<'_>,
    kind: OperatorKind,
    input: Expression,
    axis: u32,
    direction: AxisDirection,
    exclusive: bool,
) -> GraphResult<Expression> {
    let input_desc = builder.operand(kind.name(), input)?;
    ensure_axis(kind.name(), axis, input_desc.rank())?;
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        kind,
        OperatorAttributes::Cumulative {
            axis,
            direction,
            exclusive,
        },
        &[Some(input)],
        output,
    )
}

/// Running sum along `axis`; `exclusive` shifts the scan by one element.
pub fn cumulative_summation(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    axis: u32,
    direction: AxisDirection,
    exclusive: bool,
) -> GraphResult<Expression> {
    cumulative(
        builder,
        OperatorKind::CumulativeSummation,
        input,
        axis,
        direction,
        exclusive,
    )
}

pub fn cumulative_product(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    axis: u32,
    direction: AxisDirection,
    exclusive: bool,
) -> GraphResult<Expression> {
    cumulative(
        builder,
        OperatorKind::CumulativeProduct,
        input,
        axis,
        direction,
        exclusive,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonZeroCoordinatesOutputs {
    /// `[1]` UInt32 holding the number of non-zero elements.
    pub count: Expression,
    /// `[element_count, rank]` UInt32; only the first `count` rows are meaningful.
    pub coordinates: Expression,
}

pub fn non_zero_coordinates(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
) -> GraphResult<NonZeroCoordinatesOutputs> {
    const OP: &str = "NonZeroCoordinates";
    let input_desc = builder.operand(OP, input)?;
    let total = checked_element_count_or_error(input_desc.sizes(), || {
        GraphError::contract(OP, "element count overflows")
    })?;
    let count = builder.output_desc(DataType::UInt32, &[1])?;
    let coordinates =
        builder.output_desc(DataType::UInt32, &[total, input_desc.rank() as u32])?;
    let outputs = builder.emit(
        OperatorKind::NonZeroCoordinates,
        OperatorAttributes::None,
        &[Some(input)],
        vec![Some(count), Some(coordinates)],
    )?;
    Ok(NonZeroCoordinatesOutputs {
        count: required_output(OperatorKind::NonZeroCoordinates, &outputs, 0)?,
        coordinates: required_output(OperatorKind::NonZeroCoordinates, &outputs, 1)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomGeneratorOutputs {
    pub values: Expression,
    /// Advanced generator state, shaped like the input state.
    pub state: Option<Expression>,
}

/// Counter-based random bits of `output_sizes` seeded from a `UInt32` state tensor.
pub fn random_generator(
    builder: &mut GraphBuilder<'_>,
    input_state: Expression,
    output_sizes: &[u32],
    output_state: bool,
    generator: RandomGeneratorType,
) -> GraphResult<RandomGeneratorOutputs> {
    const OP: &str = "RandomGenerator";
    let state_desc = builder.operand(OP, input_state)?;
    ensure_data_type(OP, "input state", &state_desc, DataType::UInt32)?;
    let values = builder.output_desc(DataType::UInt32, output_sizes)?;
    let state = output_state.then_some(state_desc);
    let outputs = builder.emit(
        OperatorKind::RandomGenerator,
        OperatorAttributes::RandomGenerator { generator },
        &[Some(input_state)],
        vec![Some(values), state],
    )?;
    Ok(RandomGeneratorOutputs {
        values: required_output(OperatorKind::RandomGenerator, &outputs, 0)?,
        state: outputs.get(1).copied().flatten(),
    })
}

/// Tensor of `sizes` with `value` on the diagonal shifted by `offset` and zeros elsewhere.
pub fn diagonal_matrix(
    builder: &mut GraphBuilder<'_>,
    sizes: &[u32],
    data_type: DataType,
    offset: i32,
    value: f32,
) -> GraphResult<Expression> {
    const OP: &str = "DiagonalMatrix";
    ensure_contract!(
        (2..=4).contains(&sizes.len()),
        OP,
        "sizes must have rank 2 to 4, got {sizes:?}"
    );
    let output = builder.output_desc(data_type, sizes)?;
    builder.emit_single(
        OperatorKind::DiagonalMatrix,
        OperatorAttributes::DiagonalMatrix { offset, value },
        &[],
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_variant_fixes_data_type() {
        assert_eq!(ScalarValue::from(1.5f32).data_type(), DataType::Float32);
        assert_eq!(
            ScalarValue::from(f16::from_f32(0.5)).data_type(),
            DataType::Float16
        );
        assert_eq!(ScalarValue::UInt64(3).data_type(), DataType::UInt64);
    }
}
