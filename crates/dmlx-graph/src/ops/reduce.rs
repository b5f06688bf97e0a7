//! Axis reductions.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::GraphResult;
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::DataType;

use super::attributes::OperatorAttributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReduceFunction {
    ArgMax,
    ArgMin,
    Average,
    L1,
    L2,
    LogSum,
    LogSumExp,
    Max,
    Min,
    Multiply,
    Sum,
    SumSquare,
}

impl ReduceFunction {
    /// ArgMin and ArgMax produce indices rather than values.
    pub fn yields_indices(self) -> bool {
        matches!(self, ReduceFunction::ArgMax | ReduceFunction::ArgMin)
    }
}

/// Reduces `input` over `axes`; an empty list reduces every axis.
///
/// Reduced axes keep extent 1 so the output rank equals the input rank. `output_type`
/// defaults to `UInt32` for ArgMin/ArgMax and to the input type otherwise.
pub fn reduce(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    function: ReduceFunction,
    axes: &[u32],
    output_type: Option<DataType>,
) -> GraphResult<Expression> {
    const OP: &str = "Reduce";
    let input_desc = builder.operand(OP, input)?;
    let rank = input_desc.rank();
    let axes: Vec<u32> = if axes.is_empty() {
        (0..rank as u32).collect()
    } else {
        axes.to_vec()
    };
    for (position, axis) in axes.iter().enumerate() {
        ensure_contract!(
            (*axis as usize) < rank,
            OP,
            "axis {axis} is out of range for rank {rank}"
        );
        ensure_contract!(
            !axes[..position].contains(axis),
            OP,
            "axis {axis} is listed twice"
        );
    }

    let sizes = input_desc
        .sizes()
        .iter()
        .enumerate()
        .map(|(axis, size)| if axes.contains(&(axis as u32)) { 1 } else { *size })
        .collect::<Vec<_>>();
    let data_type = output_type.unwrap_or(if function.yields_indices() {
        DataType::UInt32
    } else {
        input_desc.data_type()
    });
    let output = builder.output_desc(data_type, &sizes)?;
    builder.emit_single(
        OperatorKind::Reduce,
        OperatorAttributes::Reduce { function, axes },
        &[Some(input)],
        output,
    )
}
