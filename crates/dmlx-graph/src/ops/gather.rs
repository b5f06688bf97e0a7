//! Index-driven gathers and scatters, one-hot expansion and top-k selection.
//!
//! Output shapes of the gather family are spliced from three regions: a prefix of ones, a run of
//! index-tensor extents and a run of input-tensor extents. The output rank always equals the input
//! rank.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::{DataType, TensorDesc};

use super::attributes::{AxisDirection, OperatorAttributes};
use super::common::{ensure_axis, required_output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GatherNdAttributes {
    pub input_dimension_count: u32,
    pub indices_dimension_count: u32,
    pub batch_dimension_count: u32,
}

fn ensure_same_rank(
    op: &'static str,
    input: &TensorDesc,
    indices: &TensorDesc,
) -> GraphResult<()> {
    ensure_contract!(
        input.rank() == indices.rank(),
        op,
        "indices {:?} must have the input rank {}",
        indices.sizes(),
        input.rank()
    );
    Ok(())
}

/// Output sizes of [`gather`].
///
/// Axes after `axis` come from the input, the `index_dimensions` axes ending at `axis` come from
/// the trailing indices extents, and the remaining leading axes from the input axes before `axis`.
pub(crate) fn gather_sizes(
    input: &[u32],
    indices: &[u32],
    axis: usize,
    index_dimensions: usize,
) -> Vec<u32> {
    let rank = input.len() as isize;
    let axis = axis as isize;
    let mut sizes = vec![1u32; input.len()];

    let mut output_dim = rank - 1;
    while output_dim > axis {
        sizes[output_dim as usize] = input[output_dim as usize];
        output_dim -= 1;
    }
    let mut index_dim = indices.len() as isize - 1;
    while output_dim >= 0 && index_dim >= 0 && output_dim > axis - index_dimensions as isize {
        sizes[output_dim as usize] = indices[index_dim as usize];
        output_dim -= 1;
        index_dim -= 1;
    }
    let mut input_dim = axis - 1;
    while output_dim >= 0 && input_dim >= 0 {
        sizes[output_dim as usize] = input[input_dim as usize];
        output_dim -= 1;
        input_dim -= 1;
    }
    sizes
}

/// Gathers slices of `input` along `axis` selected by `indices`.
pub fn gather(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    indices: Expression,
    axis: u32,
    index_dimensions: u32,
) -> GraphResult<Expression> {
    const OP: &str = "Gather";
    let input_desc = builder.operand(OP, input)?;
    let indices_desc = builder.operand(OP, indices)?;
    ensure_same_rank(OP, &input_desc, &indices_desc)?;
    let rank = input_desc.rank();
    let axis_index = ensure_axis(OP, axis, rank)?;
    ensure_contract!(
        index_dimensions as usize <= rank,
        OP,
        "index dimensions {index_dimensions} exceed rank {rank}"
    );
    let sizes = gather_sizes(
        input_desc.sizes(),
        indices_desc.sizes(),
        axis_index,
        index_dimensions as usize,
    );
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(
        OperatorKind::Gather,
        OperatorAttributes::Gather {
            axis,
            index_dimensions,
        },
        &[Some(input), Some(indices)],
        output,
    )
}

/// Element-wise gather; the output takes the indices' sizes.
pub fn gather_elements(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    indices: Expression,
    axis: u32,
) -> GraphResult<Expression> {
    const OP: &str = "GatherElements";
    let input_desc = builder.operand(OP, input)?;
    let indices_desc = builder.operand(OP, indices)?;
    ensure_same_rank(OP, &input_desc, &indices_desc)?;
    ensure_axis(OP, axis, input_desc.rank())?;
    let output = builder.output_desc(input_desc.data_type(), indices_desc.sizes())?;
    builder.emit_single(
        OperatorKind::GatherElements,
        OperatorAttributes::Axis { axis },
        &[Some(input), Some(indices)],
        output,
    )
}

/// Output sizes of [`gather_nd`]; inconsistent dimension counts are reported as an error detail.
pub(crate) fn gather_nd_sizes(
    input: &[u32],
    indices: &[u32],
    counts: GatherNdAttributes,
) -> Result<Vec<u32>, String> {
    let input_dims = counts.input_dimension_count as usize;
    let indices_dims = counts.indices_dimension_count as usize;
    let batch_dims = counts.batch_dimension_count as usize;
    if input_dims == 0 || input_dims > input.len() {
        return Err(format!(
            "input dimension count {input_dims} must be in 1..={}",
            input.len()
        ));
    }
    if indices_dims == 0 || indices_dims > indices.len() {
        return Err(format!(
            "indices dimension count {indices_dims} must be in 1..={}",
            indices.len()
        ));
    }
    if batch_dims >= input_dims || batch_dims >= indices_dims {
        return Err(format!(
            "batch dimension count {batch_dims} must be below both the input ({input_dims}) and indices ({indices_dims}) dimension counts"
        ));
    }
    let coordinates = indices[indices.len() - 1] as usize;
    if coordinates == 0 || coordinates > input_dims - batch_dims {
        return Err(format!(
            "{coordinates} coordinates per index do not address {} gatherable axes",
            input_dims - batch_dims
        ));
    }
    let from_input = input_dims - batch_dims - coordinates;
    let padding = input
        .len()
        .checked_sub(indices_dims + from_input - 1)
        .ok_or_else(|| "output would exceed the input rank".to_owned())?;

    let mut sizes = vec![1u32; padding];
    sizes.extend_from_slice(&indices[indices.len() - indices_dims..indices.len() - 1]);
    sizes.extend_from_slice(&input[input.len() - from_input..]);
    Ok(sizes)
}

/// Gathers slices addressed by coordinate tuples in the trailing axis of `indices`.
pub fn gather_nd(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    indices: Expression,
    input_dimension_count: u32,
    indices_dimension_count: u32,
    batch_dimension_count: u32,
) -> GraphResult<Expression> {
    const OP: &str = "GatherNd";
    let input_desc = builder.operand(OP, input)?;
    let indices_desc = builder.operand(OP, indices)?;
    let counts = GatherNdAttributes {
        input_dimension_count,
        indices_dimension_count,
        batch_dimension_count,
    };
    let sizes = gather_nd_sizes(input_desc.sizes(), indices_desc.sizes(), counts)
        .map_err(|detail| GraphError::contract(OP, detail))?;
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(
        OperatorKind::GatherNd1,
        OperatorAttributes::GatherNd(counts),
        &[Some(input), Some(indices)],
        output,
    )
}

/// Writes `updates` into a copy of `input` at positions given by `indices` along `axis`.
pub fn scatter_elements(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    indices: Expression,
    updates: Expression,
    axis: u32,
) -> GraphResult<Expression> {
    const OP: &str = "ScatterElements";
    let input_desc = builder.operand(OP, input)?;
    let indices_desc = builder.operand(OP, indices)?;
    let updates_desc = builder.operand(OP, updates)?;
    ensure_same_rank(OP, &input_desc, &indices_desc)?;
    ensure_axis(OP, axis, input_desc.rank())?;
    ensure_contract!(
        indices_desc.sizes() == updates_desc.sizes(),
        OP,
        "indices {:?} and updates {:?} must have equal sizes",
        indices_desc.sizes(),
        updates_desc.sizes()
    );
    ensure_contract!(
        updates_desc.data_type() == input_desc.data_type(),
        OP,
        "updates are {}, input is {}",
        updates_desc.data_type(),
        input_desc.data_type()
    );
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ScatterElements,
        OperatorAttributes::Axis { axis },
        &[Some(input), Some(indices), Some(updates)],
        output,
    )
}

/// Coordinate-tuple scatter; the output mirrors `input`.
pub fn scatter_nd(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    indices: Expression,
    updates: Expression,
    input_dimension_count: u32,
    indices_dimension_count: u32,
) -> GraphResult<Expression> {
    const OP: &str = "ScatterNd";
    let input_desc = builder.operand(OP, input)?;
    let indices_desc = builder.operand(OP, indices)?;
    let updates_desc = builder.operand(OP, updates)?;
    ensure_contract!(
        input_dimension_count >= 1 && input_dimension_count as usize <= input_desc.rank(),
        OP,
        "input dimension count {input_dimension_count} must be in 1..={}",
        input_desc.rank()
    );
    ensure_contract!(
        indices_dimension_count >= 1 && indices_dimension_count as usize <= indices_desc.rank(),
        OP,
        "indices dimension count {indices_dimension_count} must be in 1..={}",
        indices_desc.rank()
    );
    ensure_contract!(
        updates_desc.data_type() == input_desc.data_type(),
        OP,
        "updates are {}, input is {}",
        updates_desc.data_type(),
        input_desc.data_type()
    );
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ScatterNd,
        OperatorAttributes::ScatterNd {
            input_dimension_count,
            indices_dimension_count,
        },
        &[Some(input), Some(indices), Some(updates)],
        output,
    )
}

/// Expands `indices` along `axis` to `output_length`, filling with the off/on pair in `values`.
pub fn one_hot(
    builder: &mut GraphBuilder<'_>,
    indices: Expression,
    values: Expression,
    output_length: u32,
    axis: u32,
) -> GraphResult<Expression> {
    const OP: &str = "OneHot";
    let indices_desc = builder.operand(OP, indices)?;
    let values_desc = builder.operand(OP, values)?;
    let axis_index = ensure_axis(OP, axis, indices_desc.rank())?;
    ensure_contract!(output_length > 0, OP, "output length must be positive");
    let mut sizes = indices_desc.sizes().to_vec();
    sizes[axis_index] = output_length;
    let output = builder.output_desc(values_desc.data_type(), &sizes)?;
    builder.emit_single(
        OperatorKind::OneHot,
        OperatorAttributes::Axis { axis },
        &[Some(indices), Some(values)],
        output,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopKOutputs {
    pub values: Expression,
    /// `UInt32` positions of the selected values along the axis.
    pub indices: Expression,
}

/// Selects the `k` largest (or smallest) entries along `axis`.
pub fn top_k(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    axis: u32,
    k: u32,
    direction: AxisDirection,
) -> GraphResult<TopKOutputs> {
    const OP: &str = "TopK";
    let input_desc = builder.operand(OP, input)?;
    let axis_index = ensure_axis(OP, axis, input_desc.rank())?;
    let extent = input_desc.sizes()[axis_index];
    ensure_contract!(
        k >= 1 && k <= extent,
        OP,
        "k = {k} must be in 1..={extent} for axis {axis}"
    );
    let mut sizes = input_desc.sizes().to_vec();
    sizes[axis_index] = k;
    let values = builder.output_desc(input_desc.data_type(), &sizes)?;
    let indices = builder.output_desc(DataType::UInt32, &sizes)?;
    let outputs = builder.emit(
        OperatorKind::TopK1,
        OperatorAttributes::TopK { axis, k, direction },
        &[Some(input)],
        vec![Some(values), Some(indices)],
    )?;
    Ok(TopKOutputs {
        values: required_output(OperatorKind::TopK1, &outputs, 0)?,
        indices: required_output(OperatorKind::TopK1, &outputs, 1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_splices_indices_at_axis() {
        // [2, 3] ++ [6, 7] ++ [5], right-aligned to rank 4
        let sizes = gather_sizes(&[2, 3, 4, 5], &[1, 1, 6, 7], 2, 2);
        assert_eq!(sizes, vec![3, 6, 7, 5]);
        let sizes = gather_sizes(&[4, 5, 6], &[1, 1, 3], 1, 1);
        assert_eq!(sizes, vec![4, 3, 6]);
    }

    #[test]
    fn gather_nd_with_batch_dimension() {
        let counts = GatherNdAttributes {
            input_dimension_count: 3,
            indices_dimension_count: 3,
            batch_dimension_count: 1,
        };
        let sizes = gather_nd_sizes(&[1, 2, 3, 4], &[1, 2, 5, 1], counts)
            .unwrap_or_else(|err| panic!("unexpected error: {err}"));
        assert_eq!(sizes, vec![1, 2, 5, 4]);
    }

    #[test]
    fn gather_nd_rejects_batch_at_indices_count() {
        let counts = GatherNdAttributes {
            input_dimension_count: 3,
            indices_dimension_count: 1,
            batch_dimension_count: 1,
        };
        assert!(gather_nd_sizes(&[2, 3, 4], &[1, 1, 1], counts).is_err());
    }
}
