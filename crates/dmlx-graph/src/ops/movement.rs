//! Data movement: slicing, casting, partitioning, padding and block rearrangement.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::{DataType, TensorDesc};

use super::attributes::{DepthSpaceOrder, OperatorAttributes, PaddingMode};
use super::common::{ensure_axis, ensure_len, ensure_rank, required_output};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceAttributes {
    pub offsets: Vec<u32>,
    pub sizes: Vec<u32>,
    /// Negative strides walk the window backwards.
    pub strides: Vec<i32>,
}

fn check_window(
    op: &'static str,
    rank: usize,
    offsets: &[u32],
    sizes: &[u32],
    strides: &[i32],
) -> GraphResult<()> {
    ensure_len(op, "window offsets", offsets.len(), rank)?;
    ensure_len(op, "window sizes", sizes.len(), rank)?;
    ensure_len(op, "window strides", strides.len(), rank)?;
    ensure_contract!(
        strides.iter().all(|stride| *stride != 0),
        op,
        "window strides must be non-zero, got {strides:?}"
    );
    ensure_contract!(
        sizes.iter().all(|size| *size != 0),
        op,
        "window sizes must be non-zero, got {sizes:?}"
    );
    Ok(())
}

/// Elements visited by a strided window: `(size - 1) / |stride| + 1`.
fn strided_extent(size: u32, stride: i32) -> u32 {
    (size - 1) / stride.unsigned_abs() + 1
}

/// Extracts a strided window from `input`.
pub fn slice(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    offsets: &[u32],
    sizes: &[u32],
    strides: &[i32],
) -> GraphResult<Expression> {
    const OP: &str = "Slice";
    let input_desc = builder.operand(OP, input)?;
    check_window(OP, input_desc.rank(), offsets, sizes, strides)?;
    for (axis, extent) in input_desc.sizes().iter().enumerate() {
        ensure_contract!(
            u64::from(offsets[axis]) + u64::from(sizes[axis]) <= u64::from(*extent),
            OP,
            "window [{}, +{}) exceeds extent {extent} on axis {axis}",
            offsets[axis],
            sizes[axis]
        );
    }
    let output_sizes = sizes
        .iter()
        .zip(strides)
        .map(|(size, stride)| strided_extent(*size, *stride))
        .collect::<Vec<_>>();
    let output = builder.output_desc(input_desc.data_type(), &output_sizes)?;
    builder.emit_single(
        OperatorKind::Slice1,
        OperatorAttributes::Slice(SliceAttributes {
            offsets: offsets.to_vec(),
            sizes: sizes.to_vec(),
            strides: strides.to_vec(),
        }),
        &[Some(input)],
        output,
    )
}

/// Scatters a sliced gradient back into a zero tensor of `output_gradient_sizes`.
pub fn slice_grad(
    builder: &mut GraphBuilder<'_>,
    input_gradient: Expression,
    output_gradient_sizes: &[u32],
    offsets: &[u32],
    sizes: &[u32],
    strides: &[i32],
) -> GraphResult<Expression> {
    const OP: &str = "SliceGrad";
    let gradient_desc = builder.operand(OP, input_gradient)?;
    let rank = gradient_desc.rank();
    ensure_len(OP, "output gradient sizes", output_gradient_sizes.len(), rank)?;
    check_window(OP, rank, offsets, sizes, strides)?;
    let output = builder.output_desc(gradient_desc.data_type(), output_gradient_sizes)?;
    builder.emit_single(
        OperatorKind::SliceGrad,
        OperatorAttributes::Slice(SliceAttributes {
            offsets: offsets.to_vec(),
            sizes: sizes.to_vec(),
            strides: strides.to_vec(),
        }),
        &[Some(input_gradient)],
        output,
    )
}

pub fn cast(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    data_type: DataType,
) -> GraphResult<Expression> {
    const OP: &str = "Cast";
    let input_desc = builder.operand(OP, input)?;
    let output = builder.output_desc(data_type, input_desc.sizes())?;
    builder.emit_single(OperatorKind::Cast, OperatorAttributes::None, &[Some(input)], output)
}

/// Partitions `axis` into consecutive pieces of `axis_sizes`, which must sum to its extent.
pub fn split(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    axis: u32,
    axis_sizes: &[u32],
) -> GraphResult<Vec<Expression>> {
    const OP: &str = "Split";
    let input_desc = builder.operand(OP, input)?;
    let axis_index = ensure_axis(OP, axis, input_desc.rank())?;
    ensure_contract!(!axis_sizes.is_empty(), OP, "at least one output is required");
    let extent = input_desc.sizes()[axis_index];
    let total = axis_sizes
        .iter()
        .try_fold(0u32, |sum, size| sum.checked_add(*size));
    ensure_contract!(
        total == Some(extent),
        OP,
        "output sizes {axis_sizes:?} do not sum to extent {extent} of axis {axis}"
    );

    let mut outputs = Vec::with_capacity(axis_sizes.len());
    for size in axis_sizes {
        let mut sizes = input_desc.sizes().to_vec();
        sizes[axis_index] = *size;
        outputs.push(Some(builder.output_desc(input_desc.data_type(), &sizes)?));
    }
    let emitted = builder.emit(
        OperatorKind::Split,
        OperatorAttributes::Axis { axis },
        &[Some(input)],
        outputs,
    )?;
    (0..emitted.len())
        .map(|slot| required_output(OperatorKind::Split, &emitted, slot))
        .collect()
}

/// Concatenates `inputs` along `axis`; every other extent and the data type must agree.
pub fn join(
    builder: &mut GraphBuilder<'_>,
    inputs: &[Expression],
    axis: u32,
) -> GraphResult<Expression> {
    const OP: &str = "Join";
    let Some((first, rest)) = inputs.split_first() else {
        return Err(GraphError::contract(OP, "at least one input is required"));
    };
    let first_desc = builder.operand(OP, *first)?;
    let axis_index = ensure_axis(OP, axis, first_desc.rank())?;
    let mut sizes = first_desc.sizes().to_vec();
    for input in rest {
        let desc = builder.operand(OP, *input)?;
        check_joinable(OP, &first_desc, &desc, axis_index)?;
        sizes[axis_index] = sizes[axis_index]
            .checked_add(desc.sizes()[axis_index])
            .ok_or_else(|| GraphError::contract(OP, format!("joined extent of axis {axis} overflows")))?;
    }
    let output = builder.output_desc(first_desc.data_type(), &sizes)?;
    let wired = inputs.iter().copied().map(Some).collect::<Vec<_>>();
    builder.emit_single(
        OperatorKind::Join,
        OperatorAttributes::Axis { axis },
        &wired,
        output,
    )
}

fn check_joinable(
    op: &'static str,
    first: &TensorDesc,
    other: &TensorDesc,
    axis: usize,
) -> GraphResult<()> {
    ensure_contract!(
        first.data_type() == other.data_type(),
        op,
        "data types differ: {} vs {}",
        first.data_type(),
        other.data_type()
    );
    ensure_contract!(
        first.rank() == other.rank(),
        op,
        "ranks differ: {:?} vs {:?}",
        first.sizes(),
        other.sizes()
    );
    let mismatch = first
        .sizes()
        .iter()
        .zip(other.sizes())
        .enumerate()
        .any(|(index, (a, b))| index != axis && a != b);
    ensure_contract!(
        !mismatch,
        op,
        "sizes {:?} and {:?} differ outside axis {axis}",
        first.sizes(),
        other.sizes()
    );
    Ok(())
}

/// Grows every axis by its start and end padding.
pub fn padding(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    mode: PaddingMode,
    value: f32,
    start: &[u32],
    end: &[u32],
) -> GraphResult<Expression> {
    const OP: &str = "Padding";
    let input_desc = builder.operand(OP, input)?;
    let rank = input_desc.rank();
    ensure_len(OP, "start padding", start.len(), rank)?;
    ensure_len(OP, "end padding", end.len(), rank)?;
    let mut sizes = Vec::with_capacity(rank);
    for (axis, extent) in input_desc.sizes().iter().enumerate() {
        let padded = extent
            .checked_add(start[axis])
            .and_then(|size| size.checked_add(end[axis]))
            .ok_or_else(|| GraphError::contract(OP, format!("padded extent of axis {axis} overflows")))?;
        sizes.push(padded);
    }
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(
        OperatorKind::Padding,
        OperatorAttributes::Padding {
            mode,
            value,
            start: start.to_vec(),
            end: end.to_vec(),
        },
        &[Some(input)],
        output,
    )
}

/// Repeats the input `repeats[axis]` times along every axis.
pub fn tile(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    repeats: &[u32],
) -> GraphResult<Expression> {
    const OP: &str = "Tile";
    let input_desc = builder.operand(OP, input)?;
    ensure_len(OP, "repeats", repeats.len(), input_desc.rank())?;
    let mut sizes = Vec::with_capacity(repeats.len());
    for (axis, (extent, repeat)) in input_desc.sizes().iter().zip(repeats).enumerate() {
        sizes.push(
            extent
                .checked_mul(*repeat)
                .ok_or_else(|| GraphError::contract(OP, format!("tiled extent of axis {axis} overflows")))?,
        );
    }
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(
        OperatorKind::Tile,
        OperatorAttributes::Tile {
            repeats: repeats.to_vec(),
        },
        &[Some(input)],
        output,
    )
}

fn check_block(op: &'static str, input: &TensorDesc, block_size: u32) -> GraphResult<()> {
    ensure_rank(op, "input", input, 4)?;
    ensure_contract!(block_size > 0, op, "block size must be positive");
    Ok(())
}

/// Moves `block_size x block_size` spatial blocks into the channel axis.
pub fn space_to_depth(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    block_size: u32,
    order: DepthSpaceOrder,
) -> GraphResult<Expression> {
    const OP: &str = "SpaceToDepth";
    let input_desc = builder.operand(OP, input)?;
    check_block(OP, &input_desc, block_size)?;
    let [n, c, h, w] = [0, 1, 2, 3].map(|axis| input_desc.sizes()[axis]);
    ensure_contract!(
        h % block_size == 0 && w % block_size == 0,
        OP,
        "spatial extents {h}x{w} are not divisible by block size {block_size}"
    );
    let channels = block_size
        .checked_mul(block_size)
        .and_then(|area| area.checked_mul(c))
        .ok_or_else(|| GraphError::contract(OP, "channel extent overflows"))?;
    let sizes = [n, channels, h / block_size, w / block_size];
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(
        OperatorKind::SpaceToDepth1,
        OperatorAttributes::DepthSpace { block_size, order },
        &[Some(input)],
        output,
    )
}

/// Inverse of [`space_to_depth`].
pub fn depth_to_space(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    block_size: u32,
    order: DepthSpaceOrder,
) -> GraphResult<Expression> {
    const OP: &str = "DepthToSpace";
    let input_desc = builder.operand(OP, input)?;
    check_block(OP, &input_desc, block_size)?;
    let [n, c, h, w] = [0, 1, 2, 3].map(|axis| input_desc.sizes()[axis]);
    let area = block_size
        .checked_mul(block_size)
        .ok_or_else(|| GraphError::contract(OP, "block area overflows"))?;
    ensure_contract!(
        c % area == 0,
        OP,
        "channels {c} are not divisible by block area {area}"
    );
    let height = h
        .checked_mul(block_size)
        .ok_or_else(|| GraphError::contract(OP, "height overflows"))?;
    let width = w
        .checked_mul(block_size)
        .ok_or_else(|| GraphError::contract(OP, "width overflows"))?;
    let sizes = [n, c / area, height, width];
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(
        OperatorKind::DepthToSpace1,
        OperatorAttributes::DepthSpace { block_size, order },
        &[Some(input)],
        output,
    )
}

/// Reverses the leading `sequence_lengths[i]` elements of every sequence along `axis`.
pub fn reverse_subsequences(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    sequence_lengths: Expression,
    axis: u32,
) -> GraphResult<Expression> {
    const OP: &str = "ReverseSubsequences";
    let input_desc = builder.operand(OP, input)?;
    let lengths_desc = builder.operand(OP, sequence_lengths)?;
    ensure_axis(OP, axis, input_desc.rank())?;
    ensure_contract!(
        lengths_desc.rank() == input_desc.rank(),
        OP,
        "sequence lengths {:?} must have the input rank {}",
        lengths_desc.sizes(),
        input_desc.rank()
    );
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ReverseSubsequences,
        OperatorAttributes::Axis { axis },
        &[Some(input), Some(sequence_lengths)],
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::strided_extent;

    #[test]
    fn strided_extent_counts_visited_elements() {
        assert_eq!(strided_extent(5, 1), 5);
        assert_eq!(strided_extent(5, 2), 3);
        assert_eq!(strided_extent(5, -2), 3);
        assert_eq!(strided_extent(1, 7), 1);
    }
}
