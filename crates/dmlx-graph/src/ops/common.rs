//! Argument checks shared by the operator builders.

use crate::ensure_contract;
use crate::error::{GraphError, GraphResult};
use crate::graph::Expression;
use crate::schema::OperatorKind;
use crate::tensor::shape::per_axis_or;
use crate::tensor::{DataType, TensorDesc};

pub(crate) fn ensure_same_sizes(
    op: &'static str,
    a: &TensorDesc,
    b: &TensorDesc,
) -> GraphResult<()> {
    ensure_contract!(
        a.sizes() == b.sizes(),
        op,
        "operand sizes differ: {:?} vs {:?}",
        a.sizes(),
        b.sizes()
    );
    Ok(())
}

pub(crate) fn ensure_same_type(op: &'static str, a: &TensorDesc, b: &TensorDesc) -> GraphResult<()> {
    ensure_contract!(
        a.data_type() == b.data_type(),
        op,
        "operand data types differ: {} vs {}",
        a.data_type(),
        b.data_type()
    );
    Ok(())
}

pub(crate) fn ensure_data_type(
    op: &'static str,
    what: &str,
    desc: &TensorDesc,
    expected: DataType,
) -> GraphResult<()> {
    ensure_contract!(
        desc.data_type() == expected,
        op,
        "{what} must be {expected}, got {}",
        desc.data_type()
    );
    Ok(())
}

pub(crate) fn ensure_rank(
    op: &'static str,
    what: &str,
    desc: &TensorDesc,
    expected: usize,
) -> GraphResult<()> {
    ensure_contract!(
        desc.rank() == expected,
        op,
        "{what} must have rank {expected}, got {:?}",
        desc.sizes()
    );
    Ok(())
}

pub(crate) fn ensure_axis(op: &'static str, axis: u32, rank: usize) -> GraphResult<usize> {
    let axis = axis as usize;
    ensure_contract!(axis < rank, op, "axis {axis} is out of range for rank {rank}");
    Ok(axis)
}

pub(crate) fn ensure_len(
    op: &'static str,
    what: &str,
    len: usize,
    expected: usize,
) -> GraphResult<()> {
    ensure_contract!(
        len == expected,
        op,
        "{what} needs {expected} entries, got {len}"
    );
    Ok(())
}

/// Spatial axes of an `N, C, spatial...` tensor.
pub(crate) fn spatial_axis_count(op: &'static str, desc: &TensorDesc) -> GraphResult<usize> {
    ensure_contract!(
        desc.rank() >= 3,
        op,
        "expected N, C and at least one spatial axis, got {:?}",
        desc.sizes()
    );
    Ok(desc.rank() - 2)
}

/// Per-axis values defaulting to `fill` when the caller supplied none.
pub(crate) fn per_axis(
    op: &'static str,
    what: &str,
    values: Option<&[u32]>,
    count: usize,
    fill: u32,
) -> GraphResult<Vec<u32>> {
    let values = values.unwrap_or(&[]);
    per_axis_or(values, count, fill).ok_or_else(|| {
        GraphError::contract(
            op,
            format!("{what} needs {count} entries, got {}", values.len()),
        )
    })
}

/// Expression emitted into `slot` of a multi-output node.
pub(crate) fn required_output(
    kind: OperatorKind,
    outputs: &[Option<Expression>],
    slot: usize,
) -> GraphResult<Expression> {
    outputs
        .get(slot)
        .copied()
        .flatten()
        .ok_or_else(|| GraphError::structure(format!("{kind} produced no output in slot {slot}")))
}
