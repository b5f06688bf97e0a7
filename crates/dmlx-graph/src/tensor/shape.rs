//! Checked dimension arithmetic shared by shape-inference routines.

use super::desc::Dimensions;

/// Computes `product(dims)` with overflow checking.
pub fn checked_element_count_or_error<E, F>(dims: &[u32], mut on_overflow: F) -> Result<u32, E>
where
    F: FnMut() -> E,
{
    let mut count = 1u32;
    for dim in dims {
        count = count.checked_mul(*dim).ok_or_else(&mut on_overflow)?;
    }
    Ok(count)
}

/// Builds row-major contiguous strides with overflow checking.
pub fn contiguous_strides_or_error<E, F>(dims: &[u32], mut on_overflow: F) -> Result<Dimensions, E>
where
    F: FnMut() -> E,
{
    let mut strides: Dimensions = dims.iter().map(|_| 0).collect();
    let mut stride = 1u32;
    for axis in (0..dims.len()).rev() {
        strides[axis] = stride;
        stride = stride
            .checked_mul(dims[axis])
            .ok_or_else(&mut on_overflow)?;
    }
    Ok(strides)
}

/// Output extent of a sliding window along one axis.
///
/// `padded` is the input extent plus both paddings; the window must fit and `stride` be non-zero.
pub fn sliding_window_extent(padded: u32, window: u32, stride: u32) -> Option<u32> {
    if stride == 0 || window > padded {
        return None;
    }
    Some((padded - window) / stride + 1)
}

/// Extent covered by a dilated window: `1 + (window - 1) * dilation`, `None` on overflow.
pub fn dilated_extent(window: u32, dilation: u32) -> Option<u32> {
    window
        .saturating_sub(1)
        .checked_mul(dilation)?
        .checked_add(1)
}

/// Resolves an optional per-axis option vector, filling with `default` when empty.
pub fn per_axis_or<T: Copy>(values: &[T], count: usize, default: T) -> Option<Vec<T>> {
    if values.is_empty() {
        Some(vec![default; count])
    } else if values.len() == count {
        Some(values.to_vec())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sliding_window_rejects_oversized_window() {
        assert_eq!(sliding_window_extent(4, 5, 1), None);
        assert_eq!(sliding_window_extent(4, 2, 0), None);
        assert_eq!(sliding_window_extent(8, 2, 2), Some(4));
    }

    #[test]
    fn dilated_extent_reports_overflow() {
        assert_eq!(dilated_extent(3, 2), Some(5));
        assert_eq!(dilated_extent(1, u32::MAX), Some(1));
        assert_eq!(dilated_extent(3, u32::MAX / 2 + 1), None);
        assert_eq!(dilated_extent(2, u32::MAX), None);
    }

    #[test]
    fn per_axis_fills_defaults() {
        assert_eq!(per_axis_or::<u32>(&[], 2, 1), Some(vec![1, 1]));
        assert_eq!(per_axis_or(&[2u32, 3], 2, 1), Some(vec![2, 3]));
        assert_eq!(per_axis_or(&[2u32], 2, 1), None);
    }
}
