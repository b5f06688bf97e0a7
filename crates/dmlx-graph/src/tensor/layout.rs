//! Layout policies that turn (data type, flags, sizes) into strides and buffer sizes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use crate::error::{GraphError, GraphResult};

use super::desc::{Dimensions, TensorFlags};
use super::dtype::DataType;

/// Physical properties derived for a tensor by a [`LayoutPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorLayout {
    pub strides: Option<Dimensions>,
    pub total_bytes: u64,
    pub alignment: u32,
}

/// Caller-supplied layout function.
pub type LayoutFn = dyn Fn(DataType, TensorFlags, &[u32]) -> TensorLayout + Send + Sync;

/// Serializable selector for the built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    #[serde(alias = "packed")]
    Default,
    #[serde(alias = "interleaved", alias = "nhwc")]
    InterleavedChannel,
}

impl LayoutKind {
    /// Accepts the same spellings as the serialized form, including its aliases.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" | "packed" => Some(LayoutKind::Default),
            "interleaved" | "interleaved_channel" | "nhwc" => Some(LayoutKind::InterleavedChannel),
            _ => None,
        }
    }
}

/// Strategy used by a builder to describe every tensor it creates.
#[derive(Clone, Default)]
pub enum LayoutPolicy {
    /// Packed, no explicit strides.
    #[default]
    Default,
    /// Channel axis (axis 1) fastest-varying: an NHWC view over NCHW-ordered sizes.
    InterleavedChannel,
    Custom(Arc<LayoutFn>),
}

impl LayoutPolicy {
    pub fn custom<F>(layout: F) -> Self
    where
        F: Fn(DataType, TensorFlags, &[u32]) -> TensorLayout + Send + Sync + 'static,
    {
        LayoutPolicy::Custom(Arc::new(layout))
    }

    /// Fails when the policy's strides do not fit in `u32`.
    pub fn compute(
        &self,
        data_type: DataType,
        flags: TensorFlags,
        sizes: &[u32],
    ) -> GraphResult<TensorLayout> {
        match self {
            LayoutPolicy::Default => Ok(default_layout(data_type, sizes)),
            LayoutPolicy::InterleavedChannel => interleaved_channel_layout(data_type, sizes)
                .ok_or_else(|| {
                    GraphError::contract(
                        "TensorDesc",
                        format!("interleaved strides of {sizes:?} overflow u32"),
                    )
                }),
            LayoutPolicy::Custom(layout) => Ok(layout(data_type, flags, sizes)),
        }
    }
}

impl From<LayoutKind> for LayoutPolicy {
    fn from(kind: LayoutKind) -> Self {
        match kind {
            LayoutKind::Default => LayoutPolicy::Default,
            LayoutKind::InterleavedChannel => LayoutPolicy::InterleavedChannel,
        }
    }
}

impl fmt::Debug for LayoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutPolicy::Default => f.write_str("Default"),
            LayoutPolicy::InterleavedChannel => f.write_str("InterleavedChannel"),
            LayoutPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Bytes needed to back a tensor, rounded up to a multiple of four.
///
/// Without strides the element count is the product of `sizes`; with strides it is the index of
/// the furthest addressable element plus one. Saturates instead of overflowing.
pub fn buffer_tensor_size(data_type: DataType, sizes: &[u32], strides: Option<&[u32]>) -> u64 {
    let element_bits = u64::from(data_type.element_bits());
    let index_count = match strides {
        None => sizes
            .iter()
            .fold(1u64, |count, &size| count.saturating_mul(u64::from(size))),
        Some(strides) => {
            if sizes.iter().any(|&size| size == 0) {
                0
            } else {
                sizes
                    .iter()
                    .zip(strides)
                    .fold(1u64, |count, (&size, &stride)| {
                        count.saturating_add(u64::from(size - 1) * u64::from(stride))
                    })
            }
        }
    };
    let bytes = index_count.saturating_mul(element_bits).div_ceil(8);
    bytes.saturating_add(3) & !3
}

fn default_layout(data_type: DataType, sizes: &[u32]) -> TensorLayout {
    TensorLayout {
        strides: None,
        total_bytes: buffer_tensor_size(data_type, sizes, None),
        alignment: 0,
    }
}

const N: usize = 0;
const C: usize = 1;

/// `None` when a stride does not fit in `u32`.
fn interleaved_channel_layout(data_type: DataType, sizes: &[u32]) -> Option<TensorLayout> {
    let rank = sizes.len();
    if rank < 2 {
        return Some(default_layout(data_type, sizes));
    }

    let mut strides: Dimensions = smallvec![0; rank];
    strides[C] = 1;
    let mut stride = sizes[C];
    for axis in (2..rank).rev() {
        strides[axis] = stride;
        stride = stride.checked_mul(sizes[axis])?;
    }
    strides[N] = stride;

    let total_bytes = buffer_tensor_size(data_type, sizes, Some(&strides));
    Some(TensorLayout {
        strides: Some(strides),
        total_bytes,
        alignment: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_size_rounds_to_four_bytes() {
        assert_eq!(buffer_tensor_size(DataType::UInt8, &[3], None), 4);
        assert_eq!(buffer_tensor_size(DataType::Float16, &[5], None), 12);
        assert_eq!(buffer_tensor_size(DataType::Float32, &[1, 3, 8, 8], None), 768);
    }

    #[test]
    fn strided_size_uses_furthest_element() {
        // 2x3 matrix stored column-major inside a 4-row buffer.
        let size = buffer_tensor_size(DataType::Float32, &[2, 3], Some(&[1, 4]));
        assert_eq!(size, ((1 + 2 * 4 + 1) * 4) as u64);
    }

    #[test]
    fn oversized_buffers_saturate() {
        let size = buffer_tensor_size(DataType::Float64, &[u32::MAX, u32::MAX, u32::MAX], None);
        assert_eq!(size, 1 << 61);
    }

    #[test]
    fn interleaved_strides_must_fit_u32() {
        let policy = LayoutPolicy::InterleavedChannel;
        assert!(policy
            .compute(DataType::UInt8, TensorFlags::None, &[1, 65536, 65536, 2])
            .is_err());
        let layout = policy
            .compute(DataType::UInt8, TensorFlags::None, &[2, 3, 0, 4])
            .unwrap_or_else(|err| panic!("unexpected error: {err}"));
        assert_eq!(layout.strides.as_deref(), Some(&[0, 1, 12, 3][..]));
    }
}
