use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{GraphError, GraphResult};

use super::dtype::DataType;
use super::layout::{buffer_tensor_size, LayoutPolicy};
use super::shape::contiguous_strides_or_error;

/// Extents or strides of a tensor, outermost axis first.
pub type Dimensions = SmallVec<[u32; 8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TensorFlags {
    #[default]
    None,
    /// Backing memory is owned by the runtime once the graph is compiled.
    OwnedByRuntime,
}

/// Shape, strides, byte size and alignment of one tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorDesc {
    data_type: DataType,
    flags: TensorFlags,
    sizes: Dimensions,
    strides: Option<Dimensions>,
    total_bytes: u64,
    alignment: u32,
}

impl TensorDesc {
    /// Describes a tensor of `sizes` using `policy` for strides and byte size.
    pub fn new(data_type: DataType, sizes: &[u32], policy: &LayoutPolicy) -> GraphResult<Self> {
        Self::with_flags(data_type, TensorFlags::None, sizes, policy)
    }

    pub fn with_flags(
        data_type: DataType,
        flags: TensorFlags,
        sizes: &[u32],
        policy: &LayoutPolicy,
    ) -> GraphResult<Self> {
        if data_type == DataType::Unknown {
            return Err(GraphError::contract(
                "TensorDesc",
                "data type must be known to compute a layout",
            ));
        }
        let layout = policy.compute(data_type, flags, sizes)?;
        Self::with_layout(
            data_type,
            flags,
            sizes,
            layout.strides.as_deref(),
            layout.total_bytes,
            layout.alignment,
        )
    }

    /// Packed tensor description without consulting a policy.
    pub fn packed(data_type: DataType, sizes: &[u32]) -> GraphResult<Self> {
        Self::new(data_type, sizes, &LayoutPolicy::Default)
    }

    /// Fully explicit description; only the stride/size arity is checked.
    pub fn with_layout(
        data_type: DataType,
        flags: TensorFlags,
        sizes: &[u32],
        strides: Option<&[u32]>,
        total_bytes: u64,
        alignment: u32,
    ) -> GraphResult<Self> {
        if let Some(strides) = strides {
            if strides.len() != sizes.len() {
                return Err(GraphError::contract(
                    "TensorDesc",
                    format!(
                        "stride count {} does not match dimension count {}",
                        strides.len(),
                        sizes.len()
                    ),
                ));
            }
        }
        Ok(Self {
            data_type,
            flags,
            sizes: SmallVec::from_slice(sizes),
            strides: strides.map(SmallVec::from_slice),
            total_bytes,
            alignment,
        })
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn flags(&self) -> TensorFlags {
        self.flags
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    pub fn strides(&self) -> Option<&[u32]> {
        self.strides.as_deref()
    }

    /// Stored strides, or row-major strides for a packed tensor.
    pub fn effective_strides(&self) -> GraphResult<Dimensions> {
        match &self.strides {
            Some(strides) => Ok(strides.clone()),
            None => contiguous_strides_or_error(&self.sizes, || {
                GraphError::contract("TensorDesc", "row-major strides overflow u32")
            }),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    pub fn rank(&self) -> usize {
        self.sizes.len()
    }

    pub fn element_count(&self) -> u64 {
        self.sizes
            .iter()
            .fold(1u64, |count, &size| count.saturating_mul(u64::from(size)))
    }

    /// Byte size a packed layout would need, regardless of the stored strides.
    pub fn packed_bytes(&self) -> u64 {
        buffer_tensor_size(self.data_type, &self.sizes, None)
    }
}

impl fmt::Display for TensorDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tensor<{}, {}", self.data_type, format_dims(&self.sizes))?;
        if let Some(strides) = &self.strides {
            write!(f, ", strides={}", format_dims(strides))?;
        }
        write!(f, ", bytes={}>", self.total_bytes)
    }
}

pub(crate) fn format_dims(dims: &[u32]) -> String {
    if dims.is_empty() {
        return "scalar".to_string();
    }
    dims.iter()
        .map(|dim| dim.to_string())
        .collect::<Vec<_>>()
        .join("x")
}
