//! Tensor descriptors, data types and layout policies.

pub mod desc;
pub mod dtype;
pub mod layout;
pub mod shape;

pub use desc::{Dimensions, TensorDesc, TensorFlags};
pub use dtype::{DataType, DataTypeMask};
pub use layout::{buffer_tensor_size, LayoutFn, LayoutKind, LayoutPolicy, TensorLayout};
