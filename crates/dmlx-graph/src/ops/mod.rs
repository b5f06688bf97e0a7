//! Operator builders, one function per operator kind, grouped by family.
//!
//! Every builder takes the owning [`GraphBuilder`](crate::graph::GraphBuilder) first, infers the
//! output descriptors from its operands and appends exactly one operator node. Contract checks
//! run before anything is appended, so a failed call leaves the graph untouched.

pub mod activation;
pub mod attributes;
mod common;
pub mod conv;
pub mod elementwise;
pub mod gather;
pub mod generate;
pub mod matmul;
pub mod movement;
pub mod normalization;
pub mod pooling;
pub mod recurrent;
pub mod reduce;
pub mod resample;
pub mod roi;
mod window;

pub use attributes::{
    Activation, AxisDirection, DepthSpaceOrder, FusedActivation, InterpolationMode,
    IsInfinityMode, OperatorAttributes, PaddingMode, QuantizationType, RandomGeneratorType,
    RecurrentDirection, RoundingMode, ScaleBias, Size2D,
};
pub use conv::{ConvolutionDirection, ConvolutionMode, ConvolutionOptions};
pub use generate::ScalarValue;
pub use matmul::GemmOptions;
pub use pooling::PoolingOptions;
pub use recurrent::{GruOptions, GruOutputSelection};
pub use reduce::ReduceFunction;
pub use resample::ResampleOptions;
pub use roi::RoiSampling;
