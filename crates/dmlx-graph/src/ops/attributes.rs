//! Attribute payloads recorded on operator nodes.
//!
//! The payload is what the downstream compiler needs besides tensor descriptors: scalar
//! parameters, window geometry, enum modes and fused activations. Tensor inputs are never stored
//! here; they are node edges.

use serde::Serialize;

use crate::error::{GraphError, GraphResult};
use crate::schema::OperatorKind;

use super::conv::ConvolutionAttributes;
use super::gather::GatherNdAttributes;
use super::generate::ScalarValue;
use super::movement::SliceAttributes;
use super::normalization::MeanVarianceNormalizationAttributes;
use super::pooling::PoolingAttributes;
use super::recurrent::GruAttributes;
use super::reduce::ReduceFunction;
use super::resample::ResampleAttributes;
use super::roi::{RoiAlignAttributes, RoiAlignGradAttributes};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleBias {
    pub scale: f32,
    pub bias: f32,
}

impl ScaleBias {
    pub fn new(scale: f32, bias: f32) -> Self {
        Self { scale, bias }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RoundingMode {
    #[default]
    HalvesToNearestEven,
    TowardZero,
    TowardInfinity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum IsInfinityMode {
    #[default]
    Either,
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum AxisDirection {
    #[default]
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum InterpolationMode {
    #[default]
    NearestNeighbor,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PaddingMode {
    #[default]
    Constant,
    Edge,
    Reflection,
    Symmetric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DepthSpaceOrder {
    #[default]
    DepthColumnRow,
    ColumnRowDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RecurrentDirection {
    #[default]
    Forward,
    Backward,
    Bidirectional,
}

impl RecurrentDirection {
    pub fn direction_count(self) -> u32 {
        match self {
            RecurrentDirection::Bidirectional => 2,
            RecurrentDirection::Forward | RecurrentDirection::Backward => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RandomGeneratorType {
    #[default]
    Philox4x32x10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuantizationType {
    Scale,
    ScaleZeroPoint,
}

impl QuantizationType {
    /// Number of parameter tensors the scheme consumes.
    pub fn parameter_count(self) -> usize {
        match self {
            QuantizationType::Scale => 1,
            QuantizationType::ScaleZeroPoint => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Size2D {
    pub width: u32,
    pub height: u32,
}

/// Activation applied by an activation operator or fused into a producer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Activation {
    Elu { alpha: f32 },
    Celu { alpha: f32 },
    HardMax,
    HardSigmoid { alpha: f32, beta: f32 },
    Identity,
    LeakyRelu { alpha: f32 },
    Linear { alpha: f32, beta: f32 },
    LogSoftMax,
    ParametricSoftPlus { alpha: f32, beta: f32 },
    Relu,
    ScaledElu { alpha: f32, gamma: f32 },
    ScaledTanH { alpha: f32, beta: f32 },
    Sigmoid,
    SoftMax,
    SoftPlus { steepness: f32 },
    SoftSign,
    TanH,
    ThresholdedRelu { alpha: f32 },
    Shrink { bias: f32, threshold: f32 },
    Gelu,
    Swish { sigmoid_input_scale: f32 },
    HardSwish { alpha: f32, beta: f32 },
}

impl Activation {
    pub fn elu() -> Self {
        Activation::Elu { alpha: 1.0 }
    }

    pub fn celu() -> Self {
        Activation::Celu { alpha: 1.0 }
    }

    pub fn hard_sigmoid() -> Self {
        Activation::HardSigmoid {
            alpha: 0.2,
            beta: 0.5,
        }
    }

    pub fn leaky_relu() -> Self {
        Activation::LeakyRelu { alpha: 0.01 }
    }

    pub fn scaled_elu() -> Self {
        Activation::ScaledElu {
            alpha: 1.673_263_2,
            gamma: 1.050_701,
        }
    }

    pub fn scaled_tanh() -> Self {
        Activation::ScaledTanH {
            alpha: 1.0,
            beta: 0.5,
        }
    }

    pub fn soft_plus() -> Self {
        Activation::SoftPlus { steepness: 1.0 }
    }

    pub fn thresholded_relu() -> Self {
        Activation::ThresholdedRelu { alpha: 1.0 }
    }

    pub fn shrink() -> Self {
        Activation::Shrink {
            bias: 0.0,
            threshold: 0.5,
        }
    }

    pub fn swish() -> Self {
        Activation::Swish {
            sigmoid_input_scale: 1.0,
        }
    }

    pub fn hard_swish() -> Self {
        Activation::HardSwish {
            alpha: 1.0 / 6.0,
            beta: 0.5,
        }
    }

    pub fn kind(&self) -> OperatorKind {
        use OperatorKind as K;
        match self {
            Activation::Elu { .. } => K::ActivationElu,
            Activation::Celu { .. } => K::ActivationCelu,
            Activation::HardMax => K::ActivationHardMax,
            Activation::HardSigmoid { .. } => K::ActivationHardSigmoid,
            Activation::Identity => K::ActivationIdentity,
            Activation::LeakyRelu { .. } => K::ActivationLeakyRelu,
            Activation::Linear { .. } => K::ActivationLinear,
            Activation::LogSoftMax => K::ActivationLogSoftMax,
            Activation::ParametricSoftPlus { .. } => K::ActivationParametricSoftPlus,
            Activation::Relu => K::ActivationRelu,
            Activation::ScaledElu { .. } => K::ActivationScaledElu,
            Activation::ScaledTanH { .. } => K::ActivationScaledTanH,
            Activation::Sigmoid => K::ActivationSigmoid,
            Activation::SoftMax => K::ActivationSoftMax,
            Activation::SoftPlus { .. } => K::ActivationSoftPlus,
            Activation::SoftSign => K::ActivationSoftSign,
            Activation::TanH => K::ActivationTanH,
            Activation::ThresholdedRelu { .. } => K::ActivationThresholdedRelu,
            Activation::Shrink { .. } => K::ActivationShrink,
            Activation::Gelu => K::ActivationGelu,
            Activation::Swish { .. } => K::ActivationSwish,
            Activation::HardSwish { .. } => K::ActivationHardSwish,
        }
    }

    /// Whole-tensor normalisations cannot be folded into a producer's epilogue.
    pub fn is_fusable(&self) -> bool {
        !matches!(
            self,
            Activation::HardMax | Activation::LogSoftMax | Activation::SoftMax
        )
    }
}

/// Activation folded into the operator that produces its input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FusedActivation(Activation);

impl FusedActivation {
    pub fn new(activation: Activation) -> GraphResult<Self> {
        if !activation.is_fusable() {
            return Err(GraphError::contract(
                "FusedActivation",
                format!("{} cannot be fused", activation.kind()),
            ));
        }
        Ok(Self(activation))
    }

    pub fn relu() -> Self {
        Self(Activation::Relu)
    }

    pub fn sigmoid() -> Self {
        Self(Activation::Sigmoid)
    }

    pub fn tanh() -> Self {
        Self(Activation::TanH)
    }

    pub fn activation(&self) -> Activation {
        self.0
    }
}

/// Per-kind attribute payload of an operator node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorAttributes {
    None,
    ScaleBias {
        scale_bias: Option<ScaleBias>,
    },
    Clip {
        min: f32,
        max: f32,
        scale_bias: Option<ScaleBias>,
    },
    ClipGrad {
        min: f32,
        max: f32,
    },
    Threshold {
        min: f32,
        scale_bias: Option<ScaleBias>,
    },
    ConstantPow {
        exponent: f32,
        scale_bias: Option<ScaleBias>,
    },
    Round {
        mode: RoundingMode,
    },
    IsInfinity {
        mode: IsInfinityMode,
    },
    Fused {
        activation: Option<FusedActivation>,
    },
    Dequantize {
        quantization_type: QuantizationType,
    },
    Activation(Activation),
    Axes {
        axes: Vec<u32>,
    },
    Convolution(ConvolutionAttributes),
    Gemm {
        transpose_a: bool,
        transpose_b: bool,
        alpha: f32,
        beta: f32,
        activation: Option<FusedActivation>,
    },
    Reduce {
        function: ReduceFunction,
        axes: Vec<u32>,
    },
    Pooling(PoolingAttributes),
    Slice(SliceAttributes),
    Axis {
        axis: u32,
    },
    Padding {
        mode: PaddingMode,
        value: f32,
        start: Vec<u32>,
        end: Vec<u32>,
    },
    ValueScale2D {
        scale: f32,
        bias: Vec<f32>,
    },
    UpSample2D {
        scale: Size2D,
        mode: InterpolationMode,
    },
    Gather {
        axis: u32,
        index_dimensions: u32,
    },
    GatherNd(GatherNdAttributes),
    ScatterNd {
        input_dimension_count: u32,
        indices_dimension_count: u32,
    },
    DepthSpace {
        block_size: u32,
        order: DepthSpaceOrder,
    },
    Tile {
        repeats: Vec<u32>,
    },
    TopK {
        axis: u32,
        k: u32,
        direction: AxisDirection,
    },
    BatchNormalization {
        spatial: bool,
        epsilon: f32,
        activation: Option<FusedActivation>,
    },
    BatchNormalizationTraining {
        epsilon: f32,
        activation: Option<FusedActivation>,
    },
    Epsilon {
        epsilon: f32,
    },
    MeanVarianceNormalization(MeanVarianceNormalizationAttributes),
    LocalResponseNormalization {
        cross_channel: bool,
        local_size: u32,
        alpha: f32,
        beta: f32,
        bias: f32,
    },
    Gru(GruAttributes),
    Resample(ResampleAttributes),
    FillValueConstant {
        value: ScalarValue,
    },
    FillValueSequence {
        start: ScalarValue,
        delta: ScalarValue,
    },
    Cumulative {
        axis: u32,
        direction: AxisDirection,
        exclusive: bool,
    },
    RandomGenerator {
        generator: RandomGeneratorType,
    },
    DiagonalMatrix {
        offset: i32,
        value: f32,
    },
    ConvolutionInteger {
        strides: Vec<u32>,
        dilations: Vec<u32>,
        start_padding: Vec<u32>,
        end_padding: Vec<u32>,
        group_count: u32,
    },
    RoiAlign(RoiAlignAttributes),
    RoiAlignGrad(RoiAlignGradAttributes),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_is_not_fusable() {
        let err = FusedActivation::new(Activation::SoftMax).expect_err("softmax must be rejected");
        assert_eq!(err.category(), crate::error::ErrorCategory::ContractViolation);
        let fused = FusedActivation::new(Activation::leaky_relu())
            .unwrap_or_else(|err| panic!("unexpected error: {err}"));
        assert_eq!(fused.activation().kind(), OperatorKind::ActivationLeakyRelu);
    }

    #[test]
    fn scale_zero_point_needs_two_parameters() {
        assert_eq!(QuantizationType::Scale.parameter_count(), 1);
        assert_eq!(QuantizationType::ScaleZeroPoint.parameter_count(), 2);
    }
}
