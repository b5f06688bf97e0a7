use std::fmt;

use serde::{Deserialize, Serialize};

use super::FeatureLevel;

macro_rules! operator_kinds {
    ($($variant:ident => $name:literal @ $level:ident),+ $(,)?) => {
        /// Every operator kind the downstream runtime can compile.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum OperatorKind {
            $($variant),+
        }

        impl OperatorKind {
            pub const ALL: &'static [OperatorKind] = &[$(OperatorKind::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(OperatorKind::$variant => $name),+
                }
            }

            /// First runtime feature level that exposes this kind.
            pub fn min_feature_level(self) -> FeatureLevel {
                match self {
                    $(OperatorKind::$variant => FeatureLevel::$level),+
                }
            }
        }
    };
}

operator_kinds! {
    ElementWiseIdentity => "ElementWiseIdentity" @ V1_0,
    ElementWiseAbs => "ElementWiseAbs" @ V1_0,
    ElementWiseACos => "ElementWiseACos" @ V1_0,
    ElementWiseAdd => "ElementWiseAdd" @ V1_0,
    ElementWiseASin => "ElementWiseASin" @ V1_0,
    ElementWiseATan => "ElementWiseATan" @ V1_0,
    ElementWiseCeil => "ElementWiseCeil" @ V1_0,
    ElementWiseClip => "ElementWiseClip" @ V1_0,
    ElementWiseCos => "ElementWiseCos" @ V1_0,
    ElementWiseDivide => "ElementWiseDivide" @ V1_0,
    ElementWiseExp => "ElementWiseExp" @ V1_0,
    ElementWiseFloor => "ElementWiseFloor" @ V1_0,
    ElementWiseLog => "ElementWiseLog" @ V1_0,
    ElementWiseLogicalAnd => "ElementWiseLogicalAnd" @ V1_0,
    ElementWiseLogicalEquals => "ElementWiseLogicalEquals" @ V1_0,
    ElementWiseLogicalGreaterThan => "ElementWiseLogicalGreaterThan" @ V1_0,
    ElementWiseLogicalLessThan => "ElementWiseLogicalLessThan" @ V1_0,
    ElementWiseLogicalNot => "ElementWiseLogicalNot" @ V1_0,
    ElementWiseLogicalOr => "ElementWiseLogicalOr" @ V1_0,
    ElementWiseLogicalXor => "ElementWiseLogicalXor" @ V1_0,
    ElementWiseMax => "ElementWiseMax" @ V1_0,
    ElementWiseMean => "ElementWiseMean" @ V1_0,
    ElementWiseMin => "ElementWiseMin" @ V1_0,
    ElementWiseMultiply => "ElementWiseMultiply" @ V1_0,
    ElementWisePow => "ElementWisePow" @ V1_0,
    ElementWiseConstantPow => "ElementWiseConstantPow" @ V1_0,
    ElementWiseReciprocal => "ElementWiseReciprocal" @ V1_0,
    ElementWiseSin => "ElementWiseSin" @ V1_0,
    ElementWiseSqrt => "ElementWiseSqrt" @ V1_0,
    ElementWiseSubtract => "ElementWiseSubtract" @ V1_0,
    ElementWiseTan => "ElementWiseTan" @ V1_0,
    ElementWiseThreshold => "ElementWiseThreshold" @ V1_0,
    ElementWiseQuantizeLinear => "ElementWiseQuantizeLinear" @ V1_0,
    ElementWiseDequantizeLinear => "ElementWiseDequantizeLinear" @ V1_0,
    ActivationElu => "ActivationELU" @ V1_0,
    ActivationHardMax => "ActivationHardMax" @ V1_0,
    ActivationHardSigmoid => "ActivationHardSigmoid" @ V1_0,
    ActivationIdentity => "ActivationIdentity" @ V1_0,
    ActivationLeakyRelu => "ActivationLeakyReLU" @ V1_0,
    ActivationLinear => "ActivationLinear" @ V1_0,
    ActivationLogSoftMax => "ActivationLogSoftMax" @ V1_0,
    ActivationParameterizedRelu => "ActivationParameterizedReLU" @ V1_0,
    ActivationParametricSoftPlus => "ActivationParametricSoftPlus" @ V1_0,
    ActivationRelu => "ActivationReLU" @ V1_0,
    ActivationScaledElu => "ActivationScaledELU" @ V1_0,
    ActivationScaledTanH => "ActivationScaledTanH" @ V1_0,
    ActivationSigmoid => "ActivationSigmoid" @ V1_0,
    ActivationSoftMax => "ActivationSoftMax" @ V1_0,
    ActivationSoftPlus => "ActivationSoftPlus" @ V1_0,
    ActivationSoftSign => "ActivationSoftSign" @ V1_0,
    ActivationTanH => "ActivationTanH" @ V1_0,
    ActivationThresholdedRelu => "ActivationThresholdedReLU" @ V1_0,
    Convolution => "Convolution" @ V1_0,
    Gemm => "GEMM" @ V1_0,
    Reduce => "Reduce" @ V1_0,
    AveragePooling => "AveragePooling" @ V1_0,
    LpPooling => "LPPooling" @ V1_0,
    MaxPooling => "MaxPooling" @ V1_0,
    RoiPooling => "ROIPooling" @ V1_0,
    Slice => "Slice" @ V1_0,
    Cast => "Cast" @ V1_0,
    Split => "Split" @ V1_0,
    Join => "Join" @ V1_0,
    Padding => "Padding" @ V1_0,
    ValueScale2D => "ValueScale2D" @ V1_0,
    UpSample2D => "UpSample2D" @ V1_0,
    Gather => "Gather" @ V1_0,
    SpaceToDepth => "SpaceToDepth" @ V1_0,
    DepthToSpace => "DepthToSpace" @ V1_0,
    Tile => "Tile" @ V1_0,
    TopK => "TopK" @ V1_0,
    BatchNormalization => "BatchNormalization" @ V1_0,
    MeanVarianceNormalization => "MeanVarianceNormalization" @ V1_0,
    LocalResponseNormalization => "LocalResponseNormalization" @ V1_0,
    LpNormalization => "LPNormalization" @ V1_0,
    Rnn => "RNN" @ V1_0,
    Lstm => "LSTM" @ V1_0,
    Gru => "GRU" @ V1_0,
    ElementWiseSign => "ElementWiseSign" @ V2_0,
    ElementWiseIsNaN => "ElementWiseIsNaN" @ V2_0,
    ElementWiseErf => "ElementWiseErf" @ V2_0,
    ElementWiseSinH => "ElementWiseSinH" @ V2_0,
    ElementWiseCosH => "ElementWiseCosH" @ V2_0,
    ElementWiseTanH => "ElementWiseTanH" @ V2_0,
    ElementWiseASinH => "ElementWiseASinH" @ V2_0,
    ElementWiseACosH => "ElementWiseACosH" @ V2_0,
    ElementWiseATanH => "ElementWiseATanH" @ V2_0,
    ElementWiseIf => "ElementWiseIf" @ V2_0,
    ElementWiseAdd1 => "ElementWiseAdd1" @ V2_0,
    ActivationShrink => "ActivationShrink" @ V2_0,
    MaxPooling1 => "MaxPooling1" @ V2_0,
    MaxUnpooling => "MaxUnpooling" @ V2_0,
    DiagonalMatrix => "DiagonalMatrix" @ V2_0,
    ScatterElements => "ScatterElements" @ V2_0,
    OneHot => "OneHot" @ V2_0,
    Resample => "Resample" @ V2_0,
    ElementWiseBitShiftLeft => "ElementWiseBitShiftLeft" @ V2_1,
    ElementWiseBitShiftRight => "ElementWiseBitShiftRight" @ V2_1,
    ElementWiseRound => "ElementWiseRound" @ V2_1,
    ElementWiseIsInfinity => "ElementWiseIsInfinity" @ V2_1,
    ElementWiseModulusTruncate => "ElementWiseModulusTruncate" @ V2_1,
    ElementWiseModulusFloor => "ElementWiseModulusFloor" @ V2_1,
    FillValueConstant => "FillValueConstant" @ V2_1,
    FillValueSequence => "FillValueSequence" @ V2_1,
    CumulativeSummation => "CumulativeSummation" @ V2_1,
    ReverseSubsequences => "ReverseSubsequences" @ V2_1,
    GatherElements => "GatherElements" @ V2_1,
    GatherNd => "GatherND" @ V2_1,
    ScatterNd => "ScatterND" @ V2_1,
    MaxPooling2 => "MaxPooling2" @ V2_1,
    Slice1 => "Slice1" @ V2_1,
    TopK1 => "TopK1" @ V2_1,
    DepthToSpace1 => "DepthToSpace1" @ V2_1,
    SpaceToDepth1 => "SpaceToDepth1" @ V2_1,
    MeanVarianceNormalization1 => "MeanVarianceNormalization1" @ V2_1,
    Resample1 => "Resample1" @ V2_1,
    MatrixMultiplyInteger => "MatrixMultiplyInteger" @ V2_1,
    QuantizedLinearMatrixMultiply => "QuantizedLinearMatrixMultiply" @ V2_1,
    ConvolutionInteger => "ConvolutionInteger" @ V2_1,
    QuantizedLinearConvolution => "QuantizedLinearConvolution" @ V2_1,
    ElementWiseBitAnd => "ElementWiseBitAnd" @ V3_0,
    ElementWiseBitOr => "ElementWiseBitOr" @ V3_0,
    ElementWiseBitXor => "ElementWiseBitXor" @ V3_0,
    ElementWiseBitNot => "ElementWiseBitNot" @ V3_0,
    ElementWiseBitCount => "ElementWiseBitCount" @ V3_0,
    ElementWiseLogicalGreaterThanOrEqual => "ElementWiseLogicalGreaterThanOrEqual" @ V3_0,
    ElementWiseLogicalLessThanOrEqual => "ElementWiseLogicalLessThanOrEqual" @ V3_0,
    ActivationCelu => "ActivationCeLU" @ V3_0,
    ActivationReluGrad => "ActivationReLUGrad" @ V3_0,
    AveragePoolingGrad => "AveragePoolingGrad" @ V3_0,
    MaxPoolingGrad => "MaxPoolingGrad" @ V3_0,
    RandomGenerator => "RandomGenerator" @ V3_0,
    NonZeroCoordinates => "NonZeroCoordinates" @ V3_0,
    ResampleGrad => "ResampleGrad" @ V3_0,
    SliceGrad => "SliceGrad" @ V3_0,
    AdamOptimizer => "AdamOptimizer" @ V3_0,
    ArgMin => "ArgMin" @ V3_0,
    ArgMax => "ArgMax" @ V3_0,
    RoiAlign => "ROIAlign" @ V3_0,
    GatherNd1 => "GatherND1" @ V3_0,
    ElementWiseATanYX => "ElementWiseATanYX" @ V3_1,
    ElementWiseClipGrad => "ElementWiseClipGrad" @ V3_1,
    ElementWiseDifferenceSquare => "ElementWiseDifferenceSquare" @ V3_1,
    LocalResponseNormalizationGrad => "LocalResponseNormalizationGrad" @ V3_1,
    CumulativeProduct => "CumulativeProduct" @ V3_1,
    BatchNormalizationGrad => "BatchNormalizationGrad" @ V3_1,
    ElementWiseQuantizedLinearAdd => "ElementWiseQuantizedLinearAdd" @ V4_0,
    DynamicQuantizeLinear => "DynamicQuantizeLinear" @ V4_0,
    RoiAlign1 => "ROIAlign1" @ V4_0,
    RoiAlignGrad => "ROIAlignGrad" @ V4_1,
    BatchNormalizationTraining => "BatchNormalizationTraining" @ V4_1,
    BatchNormalizationTrainingGrad => "BatchNormalizationTrainingGrad" @ V4_1,
    ElementWiseClip1 => "ElementWiseClip1" @ V5_0,
    ElementWiseClipGrad1 => "ElementWiseClipGrad1" @ V5_0,
    Padding1 => "Padding1" @ V5_0,
    ElementWiseNegate => "ElementWiseNegate" @ V5_0,
    ActivationGelu => "ActivationGeLU" @ V5_1,
    ActivationSoftMax1 => "ActivationSoftMax1" @ V5_1,
    ActivationLogSoftMax1 => "ActivationLogSoftMax1" @ V5_1,
    ActivationHardMax1 => "ActivationHardMax1" @ V5_1,
    Resample2 => "Resample2" @ V5_1,
    ResampleGrad1 => "ResampleGrad1" @ V5_1,
    DiagonalMatrix1 => "DiagonalMatrix1" @ V5_1,
    MultiheadAttention => "MultiheadAttention" @ V6_1,
    LpPooling1 => "LPPooling1" @ V6_2,
    AveragePooling1 => "AveragePooling1" @ V6_2,
    ActivationSwish => "ActivationSwish" @ V6_2,
    ActivationHardSwish => "ActivationHardSwish" @ V6_2,
    QuantizedLinearAveragePooling => "QuantizedLinearAveragePooling" @ V6_2,
    MatrixMultiplyIntegerToFloat => "MatrixMultiplyIntegerToFloat" @ V6_2,
    MeanVarianceNormalization2 => "MeanVarianceNormalization2" @ V6_3,
    Dequantize => "Dequantize" @ V6_3,
    Resample3 => "Resample3" @ V6_4,
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
