//! Maximal (capability-independent) contracts for every [`OperatorKind`].
//!
//! Tensor inputs are listed in the order the builder wires node inputs, so the registry entry can
//! be checked positionally against an emitted node.

use std::ops::RangeInclusive;

use crate::tensor::DataTypeMask as M;

use super::field::{FieldFlags, FieldKind, OperatorTypeInfo, ANY_RANK};
use super::OperatorKind;

const ELEMENTWISE: RangeInclusive<u32> = 1..=8;
const SPATIAL: RangeInclusive<u32> = 4..=5;
const NCHW: RangeInclusive<u32> = 4..=4;

const REQUIRED: FieldFlags = FieldFlags::NONE;
const OPTIONAL: FieldFlags = FieldFlags::OPTIONAL;
const IN_PLACE: FieldFlags = FieldFlags::IN_PLACE;

const COMPARE_OUT: M = M::UINT8_32;
const MEAN_TYPES: M = M::from_bits(M::FLOAT16_32.bits() | M::INT32.bits() | M::UINT32.bits());
const POW_TYPES: M = M::from_bits(
    M::FLOAT16_32.bits()
        | M::INT32.bits()
        | M::INT16.bits()
        | M::INT8.bits()
        | M::UINT32.bits()
        | M::UINT16.bits()
        | M::UINT8.bits(),
);
const POOL_TYPES: M = M::from_bits(M::FLOAT16_32.bits() | M::QUANTIZED_8.bits());
const DATA: M = M::ALL_BUT_NIBBLE;
const F: M = M::FLOAT16_32;

fn unary(kind: OperatorKind, input: M, output: M) -> OperatorTypeInfo {
    OperatorTypeInfo::new(kind)
        .input("InputTensor", input, ELEMENTWISE, REQUIRED)
        .output("OutputTensor", output, ELEMENTWISE, REQUIRED)
}

fn inplace_unary(kind: OperatorKind, types: M) -> OperatorTypeInfo {
    OperatorTypeInfo::new(kind)
        .input("InputTensor", types, ELEMENTWISE, IN_PLACE)
        .output("OutputTensor", types, ELEMENTWISE, IN_PLACE)
}

fn inplace_unary_with_scale_bias(kind: OperatorKind, types: M) -> OperatorTypeInfo {
    inplace_unary(kind, types).scale_bias()
}

fn binary(kind: OperatorKind, a: M, b: M, output: M) -> OperatorTypeInfo {
    OperatorTypeInfo::new(kind)
        .input("ATensor", a, ELEMENTWISE, REQUIRED)
        .input("BTensor", b, ELEMENTWISE, REQUIRED)
        .output("OutputTensor", output, ELEMENTWISE, REQUIRED)
}

fn inplace_binary(kind: OperatorKind, types: M) -> OperatorTypeInfo {
    OperatorTypeInfo::new(kind)
        .input("ATensor", types, ELEMENTWISE, IN_PLACE)
        .input("BTensor", types, ELEMENTWISE, IN_PLACE)
        .output("OutputTensor", types, ELEMENTWISE, IN_PLACE)
}

fn activation(kind: OperatorKind) -> OperatorTypeInfo {
    inplace_unary(kind, F)
}

fn with_floats(mut info: OperatorTypeInfo, names: &[&'static str]) -> OperatorTypeInfo {
    for &name in names {
        info = info.attribute(name, FieldKind::Float);
    }
    info
}

fn pooling(kind: OperatorKind, types: M) -> OperatorTypeInfo {
    OperatorTypeInfo::new(kind)
        .input("InputTensor", types, SPATIAL, REQUIRED)
        .output("OutputTensor", types, SPATIAL, REQUIRED)
        .attribute("Strides", FieldKind::UIntArray)
        .attribute("WindowSize", FieldKind::UIntArray)
        .attribute("StartPadding", FieldKind::UIntArray)
        .attribute("EndPadding", FieldKind::UIntArray)
}

fn quantized_pair(info: OperatorTypeInfo, prefix: QuantizedOperand) -> OperatorTypeInfo {
    let (tensor, scale, zero_point) = prefix.names();
    info.input(tensor, M::QUANTIZED_8, ANY_RANK, REQUIRED)
        .input(scale, F, ANY_RANK, REQUIRED)
        .input(zero_point, M::QUANTIZED_8, ANY_RANK, OPTIONAL)
}

#[derive(Clone, Copy)]
enum QuantizedOperand {
    Input,
    Filter,
    A,
    B,
    Output,
}

impl QuantizedOperand {
    fn names(self) -> (&'static str, &'static str, &'static str) {
        match self {
            QuantizedOperand::Input => ("InputTensor", "InputScaleTensor", "InputZeroPointTensor"),
            QuantizedOperand::Filter => {
                ("FilterTensor", "FilterScaleTensor", "FilterZeroPointTensor")
            }
            QuantizedOperand::A => ("ATensor", "AScaleTensor", "AZeroPointTensor"),
            QuantizedOperand::B => ("BTensor", "BScaleTensor", "BZeroPointTensor"),
            QuantizedOperand::Output => {
                ("OutputTensor", "OutputScaleTensor", "OutputZeroPointTensor")
            }
        }
    }
}

fn output_quantization(info: OperatorTypeInfo, dims: RangeInclusive<u32>) -> OperatorTypeInfo {
    info.input("OutputScaleTensor", F, ANY_RANK, REQUIRED)
        .input("OutputZeroPointTensor", M::QUANTIZED_8, ANY_RANK, OPTIONAL)
        .output("OutputTensor", M::QUANTIZED_8, dims, REQUIRED)
}

fn batch_normalization_grad(kind: OperatorKind) -> OperatorTypeInfo {
    OperatorTypeInfo::new(kind)
        .input("InputTensor", F, ELEMENTWISE, REQUIRED)
        .input("InputGradientTensor", F, ELEMENTWISE, REQUIRED)
        .input("MeanTensor", F, ELEMENTWISE, REQUIRED)
        .input("VarianceTensor", F, ELEMENTWISE, REQUIRED)
        .input("ScaleTensor", F, ELEMENTWISE, REQUIRED)
        .output("OutputGradientTensor", F, ELEMENTWISE, REQUIRED)
        .output("OutputScaleGradientTensor", F, ELEMENTWISE, REQUIRED)
        .output("OutputBiasGradientTensor", F, ELEMENTWISE, REQUIRED)
        .attribute("Epsilon", FieldKind::Float)
}

fn resample(kind: OperatorKind) -> OperatorTypeInfo {
    OperatorTypeInfo::new(kind)
        .input("InputTensor", POOL_TYPES, ELEMENTWISE, REQUIRED)
        .output("OutputTensor", POOL_TYPES, ELEMENTWISE, REQUIRED)
        .attribute("InterpolationMode", FieldKind::Enum("InterpolationMode"))
        .attribute("Scales", FieldKind::FloatArray)
        .attribute("InputPixelOffsets", FieldKind::FloatArray)
        .attribute("OutputPixelOffsets", FieldKind::FloatArray)
}

fn recurrent_inputs(kind: OperatorKind) -> OperatorTypeInfo {
    OperatorTypeInfo::new(kind)
        .input("InputTensor", F, NCHW, REQUIRED)
        .input("WeightTensor", F, NCHW, REQUIRED)
        .input("RecurrenceTensor", F, NCHW, REQUIRED)
        .input("BiasTensor", F, NCHW, OPTIONAL)
        .input("HiddenInitTensor", F, NCHW, OPTIONAL)
}

/// Describes `kind` with its widest data-type masks; the registry narrows them per capability.
pub(crate) fn describe(kind: OperatorKind) -> OperatorTypeInfo {
    use OperatorKind as K;

    match kind {
        K::ElementWiseIdentity => inplace_unary_with_scale_bias(kind, DATA),
        K::ElementWiseAbs => inplace_unary_with_scale_bias(kind, M::SIGNED_NUMERIC),
        K::ElementWiseACos
        | K::ElementWiseASin
        | K::ElementWiseATan
        | K::ElementWiseCeil
        | K::ElementWiseCos
        | K::ElementWiseExp
        | K::ElementWiseFloor
        | K::ElementWiseLog
        | K::ElementWiseReciprocal
        | K::ElementWiseSin
        | K::ElementWiseSqrt
        | K::ElementWiseTan
        | K::ElementWiseErf
        | K::ElementWiseSinH
        | K::ElementWiseCosH
        | K::ElementWiseTanH
        | K::ElementWiseASinH
        | K::ElementWiseACosH
        | K::ElementWiseATanH => inplace_unary_with_scale_bias(kind, F),
        K::ElementWiseClip | K::ElementWiseClip1 => {
            with_floats(inplace_unary_with_scale_bias(kind, M::NUMERIC), &["Min", "Max"])
        }
        K::ElementWiseThreshold => with_floats(inplace_unary_with_scale_bias(kind, F), &["Min"]),
        K::ElementWiseConstantPow => {
            with_floats(inplace_unary_with_scale_bias(kind, F), &["Exponent"])
        }
        K::ElementWiseSign | K::ElementWiseNegate => inplace_unary(kind, M::SIGNED_NUMERIC),
        K::ElementWiseRound => inplace_unary(kind, F)
            .attribute("RoundingMode", FieldKind::Enum("RoundingMode")),
        K::ElementWiseIsNaN => unary(kind, F, M::UINT8),
        K::ElementWiseIsInfinity => unary(kind, F, M::UINT8)
            .attribute("InfinityMode", FieldKind::Enum("IsInfinityMode")),
        K::ElementWiseBitNot => inplace_unary(kind, M::ALL_INTEGER),
        K::ElementWiseBitCount => unary(kind, M::ALL_INTEGER, M::UINT8),
        K::ElementWiseLogicalNot => inplace_unary(kind, M::UINT8_32),

        K::ElementWiseAdd
        | K::ElementWiseSubtract
        | K::ElementWiseMultiply
        | K::ElementWiseDivide
        | K::ElementWiseMax
        | K::ElementWiseMin
        | K::ElementWiseModulusTruncate
        | K::ElementWiseModulusFloor
        | K::ElementWiseDifferenceSquare => inplace_binary(kind, M::NUMERIC),
        K::ElementWiseAdd1 => inplace_binary(kind, F).fused_activation(),
        K::ElementWiseMean => inplace_binary(kind, MEAN_TYPES),
        K::ElementWiseATanYX => inplace_binary(kind, F),
        K::ElementWisePow => OperatorTypeInfo::new(kind)
            .input("InputTensor", POW_TYPES, ELEMENTWISE, IN_PLACE)
            .input("ExponentTensor", POW_TYPES, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", POW_TYPES, ELEMENTWISE, IN_PLACE)
            .scale_bias(),
        K::ElementWiseLogicalAnd | K::ElementWiseLogicalOr | K::ElementWiseLogicalXor => {
            inplace_binary(kind, M::UINT8_32)
        }
        K::ElementWiseLogicalEquals
        | K::ElementWiseLogicalGreaterThan
        | K::ElementWiseLogicalLessThan
        | K::ElementWiseLogicalGreaterThanOrEqual
        | K::ElementWiseLogicalLessThanOrEqual => binary(kind, M::NUMERIC, M::NUMERIC, COMPARE_OUT),
        K::ElementWiseBitAnd
        | K::ElementWiseBitOr
        | K::ElementWiseBitXor
        | K::ElementWiseBitShiftLeft
        | K::ElementWiseBitShiftRight => inplace_binary(kind, M::ALL_INTEGER),
        K::ElementWiseIf => OperatorTypeInfo::new(kind)
            .input("ConditionTensor", M::UINT8, ELEMENTWISE, REQUIRED)
            .input("ATensor", DATA, ELEMENTWISE, REQUIRED)
            .input("BTensor", DATA, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", DATA, ELEMENTWISE, REQUIRED),
        K::ElementWiseClipGrad | K::ElementWiseClipGrad1 => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, ELEMENTWISE, REQUIRED)
            .input("InputGradientTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputGradientTensor", F, ELEMENTWISE, REQUIRED)
            .attribute("Min", FieldKind::Float)
            .attribute("Max", FieldKind::Float),
        K::ElementWiseQuantizeLinear => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, ELEMENTWISE, REQUIRED)
            .input("ScaleTensor", F, ELEMENTWISE, REQUIRED)
            .input("ZeroPointTensor", M::INT8_32, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", M::INT8_32, ELEMENTWISE, REQUIRED),
        K::ElementWiseDequantizeLinear => OperatorTypeInfo::new(kind)
            .input("InputTensor", M::INT8_32, ELEMENTWISE, REQUIRED)
            .input("ScaleTensor", F, ELEMENTWISE, REQUIRED)
            .input("ZeroPointTensor", M::INT8_32, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", F, ELEMENTWISE, REQUIRED),
        K::Dequantize => OperatorTypeInfo::new(kind)
            .input("InputTensor", M::INT8_32 | M::UINT4 | M::INT4, ELEMENTWISE, REQUIRED)
            .input_array("QuantizationTensors", F | M::INT8_32 | M::UINT4 | M::INT4, ELEMENTWISE)
            .output("OutputTensor", F, ELEMENTWISE, REQUIRED)
            .attribute("QuantizationType", FieldKind::Enum("QuantizationType")),
        K::ElementWiseQuantizedLinearAdd => {
            let info = quantized_pair(OperatorTypeInfo::new(kind), QuantizedOperand::A);
            let info = quantized_pair(info, QuantizedOperand::B);
            output_quantization(info, ELEMENTWISE)
        }
        K::DynamicQuantizeLinear => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", M::QUANTIZED_8, ELEMENTWISE, REQUIRED)
            .output("OutputScaleTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputZeroPointTensor", M::QUANTIZED_8, ELEMENTWISE, REQUIRED),

        K::ActivationElu
        | K::ActivationCelu
        | K::ActivationLeakyRelu
        | K::ActivationThresholdedRelu => with_floats(activation(kind), &["Alpha"]),
        K::ActivationHardSigmoid
        | K::ActivationLinear
        | K::ActivationParametricSoftPlus
        | K::ActivationScaledTanH
        | K::ActivationHardSwish => with_floats(activation(kind), &["Alpha", "Beta"]),
        K::ActivationScaledElu => with_floats(activation(kind), &["Alpha", "Gamma"]),
        K::ActivationSoftPlus => with_floats(activation(kind), &["Steepness"]),
        K::ActivationShrink => with_floats(activation(kind), &["Bias", "Threshold"]),
        K::ActivationSwish => with_floats(activation(kind), &["SigmoidInputScale"]),
        K::ActivationHardMax
        | K::ActivationIdentity
        | K::ActivationLogSoftMax
        | K::ActivationRelu
        | K::ActivationSigmoid
        | K::ActivationSoftMax
        | K::ActivationSoftSign
        | K::ActivationTanH
        | K::ActivationGelu => activation(kind),
        K::ActivationSoftMax1 | K::ActivationLogSoftMax1 | K::ActivationHardMax1 => {
            activation(kind).attribute("Axes", FieldKind::UIntArray)
        }
        K::ActivationParameterizedRelu => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, ELEMENTWISE, IN_PLACE)
            .input("SlopeTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", F, ELEMENTWISE, IN_PLACE),
        K::ActivationReluGrad => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, ELEMENTWISE, REQUIRED)
            .input("InputGradientTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputGradientTensor", F, ELEMENTWISE, REQUIRED),

        K::Convolution => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, SPATIAL, REQUIRED)
            .input("FilterTensor", F, SPATIAL, REQUIRED)
            .input("BiasTensor", F, SPATIAL, OPTIONAL)
            .output("OutputTensor", F, SPATIAL, REQUIRED)
            .attribute("Mode", FieldKind::Enum("ConvolutionMode"))
            .attribute("Direction", FieldKind::Enum("ConvolutionDirection"))
            .attribute("Strides", FieldKind::UIntArray)
            .attribute("Dilations", FieldKind::UIntArray)
            .attribute("StartPadding", FieldKind::UIntArray)
            .attribute("EndPadding", FieldKind::UIntArray)
            .attribute("OutputPadding", FieldKind::UIntArray)
            .attribute("GroupCount", FieldKind::UInt)
            .fused_activation(),
        K::ConvolutionInteger => OperatorTypeInfo::new(kind)
            .input("InputTensor", M::QUANTIZED_8, SPATIAL, REQUIRED)
            .input("InputZeroPointTensor", M::QUANTIZED_8, ANY_RANK, OPTIONAL)
            .input("FilterTensor", M::QUANTIZED_8, SPATIAL, REQUIRED)
            .input("FilterZeroPointTensor", M::QUANTIZED_8, ANY_RANK, OPTIONAL)
            .output("OutputTensor", M::INT32, SPATIAL, REQUIRED)
            .attribute("Strides", FieldKind::UIntArray)
            .attribute("Dilations", FieldKind::UIntArray)
            .attribute("StartPadding", FieldKind::UIntArray)
            .attribute("EndPadding", FieldKind::UIntArray)
            .attribute("GroupCount", FieldKind::UInt),
        K::QuantizedLinearConvolution => {
            let info = quantized_pair(OperatorTypeInfo::new(kind), QuantizedOperand::Input);
            let info = quantized_pair(info, QuantizedOperand::Filter)
                .input("BiasTensor", M::INT32, ANY_RANK, OPTIONAL);
            output_quantization(info, SPATIAL)
                .attribute("Strides", FieldKind::UIntArray)
                .attribute("Dilations", FieldKind::UIntArray)
                .attribute("StartPadding", FieldKind::UIntArray)
                .attribute("EndPadding", FieldKind::UIntArray)
                .attribute("GroupCount", FieldKind::UInt)
        }
        K::Gemm => OperatorTypeInfo::new(kind)
            .input("ATensor", F, NCHW, REQUIRED)
            .input("BTensor", F, NCHW, REQUIRED)
            .input("CTensor", F, NCHW, OPTIONAL)
            .output("OutputTensor", F, NCHW, REQUIRED)
            .attribute("TransA", FieldKind::Enum("MatrixTransform"))
            .attribute("TransB", FieldKind::Enum("MatrixTransform"))
            .attribute("Alpha", FieldKind::Float)
            .attribute("Beta", FieldKind::Float)
            .fused_activation(),
        K::MatrixMultiplyInteger => OperatorTypeInfo::new(kind)
            .input("ATensor", M::QUANTIZED_8, NCHW, REQUIRED)
            .input("AZeroPointTensor", M::QUANTIZED_8, ANY_RANK, OPTIONAL)
            .input("BTensor", M::QUANTIZED_8, NCHW, REQUIRED)
            .input("BZeroPointTensor", M::QUANTIZED_8, ANY_RANK, OPTIONAL)
            .output("OutputTensor", M::INT32, NCHW, REQUIRED),
        K::QuantizedLinearMatrixMultiply => {
            let info = quantized_pair(OperatorTypeInfo::new(kind), QuantizedOperand::A);
            let info = quantized_pair(info, QuantizedOperand::B);
            output_quantization(info, NCHW)
        }
        K::MatrixMultiplyIntegerToFloat => {
            let info = quantized_pair(OperatorTypeInfo::new(kind), QuantizedOperand::A);
            quantized_pair(info, QuantizedOperand::B)
                .input("BiasTensor", F, ANY_RANK, OPTIONAL)
                .output("OutputTensor", F, NCHW, REQUIRED)
        }
        K::MultiheadAttention => {
            let mut info = OperatorTypeInfo::new(kind).input("QueryTensor", F, 3..=5, OPTIONAL);
            for name in [
                "KeyTensor",
                "ValueTensor",
                "StackedQueryKeyTensor",
                "StackedKeyValueTensor",
                "StackedQueryKeyValueTensor",
                "BiasTensor",
                "MaskTensor",
                "RelativePositionBiasTensor",
                "PastKeyTensor",
                "PastValueTensor",
            ] {
                info = info.input(name, F | M::INT32, 1..=5, OPTIONAL);
            }
            info.output("OutputTensor", F, 3..=3, REQUIRED)
                .output("OutputPresentKeyTensor", F, 4..=4, OPTIONAL)
                .output("OutputPresentValueTensor", F, 4..=4, OPTIONAL)
                .attribute("Scale", FieldKind::Float)
                .attribute("MaskFilterValue", FieldKind::Float)
                .attribute("HeadCount", FieldKind::UInt)
                .attribute("MaskType", FieldKind::Enum("MultiheadAttentionMaskType"))
        }

        K::Reduce => OperatorTypeInfo::new(kind)
            .input("InputTensor", M::NUMERIC, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", M::NUMERIC, ELEMENTWISE, REQUIRED)
            .attribute("Function", FieldKind::Enum("ReduceFunction"))
            .attribute("Axes", FieldKind::UIntArray),
        K::ArgMin | K::ArgMax => OperatorTypeInfo::new(kind)
            .input("InputTensor", M::NUMERIC, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", M::INDEX, ELEMENTWISE, REQUIRED)
            .attribute("Axes", FieldKind::UIntArray)
            .attribute("AxisDirection", FieldKind::Enum("AxisDirection")),
        K::AveragePooling => pooling(kind, F).attribute("IncludePadding", FieldKind::Bool),
        K::AveragePooling1 => pooling(kind, F)
            .attribute("Dilations", FieldKind::UIntArray)
            .attribute("IncludePadding", FieldKind::Bool),
        K::LpPooling => pooling(kind, F).attribute("P", FieldKind::UInt),
        K::LpPooling1 => pooling(kind, F)
            .attribute("Dilations", FieldKind::UIntArray)
            .attribute("P", FieldKind::UInt),
        K::MaxPooling => pooling(kind, POOL_TYPES),
        K::MaxPooling1 => pooling(kind, POOL_TYPES).output(
            "OutputIndicesTensor",
            M::UINT32 | M::UINT64,
            SPATIAL,
            OPTIONAL,
        ),
        K::MaxPooling2 => pooling(kind, POOL_TYPES)
            .output("OutputIndicesTensor", M::UINT32 | M::UINT64, SPATIAL, OPTIONAL)
            .attribute("Dilations", FieldKind::UIntArray),
        K::QuantizedLinearAveragePooling => {
            let info = quantized_pair(OperatorTypeInfo::new(kind), QuantizedOperand::Input);
            output_quantization(info, SPATIAL)
                .attribute("Strides", FieldKind::UIntArray)
                .attribute("WindowSize", FieldKind::UIntArray)
                .attribute("Dilations", FieldKind::UIntArray)
                .attribute("IncludePadding", FieldKind::Bool)
        }
        K::AveragePoolingGrad => OperatorTypeInfo::new(kind)
            .input("InputGradientTensor", F, SPATIAL, REQUIRED)
            .output("OutputGradientTensor", F, SPATIAL, REQUIRED)
            .attribute("WindowSize", FieldKind::UIntArray),
        K::MaxPoolingGrad => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, SPATIAL, REQUIRED)
            .input("InputGradientTensor", F, SPATIAL, REQUIRED)
            .output("OutputGradientTensor", F, SPATIAL, REQUIRED)
            .attribute("WindowSize", FieldKind::UIntArray),
        K::MaxUnpooling => OperatorTypeInfo::new(kind)
            .input("InputTensor", DATA, NCHW, REQUIRED)
            .input("IndicesTensor", M::UINT32 | M::UINT64, NCHW, REQUIRED)
            .output("OutputTensor", DATA, NCHW, REQUIRED),
        K::RoiPooling => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, NCHW, REQUIRED)
            .input("ROITensor", F, NCHW, REQUIRED)
            .output("OutputTensor", F, NCHW, REQUIRED)
            .attribute("SpatialScale", FieldKind::Float),
        K::RoiAlign | K::RoiAlign1 => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, NCHW, REQUIRED)
            .input("ROITensor", F, 2..=4, REQUIRED)
            .input("BatchIndicesTensor", M::INDEX, 1..=4, REQUIRED)
            .output("OutputTensor", F, NCHW, REQUIRED)
            .attribute("ReductionFunction", FieldKind::Enum("ReduceFunction"))
            .attribute("InterpolationMode", FieldKind::Enum("InterpolationMode"))
            .attribute("SpatialScaleX", FieldKind::Float)
            .attribute("SpatialScaleY", FieldKind::Float),
        K::RoiAlignGrad => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, NCHW, OPTIONAL)
            .input("InputGradientTensor", F, NCHW, REQUIRED)
            .input("ROITensor", F, 2..=4, REQUIRED)
            .input("BatchIndicesTensor", M::INDEX, 1..=4, REQUIRED)
            .output("OutputGradientTensor", F, NCHW, OPTIONAL)
            .output("OutputROIGradientTensor", F, 2..=4, OPTIONAL),

        K::Slice | K::Slice1 => unary(kind, DATA, DATA)
            .attribute("InputWindowOffsets", FieldKind::UIntArray)
            .attribute("InputWindowSizes", FieldKind::UIntArray)
            .attribute("InputWindowStrides", FieldKind::IntArray),
        K::SliceGrad => OperatorTypeInfo::new(kind)
            .input("InputGradientTensor", DATA, ELEMENTWISE, REQUIRED)
            .output("OutputGradientTensor", DATA, ELEMENTWISE, REQUIRED)
            .attribute("InputWindowOffsets", FieldKind::UIntArray)
            .attribute("InputWindowSizes", FieldKind::UIntArray)
            .attribute("InputWindowStrides", FieldKind::IntArray),
        K::Cast => unary(kind, DATA, DATA),
        K::Split => OperatorTypeInfo::new(kind)
            .input("InputTensor", DATA, ELEMENTWISE, REQUIRED)
            .output_array("OutputTensors", DATA, ELEMENTWISE)
            .attribute("Axis", FieldKind::UInt),
        K::Join => OperatorTypeInfo::new(kind)
            .input_array("InputTensors", DATA, ELEMENTWISE)
            .output("OutputTensor", DATA, ELEMENTWISE, REQUIRED)
            .attribute("Axis", FieldKind::UInt),
        K::Padding | K::Padding1 => unary(kind, DATA, DATA)
            .attribute("PaddingMode", FieldKind::Enum("PaddingMode"))
            .attribute("PaddingValue", FieldKind::Float)
            .attribute("StartPadding", FieldKind::UIntArray)
            .attribute("EndPadding", FieldKind::UIntArray),
        K::ValueScale2D => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, NCHW, REQUIRED)
            .output("OutputTensor", F, NCHW, REQUIRED)
            .attribute("Scale", FieldKind::Float)
            .attribute("Bias", FieldKind::FloatArray),
        K::UpSample2D => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, SPATIAL, REQUIRED)
            .output("OutputTensor", F, SPATIAL, REQUIRED)
            .attribute("ScaleSize", FieldKind::UIntArray)
            .attribute("InterpolationMode", FieldKind::Enum("InterpolationMode")),
        K::Gather | K::GatherElements | K::GatherNd | K::GatherNd1 => OperatorTypeInfo::new(kind)
            .input("InputTensor", DATA, ELEMENTWISE, REQUIRED)
            .input("IndicesTensor", M::INDEX, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", DATA, ELEMENTWISE, REQUIRED),
        K::ScatterElements | K::ScatterNd => OperatorTypeInfo::new(kind)
            .input("InputTensor", DATA, ELEMENTWISE, REQUIRED)
            .input("IndicesTensor", M::INDEX, ELEMENTWISE, REQUIRED)
            .input("UpdatesTensor", DATA, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", DATA, ELEMENTWISE, REQUIRED),
        K::SpaceToDepth | K::SpaceToDepth1 | K::DepthToSpace | K::DepthToSpace1 => {
            OperatorTypeInfo::new(kind)
                .input("InputTensor", DATA, NCHW, REQUIRED)
                .output("OutputTensor", DATA, NCHW, REQUIRED)
                .attribute("BlockSize", FieldKind::UInt)
                .optional_attribute("Order", FieldKind::Enum("DepthSpaceOrder"))
        }
        K::Tile => unary(kind, DATA, DATA).attribute("Repeats", FieldKind::UIntArray),
        K::TopK | K::TopK1 => OperatorTypeInfo::new(kind)
            .input("InputTensor", M::NUMERIC, ELEMENTWISE, REQUIRED)
            .output("OutputValueTensor", M::NUMERIC, ELEMENTWISE, REQUIRED)
            .output("OutputIndexTensor", M::INDEX, ELEMENTWISE, REQUIRED)
            .attribute("Axis", FieldKind::UInt)
            .attribute("K", FieldKind::UInt)
            .optional_attribute("AxisDirection", FieldKind::Enum("AxisDirection")),
        K::OneHot => OperatorTypeInfo::new(kind)
            .input("IndicesTensor", M::INDEX, ELEMENTWISE, REQUIRED)
            .input("ValuesTensor", DATA, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", DATA, ELEMENTWISE, REQUIRED)
            .attribute("Axis", FieldKind::UInt),
        K::Resample | K::Resample1 => resample(kind),
        K::Resample2 => resample(kind)
            .attribute("RoundingDirection", FieldKind::Enum("AxisDirection")),
        K::Resample3 => resample(kind)
            .attribute("RoundingDirection", FieldKind::Enum("AxisDirection"))
            .attribute("Antialiased", FieldKind::Bool),
        K::ResampleGrad | K::ResampleGrad1 => OperatorTypeInfo::new(kind)
            .input("InputGradientTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputGradientTensor", F, ELEMENTWISE, REQUIRED)
            .attribute("InterpolationMode", FieldKind::Enum("InterpolationMode"))
            .attribute("Scales", FieldKind::FloatArray)
            .attribute("InputPixelOffsets", FieldKind::FloatArray)
            .attribute("OutputPixelOffsets", FieldKind::FloatArray),
        K::FillValueConstant => OperatorTypeInfo::new(kind)
            .output("OutputTensor", DATA, ELEMENTWISE, REQUIRED)
            .attribute("Value", FieldKind::Float),
        K::FillValueSequence => OperatorTypeInfo::new(kind)
            .output("OutputTensor", DATA, ELEMENTWISE, REQUIRED)
            .attribute("ValueStart", FieldKind::Float)
            .attribute("ValueDelta", FieldKind::Float),
        K::CumulativeSummation | K::CumulativeProduct => unary(kind, M::NUMERIC, M::NUMERIC)
            .attribute("Axis", FieldKind::UInt)
            .attribute("AxisDirection", FieldKind::Enum("AxisDirection"))
            .attribute("HasExclusiveSum", FieldKind::Bool),
        K::ReverseSubsequences => OperatorTypeInfo::new(kind)
            .input("InputTensor", DATA, ELEMENTWISE, REQUIRED)
            .input("SequenceLengthsTensor", M::INDEX, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", DATA, ELEMENTWISE, REQUIRED)
            .attribute("Axis", FieldKind::UInt),
        K::DiagonalMatrix | K::DiagonalMatrix1 => OperatorTypeInfo::new(kind)
            .output("OutputTensor", DATA, 2..=4, REQUIRED)
            .attribute("Offset", FieldKind::Int)
            .attribute("Value", FieldKind::Float),
        K::RandomGenerator => OperatorTypeInfo::new(kind)
            .input("InputStateTensor", M::UINT32, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", M::UINT32, ELEMENTWISE, REQUIRED)
            .output("OutputStateTensor", M::UINT32, ELEMENTWISE, OPTIONAL)
            .attribute("Type", FieldKind::Enum("RandomGeneratorType")),
        K::NonZeroCoordinates => OperatorTypeInfo::new(kind)
            .input("InputTensor", DATA, ELEMENTWISE, REQUIRED)
            .output("OutputCountTensor", M::UINT32, ELEMENTWISE, REQUIRED)
            .output("OutputCoordinatesTensor", M::UINT32, ELEMENTWISE, REQUIRED),
        K::AdamOptimizer => OperatorTypeInfo::new(kind)
            .input("InputParametersTensor", F, ELEMENTWISE, REQUIRED)
            .input("InputFirstMomentTensor", F, ELEMENTWISE, REQUIRED)
            .input("InputSecondMomentTensor", F, ELEMENTWISE, REQUIRED)
            .input("GradientTensor", F, ELEMENTWISE, REQUIRED)
            .input("TrainingStepTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputParametersTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputFirstMomentTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputSecondMomentTensor", F, ELEMENTWISE, REQUIRED)
            .attribute("LearningRate", FieldKind::Float)
            .attribute("Beta1", FieldKind::Float)
            .attribute("Beta2", FieldKind::Float)
            .attribute("Epsilon", FieldKind::Float),

        K::BatchNormalization => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, ELEMENTWISE, REQUIRED)
            .input("MeanTensor", F, ELEMENTWISE, REQUIRED)
            .input("VarianceTensor", F, ELEMENTWISE, REQUIRED)
            .input("ScaleTensor", F, ELEMENTWISE, REQUIRED)
            .input("BiasTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputTensor", F, ELEMENTWISE, REQUIRED)
            .attribute("Spatial", FieldKind::Bool)
            .attribute("Epsilon", FieldKind::Float)
            .fused_activation(),
        K::BatchNormalizationGrad | K::BatchNormalizationTrainingGrad => {
            batch_normalization_grad(kind)
        }
        K::BatchNormalizationTraining => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, ELEMENTWISE, REQUIRED)
            .input("ScaleTensor", F, ELEMENTWISE, REQUIRED)
            .input("BiasTensor", F, ELEMENTWISE, REQUIRED)
            .input("FusedAddTensor", F, ELEMENTWISE, OPTIONAL)
            .output("OutputTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputMeanTensor", F, ELEMENTWISE, REQUIRED)
            .output("OutputVarianceTensor", F, ELEMENTWISE, REQUIRED)
            .attribute("Epsilon", FieldKind::Float)
            .fused_activation(),
        K::MeanVarianceNormalization
        | K::MeanVarianceNormalization1
        | K::MeanVarianceNormalization2 => {
            let info = OperatorTypeInfo::new(kind)
                .input("InputTensor", F, ELEMENTWISE, REQUIRED)
                .input("ScaleTensor", F, ELEMENTWISE, OPTIONAL)
                .input("BiasTensor", F, ELEMENTWISE, OPTIONAL)
                .output("OutputTensor", F, ELEMENTWISE, REQUIRED);
            let info = if kind == K::MeanVarianceNormalization {
                info.attribute("CrossChannel", FieldKind::Bool)
            } else {
                info.attribute("Axes", FieldKind::UIntArray)
            };
            info.attribute("NormalizeVariance", FieldKind::Bool)
                .attribute("Epsilon", FieldKind::Float)
                .fused_activation()
        }
        K::LocalResponseNormalization => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, NCHW, REQUIRED)
            .output("OutputTensor", F, NCHW, REQUIRED)
            .attribute("CrossChannel", FieldKind::Bool)
            .attribute("LocalSize", FieldKind::UInt)
            .attribute("Alpha", FieldKind::Float)
            .attribute("Beta", FieldKind::Float)
            .attribute("Bias", FieldKind::Float),
        K::LocalResponseNormalizationGrad => OperatorTypeInfo::new(kind)
            .input("InputTensor", F, NCHW, REQUIRED)
            .input("InputGradientTensor", F, NCHW, REQUIRED)
            .output("OutputGradientTensor", F, NCHW, REQUIRED)
            .attribute("LocalSize", FieldKind::UInt),
        K::LpNormalization => unary(kind, F, F)
            .attribute("Axis", FieldKind::UInt)
            .attribute("Epsilon", FieldKind::Float)
            .attribute("P", FieldKind::UInt),

        K::Rnn => recurrent_inputs(kind)
            .input("SequenceLengthsTensor", M::UINT32, NCHW, OPTIONAL)
            .output("OutputSequenceTensor", F, NCHW, OPTIONAL)
            .output("OutputSingleTensor", F, NCHW, OPTIONAL)
            .attribute("Direction", FieldKind::Enum("RecurrentNetworkDirection")),
        K::Lstm => recurrent_inputs(kind)
            .input("CellMemInitTensor", F, NCHW, OPTIONAL)
            .input("SequenceLengthsTensor", M::UINT32, NCHW, OPTIONAL)
            .input("PeepholeTensor", F, NCHW, OPTIONAL)
            .output("OutputSequenceTensor", F, NCHW, OPTIONAL)
            .output("OutputSingleTensor", F, NCHW, OPTIONAL)
            .output("OutputCellSingleTensor", F, NCHW, OPTIONAL)
            .attribute("Direction", FieldKind::Enum("RecurrentNetworkDirection"))
            .attribute("ClipThreshold", FieldKind::Float)
            .attribute("CoupleInputForget", FieldKind::Bool),
        K::Gru => recurrent_inputs(kind)
            .input("SequenceLengthsTensor", M::UINT32, NCHW, OPTIONAL)
            .output("OutputSequenceTensor", F, NCHW, OPTIONAL)
            .output("OutputSingleTensor", F, NCHW, OPTIONAL)
            .attribute("Direction", FieldKind::Enum("RecurrentNetworkDirection"))
            .attribute("LinearBeforeReset", FieldKind::Bool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_declares_at_least_one_tensor_field() {
        for kind in OperatorKind::ALL {
            let info = describe(*kind);
            assert!(
                info.fields().iter().any(|field| field.is_tensor()),
                "{kind} has no tensor fields"
            );
            assert_eq!(info.kind(), *kind);
        }
    }
}
