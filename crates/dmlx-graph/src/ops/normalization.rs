//! Batch, mean-variance and local-response normalization, with the training-time variants.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::GraphResult;
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::TensorDesc;

use super::attributes::{FusedActivation, OperatorAttributes};
use super::common::{ensure_rank, ensure_same_sizes, required_output};

fn ensure_same_rank(
    op: &'static str,
    what: &str,
    input: &TensorDesc,
    other: &TensorDesc,
) -> GraphResult<()> {
    ensure_contract!(
        other.rank() == input.rank(),
        op,
        "{what} {:?} must have the input rank {}",
        other.sizes(),
        input.rank()
    );
    Ok(())
}

/// Parameter tensors of the inference-time batch normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchNormalizationInputs {
    pub input: Expression,
    pub mean: Expression,
    pub variance: Expression,
    pub scale: Expression,
    pub bias: Expression,
}

/// `scale * (input - mean) / sqrt(variance + epsilon) + bias`.
///
/// With `spatial` set the statistics are per channel and broadcast over the spatial axes.
pub fn batch_normalization(
    builder: &mut GraphBuilder<'_>,
    tensors: BatchNormalizationInputs,
    spatial: bool,
    epsilon: f32,
    activation: Option<FusedActivation>,
) -> GraphResult<Expression> {
    const OP: &str = "BatchNormalization";
    let input_desc = builder.operand(OP, tensors.input)?;
    for (what, expr) in [
        ("mean", tensors.mean),
        ("variance", tensors.variance),
        ("scale", tensors.scale),
        ("bias", tensors.bias),
    ] {
        let desc = builder.operand(OP, expr)?;
        ensure_same_rank(OP, what, &input_desc, &desc)?;
    }
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::BatchNormalization,
        OperatorAttributes::BatchNormalization {
            spatial,
            epsilon,
            activation,
        },
        &[
            Some(tensors.input),
            Some(tensors.mean),
            Some(tensors.variance),
            Some(tensors.scale),
            Some(tensors.bias),
        ],
        output,
    )
}

/// Tensors consumed by the batch normalization gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchNormalizationGradInputs {
    pub input: Expression,
    pub input_gradient: Expression,
    pub mean: Expression,
    pub variance: Expression,
    pub scale: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchNormalizationGradOutputs {
    pub gradient: Expression,
    pub scale_gradient: Expression,
    pub bias_gradient: Expression,
}

fn batch_normalization_grad_with(
    builder: &mut GraphBuilder<'_>,
    kind: OperatorKind,
    tensors: BatchNormalizationGradInputs,
    epsilon: f32,
) -> GraphResult<BatchNormalizationGradOutputs> {
    let op = kind.name();
    let input_desc = builder.operand(op, tensors.input)?;
    let gradient_desc = builder.operand(op, tensors.input_gradient)?;
    let mean_desc = builder.operand(op, tensors.mean)?;
    ensure_same_sizes(op, &input_desc, &gradient_desc)?;
    for (what, expr) in [("variance", tensors.variance), ("scale", tensors.scale)] {
        let desc = builder.operand(op, expr)?;
        ensure_same_rank(op, what, &input_desc, &desc)?;
    }
    ensure_same_rank(op, "mean", &input_desc, &mean_desc)?;

    let gradient = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    let scale_gradient = builder.output_desc(mean_desc.data_type(), mean_desc.sizes())?;
    let bias_gradient = scale_gradient.clone();
    let outputs = builder.emit(
        kind,
        OperatorAttributes::Epsilon { epsilon },
        &[
            Some(tensors.input),
            Some(tensors.input_gradient),
            Some(tensors.mean),
            Some(tensors.variance),
            Some(tensors.scale),
        ],
        vec![Some(gradient), Some(scale_gradient), Some(bias_gradient)],
    )?;
    Ok(BatchNormalizationGradOutputs {
        gradient: required_output(kind, &outputs, 0)?,
        scale_gradient: required_output(kind, &outputs, 1)?,
        bias_gradient: required_output(kind, &outputs, 2)?,
    })
}

/// Gradients of [`batch_normalization`] with respect to its input, scale and bias.
pub fn batch_normalization_grad(
    builder: &mut GraphBuilder<'_>,
    tensors: BatchNormalizationGradInputs,
    epsilon: f32,
) -> GraphResult<BatchNormalizationGradOutputs> {
    batch_normalization_grad_with(
        builder,
        OperatorKind::BatchNormalizationGrad,
        tensors,
        epsilon,
    )
}

/// Gradients of [`batch_normalization_training`], where the statistics are batch-derived.
pub fn batch_normalization_training_grad(
    builder: &mut GraphBuilder<'_>,
    tensors: BatchNormalizationGradInputs,
    epsilon: f32,
) -> GraphResult<BatchNormalizationGradOutputs> {
    batch_normalization_grad_with(
        builder,
        OperatorKind::BatchNormalizationTrainingGrad,
        tensors,
        epsilon,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchNormalizationTrainingOutputs {
    pub output: Expression,
    pub mean: Expression,
    pub variance: Expression,
}

/// Batch normalization computing its own mean and variance; those are returned shaped like `scale`.
pub fn batch_normalization_training(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    scale: Expression,
    bias: Expression,
    fused_add: Option<Expression>,
    epsilon: f32,
    activation: Option<FusedActivation>,
) -> GraphResult<BatchNormalizationTrainingOutputs> {
    const OP: &str = "BatchNormalizationTraining";
    let input_desc = builder.operand(OP, input)?;
    let scale_desc = builder.operand(OP, scale)?;
    let bias_desc = builder.operand(OP, bias)?;
    ensure_same_rank(OP, "scale", &input_desc, &scale_desc)?;
    ensure_same_sizes(OP, &scale_desc, &bias_desc)?;
    if let Some(add_desc) = builder.optional_operand(OP, fused_add)? {
        ensure_same_sizes(OP, &input_desc, &add_desc)?;
    }

    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    let mean = builder.output_desc(input_desc.data_type(), scale_desc.sizes())?;
    let variance = mean.clone();
    let kind = OperatorKind::BatchNormalizationTraining;
    let outputs = builder.emit(
        kind,
        OperatorAttributes::BatchNormalizationTraining {
            epsilon,
            activation,
        },
        &[Some(input), Some(scale), Some(bias), fused_add],
        vec![Some(output), Some(mean), Some(variance)],
    )?;
    Ok(BatchNormalizationTrainingOutputs {
        output: required_output(kind, &outputs, 0)?,
        mean: required_output(kind, &outputs, 1)?,
        variance: required_output(kind, &outputs, 2)?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanVarianceNormalizationAttributes {
    pub axes: Vec<u32>,
    pub normalize_mean: bool,
    pub normalize_variance: bool,
    pub epsilon: f32,
    pub activation: Option<FusedActivation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanVarianceNormalizationOptions {
    pub scale: Option<Expression>,
    pub bias: Option<Expression>,
    pub normalize_mean: bool,
    pub normalize_variance: bool,
    pub epsilon: f32,
    pub activation: Option<FusedActivation>,
}

impl Default for MeanVarianceNormalizationOptions {
    fn default() -> Self {
        Self {
            scale: None,
            bias: None,
            normalize_mean: true,
            normalize_variance: true,
            epsilon: 1e-5,
            activation: None,
        }
    }
}

impl MeanVarianceNormalizationOptions {
    pub fn scale(mut self, scale: Expression) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn bias(mut self, bias: Expression) -> Self {
        self.bias = Some(bias);
        self
    }

    pub fn normalize_mean(mut self, normalize: bool) -> Self {
        self.normalize_mean = normalize;
        self
    }

    pub fn normalize_variance(mut self, normalize: bool) -> Self {
        self.normalize_variance = normalize;
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn activation(mut self, activation: FusedActivation) -> Self {
        self.activation = Some(activation);
        self
    }
}

/// Normalises over `axes` to zero mean and, optionally, unit variance.
///
/// Skipping the mean subtraction needs the newer operator revision.
pub fn mean_variance_normalization(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    axes: &[u32],
    options: &MeanVarianceNormalizationOptions,
) -> GraphResult<Expression> {
    const OP: &str = "MeanVarianceNormalization";
    let input_desc = builder.operand(OP, input)?;
    let rank = input_desc.rank();
    ensure_contract!(!axes.is_empty(), OP, "at least one axis is required");
    for (position, axis) in axes.iter().enumerate() {
        ensure_contract!(
            (*axis as usize) < rank,
            OP,
            "axis {axis} is out of range for rank {rank}"
        );
        ensure_contract!(
            !axes[..position].contains(axis),
            OP,
            "axis {axis} is listed twice"
        );
    }
    for (what, expr) in [("scale", options.scale), ("bias", options.bias)] {
        if let Some(desc) = builder.optional_operand(OP, expr)? {
            ensure_same_rank(OP, what, &input_desc, &desc)?;
        }
    }

    let kind = if options.normalize_mean {
        OperatorKind::MeanVarianceNormalization1
    } else {
        OperatorKind::MeanVarianceNormalization2
    };
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        kind,
        OperatorAttributes::MeanVarianceNormalization(MeanVarianceNormalizationAttributes {
            axes: axes.to_vec(),
            normalize_mean: options.normalize_mean,
            normalize_variance: options.normalize_variance,
            epsilon: options.epsilon,
            activation: options.activation,
        }),
        &[Some(input), options.scale, options.bias],
        output,
    )
}

/// Normalises each element by the sum of squares over a window of `local_size` neighbours.
pub fn local_response_normalization(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    cross_channel: bool,
    local_size: u32,
    alpha: f32,
    beta: f32,
    bias: f32,
) -> GraphResult<Expression> {
    const OP: &str = "LocalResponseNormalization";
    let input_desc = builder.operand(OP, input)?;
    ensure_rank(OP, "input", &input_desc, 4)?;
    ensure_contract!(local_size > 0, OP, "local size must be positive");
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::LocalResponseNormalization,
        OperatorAttributes::LocalResponseNormalization {
            cross_channel,
            local_size,
            alpha,
            beta,
            bias,
        },
        &[Some(input)],
        output,
    )
}
