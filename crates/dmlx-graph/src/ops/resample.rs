//! Resampling and the fixed-function image operators.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Expression, GraphBuilder};
use crate::schema::{FeatureLevel, OperatorKind};
use crate::tensor::shape::per_axis_or;

use super::attributes::{AxisDirection, InterpolationMode, OperatorAttributes, Size2D};
use super::common::{ensure_len, ensure_rank};

const INPUT_PIXEL_OFFSET: f32 = 0.5;
const OUTPUT_PIXEL_OFFSET: f32 = -0.5;

/// Optional resample parameters. Unset scales are derived from the size ratio; unset pixel
/// offsets default to `0.5` (input) and `-0.5` (output) on every axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResampleOptions {
    pub rounding_direction: AxisDirection,
    /// Low-pass filter when downsampling; needs feature level 6.4.
    pub antialiased: bool,
    pub scales: Option<Vec<f32>>,
    pub input_pixel_offsets: Option<Vec<f32>>,
    pub output_pixel_offsets: Option<Vec<f32>>,
}

impl ResampleOptions {
    pub fn rounding_direction(mut self, direction: AxisDirection) -> Self {
        self.rounding_direction = direction;
        self
    }

    pub fn antialiased(mut self, antialiased: bool) -> Self {
        self.antialiased = antialiased;
        self
    }

    pub fn scales(mut self, scales: &[f32]) -> Self {
        self.scales = Some(scales.to_vec());
        self
    }

    pub fn input_pixel_offsets(mut self, offsets: &[f32]) -> Self {
        self.input_pixel_offsets = Some(offsets.to_vec());
        self
    }

    pub fn output_pixel_offsets(mut self, offsets: &[f32]) -> Self {
        self.output_pixel_offsets = Some(offsets.to_vec());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResampleAttributes {
    pub mode: InterpolationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding_direction: Option<AxisDirection>,
    pub scales: Vec<f32>,
    pub input_pixel_offsets: Vec<f32>,
    pub output_pixel_offsets: Vec<f32>,
    /// Present only on the 6.4 revision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antialiased: Option<bool>,
}

fn floats_per_axis(
    op: &'static str,
    what: &str,
    values: Option<&[f32]>,
    count: usize,
    fill: f32,
) -> GraphResult<Vec<f32>> {
    let values = values.unwrap_or(&[]);
    per_axis_or(values, count, fill).ok_or_else(|| {
        GraphError::contract(
            op,
            format!("{what} needs {count} entries, got {}", values.len()),
        )
    })
}

/// `numerator[i] / denominator[i]` per axis; both sides must be non-empty extents.
fn size_ratios(op: &'static str, numerator: &[u32], denominator: &[u32]) -> GraphResult<Vec<f32>> {
    ensure_contract!(
        numerator.iter().chain(denominator).all(|size| *size != 0),
        op,
        "cannot derive scales from zero extents {numerator:?} / {denominator:?}"
    );
    Ok(numerator
        .iter()
        .zip(denominator)
        .map(|(n, d)| *n as f32 / *d as f32)
        .collect())
}

fn attributes(
    op: &'static str,
    mode: InterpolationMode,
    rounding_direction: Option<AxisDirection>,
    default_scales: impl FnOnce() -> GraphResult<Vec<f32>>,
    options: &ResampleOptions,
    rank: usize,
) -> GraphResult<ResampleAttributes> {
    let scales = match &options.scales {
        Some(scales) => {
            ensure_len(op, "scales", scales.len(), rank)?;
            scales.clone()
        }
        None => default_scales()?,
    };
    Ok(ResampleAttributes {
        mode,
        rounding_direction,
        scales,
        input_pixel_offsets: floats_per_axis(
            op,
            "input pixel offsets",
            options.input_pixel_offsets.as_deref(),
            rank,
            INPUT_PIXEL_OFFSET,
        )?,
        output_pixel_offsets: floats_per_axis(
            op,
            "output pixel offsets",
            options.output_pixel_offsets.as_deref(),
            rank,
            OUTPUT_PIXEL_OFFSET,
        )?,
        antialiased: None,
    })
}

/// Resamples `input` to `output_sizes`; default scales are `output / input` per axis.
///
/// Targets at feature level 6.4 get the revision that carries the antialiasing flag.
pub fn resample(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    output_sizes: &[u32],
    mode: InterpolationMode,
    options: &ResampleOptions,
) -> GraphResult<Expression> {
    const OP: &str = "Resample";
    let input_desc = builder.operand(OP, input)?;
    let rank = input_desc.rank();
    ensure_len(OP, "output sizes", output_sizes.len(), rank)?;
    let mut attributes = attributes(
        OP,
        mode,
        Some(options.rounding_direction),
        || size_ratios(OP, output_sizes, input_desc.sizes()),
        options,
        rank,
    )?;
    let kind = if builder.config().capabilities.feature_level >= FeatureLevel::V6_4 {
        attributes.antialiased = Some(options.antialiased);
        OperatorKind::Resample3
    } else if options.antialiased {
        return Err(GraphError::unsupported(
            OP,
            "antialiased resampling needs feature level 6.4",
        ));
    } else {
        OperatorKind::Resample2
    };
    let output = builder.output_desc(input_desc.data_type(), output_sizes)?;
    builder.emit_single(
        kind,
        OperatorAttributes::Resample(attributes),
        &[Some(input)],
        output,
    )
}

/// Backward pass of [`resample`]; default scales are `input / output` per axis.
pub fn resample_grad(
    builder: &mut GraphBuilder<'_>,
    input_gradient: Expression,
    output_sizes: &[u32],
    mode: InterpolationMode,
    options: &ResampleOptions,
) -> GraphResult<Expression> {
    const OP: &str = "ResampleGrad";
    let gradient_desc = builder.operand(OP, input_gradient)?;
    let rank = gradient_desc.rank();
    ensure_len(OP, "output sizes", output_sizes.len(), rank)?;
    let attributes = attributes(
        OP,
        mode,
        None,
        || size_ratios(OP, gradient_desc.sizes(), output_sizes),
        options,
        rank,
    )?;
    let output = builder.output_desc(gradient_desc.data_type(), output_sizes)?;
    builder.emit_single(
        OperatorKind::ResampleGrad,
        OperatorAttributes::Resample(attributes),
        &[Some(input_gradient)],
        output,
    )
}

/// Integer upsampling of the two innermost axes of a 4-D or 5-D tensor.
pub fn upsample_2d(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    scale: Size2D,
    mode: InterpolationMode,
) -> GraphResult<Expression> {
    const OP: &str = "UpSample2D";
    let input_desc = builder.operand(OP, input)?;
    let rank = input_desc.rank();
    ensure_contract!(
        rank == 4 || rank == 5,
        OP,
        "input must have rank 4 or 5, got {:?}",
        input_desc.sizes()
    );
    ensure_contract!(
        scale.width > 0 && scale.height > 0,
        OP,
        "scale {}x{} must be positive",
        scale.width,
        scale.height
    );
    let mut sizes = input_desc.sizes().to_vec();
    let overflow = || GraphError::contract(OP, "upsampled extent overflows");
    sizes[rank - 2] = sizes[rank - 2].checked_mul(scale.height).ok_or_else(overflow)?;
    sizes[rank - 1] = sizes[rank - 1].checked_mul(scale.width).ok_or_else(overflow)?;
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(
        OperatorKind::UpSample2D,
        OperatorAttributes::UpSample2D { scale, mode },
        &[Some(input)],
        output,
    )
}

/// `output = input * scale + bias[channel]` on an NCHW tensor.
pub fn value_scale_2d(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    scale: f32,
    bias: &[f32],
) -> GraphResult<Expression> {
    const OP: &str = "ValueScale2D";
    let input_desc = builder.operand(OP, input)?;
    ensure_rank(OP, "input", &input_desc, 4)?;
    ensure_len(OP, "bias", bias.len(), input_desc.sizes()[1] as usize)?;
    let output = builder.output_desc(input_desc.data_type(), input_desc.sizes())?;
    builder.emit_single(
        OperatorKind::ValueScale2D,
        OperatorAttributes::ValueScale2D {
            scale,
            bias: bias.to_vec(),
        },
        &[Some(input)],
        output,
    )
}
