//! Region-of-interest alignment and its gradient.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::GraphResult;
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::TensorDesc;

use super::attributes::{InterpolationMode, OperatorAttributes};
use super::common::ensure_rank;
use super::reduce::ReduceFunction;

/// How each output cell samples its region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiSampling {
    pub reduction: ReduceFunction,
    pub mode: InterpolationMode,
    pub spatial_scale_x: f32,
    pub spatial_scale_y: f32,
    pub input_pixel_offset: f32,
    pub output_pixel_offset: f32,
    pub minimum_samples: u32,
    /// Upper bound on samples per output cell; `u32::MAX` leaves it unbounded.
    pub maximum_samples: u32,
    pub align_regions_to_corners: bool,
}

impl Default for RoiSampling {
    fn default() -> Self {
        Self {
            reduction: ReduceFunction::Average,
            mode: InterpolationMode::Linear,
            spatial_scale_x: 1.0,
            spatial_scale_y: 1.0,
            input_pixel_offset: 0.5,
            output_pixel_offset: -0.5,
            minimum_samples: 1,
            maximum_samples: u32::MAX,
            align_regions_to_corners: false,
        }
    }
}

impl RoiSampling {
    pub fn reduction(mut self, reduction: ReduceFunction) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn mode(mut self, mode: InterpolationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn spatial_scale(mut self, x: f32, y: f32) -> Self {
        self.spatial_scale_x = x;
        self.spatial_scale_y = y;
        self
    }

    pub fn pixel_offsets(mut self, input: f32, output: f32) -> Self {
        self.input_pixel_offset = input;
        self.output_pixel_offset = output;
        self
    }

    pub fn samples(mut self, minimum: u32, maximum: u32) -> Self {
        self.minimum_samples = minimum;
        self.maximum_samples = maximum;
        self
    }

    pub fn align_regions_to_corners(mut self, align: bool) -> Self {
        self.align_regions_to_corners = align;
        self
    }

    fn validate(&self, op: &'static str) -> GraphResult<()> {
        ensure_contract!(
            matches!(self.reduction, ReduceFunction::Average | ReduceFunction::Max),
            op,
            "regions reduce with Average or Max, got {:?}",
            self.reduction
        );
        ensure_contract!(
            self.minimum_samples <= self.maximum_samples,
            op,
            "minimum samples {} exceed maximum {}",
            self.minimum_samples,
            self.maximum_samples
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiAlignAttributes {
    pub sampling: RoiSampling,
    pub out_of_bounds_value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiAlignGradAttributes {
    pub sampling: RoiSampling,
}

/// Regions are the second-innermost extent of the ROI tensor; a 1-D tensor is a single region.
fn region_count(roi: &TensorDesc) -> u32 {
    let sizes = roi.sizes();
    if sizes.len() < 2 {
        1
    } else {
        sizes[sizes.len() - 2]
    }
}

/// Crops every region of `roi` out of the NCHW `input` and resamples it to
/// `output_height x output_width`. The output is `[regions, channels, height, width]`.
#[allow(clippy::too_many_arguments)]
pub fn roi_align(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    roi: Expression,
    batch_indices: Expression,
    sampling: RoiSampling,
    out_of_bounds_value: f32,
    output_height: u32,
    output_width: u32,
) -> GraphResult<Expression> {
    const OP: &str = "RoiAlign";
    let input_desc = builder.operand(OP, input)?;
    let roi_desc = builder.operand(OP, roi)?;
    builder.operand(OP, batch_indices)?;
    ensure_rank(OP, "input", &input_desc, 4)?;
    sampling.validate(OP)?;
    let output = builder.output_desc(
        input_desc.data_type(),
        &[
            region_count(&roi_desc),
            input_desc.sizes()[1],
            output_height,
            output_width,
        ],
    )?;
    builder.emit_single(
        OperatorKind::RoiAlign1,
        OperatorAttributes::RoiAlign(RoiAlignAttributes {
            sampling,
            out_of_bounds_value,
        }),
        &[Some(input), Some(roi), Some(batch_indices)],
        output,
    )
}

/// Which gradients [`roi_align_grad`] computes, and the image geometry of the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoiAlignGradRequest {
    /// `Some((batch, height, width))` requests the image gradient.
    pub output_gradient: Option<(u32, u32, u32)>,
    pub roi_gradient: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiAlignGradOutputs {
    /// `[batch, channels, height, width]`.
    pub output_gradient: Option<Expression>,
    /// Shaped like the ROI tensor.
    pub roi_gradient: Option<Expression>,
}

pub fn roi_align_grad(
    builder: &mut GraphBuilder<'_>,
    input: Option<Expression>,
    input_gradient: Expression,
    roi: Expression,
    batch_indices: Expression,
    sampling: RoiSampling,
    request: RoiAlignGradRequest,
) -> GraphResult<RoiAlignGradOutputs> {
    const OP: &str = "RoiAlignGrad";
    builder.optional_operand(OP, input)?;
    let gradient_desc = builder.operand(OP, input_gradient)?;
    let roi_desc = builder.operand(OP, roi)?;
    builder.operand(OP, batch_indices)?;
    ensure_contract!(
        request.output_gradient.is_some() || request.roi_gradient,
        OP,
        "at least one of the image or ROI gradients must be requested"
    );
    ensure_contract!(
        gradient_desc.rank() > 1,
        OP,
        "input gradient {:?} needs a channel axis",
        gradient_desc.sizes()
    );
    sampling.validate(OP)?;

    let output_gradient = match request.output_gradient {
        Some((batch, height, width)) => Some(builder.output_desc(
            gradient_desc.data_type(),
            &[batch, gradient_desc.sizes()[1], height, width],
        )?),
        None => None,
    };
    let roi_gradient = if request.roi_gradient {
        Some(builder.output_desc(roi_desc.data_type(), roi_desc.sizes())?)
    } else {
        None
    };
    let outputs = builder.emit(
        OperatorKind::RoiAlignGrad,
        OperatorAttributes::RoiAlignGrad(RoiAlignGradAttributes { sampling }),
        &[input, Some(input_gradient), Some(roi), Some(batch_indices)],
        vec![output_gradient, roi_gradient],
    )?;
    Ok(RoiAlignGradOutputs {
        output_gradient: outputs.first().copied().flatten(),
        roi_gradient: outputs.get(1).copied().flatten(),
    })
}
