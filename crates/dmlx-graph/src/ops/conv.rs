//! Convolution family: float, integer and quantized-linear convolution.
//!
//! Tensors are `N, C, spatial...` with two or three spatial axes; filters are
//! `C_out, C_in / groups, window...`.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::{DataType, TensorDesc};

use super::attributes::{FusedActivation, OperatorAttributes};
use super::common::{ensure_len, per_axis};
use super::window::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ConvolutionMode {
    Convolution,
    #[default]
    CrossCorrelation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ConvolutionDirection {
    #[default]
    Forward,
    Backward,
}

/// Optional convolution parameters; unset per-axis values take their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionOptions {
    pub mode: ConvolutionMode,
    pub direction: ConvolutionDirection,
    pub strides: Option<Vec<u32>>,
    pub dilations: Option<Vec<u32>>,
    pub start_padding: Option<Vec<u32>>,
    pub end_padding: Option<Vec<u32>>,
    pub output_padding: Option<Vec<u32>>,
    pub group_count: u32,
    pub activation: Option<FusedActivation>,
    /// Skips shape inference when set.
    pub output_sizes: Option<Vec<u32>>,
}

impl Default for ConvolutionOptions {
    fn default() -> Self {
        Self {
            mode: ConvolutionMode::default(),
            direction: ConvolutionDirection::default(),
            strides: None,
            dilations: None,
            start_padding: None,
            end_padding: None,
            output_padding: None,
            group_count: 1,
            activation: None,
            output_sizes: None,
        }
    }
}

impl ConvolutionOptions {
    pub fn mode(mut self, mode: ConvolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn direction(mut self, direction: ConvolutionDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn strides(mut self, strides: &[u32]) -> Self {
        self.strides = Some(strides.to_vec());
        self
    }

    pub fn dilations(mut self, dilations: &[u32]) -> Self {
        self.dilations = Some(dilations.to_vec());
        self
    }

    pub fn start_padding(mut self, padding: &[u32]) -> Self {
        self.start_padding = Some(padding.to_vec());
        self
    }

    pub fn end_padding(mut self, padding: &[u32]) -> Self {
        self.end_padding = Some(padding.to_vec());
        self
    }

    pub fn output_padding(mut self, padding: &[u32]) -> Self {
        self.output_padding = Some(padding.to_vec());
        self
    }

    pub fn group_count(mut self, group_count: u32) -> Self {
        self.group_count = group_count;
        self
    }

    pub fn activation(mut self, activation: FusedActivation) -> Self {
        self.activation = Some(activation);
        self
    }

    pub fn output_sizes(mut self, sizes: &[u32]) -> Self {
        self.output_sizes = Some(sizes.to_vec());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvolutionAttributes {
    pub mode: ConvolutionMode,
    pub direction: ConvolutionDirection,
    pub strides: Vec<u32>,
    pub dilations: Vec<u32>,
    pub start_padding: Vec<u32>,
    pub end_padding: Vec<u32>,
    pub output_padding: Vec<u32>,
    pub group_count: u32,
    pub activation: Option<FusedActivation>,
}

/// Parameters of the integer and quantized-linear convolutions.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerConvolutionOptions {
    pub strides: Option<Vec<u32>>,
    pub dilations: Option<Vec<u32>>,
    pub start_padding: Option<Vec<u32>>,
    pub end_padding: Option<Vec<u32>>,
    pub group_count: u32,
    pub output_sizes: Option<Vec<u32>>,
}

impl Default for IntegerConvolutionOptions {
    fn default() -> Self {
        Self {
            strides: None,
            dilations: None,
            start_padding: None,
            end_padding: None,
            group_count: 1,
            output_sizes: None,
        }
    }
}

impl IntegerConvolutionOptions {
    pub fn strides(mut self, strides: &[u32]) -> Self {
        self.strides = Some(strides.to_vec());
        self
    }

    pub fn dilations(mut self, dilations: &[u32]) -> Self {
        self.dilations = Some(dilations.to_vec());
        self
    }

    pub fn start_padding(mut self, padding: &[u32]) -> Self {
        self.start_padding = Some(padding.to_vec());
        self
    }

    pub fn end_padding(mut self, padding: &[u32]) -> Self {
        self.end_padding = Some(padding.to_vec());
        self
    }

    pub fn group_count(mut self, group_count: u32) -> Self {
        self.group_count = group_count;
        self
    }

    pub fn output_sizes(mut self, sizes: &[u32]) -> Self {
        self.output_sizes = Some(sizes.to_vec());
        self
    }
}

fn spatial_axes(op: &'static str, input: &TensorDesc, filter: &TensorDesc) -> GraphResult<usize> {
    let rank = input.rank();
    ensure_contract!(
        rank == 4 || rank == 5,
        op,
        "input must have rank 4 or 5, got {:?}",
        input.sizes()
    );
    ensure_contract!(
        filter.rank() == rank,
        op,
        "filter rank {} does not match input rank {rank}",
        filter.rank()
    );
    Ok(rank - 2)
}

fn check_groups(
    op: &'static str,
    input: &TensorDesc,
    filter: &TensorDesc,
    group_count: u32,
) -> GraphResult<()> {
    ensure_contract!(group_count > 0, op, "group count must be positive");
    let input_channels = input.sizes()[1];
    let filter_channels = filter.sizes()[1];
    ensure_contract!(
        filter_channels.checked_mul(group_count) == Some(input_channels),
        op,
        "filter expects {filter_channels} channels per group x {group_count} groups, input has {input_channels}"
    );
    ensure_contract!(
        filter.sizes()[0] % group_count == 0,
        op,
        "output channels {} are not divisible by {group_count} groups",
        filter.sizes()[0]
    );
    Ok(())
}

/// Forward output sizes: `[N, C_out, spatial...]`.
fn forward_sizes(
    op: &'static str,
    input: &TensorDesc,
    filter: &TensorDesc,
    window: &Window,
) -> GraphResult<Vec<u32>> {
    let mut sizes = Vec::with_capacity(input.rank());
    sizes.push(input.sizes()[0]);
    sizes.push(filter.sizes()[0]);
    for axis in 0..input.rank() - 2 {
        sizes.push(window.output_extent(
            op,
            axis,
            input.sizes()[axis + 2],
            filter.sizes()[axis + 2],
        )?);
    }
    Ok(sizes)
}

fn explicit_sizes(op: &'static str, sizes: &[u32], input: &TensorDesc) -> GraphResult<Vec<u32>> {
    ensure_len(op, "output sizes", sizes.len(), input.rank())?;
    Ok(sizes.to_vec())
}

/// Convolves `input` with `filter`, optionally adding `bias`.
///
/// Only forward shape inference is defined; a backward convolution needs explicit
/// `output_sizes`.
pub fn convolution(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    filter: Expression,
    bias: Option<Expression>,
    options: &ConvolutionOptions,
) -> GraphResult<Expression> {
    const OP: &str = "Convolution";
    let input_desc = builder.operand(OP, input)?;
    let filter_desc = builder.operand(OP, filter)?;
    let bias_desc = builder.optional_operand(OP, bias)?;
    let spatial = spatial_axes(OP, &input_desc, &filter_desc)?;

    let window = Window::resolve(
        OP,
        spatial,
        options.strides.as_deref(),
        options.dilations.as_deref(),
        options.start_padding.as_deref(),
        options.end_padding.as_deref(),
    )?;
    let output_padding = per_axis(
        OP,
        "output padding",
        options.output_padding.as_deref(),
        spatial,
        0,
    )?;

    let output_sizes = match (&options.output_sizes, options.direction) {
        (Some(sizes), _) => explicit_sizes(OP, sizes, &input_desc)?,
        (None, ConvolutionDirection::Forward) => {
            check_groups(OP, &input_desc, &filter_desc, options.group_count)?;
            forward_sizes(OP, &input_desc, &filter_desc, &window)?
        }
        (None, ConvolutionDirection::Backward) => {
            return Err(GraphError::unimplemented(
                OP,
                "backward shape inference is undefined; pass explicit output sizes",
            ));
        }
    };
    if let Some(bias_desc) = &bias_desc {
        ensure_contract!(
            bias_desc.rank() == input_desc.rank() && bias_desc.sizes()[1] == output_sizes[1],
            OP,
            "bias {:?} does not match {} output channels",
            bias_desc.sizes(),
            output_sizes[1]
        );
    }

    let output = builder.output_desc(input_desc.data_type(), &output_sizes)?;
    builder.emit_single(
        OperatorKind::Convolution,
        OperatorAttributes::Convolution(ConvolutionAttributes {
            mode: options.mode,
            direction: options.direction,
            strides: window.strides,
            dilations: window.dilations,
            start_padding: window.start_padding,
            end_padding: window.end_padding,
            output_padding,
            group_count: options.group_count,
            activation: options.activation,
        }),
        &[Some(input), Some(filter), bias],
        output,
    )
}

fn integer_window(
    op: &'static str,
    input: &TensorDesc,
    filter: &TensorDesc,
    options: &IntegerConvolutionOptions,
) -> GraphResult<(Window, Vec<u32>)> {
    let spatial = spatial_axes(op, input, filter)?;
    let window = Window::resolve(
        op,
        spatial,
        options.strides.as_deref(),
        options.dilations.as_deref(),
        options.start_padding.as_deref(),
        options.end_padding.as_deref(),
    )?;
    let sizes = match &options.output_sizes {
        Some(sizes) => explicit_sizes(op, sizes, input)?,
        None => {
            check_groups(op, input, filter, options.group_count)?;
            forward_sizes(op, input, filter, &window)?
        }
    };
    Ok((window, sizes))
}

fn integer_attributes(window: Window, group_count: u32) -> OperatorAttributes {
    OperatorAttributes::ConvolutionInteger {
        strides: window.strides,
        dilations: window.dilations,
        start_padding: window.start_padding,
        end_padding: window.end_padding,
        group_count,
    }
}

/// Integer convolution accumulating into `Int32`.
pub fn convolution_integer(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    input_zero_point: Option<Expression>,
    filter: Expression,
    filter_zero_point: Option<Expression>,
    options: &IntegerConvolutionOptions,
) -> GraphResult<Expression> {
    const OP: &str = "ConvolutionInteger";
    let input_desc = builder.operand(OP, input)?;
    let filter_desc = builder.operand(OP, filter)?;
    builder.optional_operand(OP, input_zero_point)?;
    builder.optional_operand(OP, filter_zero_point)?;
    let (window, sizes) = integer_window(OP, &input_desc, &filter_desc, options)?;
    let output = builder.output_desc(DataType::Int32, &sizes)?;
    builder.emit_single(
        OperatorKind::ConvolutionInteger,
        integer_attributes(window, options.group_count),
        &[Some(input), input_zero_point, Some(filter), filter_zero_point],
        output,
    )
}

/// Tensors consumed by [`quantized_linear_convolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizedConvolutionInputs {
    pub input: Expression,
    pub input_scale: Expression,
    pub input_zero_point: Option<Expression>,
    pub filter: Expression,
    pub filter_scale: Expression,
    pub filter_zero_point: Option<Expression>,
    pub bias: Option<Expression>,
    pub output_scale: Expression,
    pub output_zero_point: Option<Expression>,
}

/// Quantized convolution producing `output_type` (`Int8` or `UInt8`).
pub fn quantized_linear_convolution(
    builder: &mut GraphBuilder<'_>,
    tensors: QuantizedConvolutionInputs,
    output_type: DataType,
    options: &IntegerConvolutionOptions,
) -> GraphResult<Expression> {
    const OP: &str = "QuantizedLinearConvolution";
    ensure_contract!(
        matches!(output_type, DataType::Int8 | DataType::UInt8),
        OP,
        "output type must be Int8 or UInt8, got {output_type}"
    );
    let input_desc = builder.operand(OP, tensors.input)?;
    let filter_desc = builder.operand(OP, tensors.filter)?;
    for scale in [tensors.input_scale, tensors.filter_scale, tensors.output_scale] {
        builder.operand(OP, scale)?;
    }
    builder.optional_operand(OP, tensors.input_zero_point)?;
    builder.optional_operand(OP, tensors.filter_zero_point)?;
    builder.optional_operand(OP, tensors.bias)?;
    if let Some(zero_point) = builder.optional_operand(OP, tensors.output_zero_point)? {
        ensure_contract!(
            zero_point.data_type() == output_type,
            OP,
            "output zero point is {}, output type is {output_type}",
            zero_point.data_type()
        );
    }
    let (window, sizes) = integer_window(OP, &input_desc, &filter_desc, options)?;
    let output = builder.output_desc(output_type, &sizes)?;
    builder.emit_single(
        OperatorKind::QuantizedLinearConvolution,
        integer_attributes(window, options.group_count),
        &[
            Some(tensors.input),
            Some(tensors.input_scale),
            tensors.input_zero_point,
            Some(tensors.filter),
            Some(tensors.filter_scale),
            tensors.filter_zero_point,
            tensors.bias,
            Some(tensors.output_scale),
            tensors.output_zero_point,
        ],
        output,
    )
}
