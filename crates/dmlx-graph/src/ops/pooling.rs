//! Average, Lp and max pooling over the spatial axes of `N, C, spatial...` tensors.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::GraphResult;
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::{DataType, TensorDesc};

use super::attributes::OperatorAttributes;
use super::common::{ensure_len, required_output};
use super::window::Window;

/// Optional pooling geometry; unset values default to stride 1, dilation 1 and no padding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolingOptions {
    pub strides: Option<Vec<u32>>,
    pub dilations: Option<Vec<u32>>,
    pub start_padding: Option<Vec<u32>>,
    pub end_padding: Option<Vec<u32>>,
    pub output_sizes: Option<Vec<u32>>,
}

impl PoolingOptions {
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

    pub fn output_sizes(mut self, sizes: &[u32]) -> Self {
        self.output_sizes = Some(sizes.to_vec());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolingAttributes {
    pub window_size: Vec<u32>,
    pub strides: Vec<u32>,
    pub dilations: Vec<u32>,
    pub start_padding: Vec<u32>,
    pub end_padding: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_padding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<u32>,
}

struct ResolvedPooling {
    window: Window,
    window_size: Vec<u32>,
    output_sizes: Vec<u32>,
}

fn resolve(
    op: &'static str,
    input: &TensorDesc,
    window_size: &[u32],
    options: &PoolingOptions,
) -> GraphResult<ResolvedPooling> {
    let rank = input.rank();
    ensure_contract!(
        rank == 4 || rank == 5,
        op,
        "input must have rank 4 or 5, got {:?}",
        input.sizes()
    );
    let spatial = rank - 2;
    ensure_len(op, "window size", window_size.len(), spatial)?;
    ensure_contract!(
        window_size.iter().all(|size| *size != 0),
        op,
        "window sizes must be non-zero, got {window_size:?}"
    );
    let window = Window::resolve(
        op,
        spatial,
        options.strides.as_deref(),
        options.dilations.as_deref(),
        options.start_padding.as_deref(),
        options.end_padding.as_deref(),
    )?;
    let output_sizes = match &options.output_sizes {
        Some(sizes) => {
            ensure_len(op, "output sizes", sizes.len(), rank)?;
            sizes.clone()
        }
        None => {
            let mut sizes = vec![input.sizes()[0], input.sizes()[1]];
            for axis in 0..spatial {
                sizes.push(window.pooled_extent(
                    op,
                    axis,
                    input.sizes()[axis + 2],
                    window_size[axis],
                )?);
            }
            sizes
        }
    };
    Ok(ResolvedPooling {
        window,
        window_size: window_size.to_vec(),
        output_sizes,
    })
}

fn attributes(
    resolved: ResolvedPooling,
    include_padding: Option<bool>,
    p: Option<u32>,
) -> (OperatorAttributes, Vec<u32>) {
    let ResolvedPooling {
        window,
        window_size,
        output_sizes,
    } = resolved;
    (
        OperatorAttributes::Pooling(PoolingAttributes {
            window_size,
            strides: window.strides,
            dilations: window.dilations,
            start_padding: window.start_padding,
            end_padding: window.end_padding,
            include_padding,
            p,
        }),
        output_sizes,
    )
}

pub fn average_pooling(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    window_size: &[u32],
    include_padding: bool,
    options: &PoolingOptions,
) -> GraphResult<Expression> {
    const OP: &str = "AveragePooling";
    let input_desc = builder.operand(OP, input)?;
    let resolved = resolve(OP, &input_desc, window_size, options)?;
    let kind = if options.dilations.is_some() {
        OperatorKind::AveragePooling1
    } else {
        OperatorKind::AveragePooling
    };
    let (attributes, sizes) = attributes(resolved, Some(include_padding), None);
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(kind, attributes, &[Some(input)], output)
}

/// Lp-norm pooling; `p` must be positive.
pub fn lp_pooling(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    window_size: &[u32],
    p: u32,
    options: &PoolingOptions,
) -> GraphResult<Expression> {
    const OP: &str = "LpPooling";
    let input_desc = builder.operand(OP, input)?;
    ensure_contract!(p > 0, OP, "p must be positive");
    let resolved = resolve(OP, &input_desc, window_size, options)?;
    let kind = if options.dilations.is_some() {
        OperatorKind::LpPooling1
    } else {
        OperatorKind::LpPooling
    };
    let (attributes, sizes) = attributes(resolved, None, Some(p));
    let output = builder.output_desc(input_desc.data_type(), &sizes)?;
    builder.emit_single(kind, attributes, &[Some(input)], output)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxPoolingOutputs {
    pub values: Expression,
    /// Flat `UInt32` positions of each maximum; present only when requested.
    pub indices: Option<Expression>,
}

pub fn max_pooling(
    builder: &mut GraphBuilder<'_>,
    input: Expression,
    window_size: &[u32],
    output_indices: bool,
    options: &PoolingOptions,
) -> GraphResult<MaxPoolingOutputs> {
    const OP: &str = "MaxPooling";
    let input_desc = builder.operand(OP, input)?;
    let resolved = resolve(OP, &input_desc, window_size, options)?;
    let (attributes, sizes) = attributes(resolved, None, None);
    let values = builder.output_desc(input_desc.data_type(), &sizes)?;
    let indices = if output_indices {
        Some(builder.output_desc(DataType::UInt32, &sizes)?)
    } else {
        None
    };
    let outputs = builder.emit(
        OperatorKind::MaxPooling2,
        attributes,
        &[Some(input)],
        vec![Some(values), indices],
    )?;
    Ok(MaxPoolingOutputs {
        values: required_output(OperatorKind::MaxPooling2, &outputs, 0)?,
        indices: outputs.get(1).copied().flatten(),
    })
}
