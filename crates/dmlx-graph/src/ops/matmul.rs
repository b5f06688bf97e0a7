//! General matrix multiply over the two trailing axes of 4-D tensors.

use crate::ensure_contract;
use crate::error::GraphResult;
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;
use crate::tensor::{DataType, TensorDesc};

use super::attributes::{FusedActivation, OperatorAttributes};
use super::common::{ensure_rank, ensure_same_type};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemmOptions {
    pub transpose_a: bool,
    pub transpose_b: bool,
    pub alpha: f32,
    pub beta: f32,
    pub activation: Option<FusedActivation>,
}

impl Default for GemmOptions {
    fn default() -> Self {
        Self {
            transpose_a: false,
            transpose_b: false,
            alpha: 1.0,
            beta: 1.0,
            activation: None,
        }
    }
}

impl GemmOptions {
    pub fn transpose_a(mut self, transpose: bool) -> Self {
        self.transpose_a = transpose;
        self
    }

    pub fn transpose_b(mut self, transpose: bool) -> Self {
        self.transpose_b = transpose;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }

    pub fn activation(mut self, activation: FusedActivation) -> Self {
        self.activation = Some(activation);
        self
    }
}

/// `(rows, columns)` of a 4-D matrix operand after the optional transpose.
fn matrix_dims(desc: &TensorDesc, transpose: bool) -> (u32, u32) {
    let sizes = desc.sizes();
    if transpose {
        (sizes[3], sizes[2])
    } else {
        (sizes[2], sizes[3])
    }
}

/// `alpha * op(A) x op(B) + beta * C`; batch and channel extents come from `a`.
pub fn gemm(
    builder: &mut GraphBuilder<'_>,
    a: Expression,
    b: Expression,
    c: Option<Expression>,
    options: &GemmOptions,
) -> GraphResult<Expression> {
    const OP: &str = "Gemm";
    let a_desc = builder.operand(OP, a)?;
    let b_desc = builder.operand(OP, b)?;
    let c_desc = builder.optional_operand(OP, c)?;
    ensure_rank(OP, "A", &a_desc, 4)?;
    ensure_rank(OP, "B", &b_desc, 4)?;
    ensure_same_type(OP, &a_desc, &b_desc)?;

    let (rows, inner_a) = matrix_dims(&a_desc, options.transpose_a);
    let (inner_b, columns) = matrix_dims(&b_desc, options.transpose_b);
    ensure_contract!(
        inner_a == inner_b,
        OP,
        "inner dimensions differ: A {:?} vs B {:?}",
        a_desc.sizes(),
        b_desc.sizes()
    );
    let output_sizes = [a_desc.sizes()[0], a_desc.sizes()[1], rows, columns];
    if let Some(c_desc) = &c_desc {
        ensure_rank(OP, "C", c_desc, 4)?;
    }

    let output = builder.output_desc(a_desc.data_type(), &output_sizes)?;
    builder.emit_single(
        OperatorKind::Gemm,
        OperatorAttributes::Gemm {
            transpose_a: options.transpose_a,
            transpose_b: options.transpose_b,
            alpha: options.alpha,
            beta: options.beta,
            activation: options.activation,
        },
        &[Some(a), Some(b), c],
        output,
    )
}

/// Integer matrix multiply accumulating into `Int32`; output is `[a0, a1, a2, b3]`.
pub fn matrix_multiply_integer(
    builder: &mut GraphBuilder<'_>,
    a: Expression,
    a_zero_point: Option<Expression>,
    b: Expression,
    b_zero_point: Option<Expression>,
) -> GraphResult<Expression> {
    const OP: &str = "MatrixMultiplyInteger";
    let a_desc = builder.operand(OP, a)?;
    let b_desc = builder.operand(OP, b)?;
    builder.optional_operand(OP, a_zero_point)?;
    builder.optional_operand(OP, b_zero_point)?;
    ensure_rank(OP, "A", &a_desc, 4)?;
    ensure_rank(OP, "B", &b_desc, 4)?;
    ensure_contract!(
        a_desc.sizes()[3] == b_desc.sizes()[2],
        OP,
        "inner dimensions differ: A {:?} vs B {:?}",
        a_desc.sizes(),
        b_desc.sizes()
    );
    let sizes = a_desc.sizes();
    let output_sizes = [sizes[0], sizes[1], sizes[2], b_desc.sizes()[3]];
    let output = builder.output_desc(DataType::Int32, &output_sizes)?;
    builder.emit_single(
        OperatorKind::MatrixMultiplyInteger,
        OperatorAttributes::None,
        &[Some(a), a_zero_point, Some(b), b_zero_point],
        output,
    )
}
