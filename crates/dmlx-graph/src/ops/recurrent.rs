//! Gated recurrent unit.
//!
//! Tensors use the 4-D recurrent layout: input `[1, seq, batch, input]`, weights
//! `[1, directions, 3 * hidden, input]`, recurrence `[1, directions, 3 * hidden, hidden]`.

use serde::Serialize;

use crate::ensure_contract;
use crate::error::GraphResult;
use crate::graph::{Expression, GraphBuilder};
use crate::schema::OperatorKind;

use super::attributes::{FusedActivation, OperatorAttributes, RecurrentDirection};
use super::common::ensure_rank;

const MAX_ACTIVATIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GruOutputSelection {
    #[default]
    Both,
    Sequence,
    Single,
}

impl GruOutputSelection {
    fn sequence(self) -> bool {
        matches!(self, GruOutputSelection::Both | GruOutputSelection::Sequence)
    }

    fn single(self) -> bool {
        matches!(self, GruOutputSelection::Both | GruOutputSelection::Single)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GruInputs {
    pub input: Expression,
    pub weight: Expression,
    pub recurrence: Expression,
    pub bias: Option<Expression>,
    pub hidden_init: Option<Expression>,
    pub sequence_lengths: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GruOptions {
    /// Gate and hidden activations, one pair per direction.
    pub activations: Vec<FusedActivation>,
    pub direction: RecurrentDirection,
    pub linear_before_reset: bool,
    pub outputs: GruOutputSelection,
}

impl Default for GruOptions {
    fn default() -> Self {
        Self {
            activations: vec![FusedActivation::sigmoid(), FusedActivation::tanh()],
            direction: RecurrentDirection::Forward,
            linear_before_reset: false,
            outputs: GruOutputSelection::Both,
        }
    }
}

impl GruOptions {
    pub fn activations(mut self, activations: &[FusedActivation]) -> Self {
        self.activations = activations.to_vec();
        self
    }

    pub fn direction(mut self, direction: RecurrentDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn linear_before_reset(mut self, linear: bool) -> Self {
        self.linear_before_reset = linear;
        self
    }

    pub fn outputs(mut self, outputs: GruOutputSelection) -> Self {
        self.outputs = outputs;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GruAttributes {
    pub activations: Vec<FusedActivation>,
    pub direction: RecurrentDirection,
    pub linear_before_reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GruOutputs {
    /// `[seq, directions, batch, hidden]`: every hidden state.
    pub sequence: Option<Expression>,
    /// `[1, directions, batch, hidden]`: the final hidden state.
    pub single: Option<Expression>,
}

pub fn gru(
    builder: &mut GraphBuilder<'_>,
    tensors: GruInputs,
    options: &GruOptions,
) -> GraphResult<GruOutputs> {
    const OP: &str = "Gru";
    let input_desc = builder.operand(OP, tensors.input)?;
    let weight_desc = builder.operand(OP, tensors.weight)?;
    let recurrence_desc = builder.operand(OP, tensors.recurrence)?;
    builder.optional_operand(OP, tensors.bias)?;
    builder.optional_operand(OP, tensors.hidden_init)?;
    builder.optional_operand(OP, tensors.sequence_lengths)?;
    ensure_rank(OP, "input", &input_desc, 4)?;
    ensure_rank(OP, "weight", &weight_desc, 4)?;
    ensure_rank(OP, "recurrence", &recurrence_desc, 4)?;
    ensure_contract!(
        options.activations.len() <= MAX_ACTIVATIONS,
        OP,
        "at most {MAX_ACTIVATIONS} activations are accepted, got {}",
        options.activations.len()
    );
    let directions = options.direction.direction_count();
    ensure_contract!(
        weight_desc.sizes()[1] == directions && recurrence_desc.sizes()[1] == directions,
        OP,
        "weights {:?} and recurrence {:?} must cover {directions} direction(s)",
        weight_desc.sizes(),
        recurrence_desc.sizes()
    );

    let sequence_length = input_desc.sizes()[1];
    let batch = input_desc.sizes()[2];
    let hidden = recurrence_desc.sizes()[3];
    let data_type = input_desc.data_type();
    let sequence = if options.outputs.sequence() {
        Some(builder.output_desc(data_type, &[sequence_length, directions, batch, hidden])?)
    } else {
        None
    };
    let single = if options.outputs.single() {
        Some(builder.output_desc(data_type, &[1, directions, batch, hidden])?)
    } else {
        None
    };
    let outputs = builder.emit(
        OperatorKind::Gru,
        OperatorAttributes::Gru(GruAttributes {
            activations: options.activations.clone(),
            direction: options.direction,
            linear_before_reset: options.linear_before_reset,
        }),
        &[
            Some(tensors.input),
            Some(tensors.weight),
            Some(tensors.recurrence),
            tensors.bias,
            tensors.hidden_init,
            tensors.sequence_lengths,
        ],
        vec![sequence, single],
    )?;
    Ok(GruOutputs {
        sequence: outputs.first().copied().flatten(),
        single: outputs.get(1).copied().flatten(),
    })
}
