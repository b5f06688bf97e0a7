use std::fmt;
use std::ops::{BitOr, RangeInclusive};

use serde::Serialize;

use crate::tensor::DataTypeMask;

use super::OperatorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldRole {
    Input,
    Output,
    Attribute,
}

/// Modifier bits attached to an operator field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct FieldFlags(u8);

impl FieldFlags {
    pub const NONE: FieldFlags = FieldFlags(0);
    /// The field may be left unset (null tensor or defaulted attribute).
    pub const OPTIONAL: FieldFlags = FieldFlags(1);
    /// The tensor may alias the operator's in-place counterpart.
    pub const IN_PLACE: FieldFlags = FieldFlags(1 << 1);

    pub fn contains(self, other: FieldFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_optional(self) -> bool {
        self.contains(FieldFlags::OPTIONAL)
    }

    pub fn is_in_place(self) -> bool {
        self.contains(FieldFlags::IN_PLACE)
    }
}

impl BitOr for FieldFlags {
    type Output = FieldFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        FieldFlags(self.0 | rhs.0)
    }
}

impl fmt::Debug for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.is_optional() {
            names.push("OPTIONAL");
        }
        if self.is_in_place() {
            names.push("IN_PLACE");
        }
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join(" | "))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    Tensor,
    /// Variable-length list of tensors sharing one contract (join inputs, split outputs).
    TensorArray,
    Float,
    UInt,
    Int,
    Bool,
    Enum(&'static str),
    FloatArray,
    UIntArray,
    IntArray,
    ScaleBias,
    FusedActivation,
}

/// Contract of one input, output or attribute of an operator kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorFieldSpec {
    pub name: &'static str,
    pub role: FieldRole,
    pub kind: FieldKind,
    /// Empty for attributes.
    pub allowed_data_types: DataTypeMask,
    pub dimension_counts: RangeInclusive<u32>,
    pub flags: FieldFlags,
}

impl OperatorFieldSpec {
    pub fn is_tensor(&self) -> bool {
        matches!(self.kind, FieldKind::Tensor | FieldKind::TensorArray)
    }

    pub fn accepts_rank(&self, rank: usize) -> bool {
        u32::try_from(rank).is_ok_and(|rank| self.dimension_counts.contains(&rank))
    }
}

/// Ordered field list describing one operator kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorTypeInfo {
    kind: OperatorKind,
    fields: Vec<OperatorFieldSpec>,
}

/// Default dimension range accepted by shape-agnostic tensors.
pub const ANY_RANK: RangeInclusive<u32> = 0..=8;

impl OperatorTypeInfo {
    pub fn new(kind: OperatorKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn fields(&self) -> &[OperatorFieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&OperatorFieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &OperatorFieldSpec> {
        self.fields
            .iter()
            .filter(|field| field.role == FieldRole::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &OperatorFieldSpec> {
        self.fields
            .iter()
            .filter(|field| field.role == FieldRole::Output)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &OperatorFieldSpec> {
        self.fields
            .iter()
            .filter(|field| field.role == FieldRole::Attribute)
    }

    /// True when every tensor field has at least one admissible data type.
    pub fn is_satisfiable(&self) -> bool {
        self.fields
            .iter()
            .filter(|field| field.is_tensor() && !field.flags.is_optional())
            .all(|field| !field.allowed_data_types.is_empty())
    }

    pub fn input(
        mut self,
        name: &'static str,
        types: DataTypeMask,
        dims: RangeInclusive<u32>,
        flags: FieldFlags,
    ) -> Self {
        self.push_tensor(name, FieldRole::Input, FieldKind::Tensor, types, dims, flags);
        self
    }

    pub fn input_array(
        mut self,
        name: &'static str,
        types: DataTypeMask,
        dims: RangeInclusive<u32>,
    ) -> Self {
        self.push_tensor(
            name,
            FieldRole::Input,
            FieldKind::TensorArray,
            types,
            dims,
            FieldFlags::NONE,
        );
        self
    }

    pub fn output(
        mut self,
        name: &'static str,
        types: DataTypeMask,
        dims: RangeInclusive<u32>,
        flags: FieldFlags,
    ) -> Self {
        self.push_tensor(name, FieldRole::Output, FieldKind::Tensor, types, dims, flags);
        self
    }

    pub fn output_array(
        mut self,
        name: &'static str,
        types: DataTypeMask,
        dims: RangeInclusive<u32>,
    ) -> Self {
        self.push_tensor(
            name,
            FieldRole::Output,
            FieldKind::TensorArray,
            types,
            dims,
            FieldFlags::NONE,
        );
        self
    }

    pub fn attribute(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(OperatorFieldSpec {
            name,
            role: FieldRole::Attribute,
            kind,
            allowed_data_types: DataTypeMask::NONE,
            dimension_counts: 0..=0,
            flags: FieldFlags::NONE,
        });
        self
    }

    pub fn optional_attribute(mut self, name: &'static str, kind: FieldKind) -> Self {
        self = self.attribute(name, kind);
        if let Some(field) = self.fields.last_mut() {
            field.flags = FieldFlags::OPTIONAL;
        }
        self
    }

    pub fn scale_bias(self) -> Self {
        self.optional_attribute("ScaleBias", FieldKind::ScaleBias)
    }

    pub fn fused_activation(self) -> Self {
        self.optional_attribute("FusedActivation", FieldKind::FusedActivation)
    }

    /// Narrows every tensor field to the types present in `supported`.
    pub(crate) fn restrict(mut self, supported: DataTypeMask) -> Self {
        for field in &mut self.fields {
            if field.is_tensor() {
                field.allowed_data_types = field.allowed_data_types & supported;
            }
        }
        self
    }

    fn push_tensor(
        &mut self,
        name: &'static str,
        role: FieldRole,
        kind: FieldKind,
        types: DataTypeMask,
        dims: RangeInclusive<u32>,
        flags: FieldFlags,
    ) {
        self.fields.push(OperatorFieldSpec {
            name,
            role,
            kind,
            allowed_data_types: types,
            dimension_counts: dims,
            flags,
        });
    }
}
