//! Capability-filtered operator contracts.
//!
//! Every [`OperatorKind`] has one table entry describing its tensor inputs, outputs and
//! attributes. The builder consults the same entry when it emits a node, so the descriptive
//! registry and the shape-inference routines cannot drift apart silently.

mod catalog;
pub mod field;
pub mod kind;
pub mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tensor::DataTypeMask;

pub use field::{FieldFlags, FieldKind, FieldRole, OperatorFieldSpec, OperatorTypeInfo};
pub use kind::OperatorKind;
pub use registry::{operator_schemas, OperatorSchemas};

/// Runtime feature level, ordered from oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureLevel {
    V1_0,
    V2_0,
    V2_1,
    V3_0,
    V3_1,
    V4_0,
    V4_1,
    V5_0,
    V5_1,
    V5_2,
    V6_0,
    V6_1,
    V6_2,
    V6_3,
    V6_4,
}

impl FeatureLevel {
    pub const LATEST: FeatureLevel = FeatureLevel::V6_4;

    /// Packed `0xMm00` form used by the runtime (e.g. `0x6200` for 6.2).
    pub fn as_u32(self) -> u32 {
        let (major, minor) = self.version();
        (major << 12) | (minor << 8)
    }

    pub fn version(self) -> (u32, u32) {
        match self {
            FeatureLevel::V1_0 => (1, 0),
            FeatureLevel::V2_0 => (2, 0),
            FeatureLevel::V2_1 => (2, 1),
            FeatureLevel::V3_0 => (3, 0),
            FeatureLevel::V3_1 => (3, 1),
            FeatureLevel::V4_0 => (4, 0),
            FeatureLevel::V4_1 => (4, 1),
            FeatureLevel::V5_0 => (5, 0),
            FeatureLevel::V5_1 => (5, 1),
            FeatureLevel::V5_2 => (5, 2),
            FeatureLevel::V6_0 => (6, 0),
            FeatureLevel::V6_1 => (6, 1),
            FeatureLevel::V6_2 => (6, 2),
            FeatureLevel::V6_3 => (6, 3),
            FeatureLevel::V6_4 => (6, 4),
        }
    }
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.version();
        write!(f, "{major}.{minor}")
    }
}

/// What the target runtime reports it can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    pub feature_level: FeatureLevel,
    pub supported_data_types: DataTypeMask,
}

impl Capabilities {
    pub fn new(feature_level: FeatureLevel, supported_data_types: DataTypeMask) -> Self {
        Self {
            feature_level,
            supported_data_types,
        }
    }

    pub fn supports_kind(&self, kind: OperatorKind) -> bool {
        kind.min_feature_level() <= self.feature_level
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new(FeatureLevel::LATEST, DataTypeMask::ALL_BUT_NIBBLE)
    }
}
