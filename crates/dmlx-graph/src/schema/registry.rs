use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::tensor::DataTypeMask;

use super::catalog::describe;
use super::{Capabilities, OperatorKind, OperatorTypeInfo};

/// Number of distinct capability sets whose catalogues stay cached.
const SCHEMA_CACHE_CAPACITY: usize = 8;

static SCHEMA_CACHE: Lazy<Mutex<LruCache<Capabilities, Arc<OperatorSchemas>>>> =
    Lazy::new(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(SCHEMA_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        ))
    });

/// Immutable catalogue of operator contracts for one capability set.
#[derive(Debug, Clone)]
pub struct OperatorSchemas {
    capabilities: Capabilities,
    entries: BTreeMap<OperatorKind, OperatorTypeInfo>,
}

impl OperatorSchemas {
    fn build(capabilities: Capabilities) -> Self {
        let entries = OperatorKind::ALL
            .iter()
            .filter(|kind| capabilities.supports_kind(**kind))
            .map(|kind| {
                (
                    *kind,
                    describe(*kind).restrict(capabilities.supported_data_types),
                )
            })
            .collect();
        Self {
            capabilities,
            entries,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn get(&self, kind: OperatorKind) -> Option<&OperatorTypeInfo> {
        self.entries.get(&kind)
    }

    pub fn contains(&self, kind: OperatorKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in [`OperatorKind`] declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (OperatorKind, &OperatorTypeInfo)> {
        self.entries.iter().map(|(kind, info)| (*kind, info))
    }

    /// Union of every type some tensor field of `kind` accepts.
    pub fn data_types_of(&self, kind: OperatorKind) -> DataTypeMask {
        self.get(kind)
            .map(|info| {
                info.fields()
                    .iter()
                    .filter(|field| field.is_tensor())
                    .fold(DataTypeMask::NONE, |acc, field| {
                        acc | field.allowed_data_types
                    })
            })
            .unwrap_or(DataTypeMask::NONE)
    }
}

/// Returns the operator catalogue for `capabilities`, building it on first use.
pub fn operator_schemas(capabilities: &Capabilities) -> Arc<OperatorSchemas> {
    let mut cache = SCHEMA_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(schemas) = cache.get(capabilities) {
        debug!(
            feature_level = %capabilities.feature_level,
            "operator schema cache hit"
        );
        return Arc::clone(schemas);
    }

    let schemas = Arc::new(OperatorSchemas::build(*capabilities));
    debug!(
        feature_level = %capabilities.feature_level,
        kinds = schemas.len(),
        "operator schema cache miss; catalogue built"
    );
    cache.put(*capabilities, Arc::clone(&schemas));
    schemas
}
