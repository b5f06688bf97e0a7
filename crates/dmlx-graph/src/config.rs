//! Builder configuration: layout selection, schema validation and target capabilities.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::env;
use crate::schema::Capabilities;
use crate::tensor::LayoutKind;

fn default_validate() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub layout: LayoutKind,
    /// Check every emitted node against the operator registry.
    #[serde(default = "default_validate")]
    pub validate_schemas: bool,
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            layout: LayoutKind::Default,
            validate_schemas: default_validate(),
            capabilities: Capabilities::default(),
        }
    }
}

impl BuilderConfig {
    /// Defaults with `DMLX_LAYOUT` / `DMLX_VALIDATE` applied on top.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(value) = env::layout_override() {
            match LayoutKind::parse(value) {
                Some(layout) => self.layout = layout,
                None => warn!(value, "ignoring unrecognised DMLX_LAYOUT"),
            }
        }
        if let Some(value) = env::validate_override() {
            match env::parse_switch(value) {
                Some(validate) => self.validate_schemas = validate,
                None => warn!(value, "ignoring unrecognised DMLX_VALIDATE"),
            }
        }
        self
    }

    pub fn with_layout(mut self, layout: LayoutKind) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_schemas = validate;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn from_json_str(src: &str) -> Result<Self> {
        serde_json::from_str(src).context("failed to parse builder config")
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read builder config {}", path.display()))?;
        Self::from_json_str(&contents)
    }
}
