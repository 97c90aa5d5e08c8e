//! Manifest of desired resources
//!
//! ```yaml
//! resources:
//!   - type: safetorun_organisation
//!     name: acme
//!     attributes:
//!       organisation_id: acme
//!       organisation_name: Acme Ltd
//!       admin_email: admin@acme.io
//!
//! data:
//!   - type: safetorun_organisation
//!     name: shared
//!     attributes:
//!       organisation_id: shared-services
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<ResourceBlock>,

    /// Existing objects that are looked up, never managed
    #[serde(default)]
    pub data: Vec<ResourceBlock>,
}

/// One declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBlock {
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Local name, unique per type
    pub name: String,

    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ResourceBlock {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            attributes: serde_json::Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), serde_json::Value::String(value.into()));
        self
    }

    /// Get the block key (type.name)
    pub fn key(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

impl Manifest {
    /// Parse and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest = Self::parse(&content).map_err(|e| match e {
            ConfigError::Yaml(e) => ConfigError::InvalidManifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
            ConfigError::InvalidManifest { message, .. } => ConfigError::InvalidManifest {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        tracing::debug!(
            "Loaded manifest {} with {} resources",
            path.display(),
            manifest.resources.len()
        );
        Ok(manifest)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let manifest: Manifest = serde_yaml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        Self::validate_blocks(&self.resources, "resource")?;
        Self::validate_blocks(&self.data, "data source")
    }

    fn validate_blocks(blocks: &[ResourceBlock], kind: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for block in blocks {
            if block.resource_type.trim().is_empty() || block.name.trim().is_empty() {
                return Err(ConfigError::InvalidManifest {
                    path: Default::default(),
                    message: format!("every {} needs a type and a name", kind),
                });
            }
            if !seen.insert(block.key()) {
                return Err(ConfigError::InvalidManifest {
                    path: Default::default(),
                    message: format!("duplicate {} {}", kind, block.key()),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ResourceBlock> {
        self.resources.iter().find(|b| b.key() == key)
    }

    /// Get a data source block by key (type.name)
    pub fn get_data(&self, key: &str) -> Option<&ResourceBlock> {
        self.data.iter().find(|b| b.key() == key)
    }
}
