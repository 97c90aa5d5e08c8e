//! Resource schema definitions

use crate::error::{ProviderError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
}

/// A single schema attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub attribute_type: AttributeType,

    /// Must be set in configuration
    pub required: bool,

    /// Set by the provider, never by configuration
    pub computed: bool,

    pub description: &'static str,
}

impl Attribute {
    pub fn required_string(description: &'static str) -> Self {
        Self {
            attribute_type: AttributeType::String,
            required: true,
            computed: false,
            description,
        }
    }

    pub fn computed_string(description: &'static str) -> Self {
        Self {
            attribute_type: AttributeType::String,
            required: false,
            computed: true,
            description,
        }
    }
}

/// Attributes accepted by a resource or data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Check configuration values against the schema
    ///
    /// Required attributes must be present, every value must be known to the
    /// schema, have the right type, and computed attributes may not be set.
    pub fn validate(&self, config: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
        for (name, attribute) in &self.attributes {
            if attribute.required && !config.contains_key(*name) {
                return Err(ProviderError::MissingAttribute(name.to_string()));
            }
        }

        for (name, value) in config {
            let attribute = self.get(name).ok_or_else(|| ProviderError::InvalidAttribute {
                name: name.clone(),
                message: "not part of the schema".to_string(),
            })?;

            if attribute.computed {
                return Err(ProviderError::InvalidAttribute {
                    name: name.clone(),
                    message: "computed attributes cannot be configured".to_string(),
                });
            }

            match attribute.attribute_type {
                AttributeType::String if !value.is_string() => {
                    return Err(ProviderError::InvalidAttribute {
                        name: name.clone(),
                        message: format!("expected a string, got {}", value),
                    });
                }
                AttributeType::String => {}
            }
        }

        Ok(())
    }
}
