//! Resource data passed between the engine and resources

use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity and attributes of one resource instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Remote identity, unset until the resource exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(default)]
    attributes: Map<String, Value>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Get a string attribute, `None` when unset or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Get a string attribute that must be present
    pub fn require_str(&self, key: &str) -> Result<&str> {
        match self.attributes.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ProviderError::InvalidAttribute {
                name: key.to_string(),
                message: format!("expected a string, got {}", other),
            }),
            None => Err(ProviderError::MissingAttribute(key.to_string())),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .insert(key.into(), Value::String(value.into()));
    }

    /// Overwrite attributes with the given values, keeping the others
    pub fn merge(&mut self, attributes: &Map<String, Value>) {
        for (key, value) in attributes {
            self.attributes.insert(key.clone(), value.clone());
        }
    }

    /// Whether every given attribute already has the same value here
    pub fn matches(&self, attributes: &Map<String, Value>) -> bool {
        attributes
            .iter()
            .all(|(key, value)| self.attributes.get(key) == Some(value))
    }
}
