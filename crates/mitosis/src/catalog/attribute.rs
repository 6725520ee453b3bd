//! Attribute definitions for entities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::AttributeType;
use crate::value::Value;

/// An attribute definition within an entity.
///
/// Annotations are free-form string pairs read by the cloner to decide how the
/// attribute's value is carried over to a copy (exclude, regenerate, inherit
/// from the parent in the copy chain). Unknown annotation keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name (unique within the entity).
    pub name: String,
    /// Attribute value type.
    pub attribute_type: AttributeType,
    /// Whether the attribute must hold a value.
    pub required: bool,
    /// Default value applied when the attribute is left unset.
    #[serde(default)]
    pub default: Option<Value>,
    /// Annotation map (string key -> string value).
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

impl AttributeDef {
    /// Create a new required attribute.
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            required: true,
            default: None,
            annotations: HashMap::new(),
        }
    }

    /// Create an optional attribute (required = false).
    pub fn optional(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            required: false,
            default: None,
            annotations: HashMap::new(),
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Attach an annotation.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Check if this attribute has a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Look up an annotation value by key.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(|s| s.as_str())
    }

    /// Check whether an annotation key is present, regardless of its value.
    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains_key(key)
    }

    /// Whether the attribute may legally be left without an explicit value.
    pub fn can_be_blank(&self) -> bool {
        !self.required || self.default.is_some()
    }
}
