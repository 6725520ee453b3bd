//! Core type definitions for the catalog.

use serde::{Deserialize, Serialize};

/// Attribute value types known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    /// Boolean value.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

impl AttributeType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeType::Int64 | AttributeType::Float64)
    }

    /// Check if this type carries an identity-like value that can be
    /// regenerated rather than copied.
    pub fn is_generated(&self) -> bool {
        matches!(self, AttributeType::Uuid | AttributeType::Timestamp)
    }
}
