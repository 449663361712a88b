// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authored property values and the descriptor tables runtime nodes expose.

use serde::{Deserialize, Serialize};

/// Value of an authored node property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// String
    String(String),
    /// List of strings
    StringList(Vec<String>),
}

impl PropertyValue {
    /// Get the property type for this value
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Bool(_) => PropertyType::Bool,
            Self::Int(_) => PropertyType::Int,
            Self::Float(_) => PropertyType::Float,
            Self::String(_) => PropertyType::String,
            Self::StringList(_) => PropertyType::StringList,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}

/// Type of a property slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// String
    String,
    /// List of strings
    StringList,
    /// Pin slot written by the compiler
    Pin,
}

/// Entry in a runtime node type's property table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: &'static str,
    /// Value type
    pub property_type: PropertyType,
    /// Hidden properties are never authored and are not copied
    pub hidden: bool,
}

impl PropertyDescriptor {
    /// Describe a user-editable property
    pub const fn new(name: &'static str, property_type: PropertyType) -> Self {
        Self {
            name,
            property_type,
            hidden: false,
        }
    }

    /// Describe the hidden property backing a pin
    pub const fn pin(name: &'static str) -> Self {
        Self {
            name,
            property_type: PropertyType::Pin,
            hidden: true,
        }
    }
}

/// Error when reading or writing a runtime node property
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    /// No property with this name
    #[error("Unknown property '{0}'")]
    Unknown(String),

    /// Property exists but is written only by the compiler
    #[error("Property '{0}' is hidden")]
    Hidden(String),

    /// Value has the wrong type
    #[error("Property '{name}' expects {expected:?}, got {found:?}")]
    TypeMismatch {
        /// Property name
        name: String,
        /// Declared type
        expected: PropertyType,
        /// Type of the supplied value
        found: PropertyType,
    },

    /// Value has the right type but is not allowed
    #[error("Invalid value for property '{name}': {reason}")]
    InvalidValue {
        /// Property name
        name: String,
        /// What was wrong
        reason: String,
    },
}

impl PropertyError {
    pub(crate) fn mismatch(name: &str, expected: PropertyType, value: &PropertyValue) -> Self {
        Self::TypeMismatch {
            name: name.to_string(),
            expected,
            found: value.property_type(),
        }
    }
}

/// Typed extraction used by runtime node setters
pub(crate) trait FromProperty: Sized {
    fn from_property(name: &str, value: PropertyValue) -> Result<Self, PropertyError>;
}

impl FromProperty for bool {
    fn from_property(name: &str, value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Bool(v) => Ok(v),
            other => Err(PropertyError::mismatch(name, PropertyType::Bool, &other)),
        }
    }
}

impl FromProperty for f32 {
    fn from_property(name: &str, value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Float(v) => Ok(v),
            // integers widen silently, the property grid stores whole numbers as Int
            PropertyValue::Int(v) => Ok(v as f32),
            other => Err(PropertyError::mismatch(name, PropertyType::Float, &other)),
        }
    }
}

impl FromProperty for i32 {
    fn from_property(name: &str, value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Int(v) => Ok(v),
            other => Err(PropertyError::mismatch(name, PropertyType::Int, &other)),
        }
    }
}

impl FromProperty for String {
    fn from_property(name: &str, value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::String(v) => Ok(v),
            other => Err(PropertyError::mismatch(name, PropertyType::String, &other)),
        }
    }
}

impl FromProperty for Vec<String> {
    fn from_property(name: &str, value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::StringList(v) => Ok(v),
            other => Err(PropertyError::mismatch(name, PropertyType::StringList, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_accepts_int() {
        assert_eq!(f32::from_property("Speed", PropertyValue::Int(2)), Ok(2.0));
    }

    #[test]
    fn test_mismatch_reports_types() {
        let err = bool::from_property("Loop", PropertyValue::from("yes")).unwrap_err();
        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                name: "Loop".to_string(),
                expected: PropertyType::Bool,
                found: PropertyType::String,
            }
        );
    }
}
