//! Property definitions for types.

use super::types::{ElementType, PropertyType, ScalarKind};
use serde::{Deserialize, Serialize};

/// A property definition within a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property name (also the column name).
    pub name: String,
    /// Declared property type.
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Whether the column carries a unique constraint.
    #[serde(default)]
    pub uniq: bool,
    /// Whether the column accepts nulls.
    #[serde(default)]
    pub nullable: bool,
}

impl PropertyDef {
    /// Create a new property with default modifiers (not null, not unique).
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            uniq: false,
            nullable: false,
        }
    }

    /// Create a scalar property.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, PropertyType::Scalar(kind))
    }

    /// Create a to-one reference property.
    pub fn reference(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::reference(type_name))
    }

    /// Create an array-of-scalars property.
    pub fn array_scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, PropertyType::array_scalar(kind))
    }

    /// Create an array-of-references property.
    pub fn array_reference(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::array_reference(type_name))
    }

    /// Mark as unique.
    pub fn unique(mut self) -> Self {
        self.uniq = true;
        self
    }

    /// Mark as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Check if this property is stored in a side table.
    pub fn is_array(&self) -> bool {
        self.property_type.is_array()
    }

    /// Element type if this is an array property.
    pub fn element_type(&self) -> Option<&ElementType> {
        match &self.property_type {
            PropertyType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The type this property depends on, unwrapping one level of array.
    pub fn referenced_type(&self) -> Option<&str> {
        self.property_type.referenced_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_builder() {
        let email = PropertyDef::scalar("email", ScalarKind::String).unique();
        assert!(email.uniq);
        assert!(!email.nullable);
        assert!(!email.is_array());

        let owner = PropertyDef::reference("owner", "Person").nullable();
        assert!(owner.nullable);
        assert_eq!(owner.referenced_type(), Some("Person"));
        assert!(owner.element_type().is_none());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let property: PropertyDef =
            serde_json::from_str(r#"{"name": "pets", "type": ["Pet"]}"#).unwrap();
        assert_eq!(property.name, "pets");
        assert!(property.is_array());
        assert!(!property.uniq);
        assert!(!property.nullable);
        assert_eq!(
            property.element_type(),
            Some(&ElementType::Reference("Pet".into()))
        );
    }
}
