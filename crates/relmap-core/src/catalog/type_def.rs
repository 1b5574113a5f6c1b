//! Type definitions.

use super::property::PropertyDef;
use serde::{Deserialize, Serialize};

/// Name of the identity column every primary table carries.
pub const ID_COLUMN: &str = "id";

/// Name of the element column of every side table.
pub const VALUE_COLUMN: &str = "value";

/// A type definition (primary table schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Type name (unique within schema, also the primary table name).
    pub name: String,
    /// Property definitions, in column order.
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

impl TypeDef {
    /// Create a new type definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property to the type.
    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Add multiple properties.
    pub fn with_properties(mut self, properties: impl IntoIterator<Item = PropertyDef>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Get a property by name.
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties stored as columns of the primary table.
    pub fn column_properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.iter().filter(|p| !p.is_array())
    }

    /// Properties stored in side tables.
    pub fn array_properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.iter().filter(|p| p.is_array())
    }

    /// Name of the side table holding the elements of `property`.
    pub fn side_table_name(&self, property: &str) -> String {
        format!("{}_{}", self.name, property)
    }

    /// Distinct types this type depends on, excluding itself, in first-seen order.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        for name in self.properties.iter().filter_map(|p| p.referenced_type()) {
            if name != self.name && !deps.contains(&name) {
                deps.push(name);
            }
        }
        deps
    }
}
