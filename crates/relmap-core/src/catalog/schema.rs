//! Schema bundles: the set of types an adapter call works against.

use std::collections::HashSet;

use super::type_def::{TypeDef, ID_COLUMN};
use super::types::ScalarKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A complete schema: all type definitions a call may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Type definitions.
    pub types: Vec<TypeDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type to the schema.
    pub fn with_type(mut self, type_def: TypeDef) -> Self {
        self.types.push(type_def);
        self
    }

    /// Parse a schema document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSchema(e.to_string()))
    }

    /// Get a type by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Get a type by name, failing with [`Error::UnknownType`].
    pub fn require_type(&self, name: &str) -> Result<&TypeDef> {
        self.get_type(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// List all type names.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// Check structural rules that table derivation relies on.
    pub fn validate(&self) -> Result<()> {
        let mut type_names = HashSet::new();
        for type_def in &self.types {
            check_identifier(&type_def.name)?;
            if ScalarKind::from_name(&type_def.name).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "type name '{}' is reserved for a scalar kind",
                    type_def.name
                )));
            }
            if !type_names.insert(type_def.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate type '{}'",
                    type_def.name
                )));
            }
        }

        let mut side_tables = HashSet::new();
        for type_def in &self.types {
            let mut property_names = HashSet::new();
            for property in &type_def.properties {
                check_identifier(&property.name)?;
                if property.name == ID_COLUMN {
                    return Err(Error::InvalidSchema(format!(
                        "property '{}.{}' shadows the identity column",
                        type_def.name, property.name
                    )));
                }
                if !property_names.insert(property.name.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "duplicate property '{}.{}'",
                        type_def.name, property.name
                    )));
                }
                if let Some(target) = property.referenced_type() {
                    if !type_names.contains(target) {
                        return Err(Error::UnknownType(target.to_string()));
                    }
                }
                if property.is_array() {
                    let side_table = type_def.side_table_name(&property.name);
                    if type_names.contains(side_table.as_str()) {
                        return Err(Error::InvalidSchema(format!(
                            "side table '{}' collides with a declared type",
                            side_table
                        )));
                    }
                    if !side_tables.insert(side_table) {
                        return Err(Error::InvalidSchema(format!(
                            "side table '{}.{}' collides with another side table",
                            type_def.name, property.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Names become table and column identifiers, so keep them plain.
fn check_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidSchema(format!("invalid identifier '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PropertyDef;

    fn pets_schema() -> Schema {
        Schema::new()
            .with_type(
                TypeDef::new("User")
                    .with_property(PropertyDef::scalar("name", ScalarKind::String))
                    .with_property(PropertyDef::array_reference("pets", "Pet")),
            )
            .with_type(TypeDef::new("Pet").with_property(PropertyDef::scalar("name", ScalarKind::String)))
    }

    #[test]
    fn test_valid_schema() {
        let schema = pets_schema();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.type_names(), vec!["User", "Pet"]);
        assert!(schema.require_type("Pet").is_ok());
        assert!(matches!(
            schema.require_type("Dog"),
            Err(Error::UnknownType(name)) if name == "Dog"
        ));
    }

    #[test]
    fn test_from_json() {
        let schema = Schema::from_json(
            r#"{"types": [
                {"name": "User", "properties": [
                    {"name": "name", "type": "String", "uniq": true},
                    {"name": "pets", "type": ["Pet"]}
                ]},
                {"name": "Pet", "properties": [{"name": "name", "type": "String"}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(schema, {
            let mut expected = pets_schema();
            expected.types[0].properties[0].uniq = true;
            expected
        });
    }

    #[test]
    fn test_reject_unknown_reference() {
        let schema = Schema::new().with_type(
            TypeDef::new("User").with_property(PropertyDef::reference("owner", "Person")),
        );
        assert!(matches!(schema.validate(), Err(Error::UnknownType(name)) if name == "Person"));
    }

    #[test]
    fn test_reject_duplicates_and_reserved_names() {
        let duplicate_type = pets_schema().with_type(TypeDef::new("Pet"));
        assert!(matches!(duplicate_type.validate(), Err(Error::InvalidSchema(_))));

        let scalar_name = Schema::new().with_type(TypeDef::new("String"));
        assert!(matches!(scalar_name.validate(), Err(Error::InvalidSchema(_))));

        let id_property = Schema::new()
            .with_type(TypeDef::new("User").with_property(PropertyDef::scalar("id", ScalarKind::Integer)));
        assert!(matches!(id_property.validate(), Err(Error::InvalidSchema(_))));

        let bad_identifier = Schema::new().with_type(TypeDef::new("user table"));
        assert!(matches!(bad_identifier.validate(), Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_reject_side_table_collision() {
        let schema = pets_schema().with_type(TypeDef::new("User_pets"));
        assert!(matches!(schema.validate(), Err(Error::InvalidSchema(msg)) if msg.contains("User_pets")));
    }

    #[test]
    fn test_reject_colliding_side_tables() {
        let schema = Schema::new()
            .with_type(TypeDef::new("A").with_property(PropertyDef::array_scalar("b_c", ScalarKind::Integer)))
            .with_type(TypeDef::new("A_b").with_property(PropertyDef::array_scalar("c", ScalarKind::Integer)));

        assert!(matches!(
            schema.validate(),
            Err(Error::InvalidSchema(msg)) if msg.contains("A_b.c")
        ));
    }
}
