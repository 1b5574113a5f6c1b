//! Core type definitions for the catalog.

use serde::{Deserialize, Serialize};

/// Scalar kinds a property (or an array element) can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Signed integer.
    Integer,
    /// Short string.
    String,
    /// Unbounded text.
    Text,
    /// Calendar date.
    Date,
    /// Floating point number.
    Float,
    /// Boolean value.
    Boolean,
}

/// Element type of an array property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// Array of scalar values.
    Scalar(ScalarKind),
    /// Array of references to another type, by type name.
    Reference(String),
}

/// Declared type of a property.
///
/// Serialized the way schema documents spell it: a scalar kind name
/// (`"String"`), a type name (`"Pet"`) or a one-element list of either
/// (`["Pet"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPropertyType", into = "RawPropertyType")]
pub enum PropertyType {
    /// A scalar column.
    Scalar(ScalarKind),
    /// A to-one relation, by type name.
    Reference(String),
    /// A to-many relation stored in a side table.
    Array(ElementType),
}

impl ScalarKind {
    /// All scalar kinds, in declaration order.
    pub const ALL: [ScalarKind; 6] = [
        ScalarKind::Integer,
        ScalarKind::String,
        ScalarKind::Text,
        ScalarKind::Date,
        ScalarKind::Float,
        ScalarKind::Boolean,
    ];

    /// Name of the kind as written in schema documents.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Integer => "Integer",
            ScalarKind::String => "String",
            ScalarKind::Text => "Text",
            ScalarKind::Date => "Date",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
        }
    }

    /// Look up a kind by its schema name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Check if this kind is numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Float)
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl ElementType {
    /// Parse an element from its schema spelling.
    fn parse(name: String) -> Self {
        match ScalarKind::from_name(&name) {
            Some(kind) => ElementType::Scalar(kind),
            None => ElementType::Reference(name),
        }
    }

    fn spelling(&self) -> String {
        match self {
            ElementType::Scalar(kind) => kind.name().to_string(),
            ElementType::Reference(name) => name.clone(),
        }
    }

    /// Referenced type name, if the element is an object reference.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            ElementType::Scalar(_) => None,
            ElementType::Reference(name) => Some(name),
        }
    }

    /// Scalar kind used to store the element in the side table's `value` column.
    ///
    /// References are stored as integer identifiers.
    pub fn storage_kind(&self) -> ScalarKind {
        match self {
            ElementType::Scalar(kind) => *kind,
            ElementType::Reference(_) => ScalarKind::Integer,
        }
    }
}

impl PropertyType {
    /// Create a scalar property type.
    pub fn scalar(kind: ScalarKind) -> Self {
        PropertyType::Scalar(kind)
    }

    /// Create a to-one reference property type.
    pub fn reference(type_name: impl Into<String>) -> Self {
        PropertyType::Reference(type_name.into())
    }

    /// Create an array-of-scalars property type.
    pub fn array_scalar(kind: ScalarKind) -> Self {
        PropertyType::Array(ElementType::Scalar(kind))
    }

    /// Create an array-of-references property type.
    pub fn array_reference(type_name: impl Into<String>) -> Self {
        PropertyType::Array(ElementType::Reference(type_name.into()))
    }

    /// Check if this type is stored in a side table.
    pub fn is_array(&self) -> bool {
        matches!(self, PropertyType::Array(_))
    }

    /// The type this property depends on, unwrapping one level of array.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            PropertyType::Scalar(_) => None,
            PropertyType::Reference(name) => Some(name),
            PropertyType::Array(element) => element.referenced_type(),
        }
    }

    /// Scalar kind of the values a filter on this property compares against.
    pub fn storage_kind(&self) -> ScalarKind {
        match self {
            PropertyType::Scalar(kind) => *kind,
            PropertyType::Reference(_) => ScalarKind::Integer,
            PropertyType::Array(element) => element.storage_kind(),
        }
    }
}

/// Wire spelling of [`PropertyType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPropertyType {
    Single(String),
    List(Vec<String>),
}

impl TryFrom<RawPropertyType> for PropertyType {
    type Error = String;

    fn try_from(raw: RawPropertyType) -> Result<Self, Self::Error> {
        match raw {
            RawPropertyType::Single(name) => Ok(match ScalarKind::from_name(&name) {
                Some(kind) => PropertyType::Scalar(kind),
                None => PropertyType::Reference(name),
            }),
            RawPropertyType::List(mut names) => {
                if names.len() != 1 {
                    return Err(format!(
                        "array property type must have exactly one element, got {}",
                        names.len()
                    ));
                }
                Ok(PropertyType::Array(ElementType::parse(names.remove(0))))
            }
        }
    }
}

impl From<PropertyType> for RawPropertyType {
    fn from(property_type: PropertyType) -> Self {
        match property_type {
            PropertyType::Scalar(kind) => RawPropertyType::Single(kind.name().to_string()),
            PropertyType::Reference(name) => RawPropertyType::Single(name),
            PropertyType::Array(element) => RawPropertyType::List(vec![element.spelling()]),
        }
    }
}
