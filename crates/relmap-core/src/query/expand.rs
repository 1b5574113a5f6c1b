//! Expand requests: relations embedded into list results.

use crate::catalog::{PropertyDef, PropertyType, ScalarKind, Schema, TypeDef, ID_COLUMN};
use crate::error::Result;

use super::compose::expand_column;

/// A resolved expand request.
#[derive(Debug, Clone, Copy)]
pub struct Expand<'a> {
    /// Relation property on the listed type.
    pub property: &'a PropertyDef,
    /// Type the relation points at.
    pub target: &'a TypeDef,
    /// Whether the relation is an array (joined through its side table).
    pub to_many: bool,
}

impl<'a> Expand<'a> {
    /// Name of the expanded property.
    pub fn name(&self) -> &'a str {
        &self.property.name
    }

    /// Alias of the joined target table, `{targetType}_{propertyName}`.
    pub fn alias(&self) -> String {
        format!("{}_{}", self.target.name, self.property.name)
    }

    /// Target columns embedded in the result: `id` and every non-array property.
    pub fn fields(&self) -> Vec<(&'a str, ScalarKind)> {
        std::iter::once((ID_COLUMN, ScalarKind::Integer))
            .chain(
                self.target
                    .column_properties()
                    .map(|p| (p.name.as_str(), p.property_type.storage_kind())),
            )
            .collect()
    }

    /// Flat column carrying `field` of the embedded object.
    pub fn column(&self, field: &str) -> String {
        expand_column(&self.property.name, field)
    }
}

/// Resolve expand names against a type.
///
/// Names that are not declared, or that do not name a relation, are ignored;
/// repeated names are collapsed.
pub fn resolve_expands<'a>(
    schema: &'a Schema,
    type_def: &'a TypeDef,
    names: &[String],
) -> Result<Vec<Expand<'a>>> {
    let mut expands: Vec<Expand<'a>> = Vec::new();

    for name in names {
        if expands.iter().any(|e| e.name() == name) {
            continue;
        }

        let Some(property) = type_def.get_property(name) else {
            tracing::debug!(type_name = %type_def.name, expand = %name, "ignoring unknown expand");
            continue;
        };

        let Some(target) = property.referenced_type() else {
            tracing::debug!(type_name = %type_def.name, expand = %name, "ignoring expand of a scalar property");
            continue;
        };

        expands.push(Expand {
            property,
            target: schema.require_type(target)?,
            to_many: matches!(property.property_type, PropertyType::Array(_)),
        });
    }

    Ok(expands)
}
