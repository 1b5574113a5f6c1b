//! Schema materialization.
//!
//! Every type gets a primary table named after it, and every array property
//! a side table `{Type}_{property}` holding one row per element. Tables are
//! requested in dependency order so referenced tables always exist first.
//! Existing tables are left alone.

use tracing::{debug, info};

use crate::catalog::{
    ElementType, PropertyDef, PropertyType, Schema, TypeDef, ID_COLUMN, VALUE_COLUMN,
};
use crate::engine::{ColumnSpec, SchemaEngine, TableSpec};
use crate::error::{Error, Result};
use crate::resolve::TypeGraph;

/// Tables touched by a materialization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Tables created, in creation order.
    pub created: Vec<String>,
    /// Tables that already existed.
    pub skipped: Vec<String>,
}

impl MaterializeReport {
    fn record(&mut self, table: String, created: bool) {
        if created {
            self.created.push(table);
        } else {
            self.skipped.push(table);
        }
    }
}

/// Primary table of a type: identity `id` plus one column per non-array
/// property.
pub fn table_spec(type_def: &TypeDef) -> Result<TableSpec> {
    let mut columns = vec![ColumnSpec::identity(ID_COLUMN)];

    for property in type_def.column_properties() {
        let column = match &property.property_type {
            PropertyType::Scalar(kind) => ColumnSpec::scalar(&property.name, *kind),
            PropertyType::Reference(target) => ColumnSpec::foreign_key(&property.name, target),
            PropertyType::Array(_) => {
                return Err(Error::InvalidSchema(format!(
                    "array property '{}' has no column on '{}'",
                    property.name, type_def.name
                )))
            }
        };
        columns.push(column.with_unique(property.uniq).with_nullable(property.nullable));
    }

    Ok(TableSpec {
        name: type_def.name.clone(),
        columns,
    })
}

/// Side table of an array property: identity `id`, an owner column named
/// after the type, and a `value` column.
pub fn side_table_spec(type_def: &TypeDef, property: &PropertyDef) -> Result<TableSpec> {
    let value = match property.element_type() {
        Some(ElementType::Scalar(kind)) => ColumnSpec::scalar(VALUE_COLUMN, *kind),
        Some(ElementType::Reference(target)) => ColumnSpec::foreign_key(VALUE_COLUMN, target),
        None => {
            return Err(Error::InvalidSchema(format!(
                "property '{}' on '{}' is not an array",
                property.name, type_def.name
            )))
        }
    };

    Ok(TableSpec {
        name: type_def.side_table_name(&property.name),
        columns: vec![
            ColumnSpec::identity(ID_COLUMN),
            ColumnSpec::foreign_key(&type_def.name, &type_def.name).cascading(),
            value,
        ],
    })
}

/// Materialize every type of the schema.
///
/// The schema is validated and the full creation order computed before any
/// table is requested, so a cyclic or dangling schema issues no DDL at all.
/// Engine failures propagate as they are; tables created before the failure
/// stay.
pub async fn materialize<E>(engine: &E, schema: &Schema) -> Result<MaterializeReport>
where
    E: SchemaEngine + ?Sized,
{
    schema.validate()?;
    let order = TypeGraph::new(schema).resolve()?;

    let mut report = MaterializeReport::default();
    for type_def in order {
        let created = ensure_table(engine, table_spec(type_def)?).await?;
        report.record(type_def.name.clone(), created);

        for property in type_def.array_properties() {
            let spec = side_table_spec(type_def, property)?;
            let name = spec.name.clone();
            let created = ensure_table(engine, spec).await?;
            report.record(name, created);
        }
    }

    Ok(report)
}

async fn ensure_table<E>(engine: &E, spec: TableSpec) -> Result<bool>
where
    E: SchemaEngine + ?Sized,
{
    if engine.table_exists(&spec.name).await? {
        debug!(table = %spec.name, "table exists, skipping");
        return Ok(false);
    }

    engine.create_table(&spec).await?;
    info!(table = %spec.name, columns = spec.columns.len(), "created table");
    Ok(true)
}
