//! Insert, update and remove.
//!
//! A record is split into base attributes, stored as columns of the primary
//! table, and array attributes, stored as rows of side tables. Array
//! attributes are always replaced as a whole: existing side rows are deleted
//! before the new elements are inserted. The two steps are not atomic.

use serde_json::Value;
use tracing::debug;

use crate::catalog::{PropertyDef, TypeDef, ID_COLUMN, VALUE_COLUMN};
use crate::engine::{Outcome, QueryEngine};
use crate::error::{Error, Result};
use crate::sql::{ColumnRef, CompareOp, Delete, Insert, Predicate, Statement, Update};
use crate::Record;

/// A record split along the storage layout of its type.
#[derive(Debug, Default, PartialEq)]
struct SplitRecord<'a> {
    base: Vec<(&'a str, Value)>,
    arrays: Vec<(&'a str, Vec<Value>)>,
}

/// Keep declared properties only and split them into columns and arrays.
fn split<'a>(type_def: &'a TypeDef, data: &Record) -> Result<SplitRecord<'a>> {
    let mut record = SplitRecord::default();

    for property in &type_def.properties {
        let Some(value) = data.get(&property.name) else {
            continue;
        };

        if property.is_array() {
            record.arrays.push((property.name.as_str(), array_elements(property, value)?));
        } else {
            check_scalar(property, value)?;
            record.base.push((property.name.as_str(), value.clone()));
        }
    }

    Ok(record)
}

fn array_elements(property: &PropertyDef, value: &Value) -> Result<Vec<Value>> {
    let elements = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(elements) => elements,
        _ => {
            return Err(Error::InvalidValue {
                property: property.name.clone(),
                reason: "expected an array".into(),
            })
        }
    };

    for element in elements {
        check_scalar(property, element)?;
    }
    Ok(elements.clone())
}

fn check_scalar(property: &PropertyDef, value: &Value) -> Result<()> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(Error::InvalidValue {
            property: property.name.clone(),
            reason: "expected a scalar value".into(),
        }),
        _ => Ok(()),
    }
}

fn id_equals(table: &str, column: &str, id: i64) -> Predicate {
    Predicate::Compare {
        column: ColumnRef::new(table, column),
        op: CompareOp::Eq,
        value: Value::from(id),
    }
}

/// Insert a new object (`id` is `None`) or update an existing one.
///
/// Undeclared attributes, `id` included, are dropped. Returns the assigned
/// or given identifier as a one-element vector.
pub async fn upsert<E>(engine: &E, type_def: &TypeDef, id: Option<i64>, data: &Record) -> Result<Vec<i64>>
where
    E: QueryEngine + ?Sized,
{
    let record = split(type_def, data)?;
    let (columns, values): (Vec<String>, Vec<Value>) = record
        .base
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .unzip();

    let id = match id {
        None => {
            let insert = Statement::Insert(Insert {
                table: type_def.name.clone(),
                columns,
                rows: vec![values],
            });
            match engine.execute(&insert).await? {
                Outcome::Inserted(id) => id,
                _ => return Err(Error::UnexpectedOutcome { expected: "inserted" }),
            }
        }
        Some(id) if columns.is_empty() => id,
        Some(id) => {
            let update = Statement::Update(Update {
                table: type_def.name.clone(),
                assignments: columns.into_iter().zip(values).collect(),
                predicates: vec![id_equals(&type_def.name, ID_COLUMN, id)],
            });
            expect_affected(engine.execute(&update).await?)?;
            id
        }
    };

    for (property, elements) in record.arrays {
        replace_elements(engine, type_def, property, id, elements).await?;
    }

    debug!(type_name = %type_def.name, id, "stored object");
    Ok(vec![id])
}

async fn replace_elements<E>(
    engine: &E,
    type_def: &TypeDef,
    property: &str,
    id: i64,
    elements: Vec<Value>,
) -> Result<()>
where
    E: QueryEngine + ?Sized,
{
    let table = type_def.side_table_name(property);
    let owner = type_def.name.as_str();

    let delete = Statement::Delete(Delete {
        table: table.clone(),
        predicates: vec![id_equals(&table, owner, id)],
    });
    expect_affected(engine.execute(&delete).await?)?;

    if elements.is_empty() {
        return Ok(());
    }

    let count = elements.len();
    let insert = Statement::Insert(Insert {
        table: table.clone(),
        columns: vec![owner.to_string(), VALUE_COLUMN.to_string()],
        rows: elements
            .into_iter()
            .map(|element| vec![Value::from(id), element])
            .collect(),
    });
    match engine.execute(&insert).await? {
        Outcome::Inserted(_) | Outcome::Affected(_) => {}
        Outcome::Rows(_) => return Err(Error::UnexpectedOutcome { expected: "inserted" }),
    }

    debug!(table = %table, id, count, "replaced array elements");
    Ok(())
}

/// Delete the object with the given id. Side rows go with it through the
/// cascading owner key.
pub async fn remove<E>(engine: &E, type_def: &TypeDef, id: i64) -> Result<u64>
where
    E: QueryEngine + ?Sized,
{
    let delete = Statement::Delete(Delete {
        table: type_def.name.clone(),
        predicates: vec![id_equals(&type_def.name, ID_COLUMN, id)],
    });
    let affected = expect_affected(engine.execute(&delete).await?)?;

    debug!(type_name = %type_def.name, id, affected, "removed object");
    Ok(affected)
}

fn expect_affected(outcome: Outcome) -> Result<u64> {
    match outcome {
        Outcome::Affected(count) => Ok(count),
        _ => Err(Error::UnexpectedOutcome { expected: "affected" }),
    }
}
