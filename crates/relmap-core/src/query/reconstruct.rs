//! Rebuilding nested objects from flat joined rows.
//!
//! Rows come back one per (object, array element, ...) combination. They are
//! grouped by `id` in first-appearance order and folded into one object each:
//!
//! - column properties are read from the group's first row;
//! - an expanded to-one relation becomes a nested object, or is left out when
//!   the foreign key is null;
//! - array properties collect one element per distinct side-table row, which
//!   undoes the multiplication caused by joining several side tables. Scalar
//!   elements keep literal duplicates; expanded object elements are
//!   deduplicated by their `id`, and an expanded relation with no elements is
//!   left out.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::catalog::{PropertyType, TypeDef, ID_COLUMN};
use crate::Record;

use super::compose::row_column;
use super::expand::Expand;

/// Fold flat rows into one object per `id`.
pub fn reconstruct(rows: Vec<Record>, type_def: &TypeDef, expands: &[Expand<'_>]) -> Vec<Record> {
    group_by_id(rows)
        .into_iter()
        .map(|group| merge_group(&group, type_def, expands))
        .collect()
}

/// Group rows by their `id` column, keeping first-appearance order.
fn group_by_id(rows: Vec<Record>) -> Vec<Vec<Record>> {
    let mut groups: Vec<Vec<Record>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = row.get(ID_COLUMN).map(Value::to_string).unwrap_or_default();
        match index.get(&key) {
            Some(&i) => groups[i].push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![row]);
            }
        }
    }

    groups
}

fn merge_group(group: &[Record], type_def: &TypeDef, expands: &[Expand<'_>]) -> Record {
    let mut object = Map::new();
    let Some(first) = group.first() else {
        return object;
    };

    object.insert(ID_COLUMN.to_string(), column(first, ID_COLUMN));

    for property in &type_def.properties {
        let name = property.name.as_str();
        let expand = expands.iter().find(|e| e.name() == name);

        match (&property.property_type, expand) {
            (PropertyType::Array(_), expand) => {
                let elements = collect_elements(group, name, expand);
                if expand.is_none() || !elements.is_empty() {
                    object.insert(name.to_string(), Value::Array(elements));
                }
            }
            (_, Some(expand)) => {
                if let Some(nested) = nested_object(first, expand) {
                    object.insert(name.to_string(), Value::Object(nested));
                }
            }
            (_, None) => {
                object.insert(name.to_string(), column(first, name));
            }
        }
    }

    object
}

/// One element per distinct side-table row of `property`.
fn collect_elements(group: &[Record], property: &str, expand: Option<&Expand<'_>>) -> Vec<Value> {
    let row_key = row_column(property);
    let mut seen_rows: HashSet<String> = HashSet::new();
    let mut seen_objects: HashSet<String> = HashSet::new();
    let mut elements = Vec::new();

    for row in group {
        // A null side row id is the single padding row of an empty relation.
        let side_row = column(row, &row_key);
        if side_row.is_null() || !seen_rows.insert(side_row.to_string()) {
            continue;
        }

        match expand {
            Some(expand) => {
                let Some(nested) = nested_object(row, expand) else {
                    continue;
                };
                let object_id = nested.get(ID_COLUMN).map(Value::to_string).unwrap_or_default();
                if seen_objects.insert(object_id) {
                    elements.push(Value::Object(nested));
                }
            }
            None => elements.push(column(row, property)),
        }
    }

    elements
}

/// Collapse the expand columns of `expand` into an object; `None` when the
/// related row is missing.
fn nested_object(row: &Record, expand: &Expand<'_>) -> Option<Map<String, Value>> {
    let id = column(row, &expand.column(ID_COLUMN));
    if id.is_null() {
        return None;
    }

    Some(
        expand
            .fields()
            .into_iter()
            .map(|(field, _)| (field.to_string(), column(row, &expand.column(field))))
            .collect(),
    )
}

fn column(row: &Record, name: &str) -> Value {
    row.get(name).cloned().unwrap_or(Value::Null)
}
