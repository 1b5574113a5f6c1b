//! `CREATE TABLE` rendering.

use relmap_core::engine::{ColumnKind, ColumnSpec, ReferentialAction, TableSpec};
use relmap_core::sql::quote_ident;
use relmap_core::ScalarKind;

use crate::error::{Error, Result};

/// Declared SQLite type of a scalar kind.
pub fn column_type(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Integer => "INTEGER",
        ScalarKind::String => "VARCHAR(255)",
        ScalarKind::Text => "TEXT",
        ScalarKind::Date => "DATE",
        ScalarKind::Float => "REAL",
        ScalarKind::Boolean => "BOOLEAN",
    }
}

fn action(action: ReferentialAction) -> &'static str {
    match action {
        ReferentialAction::NoAction => "NO ACTION",
        ReferentialAction::Cascade => "CASCADE",
    }
}

/// Check that a name is a plain identifier before it reaches DDL.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

fn column_definition(column: &ColumnSpec) -> Result<String> {
    validate_identifier(&column.name)?;
    let mut sql = quote_ident(&column.name);

    match column.kind {
        ColumnKind::Identity => {
            sql.push_str(" INTEGER PRIMARY KEY AUTOINCREMENT");
            return Ok(sql);
        }
        ColumnKind::Scalar(kind) => {
            sql.push(' ');
            sql.push_str(column_type(kind));
        }
        ColumnKind::ForeignKey => sql.push_str(" INTEGER"),
    }

    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }

    if let Some(references) = &column.references {
        validate_identifier(&references.table)?;
        validate_identifier(&references.column)?;
        sql.push_str(&format!(
            " REFERENCES {}({}) ON DELETE {} ON UPDATE {}",
            quote_ident(&references.table),
            quote_ident(&references.column),
            action(references.on_delete),
            action(references.on_update),
        ));
    }

    Ok(sql)
}

/// Render the `CREATE TABLE` statement of a table.
pub fn create_table_sql(table: &TableSpec) -> Result<String> {
    validate_identifier(&table.name)?;

    let columns = table
        .columns
        .iter()
        .map(column_definition)
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "CREATE TABLE {} ({})",
        quote_ident(&table.name),
        columns.join(", ")
    ))
}
