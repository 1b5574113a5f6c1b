//! Storage engine collaborator boundary.
//!
//! The core decides *what* tables and statements are needed; an engine
//! decides how DDL is spelled and how statements run. Engines implement
//! [`SchemaEngine`] for table management and [`QueryEngine`] for reads and
//! writes.

use async_trait::async_trait;

use crate::catalog::ScalarKind;
use crate::error::EngineError;
use crate::sql::Statement;
use crate::Record;

/// Shape of a column requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Auto-incrementing integer primary key.
    Identity,
    /// Scalar column.
    Scalar(ScalarKind),
    /// Integer column holding the identifier of a row in another table.
    ForeignKey,
}

/// Action taken on referencing rows when the referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    /// Leave referencing rows alone (the engine rejects dangling references).
    NoAction,
    /// Propagate the change to referencing rows.
    Cascade,
}

/// Foreign key target of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
    /// Behaviour on delete of the referenced row.
    pub on_delete: ReferentialAction,
    /// Behaviour on update of the referenced key.
    pub on_update: ReferentialAction,
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Column shape.
    pub kind: ColumnKind,
    /// Unique constraint.
    pub unique: bool,
    /// Whether nulls are accepted.
    pub nullable: bool,
    /// Foreign key, if any.
    pub references: Option<ForeignKey>,
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name.
    pub name: String,
    /// Columns, in order.
    pub columns: Vec<ColumnSpec>,
}

/// Result of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Rows returned by a read.
    Rows(Vec<Record>),
    /// Identifier generated by an insert.
    Inserted(i64),
    /// Number of rows touched by an update or delete.
    Affected(u64),
}

/// Table management collaborator.
#[async_trait]
pub trait SchemaEngine: Send + Sync {
    /// Check whether a table exists.
    async fn table_exists(&self, name: &str) -> Result<bool, EngineError>;

    /// Create a table.
    async fn create_table(&self, table: &TableSpec) -> Result<(), EngineError>;
}

/// Statement execution collaborator.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Execute a statement.
    async fn execute(&self, statement: &Statement) -> Result<Outcome, EngineError>;
}

impl ColumnSpec {
    /// Auto-incrementing `id` column.
    pub fn identity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Identity,
            unique: false,
            nullable: false,
            references: None,
        }
    }

    /// Not-null, not-unique scalar column.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Scalar(kind),
            unique: false,
            nullable: false,
            references: None,
        }
    }

    /// Not-null integer column referencing `table.id`.
    pub fn foreign_key(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::ForeignKey,
            unique: false,
            nullable: false,
            references: Some(ForeignKey {
                table: table.into(),
                column: crate::catalog::ID_COLUMN.to_string(),
                on_delete: ReferentialAction::NoAction,
                on_update: ReferentialAction::NoAction,
            }),
        }
    }

    /// Set the unique constraint.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set nullability.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Cascade deletes and key updates of the referenced row.
    pub fn cascading(mut self) -> Self {
        if let Some(references) = self.references.as_mut() {
            references.on_delete = ReferentialAction::Cascade;
            references.on_update = ReferentialAction::Cascade;
        }
        self
    }
}

impl TableSpec {
    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl Outcome {
    /// Kind name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Rows(_) => "rows",
            Outcome::Inserted(_) => "inserted",
            Outcome::Affected(_) => "affected",
        }
    }
}
