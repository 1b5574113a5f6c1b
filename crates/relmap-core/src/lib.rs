//! relmap core - schema materialization, query composition and result
//! reconstruction.
//!
//! A [`Schema`] of object types is mapped onto relational tables: one primary
//! table per type and one side table per array property. The [`Adapter`]
//! creates those tables and runs list/get/insert/update/remove against any
//! engine implementing [`SchemaEngine`] and [`QueryEngine`].

pub mod adapter;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod materialize;
pub mod query;
pub mod resolve;
pub mod sql;
pub mod write;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// A row or object: column/property names to JSON values, in insertion order.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub use adapter::Adapter;
pub use catalog::{ElementType, PropertyDef, PropertyType, ScalarKind, Schema, TypeDef};
pub use engine::{ColumnKind, ColumnSpec, ForeignKey, Outcome, QueryEngine, ReferentialAction, SchemaEngine, TableSpec};
pub use error::{
    ClientError, ConstraintError, ConstraintViolation, EngineError, Error, ErrorBody, Result, UnknownError,
};
pub use materialize::MaterializeReport;
pub use query::{ListQuery, DEFAULT_LIMIT};
pub use resolve::TypeGraph;
pub use sql::{OutputColumn, Statement};
