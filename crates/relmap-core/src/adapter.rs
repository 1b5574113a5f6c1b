//! The public entry point: one engine, six operations.

use tracing::{debug, instrument};

use crate::catalog::Schema;
use crate::engine::{Outcome, QueryEngine, SchemaEngine};
use crate::error::{Error, Result};
use crate::materialize::{self, MaterializeReport};
use crate::query::{compose, reconstruct, resolve_expands, ListQuery};
use crate::sql::Statement;
use crate::write;
use crate::Record;

/// Maps schema-level operations onto a storage engine.
///
/// The adapter holds no state besides the engine; schemas are passed to every
/// call. Share it behind an `Arc` for concurrent use.
pub struct Adapter<E> {
    engine: E,
}

impl<E> Adapter<E>
where
    E: SchemaEngine + QueryEngine,
{
    /// Wrap an engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Create every missing table of the schema.
    #[instrument(skip(self, schema), fields(types = schema.types.len()))]
    pub async fn materialize_schema(&self, schema: &Schema) -> Result<MaterializeReport> {
        materialize::materialize(&self.engine, schema).await
    }

    /// List objects of a type, with filters, expands and pagination.
    #[instrument(skip(self, schema, query))]
    pub async fn list(&self, schema: &Schema, type_name: &str, query: &ListQuery) -> Result<Vec<Record>> {
        let type_def = schema.require_type(type_name)?;
        let expands = resolve_expands(schema, type_def, &query.expands)?;
        let select = compose(schema, type_def, query)?;

        let statement = Statement::Select(select);
        debug!(sql = %statement.to_sql().0, "composed list query");

        let rows = match self.engine.execute(&statement).await? {
            Outcome::Rows(rows) => rows,
            _ => return Err(Error::UnexpectedOutcome { expected: "rows" }),
        };

        let row_count = rows.len();
        let objects = reconstruct(rows, type_def, &expands);
        debug!(rows = row_count, objects = objects.len(), "reconstructed objects");
        Ok(objects)
    }

    /// Fetch one object by id; the result holds zero or one element.
    #[instrument(skip(self, schema, expands))]
    pub async fn get(&self, schema: &Schema, type_name: &str, id: i64, expands: &[String]) -> Result<Vec<Record>> {
        let query = ListQuery::new()
            .with_filter(format!("id={}", id))
            .with_expands(expands.iter().cloned());
        self.list(schema, type_name, &query).await
    }

    /// Insert an object; returns the generated id.
    #[instrument(skip(self, schema, data))]
    pub async fn insert(&self, schema: &Schema, type_name: &str, data: &Record) -> Result<Vec<i64>> {
        let type_def = schema.require_type(type_name)?;
        write::upsert(&self.engine, type_def, None, data).await
    }

    /// Update an object; array attributes present in `data` are replaced.
    #[instrument(skip(self, schema, data))]
    pub async fn update(&self, schema: &Schema, type_name: &str, id: i64, data: &Record) -> Result<Vec<i64>> {
        let type_def = schema.require_type(type_name)?;
        write::upsert(&self.engine, type_def, Some(id), data).await
    }

    /// Delete an object; returns the affected-row count.
    #[instrument(skip(self, schema))]
    pub async fn remove(&self, schema: &Schema, type_name: &str, id: i64) -> Result<u64> {
        let type_def = schema.require_type(type_name)?;
        write::remove(&self.engine, type_def, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PropertyDef, ScalarKind, TypeDef};
    use crate::error::{ClientError, EngineError};
    use crate::testing::RecordingEngine;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .with_type(
                TypeDef::new("User")
                    .with_property(PropertyDef::scalar("name", ScalarKind::String))
                    .with_property(PropertyDef::array_reference("pets", "Pet")),
            )
            .with_type(TypeDef::new("Pet").with_property(PropertyDef::scalar("name", ScalarKind::String)))
    }

    fn row(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[tokio::test]
    async fn test_get_reconstructs_expanded_rows() {
        let adapter = Adapter::new(RecordingEngine::new());
        adapter.engine().push_outcome(Outcome::Rows(vec![row(json!({
            "id": 1, "name": "Ann", "pets": 1, "__row_pets": 1, "__pets.id": 1, "__pets.name": "Rex"
        }))]));

        let objects = adapter.get(&schema(), "User", 1, &["pets".to_string()]).await.unwrap();
        assert_eq!(
            serde_json::Value::Object(objects[0].clone()),
            json!({"id": 1, "name": "Ann", "pets": [{"id": 1, "name": "Rex"}]})
        );

        let statements = adapter.engine().statements();
        let (sql, params) = statements[0].to_sql();
        assert!(sql.contains("WHERE \"User\".\"id\" = ?"));
        assert!(sql.contains("LIMIT 100 OFFSET 0"));
        assert_eq!(params, vec![json!(1)]);
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let adapter = Adapter::new(RecordingEngine::new());
        let result = adapter.list(&schema(), "Nope", &ListQuery::new()).await;
        assert!(matches!(result, Err(Error::UnknownType(name)) if name == "Nope"));
        assert!(adapter.engine().statements().is_empty());
    }

    #[tokio::test]
    async fn test_engine_errors_pass_through() {
        let adapter = Adapter::new(RecordingEngine::new());
        adapter
            .engine()
            .push_error(EngineError::new("UNIQUE constraint failed: User.name").with_violation("name"));

        let data = row(json!({"name": "Ann"}));
        let error = adapter.insert(&schema(), "User", &data).await.unwrap_err();
        assert_eq!(error.to_string(), "engine error: UNIQUE constraint failed: User.name");
        assert_eq!(ClientError::classify(&error).code(), "constraint_violation");
    }

    #[tokio::test]
    async fn test_list_rejects_non_row_outcome() {
        let adapter = Adapter::new(RecordingEngine::new());
        adapter.engine().push_outcome(Outcome::Affected(0));

        let result = adapter.list(&schema(), "Pet", &ListQuery::new()).await;
        assert!(matches!(result, Err(Error::UnexpectedOutcome { expected: "rows" })));
    }
}
