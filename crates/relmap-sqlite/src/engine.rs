//! The SQLite engine.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Number, Value};
use tracing::{debug, info};

use relmap_core::engine::{Outcome, QueryEngine, SchemaEngine, TableSpec};
use relmap_core::sql::Statement;
use relmap_core::{EngineError, Record, ScalarKind};

use crate::config::SqliteConfig;
use crate::ddl::create_table_sql;
use crate::error::Result;

/// Storage engine over a single SQLite connection.
///
/// Statements run one at a time on the blocking thread pool; the connection
/// is shared behind a mutex, so clones of the engine serialize on it.
#[derive(Clone)]
pub struct SqliteEngine {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEngine {
    /// Open a connection as configured.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let conn = match &config.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };

        conn.busy_timeout(config.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;

        info!(
            path = ?config.path,
            foreign_keys = config.foreign_keys,
            "opened sqlite database"
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&SqliteConfig::in_memory())
    }

    async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl SchemaEngine for SqliteEngine {
    async fn table_exists(&self, name: &str) -> std::result::Result<bool, EngineError> {
        let name = name.to_string();
        let exists = self
            .with_connection(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [&name],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(exists)
    }

    async fn create_table(&self, table: &TableSpec) -> std::result::Result<(), EngineError> {
        let sql = create_table_sql(table)?;
        debug!(table = %table.name, sql = %sql, "creating table");

        self.with_connection(move |conn| {
            conn.execute(&sql, [])?;
            Ok(())
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl QueryEngine for SqliteEngine {
    async fn execute(&self, statement: &Statement) -> std::result::Result<Outcome, EngineError> {
        let (sql, params) = statement.to_sql();
        let params: Vec<SqlValue> = params.iter().map(to_sql_value).collect();
        debug!(kind = statement.kind(), sql = %sql, params = params.len(), "executing statement");

        let outcome = match statement {
            Statement::Select(query) => {
                let kinds: HashMap<String, ScalarKind> = query
                    .output_columns()
                    .into_iter()
                    .filter_map(|column| column.kind.map(|kind| (column.name, kind)))
                    .collect();
                self.with_connection(move |conn| select(conn, &sql, params, &kinds))
                    .await?
            }
            Statement::Insert(_) => {
                self.with_connection(move |conn| {
                    conn.execute(&sql, params_from_iter(params))?;
                    Ok(Outcome::Inserted(conn.last_insert_rowid()))
                })
                .await?
            }
            Statement::Update(_) | Statement::Delete(_) => {
                self.with_connection(move |conn| {
                    let affected = conn.execute(&sql, params_from_iter(params))?;
                    Ok(Outcome::Affected(affected as u64))
                })
                .await?
            }
        };

        Ok(outcome)
    }
}

fn select(
    conn: &Connection,
    sql: &str,
    params: Vec<SqlValue>,
    kinds: &HashMap<String, ScalarKind>,
) -> Result<Outcome> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<(String, Option<ScalarKind>)> = stmt
        .column_names()
        .into_iter()
        .map(|name| (name.to_string(), kinds.get(name).copied()))
        .collect();

    let mut rows = stmt.query(params_from_iter(params))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::new();
        for (i, (name, kind)) in columns.iter().enumerate() {
            record.insert(name.clone(), from_sql_value(row.get_ref(i)?, *kind));
        }
        records.push(record);
    }

    Ok(Outcome::Rows(records))
}

/// Bind a JSON value. Nested values are stored as their JSON text.
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

/// Largest magnitude below which every integer is exactly representable as `f64`.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Read a column value, restoring booleans from their integer storage.
///
/// `REAL` columns store integers as floats; integral values within the exact
/// range come back as JSON integers so `{"score": 2}` reads back unchanged.
fn from_sql_value(value: ValueRef<'_>, kind: Option<ScalarKind>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if kind == Some(ScalarKind::Boolean) => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT => Value::from(f as i64),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
