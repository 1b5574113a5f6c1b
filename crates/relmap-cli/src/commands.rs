//! Command execution against an adapter.

use relmap_core::{Adapter, ListQuery, MaterializeReport, QueryEngine, Record, Schema, SchemaEngine};
use serde_json::Value;
use thiserror::Error;

use crate::config::Command;
use crate::formatter::Formatter;

/// Failures that happen before a command reaches the adapter.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
}

/// Result of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Report(MaterializeReport),
    Objects(Vec<Record>),
    Ids(Vec<i64>),
    Affected(u64),
}

impl CommandOutput {
    /// Render with the given formatter.
    pub fn render(&self, formatter: &dyn Formatter) -> String {
        match self {
            CommandOutput::Report(report) => formatter.format_report(report),
            CommandOutput::Objects(objects) => formatter.format_objects(objects),
            CommandOutput::Ids(ids) => formatter.format_ids(ids),
            CommandOutput::Affected(affected) => formatter.format_affected(*affected),
        }
    }
}

/// Parse a record argument.
pub fn parse_record(data: &str) -> Result<Record, InputError> {
    match serde_json::from_str(data)? {
        Value::Object(record) => Ok(record),
        other => Err(InputError::NotAnObject(other.to_string())),
    }
}

/// Run a command.
pub async fn execute<E>(
    adapter: &Adapter<E>,
    schema: &Schema,
    command: Command,
) -> Result<CommandOutput, Box<dyn std::error::Error>>
where
    E: SchemaEngine + QueryEngine,
{
    let output = match command {
        Command::Materialize => CommandOutput::Report(adapter.materialize_schema(schema).await?),
        Command::List {
            type_name,
            filters,
            expands,
            limit,
            offset,
        } => {
            let query = ListQuery::new()
                .with_filters(filters)
                .with_expands(expands)
                .with_limit(limit)
                .with_offset(offset);
            CommandOutput::Objects(adapter.list(schema, &type_name, &query).await?)
        }
        Command::Get {
            type_name,
            id,
            expands,
        } => CommandOutput::Objects(adapter.get(schema, &type_name, id, &expands).await?),
        Command::Insert { type_name, data } => {
            let record = parse_record(&data)?;
            CommandOutput::Ids(adapter.insert(schema, &type_name, &record).await?)
        }
        Command::Update {
            type_name,
            id,
            data,
        } => {
            let record = parse_record(&data)?;
            CommandOutput::Ids(adapter.update(schema, &type_name, id, &record).await?)
        }
        Command::Remove { type_name, id } => {
            CommandOutput::Affected(adapter.remove(schema, &type_name, id).await?)
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::JsonFormatter;
    use relmap_sqlite::SqliteEngine;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::from_json(
            r#"{"types": [
                {"name": "Pet", "properties": [
                    {"name": "name", "type": "String"},
                    {"name": "tags", "type": ["String"]}
                ]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_record() {
        let record = parse_record(r#"{"name": "Rex"}"#).unwrap();
        assert_eq!(record["name"], json!("Rex"));

        assert!(matches!(parse_record("[1]"), Err(InputError::NotAnObject(_))));
        assert!(matches!(parse_record("{"), Err(InputError::Json(_))));
    }

    #[tokio::test]
    async fn test_command_sequence() {
        let adapter = Adapter::new(SqliteEngine::open_in_memory().unwrap());
        let schema = schema();

        let output = execute(&adapter, &schema, Command::Materialize).await.unwrap();
        assert!(matches!(output, CommandOutput::Report(ref report) if report.created.len() == 2));

        let insert = Command::Insert {
            type_name: "Pet".into(),
            data: r#"{"name": "Rex", "tags": ["good"]}"#.into(),
        };
        assert_eq!(
            execute(&adapter, &schema, insert).await.unwrap(),
            CommandOutput::Ids(vec![1])
        );

        let update = Command::Update {
            type_name: "Pet".into(),
            id: 1,
            data: r#"{"tags": ["good", "loud"]}"#.into(),
        };
        execute(&adapter, &schema, update).await.unwrap();

        let list = Command::List {
            type_name: "Pet".into(),
            filters: vec!["tags=loud".into()],
            expands: vec![],
            limit: 10,
            offset: 0,
        };
        let output = execute(&adapter, &schema, list).await.unwrap();
        let rendered: Value = serde_json::from_str(&output.render(&JsonFormatter)).unwrap();
        assert_eq!(rendered, json!([{"id": 1, "name": "Rex", "tags": ["good", "loud"]}]));

        let remove = Command::Remove {
            type_name: "Pet".into(),
            id: 1,
        };
        assert_eq!(
            execute(&adapter, &schema, remove).await.unwrap(),
            CommandOutput::Affected(1)
        );

        let get = Command::Get {
            type_name: "Pet".into(),
            id: 1,
            expands: vec![],
        };
        assert_eq!(
            execute(&adapter, &schema, get).await.unwrap(),
            CommandOutput::Objects(vec![])
        );
    }
}
