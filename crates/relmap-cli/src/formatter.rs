//! Output formatters for command results.

use clap::ValueEnum;
use comfy_table::Table;
use relmap_core::{ErrorBody, MaterializeReport, Record};
use serde_json::{json, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// ASCII table format
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format listed or fetched objects.
    fn format_objects(&self, objects: &[Record]) -> String;

    /// Format the ids returned by insert and update.
    fn format_ids(&self, ids: &[i64]) -> String;

    /// Format an affected-row count.
    fn format_affected(&self, affected: u64) -> String;

    /// Format a materialization report.
    fn format_report(&self, report: &MaterializeReport) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Table => Box::new(TableFormatter),
    }
}

/// Error bodies are always JSON, whatever the output format.
pub fn format_error(body: &ErrorBody) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| json!({"code": body.code}).to_string())
}

/// JSON formatter.
pub struct JsonFormatter;

impl JsonFormatter {
    fn pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

impl Formatter for JsonFormatter {
    fn format_objects(&self, objects: &[Record]) -> String {
        let array = Value::Array(objects.iter().cloned().map(Value::Object).collect());
        Self::pretty(&array)
    }

    fn format_ids(&self, ids: &[i64]) -> String {
        json!(ids).to_string()
    }

    fn format_affected(&self, affected: u64) -> String {
        json!({ "affected": affected }).to_string()
    }

    fn format_report(&self, report: &MaterializeReport) -> String {
        Self::pretty(&json!({
            "created": report.created,
            "skipped": report.skipped,
        }))
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_objects(&self, objects: &[Record]) -> String {
        if objects.is_empty() {
            return "No results".to_string();
        }

        // Union of keys, in first-seen order; expanded relations can be absent.
        let mut columns: Vec<&str> = Vec::new();
        for object in objects {
            for key in object.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }

        let mut table = Table::new();
        table.set_header(columns.clone());
        for object in objects {
            table.add_row(
                columns
                    .iter()
                    .map(|column| object.get(*column).map(cell_text).unwrap_or_default())
                    .collect::<Vec<_>>(),
            );
        }

        format!("{}\n({} object(s))", table, objects.len())
    }

    fn format_ids(&self, ids: &[i64]) -> String {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        format!("id: {}", ids.join(", "))
    }

    fn format_affected(&self, affected: u64) -> String {
        format!("{} row(s) affected", affected)
    }

    fn format_report(&self, report: &MaterializeReport) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Table", "Status"]);
        for name in &report.created {
            table.add_row(vec![name.as_str(), "created"]);
        }
        for name in &report.skipped {
            table.add_row(vec![name.as_str(), "exists"]);
        }
        table.to_string()
    }
}

/// Strings print bare, everything else as compact JSON.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_core::{ConstraintError, UnknownError};

    fn objects() -> Vec<Record> {
        let rows = json!([
            {"id": 1, "name": "Ann", "pets": [{"id": 1, "name": "Rex"}]},
            {"id": 2, "name": "Bob", "owner": null}
        ]);
        match rows {
            Value::Array(rows) => rows
                .into_iter()
                .filter_map(|row| match row {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_json_objects() {
        let output = JsonFormatter.format_objects(&objects());
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["pets"][0]["name"], json!("Rex"));
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(JsonFormatter.format_ids(&[3]), "[3]");
        assert_eq!(JsonFormatter.format_affected(2), "{\"affected\":2}");
    }

    #[test]
    fn test_table_objects() {
        let output = TableFormatter.format_objects(&objects());
        assert!(output.contains("owner"));
        assert!(output.contains("Ann"));
        assert!(output.contains("NULL"));
        assert!(output.contains("[{\"id\":1,\"name\":\"Rex\"}]"));
        assert!(output.ends_with("(2 object(s))"));

        assert_eq!(TableFormatter.format_objects(&[]), "No results");
    }

    #[test]
    fn test_table_report() {
        let report = MaterializeReport {
            created: vec!["User".into()],
            skipped: vec!["Pet".into()],
        };
        let output = TableFormatter.format_report(&report);
        assert!(output.contains("created"));
        assert!(output.contains("exists"));
    }

    #[test]
    fn test_error_bodies() {
        let constraint = ConstraintError {
            field: "email".into(),
        };
        assert_eq!(
            format_error(&constraint.body()),
            "{\"code\":\"constraint_violation\",\"field\":\"email\"}"
        );
        assert_eq!(format_error(&UnknownError.body()), "{\"code\":\"unknown_error\"}");
    }
}
