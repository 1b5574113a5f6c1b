//! In-memory engine for exercising the core without a database.
//!
//! [`RecordingEngine`] keeps the names of created tables and every executed
//! statement. Statements are answered from a queue of canned outcomes; once
//! the queue is empty, selects return no rows, inserts return increasing ids
//! and updates/deletes report one affected row.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::engine::{Outcome, QueryEngine, SchemaEngine, TableSpec};
use crate::error::EngineError;
use crate::sql::Statement;

#[derive(Default)]
struct State {
    tables: Vec<TableSpec>,
    existing: Vec<String>,
    statements: Vec<Statement>,
    outcomes: VecDeque<Result<Outcome, EngineError>>,
    next_id: i64,
}

/// Engine that records requests instead of running them.
#[derive(Default)]
pub struct RecordingEngine {
    state: Mutex<State>,
}

impl RecordingEngine {
    /// Create an engine with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a table already exists.
    pub fn with_existing_table(self, name: impl Into<String>) -> Self {
        self.state.lock().existing.push(name.into());
        self
    }

    /// Queue the outcome of the next statement.
    pub fn push_outcome(&self, outcome: Outcome) {
        self.state.lock().outcomes.push_back(Ok(outcome));
    }

    /// Queue a failure for the next statement.
    pub fn push_error(&self, error: EngineError) {
        self.state.lock().outcomes.push_back(Err(error));
    }

    /// Names of the tables created so far, in creation order.
    pub fn created_tables(&self) -> Vec<String> {
        self.state.lock().tables.iter().map(|t| t.name.clone()).collect()
    }

    /// Specification of a created table.
    pub fn table(&self, name: &str) -> Option<TableSpec> {
        self.state.lock().tables.iter().find(|t| t.name == name).cloned()
    }

    /// Statements executed so far.
    pub fn statements(&self) -> Vec<Statement> {
        self.state.lock().statements.clone()
    }
}

#[async_trait]
impl SchemaEngine for RecordingEngine {
    async fn table_exists(&self, name: &str) -> Result<bool, EngineError> {
        let state = self.state.lock();
        Ok(state.existing.iter().any(|t| t == name) || state.tables.iter().any(|t| t.name == name))
    }

    async fn create_table(&self, table: &TableSpec) -> Result<(), EngineError> {
        self.state.lock().tables.push(table.clone());
        Ok(())
    }
}

#[async_trait]
impl QueryEngine for RecordingEngine {
    async fn execute(&self, statement: &Statement) -> Result<Outcome, EngineError> {
        let mut state = self.state.lock();
        state.statements.push(statement.clone());

        if let Some(outcome) = state.outcomes.pop_front() {
            return outcome;
        }

        Ok(match statement {
            Statement::Select(_) => Outcome::Rows(Vec::new()),
            Statement::Insert(_) => {
                state.next_id += 1;
                Outcome::Inserted(state.next_id)
            }
            Statement::Update(_) | Statement::Delete(_) => Outcome::Affected(1),
        })
    }
}
