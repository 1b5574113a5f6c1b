//! Relational statements handed to the query engine.
//!
//! Statements are plain values. [`Statement::to_sql`] renders the generic SQL
//! spelling with positional `?` parameters; engines with a different dialect
//! can walk the structure themselves.

use serde_json::Value;

use crate::catalog::ScalarKind;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `=`
    Eq,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

/// A qualified column reference, `"table"."column"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table name or alias.
    pub table: String,
    /// Column name.
    pub column: String,
}

/// A boolean condition; a query's predicates are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> ?`
    Compare {
        /// Left-hand column.
        column: ColumnRef,
        /// Operator.
        op: CompareOp,
        /// Bound literal.
        value: Value,
    },
    /// `left = right`
    ColumnsEqual(ColumnRef, ColumnRef),
    /// `EXISTS (subquery)`
    Exists(Box<SelectQuery>),
}

/// A row source.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A named table, optionally aliased.
    Table {
        /// Table name.
        name: String,
        /// Alias.
        alias: Option<String>,
    },
    /// A subquery used as a derived table.
    Derived {
        /// Inner query.
        query: Box<SelectQuery>,
        /// Alias of the derived table.
        alias: String,
    },
}

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`
    All,
    /// The constant `1`, for existence checks.
    One,
    /// A column, optionally renamed.
    Column {
        /// Source column.
        column: ColumnRef,
        /// Output name.
        alias: Option<String>,
        /// Declared scalar kind of the values, when known.
        kind: Option<ScalarKind>,
    },
}

/// A `LEFT OUTER JOIN source ON left = right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Joined source.
    pub source: Source,
    /// Join key on the already-joined side.
    pub left: ColumnRef,
    /// Join key on the joined source.
    pub right: ColumnRef,
}

/// A select query.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    /// Select list.
    pub projections: Vec<Projection>,
    /// Main source.
    pub from: Source,
    /// Left outer joins, in order.
    pub joins: Vec<Join>,
    /// AND-ed predicates.
    pub predicates: Vec<Predicate>,
    /// Ordering keys, ascending.
    pub order_by: Vec<ColumnRef>,
    /// Row limit.
    pub limit: Option<u64>,
    /// Rows to skip; rendered only together with a limit.
    pub offset: Option<u64>,
}

/// A named output column of a select query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    /// Output name.
    pub name: String,
    /// Declared scalar kind, when known.
    pub kind: Option<ScalarKind>,
}

/// Insert one or more rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Target table.
    pub table: String,
    /// Column names; empty inserts a row of defaults.
    pub columns: Vec<String>,
    /// Row values, aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

/// Update rows matching the predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Target table.
    pub table: String,
    /// Column assignments.
    pub assignments: Vec<(String, Value)>,
    /// AND-ed predicates.
    pub predicates: Vec<Predicate>,
}

/// Delete rows matching the predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Target table.
    pub table: String,
    /// AND-ed predicates.
    pub predicates: Vec<Predicate>,
}

/// Any statement the core hands to a [`QueryEngine`](crate::engine::QueryEngine).
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Read.
    Select(SelectQuery),
    /// Insert.
    Insert(Insert),
    /// Update.
    Update(Update),
    /// Delete.
    Delete(Delete),
}

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl CompareOp {
    /// Operator token.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Eq => "=",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }

    /// Parse an operator token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(CompareOp::Lt),
            ">" => Some(CompareOp::Gt),
            "=" => Some(CompareOp::Eq),
            "<=" => Some(CompareOp::Le),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }
}

impl ColumnRef {
    /// Create a column reference.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl Source {
    /// A plain table.
    pub fn table(name: impl Into<String>) -> Self {
        Source::Table {
            name: name.into(),
            alias: None,
        }
    }

    /// An aliased table.
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Source::Table {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// A derived table.
    pub fn derived(query: SelectQuery, alias: impl Into<String>) -> Self {
        Source::Derived {
            query: Box::new(query),
            alias: alias.into(),
        }
    }
}

impl Projection {
    /// A column projected as `alias`.
    pub fn column(column: ColumnRef, alias: impl Into<String>, kind: Option<ScalarKind>) -> Self {
        Projection::Column {
            column,
            alias: Some(alias.into()),
            kind,
        }
    }
}

impl SelectQuery {
    /// `SELECT * FROM source`.
    pub fn from(source: Source) -> Self {
        Self {
            projections: vec![Projection::All],
            from: source,
            joins: Vec::new(),
            predicates: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Replace the select list.
    pub fn select(mut self, projections: Vec<Projection>) -> Self {
        self.projections = projections;
        self
    }

    /// Append a projection.
    pub fn project(mut self, projection: Projection) -> Self {
        if self.projections == [Projection::All] {
            self.projections.clear();
        }
        self.projections.push(projection);
        self
    }

    /// Append a left outer join.
    pub fn left_join(mut self, source: Source, left: ColumnRef, right: ColumnRef) -> Self {
        self.joins.push(Join {
            source,
            left,
            right,
        });
        self
    }

    /// Append a predicate.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Append an ordering key.
    pub fn order_by(mut self, column: ColumnRef) -> Self {
        self.order_by.push(column);
        self
    }

    /// Set limit and offset.
    pub fn paginate(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Named output columns, in select-list order.
    ///
    /// `*` and constant projections have no static name and are skipped.
    pub fn output_columns(&self) -> Vec<OutputColumn> {
        self.projections
            .iter()
            .filter_map(|projection| match projection {
                Projection::Column {
                    column,
                    alias,
                    kind,
                } => Some(OutputColumn {
                    name: alias.clone().unwrap_or_else(|| column.column.clone()),
                    kind: *kind,
                }),
                Projection::All | Projection::One => None,
            })
            .collect()
    }
}

impl Statement {
    /// Render generic SQL with positional `?` parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut writer = SqlWriter::default();
        match self {
            Statement::Select(query) => writer.select(query),
            Statement::Insert(insert) => writer.insert(insert),
            Statement::Update(update) => writer.update(update),
            Statement::Delete(delete) => writer.delete(delete),
        }
        (writer.sql, writer.params)
    }

    /// Statement kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "select",
            Statement::Insert(_) => "insert",
            Statement::Update(_) => "update",
            Statement::Delete(_) => "delete",
        }
    }
}

#[derive(Default)]
struct SqlWriter {
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn ident(&mut self, name: &str) {
        self.sql.push_str(&quote_ident(name));
    }

    fn column(&mut self, column: &ColumnRef) {
        self.ident(&column.table);
        self.push(".");
        self.ident(&column.column);
    }

    fn param(&mut self, value: &Value) {
        self.push("?");
        self.params.push(value.clone());
    }

    fn select(&mut self, query: &SelectQuery) {
        self.push("SELECT ");
        for (i, projection) in query.projections.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            match projection {
                Projection::All => self.push("*"),
                Projection::One => self.push("1"),
                Projection::Column { column, alias, .. } => {
                    self.column(column);
                    if let Some(alias) = alias {
                        self.push(" AS ");
                        self.ident(alias);
                    }
                }
            }
        }

        self.push(" FROM ");
        self.source(&query.from);

        for join in &query.joins {
            self.push(" LEFT OUTER JOIN ");
            self.source(&join.source);
            self.push(" ON ");
            self.column(&join.left);
            self.push(" = ");
            self.column(&join.right);
        }

        self.predicates(&query.predicates);

        if !query.order_by.is_empty() {
            self.push(" ORDER BY ");
            for (i, column) in query.order_by.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.column(column);
            }
        }

        if let Some(limit) = query.limit {
            self.push(&format!(" LIMIT {}", limit));
            if let Some(offset) = query.offset {
                self.push(&format!(" OFFSET {}", offset));
            }
        }
    }

    fn source(&mut self, source: &Source) {
        match source {
            Source::Table { name, alias } => {
                self.ident(name);
                if let Some(alias) = alias {
                    self.push(" AS ");
                    self.ident(alias);
                }
            }
            Source::Derived { query, alias } => {
                self.push("(");
                self.select(query);
                self.push(") AS ");
                self.ident(alias);
            }
        }
    }

    fn predicates(&mut self, predicates: &[Predicate]) {
        for (i, predicate) in predicates.iter().enumerate() {
            self.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::Compare { column, op, value } => {
                    self.column(column);
                    self.push(" ");
                    self.push(op.as_str());
                    self.push(" ");
                    self.param(value);
                }
                Predicate::ColumnsEqual(left, right) => {
                    self.column(left);
                    self.push(" = ");
                    self.column(right);
                }
                Predicate::Exists(query) => {
                    self.push("EXISTS (");
                    self.select(query);
                    self.push(")");
                }
            }
        }
    }

    fn insert(&mut self, insert: &Insert) {
        self.push("INSERT INTO ");
        self.ident(&insert.table);

        if insert.columns.is_empty() {
            self.push(" DEFAULT VALUES");
            return;
        }

        self.push(" (");
        for (i, column) in insert.columns.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(column);
        }
        self.push(") VALUES ");

        for (r, row) in insert.rows.iter().enumerate() {
            if r > 0 {
                self.push(", ");
            }
            self.push("(");
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.param(value);
            }
            self.push(")");
        }
    }

    fn update(&mut self, update: &Update) {
        self.push("UPDATE ");
        self.ident(&update.table);
        self.push(" SET ");
        for (i, (column, value)) in update.assignments.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(column);
            self.push(" = ");
            self.param(value);
        }
        self.predicates(&update.predicates);
    }

    fn delete(&mut self, delete: &Delete) {
        self.push("DELETE FROM ");
        self.ident(&delete.table);
        self.predicates(&delete.predicates);
    }
}
