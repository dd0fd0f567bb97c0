use super::executor::{Executor, Mutation};
use super::predicate::render_literal;
use crate::connection::Connector;
use crate::core::{Result, Value};
use crate::schema::naming::quote_identifier;
use indexmap::IndexMap;

/// Right-hand side of a SET or VALUES entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// Escaped and rendered as a literal.
    Value(Value),
    /// Written verbatim, e.g. `FROM_UNIXTIME(1700000000)`.
    Raw(String),
}

impl Assignment {
    pub(crate) fn to_sql(&self, conn: &dyn Connector) -> String {
        match self {
            Self::Value(v) => render_literal(conn, v),
            Self::Raw(expr) => expr.clone(),
        }
    }
}

/// INSERT builder with optional `ON DUPLICATE KEY UPDATE` clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    table: String,
    values: IndexMap<String, Assignment>,
    on_duplicate: IndexMap<String, Assignment>,
}

impl InsertQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: IndexMap::new(),
            on_duplicate: IndexMap::new(),
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(column.into(), Assignment::Value(value.into()));
        self
    }

    pub fn set_raw(&mut self, column: impl Into<String>, expr: impl Into<String>) -> &mut Self {
        self.values.insert(column.into(), Assignment::Raw(expr.into()));
        self
    }

    pub fn on_duplicate_key(&mut self, column: impl Into<String>, expr: impl Into<String>) -> &mut Self {
        self.on_duplicate.insert(column.into(), Assignment::Raw(expr.into()));
        self
    }

    pub fn to_sql(&self, conn: &dyn Connector) -> String {
        let columns: Vec<String> = self.values.keys().map(|c| quote_identifier(c)).collect();
        let values: Vec<String> = self.values.values().map(|a| a.to_sql(conn)).collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&self.table),
            columns.join(", "),
            values.join(", ")
        );

        if !self.on_duplicate.is_empty() {
            let updates: Vec<String> = self
                .on_duplicate
                .iter()
                .map(|(c, a)| format!("{} = {}", quote_identifier(c), a.to_sql(conn)))
                .collect();
            sql.push_str(&format!(" ON DUPLICATE KEY UPDATE {}", updates.join(", ")));
        }

        sql
    }

    pub fn run(&self, exec: &Executor<'_>) -> Result<Mutation> {
        exec.execute(&self.to_sql(exec.connector()))
    }
}
