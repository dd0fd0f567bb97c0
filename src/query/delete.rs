use super::executor::{Executor, Mutation};
use super::predicate::{Condition, WhereClause};
use crate::connection::Connector;
use crate::core::Result;
use crate::schema::naming::quote_identifier;

/// DELETE builder.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    table: String,
    where_clause: WhereClause,
}

impl DeleteQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: WhereClause::new(),
        }
    }

    pub fn filter(&mut self, condition: Condition) -> &mut Self {
        self.where_clause.push(condition);
        self
    }

    pub fn filter_all(&mut self, clause: &WhereClause) -> &mut Self {
        for condition in clause.conditions() {
            self.where_clause.push(condition.clone());
        }
        self
    }

    pub fn where_clause(&self) -> &WhereClause {
        &self.where_clause
    }

    pub fn to_sql(&self, conn: &dyn Connector) -> String {
        format!(
            "DELETE FROM {}{}",
            quote_identifier(&self.table),
            self.where_clause.to_sql(conn)
        )
    }

    pub fn run(&self, exec: &Executor<'_>) -> Result<Mutation> {
        exec.execute(&self.to_sql(exec.connector()))
    }
}
