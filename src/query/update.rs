use super::executor::{Executor, Mutation};
use super::insert::Assignment;
use super::predicate::{Condition, WhereClause};
use crate::connection::Connector;
use crate::core::{Result, Value};
use crate::schema::naming::quote_identifier;
use indexmap::IndexMap;

/// UPDATE builder.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    table: String,
    sets: IndexMap<String, Assignment>,
    where_clause: WhereClause,
}

impl UpdateQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            sets: IndexMap::new(),
            where_clause: WhereClause::new(),
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.sets.insert(column.into(), Assignment::Value(value.into()));
        self
    }

    pub fn set_raw(&mut self, column: impl Into<String>, expr: impl Into<String>) -> &mut Self {
        self.sets.insert(column.into(), Assignment::Raw(expr.into()));
        self
    }

    pub fn filter(&mut self, condition: Condition) -> &mut Self {
        self.where_clause.push(condition);
        self
    }

    pub fn to_sql(&self, conn: &dyn Connector) -> String {
        let sets: Vec<String> = self
            .sets
            .iter()
            .map(|(c, a)| format!("{} = {}", quote_identifier(c), a.to_sql(conn)))
            .collect();
        format!(
            "UPDATE {} SET {}{}",
            quote_identifier(&self.table),
            sets.join(", "),
            self.where_clause.to_sql(conn)
        )
    }

    pub fn run(&self, exec: &Executor<'_>) -> Result<Mutation> {
        exec.execute(&self.to_sql(exec.connector()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MockConnector;

    #[test]
    fn test_update_statement() {
        let mut q = UpdateQuery::new("user");
        q.set("name", "Ana")
            .set("active", true)
            .set_raw("updated_at", "FROM_UNIXTIME(1700000000)")
            .filter(Condition::eq("id", 7));
        assert_eq!(
            q.to_sql(&MockConnector::new()),
            "UPDATE `user` SET `name` = 'Ana', `active` = 1, `updated_at` = FROM_UNIXTIME(1700000000) WHERE `id` = 7"
        );
    }
}
