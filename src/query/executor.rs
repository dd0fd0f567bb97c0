use crate::connection::Connector;
use crate::core::Result;
use crate::result::Cursor;

/// Effect of an INSERT, UPDATE or DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mutation {
    pub affected_rows: u64,
    pub last_insert_id: Option<i64>,
}

impl Mutation {
    pub fn took_effect(&self) -> bool {
        self.affected_rows > 0
    }
}

/// Runs generated SQL against a connector.
///
/// Statements are logged before execution; backend failures are logged and
/// returned as `QueryExecution` carrying the statement text. No retry.
#[derive(Clone, Copy)]
pub struct Executor<'c> {
    connector: &'c dyn Connector,
    log_statements: bool,
}

impl<'c> Executor<'c> {
    pub fn new(connector: &'c dyn Connector) -> Self {
        Self {
            connector,
            log_statements: false,
        }
    }

    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    pub fn connector(&self) -> &'c dyn Connector {
        self.connector
    }

    pub fn query(&self, sql: &str) -> Result<Box<dyn Cursor>> {
        if self.log_statements {
            log::info!("Executing query: {}", sql);
        } else {
            log::debug!("Executing query: {}", sql);
        }

        self.connector.query(sql).map_err(|e| {
            log::warn!("Query failed: {} [{}]", e, sql);
            e.with_sql(sql)
        })
    }

    pub fn execute(&self, sql: &str) -> Result<Mutation> {
        let mut cursor = self.query(sql)?;
        cursor.close();
        let mutation = Mutation {
            affected_rows: self.connector.affected_rows(),
            last_insert_id: self.connector.last_insert_id(),
        };
        log::debug!("Statement affected {} row(s)", mutation.affected_rows);
        Ok(mutation)
    }
}
