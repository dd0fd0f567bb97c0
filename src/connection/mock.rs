use super::Connector;
use crate::core::{BackendError, Row};
use crate::result::{Cursor, ResultSet};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted answer, consumed by the next statement the connector sees.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Rows { rows: Vec<Row>, forward_only: bool },
    Outcome { affected_rows: u64, last_insert_id: Option<i64> },
    Error(String),
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<MockResponse>,
    statements: Vec<String>,
    last_insert_id: Option<i64>,
    affected_rows: u64,
}

/// Scripted connector for tests and offline hosts.
///
/// Answers statements strictly in the order they were queued and records
/// every SQL string it receives. A statement with nothing queued fails.
///
/// ```
/// use activerow::connection::{Connector, MockConnector};
/// use activerow::core::row;
/// use activerow::result::Cursor;
///
/// let mock = MockConnector::new();
/// mock.push_rows(vec![row([("id", 1)])]);
/// let cursor = mock.query("SELECT * FROM `user`").unwrap();
/// assert_eq!(cursor.row_count(), Some(1));
/// assert_eq!(mock.statements(), vec!["SELECT * FROM `user`".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MockConnector {
    state: Mutex<MockState>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: MockResponse) -> &Self {
        if let Ok(mut state) = self.state.lock() {
            state.responses.push_back(response);
        }
        self
    }

    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.push(MockResponse::Rows {
            rows,
            forward_only: false,
        })
    }

    /// Queues rows behind a cursor that cannot be rewound once started.
    pub fn push_stream(&self, rows: Vec<Row>) -> &Self {
        self.push(MockResponse::Rows {
            rows,
            forward_only: true,
        })
    }

    pub fn push_outcome(&self, affected_rows: u64, last_insert_id: Option<i64>) -> &Self {
        self.push(MockResponse::Outcome {
            affected_rows,
            last_insert_id,
        })
    }

    pub fn push_error(&self, message: impl Into<String>) -> &Self {
        self.push(MockResponse::Error(message.into()))
    }

    pub fn statements(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.statements.clone())
            .unwrap_or_default()
    }

    pub fn last_statement(&self) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.statements.last().cloned())
    }

    /// Responses queued but not yet consumed.
    pub fn pending(&self) -> usize {
        self.state.lock().map(|s| s.responses.len()).unwrap_or(0)
    }
}

impl Connector for MockConnector {
    fn query(&self, sql: &str) -> Result<Box<dyn Cursor>, BackendError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| BackendError::new(e.to_string()))?;
        state.statements.push(sql.to_string());

        match state.responses.pop_front() {
            Some(MockResponse::Rows { rows, forward_only }) => {
                state.affected_rows = rows.len() as u64;
                let set = ResultSet::new(rows);
                let set = if forward_only { set.forward_only() } else { set };
                Ok(Box::new(set))
            }
            Some(MockResponse::Outcome {
                affected_rows,
                last_insert_id,
            }) => {
                state.affected_rows = affected_rows;
                if last_insert_id.is_some() {
                    state.last_insert_id = last_insert_id;
                }
                Ok(Box::new(ResultSet::empty()))
            }
            Some(MockResponse::Error(message)) => {
                state.affected_rows = 0;
                Err(BackendError::new(message))
            }
            None => Err(BackendError::new("no scripted response left")),
        }
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.state.lock().ok().and_then(|s| s.last_insert_id)
    }

    fn affected_rows(&self) -> u64 {
        self.state.lock().map(|s| s.affected_rows).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::row;

    #[test]
    fn test_responses_are_consumed_in_order() {
        let mock = MockConnector::new();
        mock.push_outcome(1, Some(42)).push_rows(vec![row([("id", 42)])]);

        mock.query("INSERT").unwrap();
        assert_eq!(mock.affected_rows(), 1);
        assert_eq!(mock.last_insert_id(), Some(42));

        let cursor = mock.query("SELECT").unwrap();
        assert_eq!(cursor.row_count(), Some(1));
        assert_eq!(mock.pending(), 0);
        assert_eq!(mock.statements(), vec!["INSERT", "SELECT"]);
    }

    #[test]
    fn test_error_and_exhausted_script() {
        let mock = MockConnector::new();
        mock.push_error("Table 'x' doesn't exist");

        let err = mock.query("SELECT * FROM x").err().unwrap();
        assert_eq!(err.message, "Table 'x' doesn't exist");
        assert!(mock.query("SELECT 1").is_err());
        assert_eq!(mock.last_statement().as_deref(), Some("SELECT 1"));
    }
}
