use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("The field [{0}] has not been defined in this model")]
    FieldNotDefined(String),

    #[error("{message} [{sql}]")]
    QueryExecution { message: String, sql: String },

    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("Entity type '{0}' is not registered")]
    UnknownEntityType(String),

    #[error("Cursor cannot be re-positioned once iteration has started")]
    CursorNotRewindable,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, OrmError>;

/// Failure reported by a [`Connector`](crate::connection::Connector) for one statement.
///
/// Carries only the backend message; the query layer pairs it with the SQL
/// text when it becomes an [`OrmError::QueryExecution`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn with_sql(self, sql: impl Into<String>) -> OrmError {
        OrmError::QueryExecution {
            message: self.message,
            sql: sql.into(),
        }
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
