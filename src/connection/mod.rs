pub mod config;
pub mod mock;

use crate::core::BackendError;
use crate::result::Cursor;
use std::sync::Arc;

pub use config::Config;
pub use mock::MockConnector;

/// The SQL backend this layer talks to.
///
/// Statements are plain strings with values already escaped through
/// [`escape`](Connector::escape); nothing is bound as a parameter. Every call
/// blocks until the backend answers. Mutations return an empty cursor and
/// report their effect through [`last_insert_id`](Connector::last_insert_id)
/// and [`affected_rows`](Connector::affected_rows), which describe the most
/// recent statement only.
pub trait Connector {
    fn query(&self, sql: &str) -> Result<Box<dyn Cursor>, BackendError>;

    fn last_insert_id(&self) -> Option<i64>;

    fn affected_rows(&self) -> u64;

    /// Neutralizes a string for interpolation between single quotes.
    fn escape(&self, value: &str) -> String {
        escape_string(value)
    }
}

impl<C: Connector + ?Sized> Connector for Arc<C> {
    fn query(&self, sql: &str) -> Result<Box<dyn Cursor>, BackendError> {
        (**self).query(sql)
    }

    fn last_insert_id(&self) -> Option<i64> {
        (**self).last_insert_id()
    }

    fn affected_rows(&self) -> u64 {
        (**self).affected_rows()
    }

    fn escape(&self, value: &str) -> String {
        (**self).escape(value)
    }
}

/// MySQL-style escaping of the characters that can break out of a quoted literal.
pub fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x1a' => escaped.push_str("\\Z"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("O'Brien"), "O\\'Brien");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
        assert_eq!(escape_string("line\nbreak"), "line\\nbreak");
        assert_eq!(escape_string("plain"), "plain");
    }
}
