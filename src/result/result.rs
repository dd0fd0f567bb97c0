use super::Cursor;
use crate::core::{OrmError, Result, Row};

/// Fully buffered result, the cursor type handed out by in-process connectors.
///
/// Rewinding is supported unless the set was built with [`ResultSet::forward_only`],
/// which mimics an unbuffered server-side cursor.
#[derive(Debug, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
    position: Option<usize>,
    forward_only: bool,
    closed: bool,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    pub fn forward_only(mut self) -> Self {
        self.forward_only = true;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn next_index(&self) -> usize {
        self.position.map_or(0, |p| p + 1)
    }
}

impl Cursor for ResultSet {
    fn rewind_to_first(&mut self) -> Result<()> {
        if self.forward_only && self.position.is_some() {
            return Err(OrmError::CursorNotRewindable);
        }
        self.position = None;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        let next = self.next_index();
        self.position = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn current_row(&self) -> Option<&Row> {
        self.position.and_then(|p| self.rows.get(p))
    }

    fn current_index(&self) -> Option<usize> {
        self.position.filter(|p| *p < self.rows.len())
    }

    fn row_count(&self) -> Option<usize> {
        Some(self.rows.len())
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>> {
        if self.closed {
            return Ok(Vec::new());
        }
        let start = self.next_index().min(self.rows.len());
        self.position = Some(self.rows.len());
        Ok(self.rows[start..].to_vec())
    }

    fn supports_rewind(&self) -> bool {
        !self.forward_only
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
