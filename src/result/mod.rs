pub mod result;

use crate::core::{Result, Row};

pub use result::ResultSet;

/// Forward cursor over the rows produced by one SELECT.
///
/// A fresh cursor sits before its first row: the first [`advance`](Cursor::advance)
/// positions it on row 0. Implementations release their server-side
/// resources in [`close`](Cursor::close) and again when dropped.
pub trait Cursor {
    /// Moves back before the first row. Fails for cursors that cannot re-position.
    fn rewind_to_first(&mut self) -> Result<()>;

    /// Moves to the next row; `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool>;

    fn current_row(&self) -> Option<&Row>;

    fn current_index(&self) -> Option<usize>;

    /// Total rows in the result, when the backend knows it up front.
    fn row_count(&self) -> Option<usize>;

    /// Drains every row not yet visited.
    fn fetch_all(&mut self) -> Result<Vec<Row>>;

    fn supports_rewind(&self) -> bool {
        true
    }

    fn close(&mut self) {}
}
