pub mod error;
pub mod types;
pub mod value;

pub use error::{BackendError, OrmError, Result};
pub use types::{Row, row, unix_now};
pub use value::Value;
