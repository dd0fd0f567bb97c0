//! Everyday imports for declaring entity types and querying them.
//!
//! Low-level pieces (query builders, cursors, casting) stay in their modules.

pub use crate::collection::{Collection, PackedCollection, Record};
pub use crate::connection::{Config, Connector, MockConnector};
pub use crate::core::{OrmError, Result, Row, Value, row};
pub use crate::facade::Database;
pub use crate::model::{Entity, Included, Model, ModelRef};
pub use crate::query::{Criteria, Direction, Lookup, Operator};
pub use crate::schema::{EntitySchema, EntitySchemaBuilder, FieldSpec};
