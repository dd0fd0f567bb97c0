// ============================================================================
// activerow: Active-Record data mapping over a SQL connector
// ============================================================================

//! Entity types are declared as field schemas and registered on a
//! [`Database`], which pairs them with a [`Connector`](connection::Connector).
//! Finders translate criteria maps into SQL, entities track their own
//! changes, and multi-row results come back as lazy
//! [`Collection`]s that materialize one entity at a time.
//!
//! ```
//! use activerow::prelude::*;
//! use serde_json::json;
//!
//! let mock = std::sync::Arc::new(MockConnector::new());
//! let mut db = Database::new(mock.clone());
//! db.register(
//!     EntitySchemaBuilder::new("User")
//!         .field("name", FieldSpec::varchar(64))
//!         .field("status", FieldSpec::varchar(16))
//!         .timestamps(false),
//! )?;
//!
//! mock.push_rows(vec![row([("id", Value::from(1)), ("name", "Ana".into()), ("status", "active".into())])]);
//! let criteria = Criteria::from_json(&json!({
//!     "where": { "status": "active" },
//!     "order": { "name": "ASC" },
//!     "limit": 10
//! }))?;
//! let users = db.model("User")?.all(Some(criteria), false)?;
//! for user in users.entities() {
//!     assert_eq!(user?.get("name")?, &Value::from("Ana"));
//! }
//! assert_eq!(
//!     mock.last_statement().unwrap(),
//!     "SELECT * FROM `user` WHERE `status` = 'active' ORDER BY `name` ASC LIMIT 10"
//! );
//! # Ok::<(), OrmError>(())
//! ```

pub mod collection;
pub mod connection;
pub mod core;
pub mod facade;
pub mod model;
pub mod prelude;
pub mod query;
pub mod result;
pub mod schema;

pub use collection::{Collection, PackedCollection};
pub use crate::core::{OrmError, Result, Row, Value};
pub use facade::Database;
pub use model::{Entity, Model};
pub use query::Criteria;
pub use schema::{EntitySchema, FieldSpec};
