pub mod entity_schema;
pub mod field;
pub mod naming;
pub mod registry;
pub mod relation;

pub use entity_schema::{CREATED_AT, DEFAULT_ID_FIELD, EntitySchema, EntitySchemaBuilder, UPDATED_AT};
pub use field::{DefaultValue, FieldMeta, FieldSpec};
pub use registry::Registry;
pub use relation::{Relation, RelationDecl, RelationKind};
