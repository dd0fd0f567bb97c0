pub mod cast;
pub mod entity;
pub mod repository;
pub mod resolver;

pub use cast::{CastKind, cast_field, datacast};
pub use entity::{Entity, Included};
pub use repository::{ModelRef, rewrite_timestamps};
pub use resolver::resolve;

use crate::schema::EntitySchemaBuilder;

/// Static declaration of an entity type.
///
/// ```
/// use activerow::model::Model;
/// use activerow::schema::{EntitySchemaBuilder, FieldSpec};
///
/// struct User;
///
/// impl Model for User {
///     const NAME: &'static str = "User";
///
///     fn define(schema: EntitySchemaBuilder) -> EntitySchemaBuilder {
///         schema
///             .field("name", FieldSpec::varchar(64).not_null())
///             .field("status", FieldSpec::enumeration(["active", "banned"]))
///     }
/// }
/// ```
pub trait Model {
    const NAME: &'static str;

    fn define(schema: EntitySchemaBuilder) -> EntitySchemaBuilder;
}
