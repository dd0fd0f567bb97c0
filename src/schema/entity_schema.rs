use super::field::{FieldMeta, FieldSpec};
use super::naming::{ensure_identifier, uncamelize};
use super::relation::{Relation, RelationDecl};
use crate::connection::Config;
use crate::core::{OrmError, Result};
use indexmap::IndexMap;

pub const DEFAULT_ID_FIELD: &str = "id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

/// Normalized, immutable schema of one entity type.
///
/// Built once from an [`EntitySchemaBuilder`] and shared by every entity of
/// that type through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    name: String,
    table: String,
    id_field: String,
    timestamps: bool,
    fields: IndexMap<String, FieldSpec>,
    instance_fields: IndexMap<String, FieldSpec>,
    relations: Vec<RelationDecl>,
}

impl EntitySchema {
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    /// Declared columns merged over the built-in identifier definition.
    pub fn fields(&self) -> &IndexMap<String, FieldSpec> {
        &self.fields
    }

    /// Columns an entity instance carries: [`fields`](Self::fields) plus the
    /// timestamp columns when timestamps are enabled.
    pub fn instance_fields(&self) -> &IndexMap<String, FieldSpec> {
        &self.instance_fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.instance_fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.instance_fields.contains_key(name)
    }

    pub fn meta(&self) -> IndexMap<String, FieldMeta> {
        self.fields
            .iter()
            .map(|(name, spec)| (name.clone(), spec.meta()))
            .collect()
    }

    pub fn relations(&self) -> &[RelationDecl] {
        &self.relations
    }
}

/// Declaration of an entity type's fields, identifier, timestamps and relations.
///
/// ```
/// use activerow::schema::{EntitySchema, FieldSpec};
///
/// let schema = EntitySchema::builder("BlogPost")
///     .field("title", FieldSpec::varchar(120).not_null())
///     .field("user_id", FieldSpec::unsigned_int())
///     .belongs_to("User", Some("user_id"), Some("id"))
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.table(), "blog_post");
/// assert_eq!(schema.fields().keys().collect::<Vec<_>>(), ["id", "title", "user_id"]);
/// ```
#[derive(Debug, Clone)]
pub struct EntitySchemaBuilder {
    name: String,
    table: Option<String>,
    id_field: Option<String>,
    timestamps: Option<bool>,
    fields: IndexMap<String, FieldSpec>,
    relations: Vec<RelationDecl>,
}

impl EntitySchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            id_field: None,
            timestamps: None,
            fields: IndexMap::new(),
            relations: Vec::new(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = Some(id_field.into());
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = Some(enabled);
        self
    }

    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn has_one(mut self, target: &str, field: Option<&str>, target_field: Option<&str>) -> Self {
        self.relations.push(RelationDecl::HasOne(
            Relation::has_one(target).fields(field, target_field),
        ));
        self
    }

    pub fn has_many(mut self, target: &str, field: Option<&str>, target_field: Option<&str>) -> Self {
        self.relations.push(RelationDecl::HasMany(
            Relation::has_many(target).fields(field, target_field),
        ));
        self
    }

    pub fn belongs_to(mut self, target: &str, field: Option<&str>, target_field: Option<&str>) -> Self {
        self.relations.push(RelationDecl::BelongsTo(
            Relation::has_one(target).fields(field, target_field),
        ));
        self
    }

    pub fn build(self) -> Result<EntitySchema> {
        self.build_with(&Config::default())
    }

    pub fn build_with(self, config: &Config) -> Result<EntitySchema> {
        if self.name.is_empty() {
            return Err(OrmError::InvalidCriteria("entity name is empty".to_string()));
        }

        let id_field = self.id_field.unwrap_or_else(|| DEFAULT_ID_FIELD.to_string());
        let table = self.table.unwrap_or_else(|| uncamelize(&self.name));
        let timestamps = self.timestamps.unwrap_or(config.default_timestamps);

        let mut fields = IndexMap::with_capacity(self.fields.len() + 1);
        if id_field == DEFAULT_ID_FIELD {
            fields.insert(DEFAULT_ID_FIELD.to_string(), FieldSpec::identifier().normalize());
        } else if !self.fields.contains_key(&id_field) {
            fields.insert(id_field.clone(), FieldSpec::identifier().normalize());
        }
        for (name, spec) in self.fields {
            fields.insert(name, spec.normalize());
        }

        if config.strict_identifiers {
            ensure_identifier(&table)?;
            for name in fields.keys() {
                ensure_identifier(name)?;
            }
        }

        let mut instance_fields = fields.clone();
        if timestamps {
            for name in [CREATED_AT, UPDATED_AT] {
                instance_fields.insert(
                    name.to_string(),
                    FieldSpec::timestamp().nullable().normalize(),
                );
            }
        }

        Ok(EntitySchema {
            name: self.name,
            table,
            id_field,
            timestamps,
            fields,
            instance_fields,
            relations: self.relations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::DefaultValue;

    fn user() -> EntitySchema {
        EntitySchema::builder("User")
            .field("name", FieldSpec::varchar(64))
            .field("status", FieldSpec::enumeration(["active", "banned"]).default_value("active"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builtin_identifier_comes_first() {
        let schema = user();
        let names: Vec<&str> = schema.fields().keys().map(String::as_str).collect();
        assert_eq!(names, ["id", "name", "status"]);
        assert!(schema.fields()["id"].is_primary_key());
        assert!(schema.fields()["name"].allows_null());
        assert_eq!(schema.table(), "user");
    }

    #[test]
    fn test_renamed_identifier_replaces_builtin() {
        let schema = EntitySchema::builder("Account")
            .id_field("account_id")
            .field("email", FieldSpec::varchar(128))
            .build()
            .unwrap();
        assert!(!schema.fields().contains_key("id"));
        assert_eq!(schema.fields().keys().filter(|k| *k == "account_id").count(), 1);
        assert!(schema.fields()["account_id"].is_auto_increment());
    }

    #[test]
    fn test_declared_identifier_overrides_builtin_in_place() {
        let schema = EntitySchema::builder("Code")
            .field("label", FieldSpec::text())
            .field("id", FieldSpec::varchar(8).primary_key())
            .build()
            .unwrap();
        let names: Vec<&str> = schema.fields().keys().map(String::as_str).collect();
        assert_eq!(names, ["id", "label"]);
        assert_eq!(schema.fields()["id"].type_tag(), "VARCHAR(8)");
    }

    #[test]
    fn test_timestamps_only_on_instance_fields() {
        let schema = user();
        assert!(schema.timestamps());
        assert!(!schema.fields().contains_key(CREATED_AT));
        assert!(schema.has_field(CREATED_AT));
        assert!(schema.has_field(UPDATED_AT));
        assert_eq!(schema.field(UPDATED_AT).unwrap().resolved_default(), &DefaultValue::Null);

        let plain = EntitySchema::builder("Tag").timestamps(false).build().unwrap();
        assert!(!plain.has_field(CREATED_AT));

        let defaulted = EntitySchema::builder("Tag")
            .build_with(&Config::new().default_timestamps(false))
            .unwrap();
        assert!(!defaulted.timestamps());
    }

    #[test]
    fn test_meta_projection() {
        let meta = user().meta();
        assert_eq!(meta["id"].type_tag, "UNSIGNED INT");
        assert!(meta["id"].primary_key);
        assert_eq!(meta["status"].values.as_ref().map(Vec::len), Some(2));
        assert!(!meta.contains_key(CREATED_AT));
    }

    #[test]
    fn test_strict_identifiers() {
        let bad = EntitySchema::builder("User")
            .field("name`; --", FieldSpec::varchar(8))
            .build();
        assert!(matches!(bad, Err(OrmError::InvalidCriteria(_))));

        let lenient = EntitySchema::builder("User")
            .field("display name", FieldSpec::varchar(8))
            .build_with(&Config::new().strict_identifiers(false));
        assert!(lenient.is_ok());
    }
}
