use super::entity_schema::EntitySchema;
use super::relation::{Relation, RelationDecl, RelationKind};
use crate::core::{OrmError, Result};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Schemas keyed by entity type name, plus the relation map between them.
///
/// Schemas are immutable once registered. Relations live here rather than on
/// the schema because a `belongs_to` declaration also installs the reciprocal
/// `has_many` on its target, which may be registered before or after.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    schemas: IndexMap<String, Arc<EntitySchema>>,
    relations: HashMap<String, IndexMap<String, Relation>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema. Re-registering a name replaces the previous schema
    /// along with every relation it declared.
    pub fn register(&mut self, schema: EntitySchema) -> Arc<EntitySchema> {
        let name = schema.name().to_string();
        if let Some(previous) = self.schemas.get(&name).cloned() {
            self.uninstall(&previous);
        }
        for decl in schema.relations() {
            match decl {
                RelationDecl::HasOne(rel) | RelationDecl::HasMany(rel) => {
                    self.install(&name, rel.clone());
                }
                RelationDecl::BelongsTo(rel) => {
                    self.install(&name, Relation { kind: RelationKind::HasOne, ..rel.clone() });
                    let reciprocal = Relation::has_many(name.clone()).fields(
                        rel.target_field.as_deref(),
                        rel.local_field.as_deref(),
                    );
                    self.install(&rel.target, reciprocal);
                }
            }
        }

        let schema = Arc::new(schema);
        self.schemas.insert(name, Arc::clone(&schema));
        schema
    }

    /// Drops the relations `schema` installed, reciprocal ones included.
    fn uninstall(&mut self, schema: &EntitySchema) {
        let name = schema.name();
        for decl in schema.relations() {
            match decl {
                RelationDecl::HasOne(rel) | RelationDecl::HasMany(rel) => {
                    self.remove(name, &rel.target);
                }
                RelationDecl::BelongsTo(rel) => {
                    self.remove(name, &rel.target);
                    self.remove(&rel.target, name);
                }
            }
        }
    }

    fn remove(&mut self, owner: &str, target: &str) {
        if let Some(relations) = self.relations.get_mut(owner) {
            relations.shift_remove(target);
            if relations.is_empty() {
                self.relations.remove(owner);
            }
        }
    }

    fn install(&mut self, owner: &str, relation: Relation) {
        log::trace!("relation {} -> {} ({:?})", owner, relation.target, relation.kind);
        self.relations
            .entry(owner.to_string())
            .or_default()
            .insert(relation.target.clone(), relation);
    }

    pub fn get(&self, name: &str) -> Result<Arc<EntitySchema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| OrmError::UnknownEntityType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn relation(&self, owner: &str, target: &str) -> Option<&Relation> {
        self.relations.get(owner).and_then(|r| r.get(target))
    }

    pub fn relations_of(&self, owner: &str) -> Vec<&Relation> {
        self.relations
            .get(owner)
            .map(|r| r.values().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    #[test]
    fn test_belongs_to_installs_both_directions() {
        let mut registry = Registry::new();
        registry.register(EntitySchema::builder("User").build().unwrap());
        registry.register(
            EntitySchema::builder("Post")
                .field("user_id", FieldSpec::unsigned_int())
                .belongs_to("User", Some("user_id"), Some("id"))
                .build()
                .unwrap(),
        );

        let up = registry.relation("Post", "User").unwrap();
        assert_eq!(up.kind, RelationKind::HasOne);
        assert_eq!(up.local_field.as_deref(), Some("user_id"));
        assert_eq!(up.target_field.as_deref(), Some("id"));

        let down = registry.relation("User", "Post").unwrap();
        assert_eq!(down.kind, RelationKind::HasMany);
        assert_eq!(down.local_field.as_deref(), Some("id"));
        assert_eq!(down.target_field.as_deref(), Some("user_id"));
    }

    #[test]
    fn test_reregistering_drops_previous_relations() {
        let mut registry = Registry::new();
        registry.register(EntitySchema::builder("User").build().unwrap());
        registry.register(
            EntitySchema::builder("Post")
                .field("user_id", FieldSpec::unsigned_int())
                .belongs_to("User", Some("user_id"), Some("id"))
                .build()
                .unwrap(),
        );
        registry.register(EntitySchema::builder("Post").build().unwrap());

        assert!(registry.relation("Post", "User").is_none());
        assert!(registry.relation("User", "Post").is_none());
        assert!(registry.relations_of("User").is_empty());
    }

    #[test]
    fn test_reregistering_keeps_relations_from_other_types() {
        let mut registry = Registry::new();
        registry.register(EntitySchema::builder("User").build().unwrap());
        registry.register(
            EntitySchema::builder("Post")
                .field("user_id", FieldSpec::unsigned_int())
                .belongs_to("User", Some("user_id"), Some("id"))
                .build()
                .unwrap(),
        );
        registry.register(EntitySchema::builder("User").build().unwrap());

        assert_eq!(registry.relation("User", "Post").unwrap().kind, RelationKind::HasMany);
        assert_eq!(registry.relation("Post", "User").unwrap().kind, RelationKind::HasOne);
    }

    #[test]
    fn test_unknown_type() {
        let registry = Registry::new();
        assert!(matches!(registry.get("Ghost"), Err(OrmError::UnknownEntityType(n)) if n == "Ghost"));
        assert!(registry.relations_of("Ghost").is_empty());
    }

    #[test]
    fn test_register_shares_schema() {
        let mut registry = Registry::new();
        let schema = registry.register(EntitySchema::builder("Tag").build().unwrap());
        assert!(Arc::ptr_eq(&schema, &registry.get("Tag").unwrap()));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["Tag"]);
    }
}
