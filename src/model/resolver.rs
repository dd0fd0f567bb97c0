use super::cast::cast_field;
use super::entity::{Entity, Included};
use crate::core::{Result, Row, Value};
use crate::facade::Database;
use crate::query::{Criteria, Operator};
use crate::schema::{EntitySchema, Relation, RelationKind};

/// Resolves every named relation of `entity` and attaches the results.
///
/// Names without a registered relation are skipped. Each resolved relation
/// costs one extra query.
pub(crate) fn resolve_includes(db: &Database, entity: &mut Entity, names: &[String]) -> Result<()> {
    for name in names {
        let Some(relation) = db.registry().relation(entity.entity_type(), name) else {
            log::trace!("{} has no relation to {}, skipping include", entity.entity_type(), name);
            continue;
        };
        let related = resolve(db, entity, relation)?;
        entity.attach(name.clone(), related);
    }
    Ok(())
}

/// Loads the entities `relation` points at from `entity`.
pub fn resolve(db: &Database, entity: &Entity, relation: &Relation) -> Result<Included> {
    let target = db.model(&relation.target)?;
    let local_field = relation
        .local_field
        .as_deref()
        .unwrap_or_else(|| entity.id_field());
    let target_field = relation
        .target_field
        .as_deref()
        .unwrap_or_else(|| target.schema().id_field());

    let key = entity.get(local_field)?.clone();
    log::trace!(
        "resolving {:?} {}.{} -> {}.{}",
        relation.kind,
        entity.entity_type(),
        local_field,
        relation.target,
        target_field
    );

    match relation.kind {
        RelationKind::HasOne => {
            if key.is_null() {
                return Ok(Included::One(None));
            }
            let found = target.find(Criteria::new().where_eq(target_field, key))?;
            Ok(Included::One(found.map(Box::new)))
        }
        RelationKind::HasMany => {
            if key.is_null() {
                return Ok(Included::Many(Vec::new()));
            }
            let collection = target.all(Some(Criteria::new().where_eq(target_field, key)), false)?;
            let entities = collection.entities().collect::<Result<Vec<_>>>()?;
            Ok(Included::Many(entities))
        }
    }
}

/// Related entities loaded for a whole result set, one query per relation.
///
/// Keys are collected from every row up front and each relation is fetched
/// with a single `IN` query; [`attach`](Self::attach) then hands each entity
/// the targets that match its key.
#[derive(Debug)]
pub(crate) struct IncludeSet {
    loaded: Vec<LoadedRelation>,
}

#[derive(Debug)]
struct LoadedRelation {
    name: String,
    kind: RelationKind,
    local_field: String,
    target_field: String,
    targets: Vec<Entity>,
}

impl IncludeSet {
    pub(crate) fn load(db: &Database, schema: &EntitySchema, rows: &[Row], names: &[String]) -> Result<Self> {
        let mut loaded = Vec::with_capacity(names.len());
        for name in names {
            let Some(relation) = db.registry().relation(schema.name(), name) else {
                log::trace!("{} has no relation to {}, skipping include", schema.name(), name);
                continue;
            };
            let target = db.model(&relation.target)?;
            let local_field = relation.local_field.as_deref().unwrap_or_else(|| schema.id_field());
            let target_field = relation
                .target_field
                .as_deref()
                .unwrap_or_else(|| target.schema().id_field());

            let mut keys: Vec<Value> = Vec::new();
            for row in rows {
                let key = key_of(schema, row, local_field);
                if !key.is_null() && !keys.contains(&key) {
                    keys.push(key);
                }
            }
            log::trace!(
                "loading {:?} {}.{} -> {}.{} for {} keys",
                relation.kind,
                schema.name(),
                local_field,
                relation.target,
                target_field,
                keys.len()
            );

            let targets = if keys.is_empty() {
                Vec::new()
            } else {
                let criteria = Criteria::new().where_op(target_field, Operator::In, Value::List(keys));
                target.all(Some(criteria), false)?.entities().collect::<Result<Vec<_>>>()?
            };
            loaded.push(LoadedRelation {
                name: name.clone(),
                kind: relation.kind,
                local_field: local_field.to_string(),
                target_field: target_field.to_string(),
                targets,
            });
        }
        Ok(Self { loaded })
    }

    pub(crate) fn attach(&self, entity: &mut Entity) {
        for relation in &self.loaded {
            let key = entity.get(&relation.local_field).ok().cloned().unwrap_or(Value::Null);
            let mut matching = relation
                .targets
                .iter()
                .filter(|t| !key.is_null() && t.get(&relation.target_field).ok() == Some(&key));
            let related = match relation.kind {
                RelationKind::HasOne => Included::One(matching.next().cloned().map(Box::new)),
                RelationKind::HasMany => Included::Many(matching.cloned().collect()),
            };
            entity.attach(relation.name.clone(), related);
        }
    }
}

/// `field` of a stored row, cast the way the entity will hold it.
fn key_of(schema: &EntitySchema, row: &Row, field: &str) -> Value {
    let value = row.get(field).cloned().unwrap_or(Value::Null);
    match schema.field(field) {
        Some(spec) => cast_field(spec, value),
        None => value,
    }
}
