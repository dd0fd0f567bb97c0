use super::cast::cast_field;
use crate::core::{OrmError, Result, Row, Value, unix_now};
use crate::facade::Database;
use crate::query::{Condition, InsertQuery, UpdateQuery};
use crate::schema::naming::quote_identifier;
use crate::schema::{CREATED_AT, DefaultValue, EntitySchema, UPDATED_AT};
use indexmap::IndexMap;
use std::sync::Arc;

/// Related entities attached to an entity by `include`.
#[derive(Debug, Clone, PartialEq)]
pub enum Included {
    One(Option<Box<Entity>>),
    Many(Vec<Entity>),
}

/// One schema-bound record.
///
/// Values are stored already cast to their field's type. Only fields the
/// schema declares (plus the timestamp columns when enabled) can be held.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    schema: Arc<EntitySchema>,
    values: IndexMap<String, Value>,
    dirty: bool,
    included: IndexMap<String, Included>,
}

impl Entity {
    /// Fresh, unsaved entity holding every field's default.
    ///
    /// `CURRENT_TIMESTAMP` defaults resolve now. With timestamps enabled,
    /// `created_at` is stamped now and `updated_at` starts out NULL.
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        let now = unix_now();
        let mut values = IndexMap::with_capacity(schema.instance_fields().len());
        for (name, spec) in schema.instance_fields() {
            let initial = match spec.resolved_default() {
                DefaultValue::Null => Value::Null,
                DefaultValue::Value(v) => cast_field(spec, v.clone()),
                DefaultValue::CurrentTimestamp => Value::Integer(now),
            };
            values.insert(name.clone(), initial);
        }

        if schema.timestamps() {
            values.insert(CREATED_AT.to_string(), Value::Integer(now));
            values.insert(UPDATED_AT.to_string(), Value::Null);
        }
        values.insert(schema.id_field().to_string(), Value::Null);

        Self {
            schema,
            values,
            dirty: true,
            included: IndexMap::new(),
        }
    }

    /// Entity materialized from a stored row; starts out clean.
    pub fn from_row(schema: Arc<EntitySchema>, row: Row) -> Self {
        let mut entity = Self::new(schema);
        entity.assign(row, None);
        entity.dirty = false;
        entity
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn entity_type(&self) -> &str {
        self.schema.name()
    }

    pub fn get(&self, field: &str) -> Result<&Value> {
        self.values
            .get(field)
            .ok_or_else(|| OrmError::FieldNotDefined(field.to_string()))
    }

    /// Casts and stores `value`. Undeclared fields are ignored.
    ///
    /// Returns whether the field is declared.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> bool {
        let Some(spec) = self.schema.field(field) else {
            return false;
        };
        let value = cast_field(spec, value.into());
        self.values.insert(field.to_string(), value);
        self.dirty = true;
        true
    }

    /// Mass assignment through [`set`](Self::set).
    ///
    /// Keys outside `allowed` (when given) and undeclared keys are dropped
    /// without error.
    pub fn assign(&mut self, data: Row, allowed: Option<&[&str]>) {
        for (field, value) in data {
            if let Some(allowed) = allowed {
                if !allowed.contains(&field.as_str()) {
                    continue;
                }
            }
            self.set(&field, value);
        }
    }

    /// All values, or only the named ones that exist.
    pub fn values(&self, fields: Option<&[&str]>) -> Row {
        match fields {
            None => self.values.clone(),
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    self.values
                        .get(*name)
                        .map(|v| (name.to_string(), v.clone()))
                })
                .collect(),
        }
    }

    pub fn id_field(&self) -> &str {
        self.schema.id_field()
    }

    /// Identifier value, `None` until the entity has been stored.
    pub fn id(&self) -> Option<&Value> {
        self.values
            .get(self.schema.id_field())
            .filter(|v| !v.is_null())
    }

    /// Whether `field` is declared, whatever it holds.
    pub fn has_field(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Whether `field` is declared and holds a non-NULL value.
    pub fn has_value(&self, field: &str) -> bool {
        self.values.get(field).is_some_and(|v| !v.is_null())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn included(&self, entity_type: &str) -> Option<&Included> {
        self.included.get(entity_type)
    }

    pub(crate) fn attach(&mut self, entity_type: impl Into<String>, related: Included) {
        self.included.insert(entity_type.into(), related);
    }

    /// Inserts the entity when it has no identifier, updates it otherwise.
    ///
    /// Returns whether a row was affected. An insert that collapsed into an
    /// unchanged duplicate reports `false`.
    pub fn save(&mut self, db: &Database) -> Result<bool> {
        let exec = db.executor();
        let table = self.schema.table().to_string();
        let id_field = self.schema.id_field().to_string();
        let now = unix_now();

        let mutation = match self.id().cloned() {
            Some(id) => {
                let mut query = UpdateQuery::new(table);
                for name in self.schema.fields().keys().filter(|n| **n != id_field) {
                    query.set(name.clone(), self.value_or_null(name));
                }
                if self.schema.timestamps() {
                    query.set_raw(UPDATED_AT, from_unixtime(now));
                }
                query.filter(Condition::eq(id_field.clone(), id));
                let mutation = query.run(&exec)?;
                if self.schema.timestamps() {
                    self.values.insert(UPDATED_AT.to_string(), Value::Integer(now));
                }
                mutation
            }
            None => {
                let mut query = InsertQuery::new(table);
                for name in self.schema.fields().keys().filter(|n| **n != id_field) {
                    query.set(name.clone(), self.value_or_null(name));
                }
                if self.schema.timestamps() {
                    query.set_raw(CREATED_AT, from_unixtime(now));
                }

                let mut upserts = self
                    .schema
                    .fields()
                    .iter()
                    .filter_map(|(name, spec)| spec.on_duplicate.as_ref().map(|e| (name, e)))
                    .peekable();
                if upserts.peek().is_some() {
                    // Lets LAST_INSERT_ID() report the existing row on a collision.
                    query.on_duplicate_key(
                        id_field.clone(),
                        format!("LAST_INSERT_ID({})", quote_identifier(&id_field)),
                    );
                }
                for (name, expr) in upserts {
                    query.on_duplicate_key(name.clone(), expr.clone());
                }

                let mutation = query.run(&exec)?;
                if self.schema.timestamps() {
                    self.values.insert(CREATED_AT.to_string(), Value::Integer(now));
                }
                if let Some(id) = mutation.last_insert_id.filter(|id| *id > 0) {
                    let value = match self.schema.field(&id_field) {
                        Some(spec) => cast_field(spec, Value::Integer(id)),
                        None => Value::Integer(id),
                    };
                    self.values.insert(id_field.clone(), value);
                }
                mutation
            }
        };

        self.dirty = false;
        Ok(mutation.took_effect())
    }

    /// Assigns `data` restricted to `fields`, then saves.
    ///
    /// The assignment is skipped unless both are non-empty.
    pub fn save_with(&mut self, db: &Database, data: Row, fields: &[&str]) -> Result<bool> {
        if !data.is_empty() && !fields.is_empty() {
            self.assign(data, Some(fields));
        }
        self.save(db)
    }
}

impl Entity {
    fn value_or_null(&self, field: &str) -> Value {
        self.values.get(field).cloned().unwrap_or(Value::Null)
    }
}

fn from_unixtime(epoch: i64) -> String {
    format!("FROM_UNIXTIME({})", epoch)
}
