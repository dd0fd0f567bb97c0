// ============================================================================
// Per-type finders: find, all, destroy, build, create
// ============================================================================

use super::cast::CastKind;
use super::entity::Entity;
use super::resolver::{IncludeSet, resolve_includes};
use crate::collection::Collection;
use crate::core::{OrmError, Result, Row, Value};
use crate::facade::Database;
use crate::query::{Criteria, DeleteQuery, Lookup, Projection, SelectQuery};
use crate::result::ResultSet;
use crate::schema::naming::ensure_identifier;
use crate::schema::{CREATED_AT, EntitySchema, FieldMeta, FieldSpec, UPDATED_AT};
use indexmap::IndexMap;
use std::sync::Arc;

/// Stored timestamp columns and the epoch aliases they are selected under.
const TIMESTAMP_ALIASES: [(&str, &str); 2] = [
    (CREATED_AT, "_created_at_ts"),
    (UPDATED_AT, "_updated_at_ts"),
];

/// Handle on one registered entity type.
///
/// Obtained from [`Database::model`]; cheap to create and to clone.
#[derive(Clone)]
pub struct ModelRef<'db> {
    db: &'db Database,
    schema: Arc<EntitySchema>,
}

impl<'db> ModelRef<'db> {
    pub(crate) fn new(db: &'db Database, schema: Arc<EntitySchema>) -> Self {
        Self { db, schema }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn fields(&self) -> &IndexMap<String, FieldSpec> {
        self.schema.fields()
    }

    pub fn meta(&self) -> IndexMap<String, FieldMeta> {
        self.schema.meta()
    }

    /// Unsaved entity with every default applied.
    pub fn new_entity(&self) -> Entity {
        Entity::new(Arc::clone(&self.schema))
    }

    /// Mass-assigns `data` into a new entity without persisting it.
    pub fn build(&self, data: Row, fields: Option<&[&str]>) -> Entity {
        let mut entity = self.new_entity();
        entity.assign(data, fields);
        entity
    }

    /// [`build`](Self::build) followed by a save.
    pub fn create(&self, data: Row, fields: Option<&[&str]>) -> Result<Entity> {
        let mut entity = self.build(data, fields);
        entity.save(self.db)?;
        Ok(entity)
    }

    /// First entity matching an identifier or criteria, or `None`.
    ///
    /// Included relations are resolved and attached to the entity.
    pub fn find(&self, lookup: impl Into<Lookup>) -> Result<Option<Entity>> {
        let criteria = self.criteria_for(lookup.into());
        let mut query = self.select(&criteria)?;
        query.limit(1, criteria.offset);

        let mut cursor = query.run(&self.db.executor())?;
        let row = if cursor.advance()? {
            cursor.current_row().cloned()
        } else {
            None
        };
        cursor.close();

        let Some(row) = row else {
            return Ok(None);
        };
        let row = if self.schema.timestamps() {
            rewrite_timestamps(row)
        } else {
            row
        };

        let mut entity = Entity::from_row(Arc::clone(&self.schema), row);
        resolve_includes(self.db, &mut entity, &criteria.include)?;
        Ok(Some(entity))
    }

    /// Lazy collection over every matching row.
    ///
    /// With `raw`, elements are type-cast rows instead of entities and
    /// includes are not resolved.
    ///
    /// Includes cost one query per relation. The primary result is drained
    /// before they run, so the collection then walks buffered rows.
    pub fn all(&self, criteria: Option<Criteria>, raw: bool) -> Result<Collection<'db>> {
        let criteria = criteria.unwrap_or_default();
        let query = self.select(&criteria)?;
        let mut cursor = query.run(&self.db.executor())?;

        let mut includes = None;
        if !raw && !criteria.include.is_empty() {
            let rows = cursor.fetch_all()?;
            cursor.close();
            includes = Some(IncludeSet::load(self.db, &self.schema, &rows, &criteria.include)?);
            cursor = Box::new(ResultSet::new(rows));
        }

        let mut collection = Collection::new(Arc::clone(&self.schema), cursor).raw(raw);
        if self.schema.timestamps() {
            collection = collection.before(rewrite_timestamps);
        }
        if let Some(includes) = includes {
            collection = collection.after(move |entity| {
                includes.attach(entity);
                Ok(())
            });
        }
        Ok(collection)
    }

    /// Deletes the matching rows. Returns whether any row was removed.
    ///
    /// Criteria without conditions are rejected instead of emptying the table.
    pub fn destroy(&self, lookup: impl Into<Lookup>) -> Result<bool> {
        let clause = lookup.into().where_clause(self.schema.id_field());
        if clause.is_empty() {
            return Err(OrmError::InvalidCriteria(format!(
                "refusing to delete from '{}' without conditions",
                self.schema.table()
            )));
        }
        if self.db.config().strict_identifiers {
            for condition in clause.conditions() {
                ensure_identifier(&condition.field)?;
            }
        }

        let mut query = DeleteQuery::new(self.schema.table());
        query.filter_all(&clause);
        let mutation = query.run(&self.db.executor())?;
        Ok(mutation.took_effect())
    }

    fn criteria_for(&self, lookup: Lookup) -> Criteria {
        match lookup {
            Lookup::Id(id) => Criteria::new().where_eq(self.schema.id_field(), id),
            Lookup::Criteria(criteria) => criteria,
        }
    }

    /// SELECT for `criteria`, plus epoch projections of the timestamp columns.
    fn select(&self, criteria: &Criteria) -> Result<SelectQuery> {
        if self.db.config().strict_identifiers {
            for column in criteria.referenced_columns() {
                ensure_identifier(column)?;
            }
        }

        let mut query = SelectQuery::new(self.schema.table());
        let explicit = criteria.apply(&mut query);
        if self.schema.timestamps() {
            if !explicit {
                query.select(Projection::All);
            }
            for (column, alias) in TIMESTAMP_ALIASES {
                query.select(Projection::Function {
                    function: "UNIX_TIMESTAMP".to_string(),
                    column: column.to_string(),
                    alias: alias.to_string(),
                });
            }
        }
        Ok(query)
    }
}

/// Replaces the stored timestamp columns with their epoch projections.
pub fn rewrite_timestamps(mut row: Row) -> Row {
    for (column, alias) in TIMESTAMP_ALIASES {
        if let Some(epoch) = row.shift_remove(alias) {
            let epoch = match epoch {
                Value::Null => Value::Null,
                other => CastKind::Integer.cast(other),
            };
            row.insert(column.to_string(), epoch);
        }
    }
    row
}
