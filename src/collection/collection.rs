use super::packed::PackedCollection;
use crate::core::{OrmError, Result, Row, Value};
use crate::facade::Database;
use crate::model::{Entity, datacast};
use crate::query::{Criteria, Operator};
use crate::result::Cursor;
use crate::schema::EntitySchema;
use std::fmt;
use std::sync::Arc;

/// One element of a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Entity(Entity),
    /// Type-cast row, produced in raw mode.
    Row(Row),
}

impl Record {
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(e) => Some(e),
            Self::Row(_) => None,
        }
    }

    pub fn into_entity(self) -> Option<Entity> {
        match self {
            Self::Entity(e) => Some(e),
            Self::Row(_) => None,
        }
    }

    pub fn row(&self) -> Option<&Row> {
        match self {
            Self::Row(r) => Some(r),
            Self::Entity(_) => None,
        }
    }

    /// Value of `field`, from the entity or the row.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Self::Entity(e) => e.get(field).ok(),
            Self::Row(r) => r.get(field),
        }
    }
}

enum State {
    Unstarted,
    Positioned(Record),
    Exhausted,
}

type BeforeHook<'a> = Box<dyn Fn(Row) -> Row + 'a>;
type AfterHook<'a> = Box<dyn Fn(&mut Entity) -> Result<()> + 'a>;

/// Forward-only view over a query result, materializing one element at a time.
///
/// The collection owns its cursor and closes it when dropped. Iterating
/// starts from the first row when the collection is unstarted, yields the
/// current element if iteration has not handed it out yet, and otherwise
/// continues after it. [`rewind`](Self::rewind) re-positions on the first row
/// when the cursor supports it.
///
/// A collection without a cursor (see [`Collection::empty`]) is exhausted from
/// the start and reports no row count.
pub struct Collection<'a> {
    schema: Arc<EntitySchema>,
    cursor: Option<Box<dyn Cursor>>,
    state: State,
    /// Whether the positioned element has been handed out by `next`.
    yielded: bool,
    raw: bool,
    before: Option<BeforeHook<'a>>,
    after: Option<AfterHook<'a>>,
}

impl<'a> Collection<'a> {
    pub fn new(schema: Arc<EntitySchema>, cursor: Box<dyn Cursor>) -> Self {
        Self {
            schema,
            cursor: Some(cursor),
            state: State::Unstarted,
            yielded: false,
            raw: false,
            before: None,
            after: None,
        }
    }

    /// Collection bound to no cursor.
    pub fn empty(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            cursor: None,
            state: State::Exhausted,
            yielded: false,
            raw: false,
            before: None,
            after: None,
        }
    }

    /// Yield type-cast rows instead of entities.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Row transform applied before materialization.
    pub fn before(mut self, hook: impl Fn(Row) -> Row + 'a) -> Self {
        self.before = Some(Box::new(hook));
        self
    }

    /// Entity hook applied after materialization. Not applied in raw mode.
    pub fn after(mut self, hook: impl Fn(&mut Entity) -> Result<()> + 'a) -> Self {
        self.after = Some(Box::new(hook));
        self
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn entity_type(&self) -> &str {
        self.schema.name()
    }

    /// Re-positions on the first row.
    ///
    /// Fails with `CursorNotRewindable` when iteration has started on a
    /// cursor that cannot go back.
    pub fn rewind(&mut self) -> Result<()> {
        let Some(cursor) = self.cursor.as_mut() else {
            self.state = State::Exhausted;
            return Ok(());
        };
        if !matches!(self.state, State::Unstarted) && !cursor.supports_rewind() {
            return Err(OrmError::CursorNotRewindable);
        }
        cursor.rewind_to_first()?;
        self.state = State::Unstarted;
        self.step()
    }

    /// Moves to the next element. Once exhausted, stays exhausted.
    pub fn advance(&mut self) -> Result<()> {
        if matches!(self.state, State::Exhausted) {
            return Ok(());
        }
        self.step()
    }

    fn step(&mut self) -> Result<()> {
        let Some(cursor) = self.cursor.as_mut() else {
            self.state = State::Exhausted;
            return Ok(());
        };

        let row = match cursor.advance() {
            Ok(true) => cursor.current_row().cloned().unwrap_or_default(),
            Ok(false) => {
                log::trace!("{} collection exhausted", self.schema.name());
                self.state = State::Exhausted;
                if !cursor.supports_rewind() {
                    cursor.close();
                }
                return Ok(());
            }
            Err(e) => {
                self.state = State::Exhausted;
                return Err(e);
            }
        };

        match self.materialize(row) {
            Ok(record) => {
                self.state = State::Positioned(record);
                self.yielded = false;
                Ok(())
            }
            Err(e) => {
                self.state = State::Exhausted;
                Err(e)
            }
        }
    }

    fn materialize(&self, row: Row) -> Result<Record> {
        let row = match &self.before {
            Some(hook) => hook(row),
            None => row,
        };
        if self.raw {
            return Ok(Record::Row(datacast(row, self.schema.instance_fields())));
        }

        let mut entity = Entity::from_row(Arc::clone(&self.schema), row);
        if let Some(hook) = &self.after {
            hook(&mut entity)?;
        }
        Ok(Record::Entity(entity))
    }

    pub fn current(&self) -> Option<&Record> {
        match &self.state {
            State::Positioned(record) => Some(record),
            _ => None,
        }
    }

    /// Row index of the current element.
    pub fn key(&self) -> Option<usize> {
        match self.state {
            State::Positioned(_) => self.cursor.as_ref().and_then(|c| c.current_index()),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    /// Rows in the underlying result; `None` when unbound or unknown.
    ///
    /// Named apart from [`Iterator::count`], which drains the collection.
    pub fn row_count(&self) -> Option<usize> {
        self.cursor.as_ref().and_then(|c| c.row_count())
    }

    /// Drains the current and every remaining element into memory.
    pub fn to_vec(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(self.row_count().unwrap_or(0));
        if self.yielded {
            if let Some(current) = self.current() {
                records.push(current.clone());
            }
        }
        for record in self.by_ref() {
            records.push(record?);
        }
        Ok(records)
    }

    /// The entities of this collection, skipping raw rows.
    pub fn entities(self) -> impl Iterator<Item = Result<Entity>> + 'a {
        self.filter_map(|record| match record {
            Ok(record) => record.into_entity().map(Ok),
            Err(e) => Some(Err(e)),
        })
    }

    /// Drains the collection, keeping only entity type and identifiers.
    pub fn pack(&mut self) -> Result<PackedCollection> {
        let id_field = self.schema.id_field().to_string();
        let identifiers = self
            .to_vec()?
            .iter()
            .filter_map(|record| record.get(&id_field))
            .filter(|id| !id.is_null())
            .cloned()
            .collect();
        Ok(PackedCollection::new(self.schema.name(), identifiers))
    }

    /// Re-queries the rows a packed collection refers to.
    ///
    /// Rows deleted since packing are missing; an empty identifier list
    /// yields an unbound collection without querying.
    pub fn unpack(db: &'a Database, packed: &PackedCollection) -> Result<Self> {
        let model = db.model(&packed.entity_type)?;
        if packed.identifiers.is_empty() {
            return Ok(Self::empty(Arc::clone(model.schema())));
        }
        let criteria = Criteria::new().where_op(
            model.schema().id_field(),
            Operator::In,
            Value::List(packed.identifiers.clone()),
        );
        model.all(Some(criteria), false)
    }

    pub fn json(&mut self) -> Result<String> {
        self.pack()?.to_json()
    }

    pub fn from_json(db: &'a Database, json: &str) -> Result<Self> {
        Self::unpack(db, &PackedCollection::from_json(json)?)
    }

    /// MessagePack form of [`pack`](Self::pack).
    pub fn serialize(&mut self) -> Result<Vec<u8>> {
        self.pack()?.to_msgpack()
    }

    pub fn deserialize(db: &'a Database, bytes: &[u8]) -> Result<Self> {
        Self::unpack(db, &PackedCollection::from_msgpack(bytes)?)
    }
}

impl Iterator for Collection<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let moved = match self.state {
            State::Unstarted => self.rewind(),
            State::Positioned(_) if !self.yielded => Ok(()),
            _ => self.advance(),
        };
        if let Err(e) = moved {
            return Some(Err(e));
        }
        self.yielded = true;
        self.current().cloned().map(Ok)
    }
}

impl Drop for Collection<'_> {
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.close();
        }
    }
}

impl fmt::Debug for Collection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Unstarted => "unstarted",
            State::Positioned(_) => "positioned",
            State::Exhausted => "exhausted",
        };
        f.debug_struct("Collection")
            .field("entity_type", &self.schema.name())
            .field("state", &state)
            .field("raw", &self.raw)
            .field("row_count", &self.row_count())
            .finish()
    }
}
