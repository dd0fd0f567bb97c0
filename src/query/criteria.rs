// ============================================================================
// Declarative criteria and their translation onto a SELECT
// ============================================================================

use super::predicate::{Condition, Operator, WhereClause};
use super::select::{Direction, Projection, SelectQuery};
use crate::core::{OrmError, Result, Value};

const RECOGNIZED_KEYS: [&str; 7] = [
    "attributes",
    "where",
    "group",
    "order",
    "limit",
    "offset",
    "include",
];

/// One entry of the `attributes` list.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Column(String),
    Aliased { alias: String, expr: String },
}

/// Which rows to select or affect, and how to project, order and cap them.
///
/// Built fluently or parsed from a JSON criteria map:
///
/// ```
/// use activerow::query::Criteria;
/// use serde_json::json;
///
/// let criteria = Criteria::from_json(&json!({
///     "where": { "status": "active", "age": { ">": 21 } },
///     "order": { "name": "ASC" },
///     "limit": 10
/// })).unwrap();
///
/// assert_eq!(criteria.conditions.len(), 2);
/// assert_eq!(criteria.limit, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub attributes: Vec<Attribute>,
    pub conditions: WhereClause,
    pub group: Vec<String>,
    pub order: Vec<(String, Direction)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub include: Vec<String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, column: impl Into<String>) -> Self {
        self.attributes.push(Attribute::Column(column.into()));
        self
    }

    pub fn attribute_as(mut self, alias: impl Into<String>, expr: impl Into<String>) -> Self {
        self.attributes.push(Attribute::Aliased {
            alias: alias.into(),
            expr: expr.into(),
        });
        self
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::eq(field, value));
        self
    }

    pub fn where_op(mut self, field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::new(field, op, value));
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group.push(column.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn include(mut self, entity_type: impl Into<String>) -> Self {
        self.include.push(entity_type.into());
        self
    }

    /// Parses a criteria map.
    ///
    /// A map that has none of the recognized keys (`attributes`, `where`,
    /// `group`, `order`, `limit`, `offset`, `include`) is read entirely as a
    /// where map.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let map = json
            .as_object()
            .ok_or_else(|| OrmError::InvalidCriteria("criteria must be a map".to_string()))?;

        if !map.keys().any(|k| RECOGNIZED_KEYS.contains(&k.as_str())) {
            return Ok(Self {
                conditions: WhereClause::from_json(map)?,
                ..Self::default()
            });
        }

        let mut criteria = Self::new();
        for (key, value) in map {
            match key.as_str() {
                "attributes" => criteria.attributes = parse_attributes(value)?,
                "where" => {
                    let clause = value.as_object().ok_or_else(|| {
                        OrmError::InvalidCriteria("'where' must be a map".to_string())
                    })?;
                    criteria.conditions = WhereClause::from_json(clause)?;
                }
                "group" => criteria.group = parse_names("group", value)?,
                "order" => criteria.order = parse_order(value)?,
                "limit" => criteria.limit = Some(parse_count("limit", value)?),
                "offset" => criteria.offset = Some(parse_count("offset", value)?),
                "include" => criteria.include = parse_names("include", value)?,
                other => {
                    return Err(OrmError::InvalidCriteria(format!(
                        "unexpected key '{}' next to criteria keys",
                        other
                    )));
                }
            }
        }
        Ok(criteria)
    }

    /// Every column name the criteria refers to outside raw expressions.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .conditions()
            .iter()
            .map(|c| c.field.as_str())
            .chain(self.group.iter().map(String::as_str))
            .chain(self.order.iter().map(|(c, _)| c.as_str()))
    }

    /// Translates projections, predicates, grouping, ordering and the row cap
    /// onto `query`. Inclusion is left to the caller.
    ///
    /// Returns whether explicit attributes replaced the default projection.
    pub fn apply(&self, query: &mut SelectQuery) -> bool {
        for attribute in &self.attributes {
            query.select(match attribute {
                Attribute::Column(c) => Projection::Column(c.clone()),
                Attribute::Aliased { alias, expr } => Projection::Aliased {
                    expr: expr.clone(),
                    alias: alias.clone(),
                },
            });
        }

        query.filter_all(&self.conditions);

        for column in &self.group {
            query.group_by(column.clone());
        }

        for (column, direction) in &self.order {
            query.order_by(column.clone(), *direction);
        }

        if let Some(limit) = self.limit {
            query.limit(limit, self.offset);
        }

        !self.attributes.is_empty()
    }
}

fn parse_attributes(value: &serde_json::Value) -> Result<Vec<Attribute>> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| Attribute::Column(s.to_string()))
                    .ok_or_else(|| {
                        OrmError::InvalidCriteria("attribute entries must be strings".to_string())
                    })
            })
            .collect(),
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(alias, expr)| {
                expr.as_str()
                    .map(|e| Attribute::Aliased {
                        alias: alias.clone(),
                        expr: e.to_string(),
                    })
                    .ok_or_else(|| {
                        OrmError::InvalidCriteria(format!("expression for '{}' must be a string", alias))
                    })
            })
            .collect(),
        _ => Err(OrmError::InvalidCriteria(
            "'attributes' must be a list or a map".to_string(),
        )),
    }
}

fn parse_names(key: &str, value: &serde_json::Value) -> Result<Vec<String>> {
    match value {
        serde_json::Value::String(s) => Ok(vec![s.clone()]),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    OrmError::InvalidCriteria(format!("'{}' entries must be strings", key))
                })
            })
            .collect(),
        _ => Err(OrmError::InvalidCriteria(format!(
            "'{}' must be a string or a list",
            key
        ))),
    }
}

fn parse_order(value: &serde_json::Value) -> Result<Vec<(String, Direction)>> {
    match value {
        serde_json::Value::Object(map) => Ok(map
            .iter()
            .map(|(column, dir)| {
                let token = dir.as_str().unwrap_or_default();
                (column.clone(), Direction::from_token(token))
            })
            .collect()),
        // Bare column names sort ascending.
        _ => Ok(parse_names("order", value)?
            .into_iter()
            .map(|c| (c, Direction::Asc))
            .collect()),
    }
}

fn parse_count(key: &str, value: &serde_json::Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        OrmError::InvalidCriteria(format!("'{}' must be a non-negative integer", key))
    })
}

/// What a finder looks up: a bare identifier value or full criteria.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Id(Value),
    Criteria(Criteria),
}

impl Lookup {
    /// The predicates this lookup stands for, given the identifier column.
    pub fn where_clause(&self, id_field: &str) -> WhereClause {
        match self {
            Self::Id(id) => std::iter::once(Condition::eq(id_field, id.clone())).collect(),
            Self::Criteria(c) => c.conditions.clone(),
        }
    }
}

impl From<Criteria> for Lookup {
    fn from(c: Criteria) -> Self {
        Self::Criteria(c)
    }
}

impl From<Value> for Lookup {
    fn from(v: Value) -> Self {
        Self::Id(v)
    }
}

impl From<i64> for Lookup {
    fn from(id: i64) -> Self {
        Self::Id(Value::Integer(id))
    }
}

impl From<i32> for Lookup {
    fn from(id: i32) -> Self {
        Self::Id(Value::Integer(id as i64))
    }
}

impl From<&str> for Lookup {
    fn from(id: &str) -> Self {
        Self::Id(Value::Text(id.to_string()))
    }
}
