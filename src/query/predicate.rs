// ============================================================================
// WHERE predicates shared by SELECT, UPDATE and DELETE
// ============================================================================

use crate::connection::Connector;
use crate::core::{OrmError, Result, Value};
use crate::schema::naming::quote_identifier;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Like,
    NotLike,
    Is,
    IsNot,
}

impl Operator {
    /// Parses an operator token; tokens are matched case-insensitively.
    pub fn parse(token: &str) -> Result<Self> {
        let normalized = token.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Self::Eq,
            "!=" | "<>" | "ne" => Self::Ne,
            "<" | "lt" => Self::Lt,
            "<=" | "lte" => Self::Le,
            ">" | "gt" => Self::Gt,
            ">=" | "gte" => Self::Ge,
            "in" => Self::In,
            "not in" => Self::NotIn,
            "like" => Self::Like,
            "not like" => Self::NotLike,
            "is" => Self::Is,
            "is not" => Self::IsNot,
            _ => {
                return Err(OrmError::InvalidCriteria(format!(
                    "unsupported operator '{}'",
                    token
                )));
            }
        };
        Ok(op)
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
        }
    }

    fn negated(&self) -> bool {
        matches!(self, Self::Ne | Self::NotIn | Self::IsNot)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One `field <op> value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    pub fn to_sql(&self, conn: &dyn Connector) -> String {
        let field = quote_identifier(&self.field);
        match (&self.op, &self.value) {
            (op, Value::Null) if matches!(op, Operator::Eq | Operator::Is) => {
                format!("{} IS NULL", field)
            }
            (op, Value::Null) if matches!(op, Operator::Ne | Operator::IsNot) => {
                format!("{} IS NOT NULL", field)
            }
            (Operator::Is | Operator::IsNot, Value::Boolean(b)) => {
                format!("{} {} {}", field, self.op, if *b { "TRUE" } else { "FALSE" })
            }
            (Operator::Eq | Operator::Ne | Operator::In | Operator::NotIn, Value::List(items)) => {
                if items.is_empty() {
                    // Nothing is IN an empty set; everything is NOT IN it.
                    return if self.op.negated() { "1 = 1" } else { "0 = 1" }.to_string();
                }
                let keyword = if self.op.negated() { "NOT IN" } else { "IN" };
                format!("{} {} {}", field, keyword, render_literal(conn, &self.value))
            }
            (Operator::In | Operator::NotIn, scalar) => {
                format!("{} {} ({})", field, self.op, render_literal(conn, scalar))
            }
            (op, value) => format!("{} {} {}", field, op, render_literal(conn, value)),
        }
    }
}

/// Conjunction of [`Condition`]s. There is no OR.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    conditions: Vec<Condition>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Parses a where map: `field => scalar` is equality, `field => [..]` is
    /// membership, `field => { op => value, .. }` yields one predicate per pair.
    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let mut clause = Self::new();
        for (field, spec) in map {
            match spec {
                serde_json::Value::Object(ops) => {
                    if ops.is_empty() {
                        return Err(OrmError::InvalidCriteria(format!(
                            "empty operator map for '{}'",
                            field
                        )));
                    }
                    for (op, value) in ops {
                        clause.push(Condition::new(
                            field.clone(),
                            Operator::parse(op)?,
                            Value::from(value.clone()),
                        ));
                    }
                }
                serde_json::Value::Array(_) => {
                    clause.push(Condition::new(field.clone(), Operator::In, Value::from(spec.clone())));
                }
                scalar => clause.push(Condition::eq(field.clone(), Value::from(scalar.clone()))),
            }
        }
        Ok(clause)
    }

    /// Renders ` WHERE a AND b`, or an empty string when there are no conditions.
    pub fn to_sql(&self, conn: &dyn Connector) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self.conditions.iter().map(|c| c.to_sql(conn)).collect();
        format!(" WHERE {}", parts.join(" AND "))
    }
}

impl FromIterator<Condition> for WhereClause {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

/// Renders a value as a SQL literal, escaping text through the connector.
pub fn render_literal(conn: &dyn Connector, value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => f.to_string(),
        Value::Float(_) => "NULL".to_string(),
        Value::Text(s) => format!("'{}'", conn.escape(s)),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(|v| render_literal(conn, v)).collect();
            format!("({})", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MockConnector;
    use serde_json::json;

    fn sql(c: Condition) -> String {
        c.to_sql(&MockConnector::new())
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse(">").unwrap(), Operator::Gt);
        assert_eq!(Operator::parse("NOT  In").unwrap(), Operator::NotIn);
        assert_eq!(Operator::parse("<>").unwrap(), Operator::Ne);
        assert!(matches!(Operator::parse("; DROP"), Err(OrmError::InvalidCriteria(_))));
    }

    #[test]
    fn test_condition_rendering() {
        assert_eq!(sql(Condition::eq("status", "active")), "`status` = 'active'");
        assert_eq!(sql(Condition::new("age", Operator::Gt, 21)), "`age` > 21");
        assert_eq!(sql(Condition::eq("deleted_at", Value::Null)), "`deleted_at` IS NULL");
        assert_eq!(sql(Condition::new("deleted_at", Operator::Ne, Value::Null)), "`deleted_at` IS NOT NULL");
        assert_eq!(sql(Condition::new("id", Operator::In, vec![1, 2, 3])), "`id` IN (1, 2, 3)");
        assert_eq!(sql(Condition::new("id", Operator::In, 4)), "`id` IN (4)");
        assert_eq!(sql(Condition::new("id", Operator::In, Vec::<i64>::new())), "0 = 1");
        assert_eq!(sql(Condition::new("id", Operator::NotIn, Vec::<i64>::new())), "1 = 1");
        assert_eq!(sql(Condition::new("flag", Operator::Is, true)), "`flag` IS TRUE");
        assert_eq!(sql(Condition::new("name", Operator::Like, "O'B%")), "`name` LIKE 'O\\'B%'");
    }

    #[test]
    fn test_where_map_is_conjunctive() {
        let map = json!({ "status": "active", "age": { ">": 21 } });
        let clause = WhereClause::from_json(map.as_object().unwrap()).unwrap();
        assert_eq!(clause.len(), 2);
        assert!(clause.conditions().contains(&Condition::eq("status", "active")));
        assert!(clause.conditions().contains(&Condition::new("age", Operator::Gt, 21)));

        let rendered = clause.to_sql(&MockConnector::new());
        assert_eq!(rendered, " WHERE `status` = 'active' AND `age` > 21");
    }

    #[test]
    fn test_where_map_multiple_ops_on_one_field() {
        let map = json!({ "age": { ">=": 18, "<": 65 }, "id": [1, 2] });
        let clause = WhereClause::from_json(map.as_object().unwrap()).unwrap();
        assert_eq!(clause.len(), 3);
        assert_eq!(clause.conditions()[2], Condition::new("id", Operator::In, vec![1, 2]));

        let bad = json!({ "age": { "~": 1 } });
        assert!(WhereClause::from_json(bad.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_literals() {
        let conn = MockConnector::new();
        assert_eq!(render_literal(&conn, &Value::Boolean(true)), "1");
        assert_eq!(render_literal(&conn, &Value::Float(2.5)), "2.5");
        assert_eq!(render_literal(&conn, &Value::Float(f64::NAN)), "NULL");
        assert_eq!(render_literal(&conn, &Value::Null), "NULL");
    }
}
