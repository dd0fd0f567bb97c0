use super::executor::Executor;
use super::predicate::{Condition, WhereClause};
use crate::connection::Connector;
use crate::core::Result;
use crate::result::Cursor;
use crate::schema::naming::{is_identifier, quote_identifier};

/// Sort direction of one ORDER BY key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// `"ASC"` in any case sorts ascending; every other token sorts descending.
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    /// A bare column, or a raw expression when it is not a plain identifier.
    Column(String),
    Aliased { expr: String, alias: String },
    /// `FUNCTION(column) AS alias`
    Function {
        function: String,
        column: String,
        alias: String,
    },
}

impl Projection {
    fn to_sql(&self) -> String {
        match self {
            Self::All => "*".to_string(),
            Self::Column(c) => column_or_expr(c),
            Self::Aliased { expr, alias } => {
                format!("{} AS {}", column_or_expr(expr), quote_identifier(alias))
            }
            Self::Function {
                function,
                column,
                alias,
            } => format!(
                "{}({}) AS {}",
                function,
                quote_identifier(column),
                quote_identifier(alias)
            ),
        }
    }
}

fn column_or_expr(s: &str) -> String {
    if is_identifier(s) {
        quote_identifier(s)
    } else {
        s.to_string()
    }
}

/// SELECT builder.
///
/// ```
/// use activerow::connection::MockConnector;
/// use activerow::query::{Condition, Direction, Operator, SelectQuery};
///
/// let mut query = SelectQuery::new("user");
/// query
///     .filter(Condition::new("age", Operator::Gt, 21))
///     .order_by("name", Direction::Asc)
///     .limit(10, None);
/// assert_eq!(
///     query.to_sql(&MockConnector::new()),
///     "SELECT * FROM `user` WHERE `age` > 21 ORDER BY `name` ASC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    projections: Vec<Projection>,
    where_clause: WhereClause,
    group_by: Vec<String>,
    order_by: Vec<(String, Direction)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projections: Vec::new(),
            where_clause: WhereClause::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Adds a projection. With none, the query selects `*`.
    pub fn select(&mut self, projection: Projection) -> &mut Self {
        self.projections.push(projection);
        self
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    pub fn filter(&mut self, condition: Condition) -> &mut Self {
        self.where_clause.push(condition);
        self
    }

    pub fn filter_all(&mut self, clause: &WhereClause) -> &mut Self {
        for condition in clause.conditions() {
            self.where_clause.push(condition.clone());
        }
        self
    }

    pub fn where_clause(&self) -> &WhereClause {
        &self.where_clause
    }

    pub fn group_by(&mut self, column: impl Into<String>) -> &mut Self {
        self.group_by.push(column.into());
        self
    }

    pub fn order_by(&mut self, column: impl Into<String>, direction: Direction) -> &mut Self {
        self.order_by.push((column.into(), direction));
        self
    }

    /// Caps the row count; the offset only applies together with a limit.
    pub fn limit(&mut self, limit: u64, offset: Option<u64>) -> &mut Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    pub fn to_sql(&self, conn: &dyn Connector) -> String {
        let projections = if self.projections.is_empty() {
            "*".to_string()
        } else {
            self.projections
                .iter()
                .map(Projection::to_sql)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!(
            "SELECT {} FROM {}{}",
            projections,
            quote_identifier(&self.table),
            self.where_clause.to_sql(conn)
        );

        if !self.group_by.is_empty() {
            let cols: Vec<String> = self.group_by.iter().map(|c| column_or_expr(c)).collect();
            sql.push_str(&format!(" GROUP BY {}", cols.join(", ")));
        }

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|(c, d)| format!("{} {}", column_or_expr(c), d.as_sql()))
                .collect();
            sql.push_str(&format!(" ORDER BY {}", keys.join(", ")));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
            if let Some(offset) = self.offset {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }

        sql
    }

    pub fn run(&self, exec: &Executor<'_>) -> Result<Box<dyn Cursor>> {
        exec.query(&self.to_sql(exec.connector()))
    }
}
