pub mod criteria;
pub mod delete;
pub mod executor;
pub mod insert;
pub mod predicate;
pub mod select;
pub mod update;

pub use criteria::{Attribute, Criteria, Lookup};
pub use delete::DeleteQuery;
pub use executor::{Executor, Mutation};
pub use insert::{Assignment, InsertQuery};
pub use predicate::{Condition, Operator, WhereClause, render_literal};
pub use select::{Direction, Projection, SelectQuery};
pub use update::UpdateQuery;
