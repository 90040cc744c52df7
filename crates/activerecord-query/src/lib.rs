//! Parameterized SQL query builder for ActiveRecord Rust.
//!
//! `activerecord-query` turns structured predicates into SQL with positional
//! `?` placeholders and runs it through a [`Connection`](activerecord_core::Connection).
//!
//! # Role In The Architecture
//!
//! - **Predicates**: [`Expr`] with `equal`, `like`, `in_list`, `is`, `and`, `or`.
//! - **Statements**: [`Select`], [`InsertBuilder`], [`UpdateBuilder`],
//!   [`DeleteBuilder`], all reachable from [`Query`].
//! - **Execution**: each builder renders for the connection's dialect and
//!   executes one statement.

pub mod builder;
pub mod clause;
pub mod expr;
pub mod select;

pub use builder::{DeleteBuilder, InsertBuilder, UpdateBuilder};
pub use clause::{OrderBy, OrderDirection, Where};
pub use expr::Expr;
pub use select::Select;

use activerecord_core::Row;

/// Entry point for statements against one table.
///
/// ```
/// use activerecord_query::{Expr, Query};
/// use activerecord_core::{Dialect, Row};
///
/// let (sql, _) = Query::new("users")
///     .update(Row::new().with("name", "badger"))
///     .filter(Expr::equal("id", 1))
///     .build_with_dialect(Dialect::MySql);
/// assert_eq!(sql, "UPDATE `users` SET `name` = ? WHERE `id` = ?");
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    table: String,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn select(self) -> Select {
        Select::new(self.table)
    }

    /// `SELECT COUNT(*) AS count`.
    pub fn count(self) -> Select {
        Select::new(self.table).count()
    }

    pub fn insert(self, row: Row) -> InsertBuilder {
        InsertBuilder::new(self.table, row)
    }

    pub fn update(self, row: Row) -> UpdateBuilder {
        UpdateBuilder::new(self.table, row)
    }

    pub fn delete(self) -> DeleteBuilder {
        DeleteBuilder::new(self.table)
    }
}
