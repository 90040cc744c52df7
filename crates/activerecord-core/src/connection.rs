//! The driver boundary.
//!
//! Drivers implement [`Connection`]; everything above this layer talks to the
//! database only through it. Calls are synchronous and each one covers a
//! single statement.

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// SQL dialect spoken by a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// MySQL / MariaDB.
    #[default]
    MySql,
    /// SQLite.
    Sqlite,
}

impl Dialect {
    /// The `LIMIT` value meaning "no limit", for `OFFSET`-only queries.
    pub const fn unbounded_limit(&self) -> &'static str {
        match self {
            Dialect::MySql => "18446744073709551615",
            Dialect::Sqlite => "-1",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

/// A database connection.
///
/// Parameters are bound positionally to `?` placeholders.
pub trait Connection: Send + Sync {
    /// Dialect used when rendering SQL for this connection.
    fn dialect(&self) -> Dialect;

    /// Run a statement and return every row.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Run a statement and return the first row, if any.
    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Run an `INSERT` and return the generated auto-increment id.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64>;

    /// Run parameterless statements in order, stopping at the first failure.
    fn batch(&self, statements: &[String]) -> Result<()> {
        for sql in statements {
            self.execute(sql, &[])?;
        }
        Ok(())
    }
}
