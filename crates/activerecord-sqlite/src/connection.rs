//! [`Connection`] over a single rusqlite handle.

use std::sync::{Mutex, MutexGuard, PoisonError};

use activerecord_core::{
    Connection, Dialect, Error, QueryError, QueryErrorKind, Result, Row, Value,
};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{OpenFlags, ToSql};

use crate::config::SqliteConfig;

/// A synchronous SQLite connection.
///
/// The handle sits behind a mutex; each statement holds the lock only while
/// it runs.
pub struct SqliteConnection {
    inner: Mutex<rusqlite::Connection>,
}

impl SqliteConnection {
    /// Open a database as described by `config`.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let conn = match &config.path {
            None => rusqlite::Connection::open_in_memory(),
            Some(path) => {
                let flags = if config.read_only {
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI
                } else {
                    OpenFlags::default()
                };
                rusqlite::Connection::open_with_flags(path, flags)
            }
        }
        .map_err(|e| connection_error(&e))?;

        conn.busy_timeout(config.busy_timeout)
            .map_err(|e| connection_error(&e))?;
        if config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON")
                .map_err(|e| connection_error(&e))?;
        }

        tracing::debug!(
            path = ?config.path,
            foreign_keys = config.foreign_keys,
            "Opened SQLite connection"
        );
        Ok(Self {
            inner: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database with default settings.
    pub fn open_memory() -> Result<Self> {
        Self::open(&SqliteConfig::memory())
    }

    fn lock(&self) -> MutexGuard<'_, rusqlite::Connection> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection").finish_non_exhaustive()
    }
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        tracing::trace!(sql = %sql, params = params.len(), "sqlite query");
        let conn = self.lock();
        let mut stmt = conn.prepare(sql).map_err(|e| query_error(&e, sql))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter().map(Param)))
            .map_err(|e| query_error(&e, sql))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| query_error(&e, sql))? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value = row.get_ref(idx).map_err(|e| query_error(&e, sql))?;
                values.push(from_sqlite(value));
            }
            out.push(Row::from_parts(columns.clone(), values));
        }
        Ok(out)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        tracing::trace!(sql = %sql, params = params.len(), "sqlite execute");
        let conn = self.lock();
        let affected = conn
            .execute(sql, rusqlite::params_from_iter(params.iter().map(Param)))
            .map_err(|e| query_error(&e, sql))?;
        Ok(affected as u64)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        tracing::trace!(sql = %sql, params = params.len(), "sqlite insert");
        let conn = self.lock();
        conn.execute(sql, rusqlite::params_from_iter(params.iter().map(Param)))
            .map_err(|e| query_error(&e, sql))?;
        Ok(conn.last_insert_rowid())
    }

    fn batch(&self, statements: &[String]) -> Result<()> {
        let conn = self.lock();
        for sql in statements {
            tracing::trace!(sql = %sql, "sqlite batch");
            conn.execute_batch(sql).map_err(|e| query_error(&e, sql))?;
        }
        Ok(())
    }
}

/// Binds a [`Value`] as a statement parameter.
struct Param<'a>(&'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Bool(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*b))),
            Value::BigInt(v) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*v)),
            Value::Double(v) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*v)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::BigInt(v),
        ValueRef::Real(v) => Value::Double(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}

fn query_error(err: &rusqlite::Error, sql: &str) -> Error {
    let kind = match err.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => QueryErrorKind::Constraint,
        Some(rusqlite::ErrorCode::CannotOpen | rusqlite::ErrorCode::NotADatabase) => {
            QueryErrorKind::Connection
        }
        _ => QueryErrorKind::Database,
    };
    Error::Query(QueryError::new(kind, err.to_string()).with_sql(sql))
}

fn connection_error(err: &rusqlite::Error) -> Error {
    Error::Query(QueryError::new(QueryErrorKind::Connection, err.to_string()))
}
