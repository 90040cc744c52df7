//! Recording connection for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use activerecord_core::{Connection, Dialect, QueryError, QueryErrorKind, Result, Row, Value};

/// Records every statement and answers from scripted results.
///
/// Queries pop scripted row sets (empty when none are left), inserts pop
/// scripted ids (then count up), and `fail_next` makes the next statement fail.
#[derive(Debug, Default)]
pub(crate) struct MockConnection {
    statements: Mutex<Vec<(String, Vec<Value>)>>,
    rows: Mutex<VecDeque<Vec<Row>>>,
    ids: Mutex<VecDeque<i64>>,
    next_id: Mutex<i64>,
    failure: Mutex<Option<String>>,
}

impl MockConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_rows(&self, rows: Vec<Row>) {
        self.rows.lock().unwrap().push_back(rows);
    }

    pub(crate) fn push_insert_id(&self, id: i64) {
        self.ids.lock().unwrap().push_back(id);
    }

    pub(crate) fn fail_next(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.statements.lock().unwrap().clone()
    }

    pub(crate) fn last_statement(&self) -> Option<(String, Vec<Value>)> {
        self.statements.lock().unwrap().last().cloned()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Result<()> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        match self.failure.lock().unwrap().take() {
            Some(message) => {
                let kind = if message.to_lowercase().contains("constraint") {
                    QueryErrorKind::Constraint
                } else {
                    QueryErrorKind::Database
                };
                Err(QueryError::new(kind, message).with_sql(sql).into())
            }
            None => Ok(()),
        }
    }
}

impl Connection for MockConnection {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.record(sql, params)?;
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.record(sql, params)?;
        Ok(1)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        self.record(sql, params)?;
        let mut next = self.next_id.lock().unwrap();
        let id = self.ids.lock().unwrap().pop_front().unwrap_or(*next + 1);
        *next = id;
        Ok(id)
    }
}
