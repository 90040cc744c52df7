//! SELECT query builder.

use activerecord_core::{Connection, Dialect, Result, Row, Value, quote_ident};

use crate::clause::{OrderBy, OrderDirection, Where, limit_offset};
use crate::expr::Expr;

/// A SELECT (or `COUNT(*)`) over one table.
///
/// # Example
///
/// ```
/// use activerecord_query::{Expr, OrderDirection, Query};
/// use activerecord_core::Dialect;
///
/// let (sql, params) = Query::new("users")
///     .select()
///     .filter(Expr::equal("soft_delete", 0))
///     .order_by("name", OrderDirection::Asc)
///     .limit(10)
///     .build_with_dialect(Dialect::Sqlite);
///
/// assert_eq!(
///     sql,
///     "SELECT * FROM `users` WHERE `soft_delete` = ? ORDER BY `name` ASC LIMIT 10"
/// );
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    count: bool,
    where_clause: Option<Where>,
    order_by: Vec<OrderBy>,
    group_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            count: false,
            where_clause: None,
            order_by: Vec::new(),
            group_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Restrict the selected columns (default `*`).
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Turn this into `SELECT COUNT(*) AS count`; ordering and paging are dropped.
    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Add a WHERE condition, ANDed with any existing one.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(expr),
            None => Where::new(expr),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by.push(OrderBy::new(column, direction));
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
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

    pub fn where_clause(&self) -> Option<&Where> {
        self.where_clause.as_ref()
    }

    /// Build the SQL and parameters for a dialect.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut body = format!("FROM {}", quote_ident(&self.table));

        if let Some(where_clause) = self.where_clause.as_ref().filter(|w| !w.is_empty()) {
            body.push_str(" WHERE ");
            body.push_str(&where_clause.to_sql(&mut params));
        }

        if !self.group_by.is_empty() {
            let groups: Vec<String> = self.group_by.iter().map(|g| quote_ident(g)).collect();
            body.push_str(" GROUP BY ");
            body.push_str(&groups.join(", "));
        }

        if self.count {
            let sql = if self.group_by.is_empty() {
                format!("SELECT COUNT(*) AS `count` {}", body)
            } else {
                format!("SELECT COUNT(*) AS `count` FROM (SELECT 1 {}) AS `grouped`", body)
            };
            return (sql, params);
        }

        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut sql = format!("SELECT {} {}", columns, body);

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self.order_by.iter().map(OrderBy::to_sql).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        sql.push_str(&limit_offset(dialect, self.limit, self.offset));
        (sql, params)
    }

    /// Run the query and return every row.
    pub fn fetch_all<C: Connection + ?Sized>(&self, conn: &C) -> Result<Vec<Row>> {
        let (sql, params) = self.build_with_dialect(conn.dialect());
        tracing::debug!(table = %self.table, sql = %sql, "Executing select");
        conn.query(&sql, &params)
    }

    /// Run the query and return the first row, if any.
    pub fn fetch_one<C: Connection + ?Sized>(&self, conn: &C) -> Result<Option<Row>> {
        let (sql, params) = self.build_with_dialect(conn.dialect());
        tracing::debug!(table = %self.table, sql = %sql, "Executing select");
        conn.query_one(&sql, &params)
    }

    /// Count the rows this query's WHERE/GROUP BY would produce.
    pub fn fetch_count<C: Connection + ?Sized>(&self, conn: &C) -> Result<u64> {
        let counter = self.clone().count();
        let row = counter.fetch_one(conn)?;
        let count = row
            .as_ref()
            .and_then(|r| r.get("count"))
            .and_then(Value::to_i64)
            .unwrap_or(0);
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
