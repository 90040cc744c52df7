//! Query builders for INSERT, UPDATE, DELETE operations.

use activerecord_core::{Connection, Dialect, Result, Row, Value, quote_ident};

use crate::clause::Where;
use crate::expr::Expr;

/// INSERT query builder.
///
/// Every column in the row is written, NULLs included.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    row: Row,
}

impl InsertBuilder {
    pub fn new(table: impl Into<String>, row: Row) -> Self {
        Self {
            table: table.into(),
            row,
        }
    }

    /// Build the INSERT SQL and parameters with specific dialect.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let table = quote_ident(&self.table);
        if self.row.is_empty() {
            let sql = match dialect {
                Dialect::Sqlite => format!("INSERT INTO {} DEFAULT VALUES", table),
                Dialect::MySql => format!("INSERT INTO {} () VALUES ()", table),
            };
            return (sql, Vec::new());
        }

        let columns: Vec<String> = self.row.columns().map(quote_ident).collect();
        let values: Vec<Value> = self.row.iter().map(|(_, v)| v.clone()).collect();
        let placeholders = vec!["?"; values.len()].join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );
        (sql, values)
    }

    /// Execute the INSERT and return the inserted ID.
    pub fn execute<C: Connection + ?Sized>(&self, conn: &C) -> Result<i64> {
        let (sql, params) = self.build_with_dialect(conn.dialect());
        tracing::debug!(table = %self.table, sql = %sql, "Executing insert");
        conn.insert(&sql, &params)
    }
}

/// UPDATE query builder.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    row: Row,
    where_clause: Option<Where>,
}

impl UpdateBuilder {
    pub fn new(table: impl Into<String>, row: Row) -> Self {
        Self {
            table: table.into(),
            row,
            where_clause: None,
        }
    }

    /// Add a WHERE condition, ANDed with any existing one.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(expr),
            None => Where::new(expr),
        });
        self
    }

    /// Build the UPDATE SQL and parameters.
    ///
    /// An empty row yields empty SQL.
    pub fn build_with_dialect(&self, _dialect: Dialect) -> (String, Vec<Value>) {
        if self.row.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut params = Vec::with_capacity(self.row.len());
        let mut set_clauses = Vec::with_capacity(self.row.len());
        for (column, value) in self.row.iter() {
            set_clauses.push(format!("{} = ?", quote_ident(column)));
            params.push(value.clone());
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_ident(&self.table),
            set_clauses.join(", ")
        );
        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.to_sql(&mut params));
        }
        (sql, params)
    }

    /// Execute the UPDATE and return rows affected.
    pub fn execute<C: Connection + ?Sized>(&self, conn: &C) -> Result<u64> {
        let (sql, params) = self.build_with_dialect(conn.dialect());
        if sql.is_empty() {
            return Ok(0);
        }
        tracing::debug!(table = %self.table, sql = %sql, "Executing update");
        conn.execute(&sql, &params)
    }
}

/// DELETE query builder.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    where_clause: Option<Where>,
}

impl DeleteBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: None,
        }
    }

    /// Add a WHERE condition, ANDed with any existing one.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(expr),
            None => Where::new(expr),
        });
        self
    }

    /// Build the DELETE SQL and parameters.
    pub fn build_with_dialect(&self, _dialect: Dialect) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", quote_ident(&self.table));
        let mut params = Vec::new();
        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.to_sql(&mut params));
        }
        (sql, params)
    }

    /// Execute the DELETE and return rows affected.
    pub fn execute<C: Connection + ?Sized>(&self, conn: &C) -> Result<u64> {
        let (sql, params) = self.build_with_dialect(conn.dialect());
        tracing::debug!(table = %self.table, sql = %sql, "Executing delete");
        conn.execute(&sql, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> Row {
        Row::new().with("name", "Spider-Man").with("age", 25)
    }

    #[test]
    fn test_insert_basic() {
        let (sql, params) = InsertBuilder::new("heroes", hero()).build_with_dialect(Dialect::MySql);
        assert_eq!(sql, "INSERT INTO `heroes` (`name`, `age`) VALUES (?, ?)");
        assert_eq!(params, vec![Value::from("Spider-Man"), Value::BigInt(25)]);
    }

    #[test]
    fn test_insert_keeps_nulls() {
        let row = Row::new().with("name", "x").with("note", Value::Null);
        let (sql, params) = InsertBuilder::new("t", row).build_with_dialect(Dialect::Sqlite);
        assert_eq!(sql, "INSERT INTO `t` (`name`, `note`) VALUES (?, ?)");
        assert_eq!(params[1], Value::Null);
    }

    #[test]
    fn test_insert_empty_row_per_dialect() {
        let sqlite = InsertBuilder::new("t", Row::new()).build_with_dialect(Dialect::Sqlite);
        assert_eq!(sqlite.0, "INSERT INTO `t` DEFAULT VALUES");
        let mysql = InsertBuilder::new("t", Row::new()).build_with_dialect(Dialect::MySql);
        assert_eq!(mysql.0, "INSERT INTO `t` () VALUES ()");
    }

    #[test]
    fn test_update_basic() {
        let (sql, params) = UpdateBuilder::new("heroes", hero())
            .filter(Expr::equal("id", 7))
            .build_with_dialect(Dialect::Sqlite);
        assert_eq!(sql, "UPDATE `heroes` SET `name` = ?, `age` = ? WHERE `id` = ?");
        assert_eq!(params.len(), 3);
        assert_eq!(params[2], Value::BigInt(7));
    }

    #[test]
    fn test_update_empty_row_is_noop() {
        let (sql, params) = UpdateBuilder::new("t", Row::new())
            .filter(Expr::equal("id", 1))
            .build_with_dialect(Dialect::Sqlite);
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_delete_basic() {
        let (sql, params) = DeleteBuilder::new("heroes")
            .filter(Expr::equal("id", 1))
            .build_with_dialect(Dialect::MySql);
        assert_eq!(sql, "DELETE FROM `heroes` WHERE `id` = ?");
        assert_eq!(params, vec![Value::BigInt(1)]);
    }

    #[test]
    fn test_delete_all() {
        let (sql, _) = DeleteBuilder::new("heroes").build_with_dialect(Dialect::MySql);
        assert_eq!(sql, "DELETE FROM `heroes`");
    }
}
