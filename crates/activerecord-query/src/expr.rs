//! Boolean predicates.
//!
//! An [`Expr`] renders to SQL with positional `?` placeholders, pushing its
//! bound values onto a parameter list in placeholder order.

use activerecord_core::{Value, quote_ident};

/// A WHERE-clause predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `col = ?` (`col IS NULL` for a NULL value).
    Equal { column: String, value: Value },
    /// `col <> ?` (`col IS NOT NULL` for a NULL value).
    NotEqual { column: String, value: Value },
    /// `col LIKE ?`
    Like { column: String, pattern: Value },
    /// `col IN (?, ...)`; empty lists match nothing.
    In { column: String, values: Vec<Value> },
    /// `col IS NULL` / `col IS ?`
    Is { column: String, value: Value },
    /// Conjunction; empty matches everything.
    And(Vec<Expr>),
    /// Disjunction; empty matches nothing.
    Or(Vec<Expr>),
    /// Verbatim SQL with its own parameters.
    Raw { sql: String, params: Vec<Value> },
}

impl Expr {
    pub fn equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::Equal {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn not_equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::NotEqual {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Expr::Like {
            column: column.into(),
            pattern: pattern.into(),
        }
    }

    pub fn in_list<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Expr::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::Is {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Expr::And(exprs.into_iter().collect())
    }

    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Or(exprs.into_iter().collect())
    }

    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Expr::Raw {
            sql: sql.into(),
            params,
        }
    }

    /// Render to SQL, appending bound values to `params`.
    pub fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Expr::Equal { column, value } if value.is_null() => {
                format!("{} IS NULL", quote_ident(column))
            }
            Expr::Equal { column, value } => {
                params.push(value.clone());
                format!("{} = ?", quote_ident(column))
            }
            Expr::NotEqual { column, value } if value.is_null() => {
                format!("{} IS NOT NULL", quote_ident(column))
            }
            Expr::NotEqual { column, value } => {
                params.push(value.clone());
                format!("{} <> ?", quote_ident(column))
            }
            Expr::Like { column, pattern } => {
                params.push(pattern.clone());
                format!("{} LIKE ?", quote_ident(column))
            }
            Expr::In { values, .. } if values.is_empty() => "1 = 0".to_string(),
            Expr::In { column, values } => {
                params.extend(values.iter().cloned());
                let placeholders = vec!["?"; values.len()].join(", ");
                format!("{} IN ({})", quote_ident(column), placeholders)
            }
            Expr::Is { column, value } if value.is_null() => {
                format!("{} IS NULL", quote_ident(column))
            }
            Expr::Is { column, value } => {
                params.push(value.clone());
                format!("{} IS ?", quote_ident(column))
            }
            Expr::And(exprs) => join(exprs, " AND ", "1 = 1", params),
            Expr::Or(exprs) => join(exprs, " OR ", "1 = 0", params),
            Expr::Raw { sql, params: raw } => {
                params.extend(raw.iter().cloned());
                sql.clone()
            }
        }
    }

    /// Column names this predicate references, in order of appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    /// True if this predicate references `column`.
    pub fn references(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Equal { column, .. }
            | Expr::NotEqual { column, .. }
            | Expr::Like { column, .. }
            | Expr::In { column, .. }
            | Expr::Is { column, .. } => out.push(column),
            Expr::And(exprs) | Expr::Or(exprs) => {
                for expr in exprs {
                    expr.collect_columns(out);
                }
            }
            Expr::Raw { .. } => {}
        }
    }
}

fn join(exprs: &[Expr], sep: &str, empty: &str, params: &mut Vec<Value>) -> String {
    match exprs {
        [] => empty.to_string(),
        [only] => only.to_sql(params),
        many => {
            let parts: Vec<String> = many.iter().map(|e| e.to_sql(params)).collect();
            format!("({})", parts.join(sep))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(expr: &Expr) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let sql = expr.to_sql(&mut params);
        (sql, params)
    }

    #[test]
    fn test_equal() {
        let (sql, params) = render(&Expr::equal("id", 1));
        assert_eq!(sql, "`id` = ?");
        assert_eq!(params, vec![Value::BigInt(1)]);
    }

    #[test]
    fn test_equal_null_renders_is_null() {
        let (sql, params) = render(&Expr::equal("deleted", Value::Null));
        assert_eq!(sql, "`deleted` IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_like_and_not_equal() {
        assert_eq!(render(&Expr::like("name", "bad%")).0, "`name` LIKE ?");
        assert_eq!(render(&Expr::not_equal("n", 2)).0, "`n` <> ?");
        assert_eq!(render(&Expr::not_equal("n", Value::Null)).0, "`n` IS NOT NULL");
    }

    #[test]
    fn test_in_list() {
        let (sql, params) = render(&Expr::in_list("id", [1, 2, 3]));
        assert_eq!(sql, "`id` IN (?, ?, ?)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        let (sql, params) = render(&Expr::in_list("id", Vec::<i64>::new()));
        assert_eq!(sql, "1 = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_is() {
        assert_eq!(render(&Expr::is("x", Value::Null)).0, "`x` IS NULL");
        let (sql, params) = render(&Expr::is("flag", true));
        assert_eq!(sql, "`flag` IS ?");
        assert_eq!(params, vec![Value::Bool(true)]);
    }

    #[test]
    fn test_nested_combinators_keep_param_order() {
        let expr = Expr::and([
            Expr::equal("a", 1),
            Expr::or([Expr::equal("b", 2), Expr::like("c", "x%")]),
        ]);
        let (sql, params) = render(&expr);
        assert_eq!(sql, "(`a` = ? AND (`b` = ? OR `c` LIKE ?))");
        assert_eq!(
            params,
            vec![Value::BigInt(1), Value::BigInt(2), Value::from("x%")]
        );
    }

    #[test]
    fn test_degenerate_combinators() {
        assert_eq!(render(&Expr::and([])).0, "1 = 1");
        assert_eq!(render(&Expr::or([])).0, "1 = 0");
        assert_eq!(render(&Expr::and([Expr::equal("a", 1)])).0, "`a` = ?");
    }

    #[test]
    fn test_raw() {
        let (sql, params) = render(&Expr::raw("LENGTH(`name`) > ?", vec![Value::from(3)]));
        assert_eq!(sql, "LENGTH(`name`) > ?");
        assert_eq!(params, vec![Value::BigInt(3)]);
    }

    #[test]
    fn test_columns() {
        let expr = Expr::and([
            Expr::equal("soft_delete", 0),
            Expr::or([Expr::like("name", "a"), Expr::raw("1", vec![])]),
        ]);
        assert_eq!(expr.columns(), vec!["soft_delete", "name"]);
        assert!(expr.references("name"));
        assert!(!expr.references("id"));
    }
}
