//! WHERE, ORDER BY and LIMIT/OFFSET clauses.

use activerecord_core::{Dialect, Value, quote_ident};
use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// `"desc"` in any case is descending; anything else is ascending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            OrderDirection::Desc
        } else {
            OrderDirection::Asc
        }
    }

    pub const fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl From<String> for OrderDirection {
    fn from(s: String) -> Self {
        OrderDirection::parse(&s)
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", quote_ident(&self.column), self.direction.as_sql())
    }
}

/// Conjunction of filters accumulated by repeated `filter` calls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Where {
    exprs: Vec<Expr>,
}

impl Where {
    pub fn new(expr: Expr) -> Self {
        Self { exprs: vec![expr] }
    }

    /// AND another predicate onto this clause.
    pub fn and(mut self, expr: Expr) -> Self {
        self.exprs.push(expr);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Render without the `WHERE` keyword.
    pub fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self.exprs.as_slice() {
            [only] => only.to_sql(params),
            many => many
                .iter()
                .map(|e| e.to_sql(params))
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }

    /// True if any predicate references `column`.
    pub fn references(&self, column: &str) -> bool {
        self.exprs.iter().any(|e| e.references(column))
    }
}

/// Render `LIMIT`/`OFFSET`, with the dialect's unbounded limit for offset-only.
pub fn limit_offset(dialect: Dialect, limit: Option<u64>, offset: Option<u64>) -> String {
    match (limit, offset) {
        (None, None) => String::new(),
        (Some(limit), None) => format!(" LIMIT {}", limit),
        (Some(limit), Some(offset)) => format!(" LIMIT {} OFFSET {}", limit, offset),
        (None, Some(offset)) => format!(
            " LIMIT {} OFFSET {}",
            dialect.unbounded_limit(),
            offset
        ),
    }
}
