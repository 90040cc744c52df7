//! Search queries over a record type.
//!
//! [`QueryResult`] is a deferred `SELECT` bound to one record type. Search
//! hooks contribute predicates unless an explicit filter already references
//! the hook's column. Nothing runs until the first fetch.

use std::fmt;

use activerecord_core::{Dialect, Error, Result, Row, Value};
use activerecord_query::{Expr, OrderDirection, Query, Select};

use crate::hooks::HookAction;
use crate::model::Model;
use crate::record::Record;

/// A deferred search over `M`'s table.
pub struct QueryResult<M: Model> {
    template: Record<M>,
    filters: Vec<Expr>,
    order_by: Vec<(String, OrderDirection)>,
    group_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    max_results: Option<u64>,
    rows: Option<std::vec::IntoIter<Row>>,
}

impl<M: Model> QueryResult<M> {
    pub(crate) fn new(template: Record<M>) -> Self {
        Self {
            template,
            filters: Vec::new(),
            order_by: Vec::new(),
            group_by: Vec::new(),
            limit: None,
            offset: None,
            max_results: None,
            rows: None,
        }
    }

    /// AND an explicit predicate into the query.
    ///
    /// Search hooks on columns referenced here are skipped.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filters.push(expr);
        self.reset()
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by.push((column.into(), direction));
        self.reset()
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self.reset()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self.reset()
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self.reset()
    }

    fn reset(mut self) -> Self {
        self.rows = None;
        self.max_results = None;
        self
    }

    fn table_name(&self) -> &str {
        self.template.table_name()
    }

    /// Hook predicates plus explicit filters, without paging.
    fn base_select(&self) -> Select {
        let mut select = Query::new(self.table_name()).select();
        for (column, expr) in self.template.hooks().filters(HookAction::Search) {
            if self.filters.iter().any(|f| f.references(&column)) {
                tracing::trace!(table = self.table_name(), column = %column, "Search hook overridden");
                continue;
            }
            select = select.filter(expr);
        }
        for expr in &self.filters {
            select = select.filter(expr.clone());
        }
        for column in &self.group_by {
            select = select.group_by(column.clone());
        }
        select
    }

    fn select(&self) -> Select {
        let mut select = self.base_select();
        for (column, direction) in &self.order_by {
            select = select.order_by(column.clone(), *direction);
        }
        if let Some(limit) = self.limit {
            select = select.limit(limit);
        }
        if let Some(offset) = self.offset {
            select = select.offset(offset);
        }
        select
    }

    /// SQL and parameters this query would run.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        self.select().build_with_dialect(dialect)
    }

    fn search_error(&self, source: Error) -> Error {
        Error::persistence(
            format!("Can not search the record in the `{}` table.", self.table_name()),
            source,
        )
    }

    fn ensure_executed(&mut self) -> Result<()> {
        if self.rows.is_none() {
            let conn = self.template.connection();
            let rows = self
                .select()
                .fetch_all(conn.as_ref())
                .map_err(|e| self.search_error(e))?;
            tracing::debug!(table = self.table_name(), rows = rows.len(), "Search executed");
            self.rows = Some(rows.into_iter());
        }
        Ok(())
    }

    fn next_record(&mut self) -> Option<Record<M>> {
        let row = self.rows.as_mut()?.next()?;
        let mut record = self.template.new_instance();
        record.fill(&row);
        Some(record)
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Next matching record; `NotFound` once the results are exhausted.
    pub fn fetch(&mut self) -> Result<Record<M>> {
        self.ensure_executed()?;
        self.next_record().ok_or_else(|| Error::NotFound {
            table: self.table_name().to_string(),
            id: None,
        })
    }

    /// Every remaining record, in result order.
    pub fn fetch_all(&mut self) -> Result<Vec<Record<M>>> {
        self.ensure_executed()?;
        Ok(std::iter::from_fn(|| self.next_record()).collect())
    }

    /// [`fetch`](Self::fetch), serialized to `whitelist`.
    pub fn fetch_as_array(&mut self, whitelist: &[&str]) -> Result<Row> {
        Ok(self.fetch()?.to_array(whitelist))
    }

    /// [`fetch_all`](Self::fetch_all), serialized to `whitelist`.
    pub fn fetch_all_as_array(&mut self, whitelist: &[&str]) -> Result<Vec<Row>> {
        Ok(self
            .fetch_all()?
            .iter()
            .map(|record| record.to_array(whitelist))
            .collect())
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Rows matching the filters, ignoring limit and offset. Cached.
    pub fn count_max_results(&mut self) -> Result<u64> {
        if let Some(count) = self.max_results {
            return Ok(count);
        }
        let conn = self.template.connection();
        let count = self
            .base_select()
            .fetch_count(conn.as_ref())
            .map_err(|e| self.search_error(e))?;
        self.max_results = Some(count);
        Ok(count)
    }

    /// 1 without a limit, 0 for a zero limit, else `ceil(count / limit)`.
    pub fn number_of_pages(&mut self) -> Result<u64> {
        match self.limit {
            None => Ok(1),
            Some(0) => Ok(0),
            Some(limit) => Ok(self.count_max_results()?.div_ceil(limit)),
        }
    }

    /// 1-based page of the current offset.
    pub fn current_page(&self) -> u64 {
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) if limit > 0 && offset > 0 => offset / limit + 1,
            _ => 1,
        }
    }
}

impl<M: Model> fmt::Debug for QueryResult<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("table", &self.table_name())
            .field("filters", &self.filters)
            .field("order_by", &self.order_by)
            .field("group_by", &self.group_by)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Iterator over the records of a [`QueryResult`].
pub struct Records<M: Model> {
    query: QueryResult<M>,
    done: bool,
}

impl<M: Model> Iterator for Records<M> {
    type Item = Result<Record<M>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Err(e) = self.query.ensure_executed() {
            self.done = true;
            return Some(Err(e));
        }
        let next = self.query.next_record();
        self.done = next.is_none();
        next.map(Ok)
    }
}

impl<M: Model> IntoIterator for QueryResult<M> {
    type Item = Result<Record<M>>;
    type IntoIter = Records<M>;

    fn into_iter(self) -> Records<M> {
        Records {
            query: self,
            done: false,
        }
    }
}
