//! Validated writes from untrusted input.
//!
//! The `api_*` entry points take a key/value map from outside (a decoded
//! request body, say), restrict it to a whitelist, validate it and either
//! apply it completely or not at all.
//!
//! Validation runs on a transaction copy of the record's cells, never on the
//! record itself. Field-level problems come back as a [`ValidationError`]
//! inside `Ok`, while configuration and driver failures are ordinary
//! [`Error`](activerecord_core::Error)s.
//!
//! # Example
//!
//! ```ignore
//! match user.api_create(&input, &["username", "email"], &["id", "username"])? {
//!     Ok(created) => respond_json(201, &created),
//!     Err(errors) => respond_json(422, &errors),
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use activerecord_core::{
    ColumnProperty, Error, ID_COLUMN, Result, Row, ValidationError, ValidationErrorKind, Value, Values,
};
use activerecord_query::{Expr, OrderDirection};

use crate::hooks::HookAction;
use crate::model::Model;
use crate::record::Record;

/// Outcome of an API call: the serialized record or the field errors.
pub type ApiResult<T = Row> = std::result::Result<T, ValidationError>;

const UNKNOWN_FIELD: &str = "Unknown input field";
const IMMUTABLE_FIELD: &str = "Field cannot be changed";
const MISSING_ENTITY: &str = "Entity for this value doesn't exist";

/// Search request parameters, typically decoded from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// One page of search results with its paging metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub data: Vec<Row>,
    pub current_page: u64,
    pub limit: u64,
    pub offset: u64,
    pub pages: u64,
}

/// Settings for the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiConfig {
    /// Upper bound on the page size a search may request.
    pub max_result_limit: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_result_limit: 100,
        }
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_result_limit(mut self, limit: u64) -> Self {
        self.max_result_limit = limit;
        self
    }
}

impl<M: Model> Record<M> {
    /// Validate `input` and insert it as a new row.
    ///
    /// Only keys in `writable` are considered. On success the new row is
    /// returned restricted to `readable`; on failure nothing is written and
    /// this record is unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(table = %self.table_name()))]
    pub fn api_create(
        &mut self,
        input: &Row,
        writable: &[&str],
        readable: &[&str],
    ) -> Result<ApiResult> {
        let mut transaction = Values::new(Arc::clone(self.values().table()));
        let errors = self.apply_input(&mut transaction, input, writable, HookAction::Create)?;
        if !errors.is_empty() {
            tracing::warn!(
                table = self.table_name(),
                errors = errors.len(),
                "Rejected API create"
            );
            return Ok(Err(errors));
        }

        self.persist_insert(transaction)?;
        Ok(Ok(self.to_array(readable)))
    }

    /// Validate `input` against the current state and update the bound row.
    ///
    /// Writes to immutable columns are rejected.
    #[tracing::instrument(level = "debug", skip_all, fields(table = %self.table_name()))]
    pub fn api_update(
        &mut self,
        input: &Row,
        writable: &[&str],
        readable: &[&str],
    ) -> Result<ApiResult> {
        let id = self.id().ok_or_else(|| {
            Error::InvalidState(format!(
                "Can not update a non-existent active record entry to the `{}` table.",
                self.table_name()
            ))
        })?;

        let mut transaction = self.values().clone();
        let errors = self.apply_input(&mut transaction, input, writable, HookAction::Update)?;
        if !errors.is_empty() {
            tracing::warn!(
                table = self.table_name(),
                id,
                errors = errors.len(),
                "Rejected API update"
            );
            return Ok(Err(errors));
        }

        self.persist_update(id, transaction)?;
        Ok(Ok(self.to_array(readable)))
    }

    /// Read row `id`; a missing row is reported as a field error on `id`.
    pub fn api_read(&mut self, id: i64, readable: &[&str]) -> Result<ApiResult> {
        match self.read(id) {
            Ok(_) => Ok(Ok(self.to_array(readable))),
            Err(e) if e.is_not_found() => {
                let mut errors = ValidationError::new();
                errors.add(
                    ID_COLUMN,
                    ValidationErrorKind::NotFound,
                    format!(
                        "Can not read the non-existent active record entry {} from the `{}` table.",
                        id,
                        self.table_name()
                    ),
                );
                Ok(Err(errors))
            }
            Err(e) => Err(e),
        }
    }

    /// One page of search results serialized to `readable`.
    ///
    /// Ordering is only honoured for readable columns and the page size is
    /// clamped to `max_limit`.
    #[tracing::instrument(level = "debug", skip_all, fields(table = %self.table_name()))]
    pub fn api_search(
        &self,
        params: &SearchParams,
        readable: &[&str],
        extra: Option<Expr>,
        max_limit: u64,
    ) -> Result<SearchPage> {
        let mut query = self.search();
        if let Some(extra) = extra {
            query = query.filter(extra);
        }
        if let Some(column) = params.order_by.as_deref() {
            if readable.contains(&column) {
                query = query.order_by(column, params.order_direction.unwrap_or_default());
            } else {
                tracing::debug!(column, "Ignoring order by unreadable column");
            }
        }

        let limit = params.limit.map_or(max_limit, |l| l.min(max_limit));
        let offset = params.offset.unwrap_or(0);
        query = query.limit(limit);
        if offset > 0 {
            query = query.offset(offset);
        }

        let pages = query.number_of_pages()?;
        let current_page = query.current_page();
        let data = query.fetch_all_as_array(readable)?;
        Ok(SearchPage {
            data,
            current_page,
            limit,
            offset,
            pages,
        })
    }

    /// [`api_search`](Self::api_search) with the default [`ApiConfig`].
    pub fn api_search_default(&self, params: &SearchParams, readable: &[&str]) -> Result<SearchPage> {
        self.api_search(params, readable, None, ApiConfig::default().max_result_limit)
    }

    /// Run the validation pipeline, loading `input` into `transaction`.
    fn apply_input(
        &self,
        transaction: &mut Values,
        input: &Row,
        writable: &[&str],
        action: HookAction,
    ) -> Result<ValidationError> {
        let input: Row = input
            .iter()
            .filter(|(column, _)| writable.contains(column))
            .map(|(column, value)| (column, value.clone()))
            .collect();
        let table = self.table();
        let mut errors = ValidationError::new();

        for (column, _) in input.iter() {
            if column == ID_COLUMN {
                errors.add(column, ValidationErrorKind::Immutable, IMMUTABLE_FIELD);
            } else if !table.contains(column) {
                errors.add(column, ValidationErrorKind::UnknownField, UNKNOWN_FIELD);
            }
        }

        if action == HookAction::Update {
            for column in table.columns() {
                if input.contains(&column.name) && column.has_property(ColumnProperty::IMMUTABLE) {
                    errors.add(&column.name, ValidationErrorKind::Immutable, IMMUTABLE_FIELD);
                }
            }
        }

        for column in table.data_columns() {
            let supplied = input.get(&column.name);
            if let Some(value) = supplied {
                if let Err(message) = column.check(value) {
                    errors.add(&column.name, ValidationErrorKind::Invalid, message);
                }
            }

            let Some(relation) = &column.relation else {
                continue;
            };
            if !column.has_property(ColumnProperty::NOT_NULL) {
                continue;
            }
            let value = supplied
                .or_else(|| transaction.get(&column.name))
                .cloned()
                .unwrap_or_default();
            if value.is_null() {
                continue;
            }
            let exists = match value.to_i64() {
                Some(id) => relation.exists(self.connection(), id)?,
                None => false,
            };
            if !exists {
                errors.add(&column.name, ValidationErrorKind::Invalid, MISSING_ENTITY);
            }
        }

        for column in table.data_columns() {
            let Some(value) = input.get(&column.name) else {
                continue;
            };
            let value = match &column.setter {
                Some(setter) => match setter(value) {
                    Ok(v) => v,
                    Err(message) => {
                        errors.add(&column.name, ValidationErrorKind::Invalid, message);
                        continue;
                    }
                },
                None => value.clone(),
            };
            transaction.set(&column.name, value)?;
        }

        self.hooks().run(action, transaction)?;

        for column in table.data_columns() {
            let missing = transaction.get(&column.name).is_none_or(Value::is_blank);
            if column.is_required() && missing {
                errors.add(
                    &column.name,
                    ValidationErrorKind::Missing,
                    format!("The required field \"{}\" is missing", column.name),
                );
            }
        }

        Ok(errors)
    }
}
