//! The record engine.
//!
//! A [`Record`] is one row of a [`Model`]'s table. It is either transient
//! (no id) or bound to a persisted row. Identity only changes through
//! [`create`](Record::create), [`read`](Record::read),
//! [`fill`](Record::fill) and [`delete`](Record::delete).
//!
//! Every write runs against a staged copy of the cells; the record itself is
//! only updated once the statement succeeds.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use activerecord_core::{
    ColumnDef, ColumnDefault, ColumnProperty, Connection, Error, ID_COLUMN, Result, Row,
    TableDefinition, Value, Values,
};
use activerecord_query::{Expr, Query};

use crate::hooks::{Hook, HookAction, HookRegistry};
use crate::model::Model;
use crate::search::QueryResult;

/// One row of `M`'s table.
pub struct Record<M: Model> {
    conn: Arc<dyn Connection>,
    hooks: Arc<HookRegistry>,
    values: Values,
    id: Option<i64>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Record<M> {
    /// A transient record with every column NULL.
    pub fn new(conn: Arc<dyn Connection>) -> Result<Self> {
        let (table, hooks) = M::schema()?;
        Ok(Self {
            conn,
            hooks: Arc::new(hooks),
            values: Values::new(Arc::new(table)),
            id: None,
            _model: PhantomData,
        })
    }

    /// A transient record sharing this one's connection, columns and hooks.
    pub fn new_instance(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            hooks: Arc::clone(&self.hooks),
            values: Values::new(Arc::clone(self.values.table())),
            id: None,
            _model: PhantomData,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    pub fn table(&self) -> &TableDefinition {
        self.values.table()
    }

    pub fn table_name(&self) -> &str {
        self.values.table().name()
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Data cells (every column except `id`).
    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// True once the record is bound to a row.
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    /// Current value of a column, `id` included.
    pub fn get(&self, name: &str) -> Result<Value> {
        if name == ID_COLUMN {
            return Ok(Value::from(self.id));
        }
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownColumn {
                column: name.to_string(),
            })
    }

    /// Assign a column directly, bypassing validators and setters.
    ///
    /// `id` cannot be assigned.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        if name == ID_COLUMN {
            return Err(Error::InvalidState(format!(
                "The `{}` column of the `{}` table is managed by the record engine.",
                ID_COLUMN,
                self.table_name()
            )));
        }
        self.values.set(name, value)?;
        Ok(self)
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Insert this record as a new row and bind the generated id.
    #[tracing::instrument(level = "debug", skip(self), fields(table = %self.table_name()))]
    pub fn create(&mut self) -> Result<&mut Self> {
        let mut staged = self.values.clone();
        self.hooks.run(HookAction::Create, &mut staged)?;
        self.persist_insert(staged)?;
        Ok(self)
    }

    /// Load the row with `id`, subject to the read hooks.
    #[tracing::instrument(level = "debug", skip(self), fields(table = %self.table_name()))]
    pub fn read(&mut self, id: i64) -> Result<&mut Self> {
        let mut select = Query::new(self.table_name())
            .select()
            .filter(Expr::equal(ID_COLUMN, id));
        for (_, expr) in self.hooks.filters(HookAction::Read) {
            select = select.filter(expr);
        }

        let row = select.limit(1).fetch_one(self.conn.as_ref()).map_err(|e| {
            Error::persistence(
                format!(
                    "Can not read active record entry {} from the `{}` table.",
                    id,
                    self.table_name()
                ),
                e,
            )
        })?;
        let Some(row) = row else {
            return Err(Error::NotFound {
                table: self.table_name().to_string(),
                id: Some(id),
            });
        };

        self.values.clear();
        self.id = Some(id);
        self.fill(&row);
        Ok(self)
    }

    /// Write every data column to the bound row.
    #[tracing::instrument(level = "debug", skip(self), fields(table = %self.table_name()))]
    pub fn update(&mut self) -> Result<&mut Self> {
        let id = self.id.ok_or_else(|| {
            Error::InvalidState(format!(
                "Can not update a non-existent active record entry to the `{}` table.",
                self.table_name()
            ))
        })?;
        let mut staged = self.values.clone();
        self.hooks.run(HookAction::Update, &mut staged)?;
        self.persist_update(id, staged)?;
        Ok(self)
    }

    /// Delete the bound row; the record becomes transient.
    #[tracing::instrument(level = "debug", skip(self), fields(table = %self.table_name()))]
    pub fn delete(&mut self) -> Result<&mut Self> {
        let id = self.id.ok_or_else(|| {
            Error::InvalidState(format!(
                "Can not delete a non-existent active record entry from the `{}` table.",
                self.table_name()
            ))
        })?;
        let mut staged = self.values.clone();
        self.hooks.run(HookAction::Delete, &mut staged)?;

        Query::new(self.table_name())
            .delete()
            .filter(Expr::equal(ID_COLUMN, id))
            .execute(self.conn.as_ref())
            .map_err(|e| {
                Error::persistence(
                    format!(
                        "Can not delete active record entry {} from the `{}` table.",
                        id,
                        self.table_name()
                    ),
                    e,
                )
            })?;

        tracing::info!(table = self.table_name(), id, "Deleted active record entry");
        self.values = staged;
        self.id = None;
        Ok(self)
    }

    /// `create()` when transient, `update()` when bound.
    pub fn sync(&mut self) -> Result<&mut Self> {
        if self.exists() {
            self.update()
        } else {
            self.create()
        }
    }

    /// Copy known columns from a row; unknown keys are ignored.
    ///
    /// An `id` entry sets the identity: an integer binds the record, NULL
    /// makes it transient.
    pub fn fill(&mut self, row: &Row) -> &mut Self {
        for (column, value) in row.iter() {
            if column == ID_COLUMN {
                self.id = value.to_i64();
            } else if let Err(e) = self.values.set(column, value.clone()) {
                tracing::trace!(table = self.table_name(), error = %e, "Skipping unknown column");
            }
        }
        self
    }

    /// Ordered view restricted to `whitelist`, `id` first.
    pub fn to_array(&self, whitelist: &[&str]) -> Row {
        let mut out = Row::new();
        if whitelist.contains(&ID_COLUMN) {
            out.insert(ID_COLUMN, Value::from(self.id));
        }
        for (column, value) in self.values.iter() {
            if whitelist.contains(&column) {
                out.insert(column, value.clone());
            }
        }
        out
    }

    /// Start a search over this record type.
    pub fn search(&self) -> QueryResult<M> {
        QueryResult::new(self.new_instance())
    }

    // ========================================================================
    // Hook registration
    // ========================================================================

    /// Register a hook on this record (and instances created from it).
    pub fn register_hook(&mut self, action: HookAction, column: &str, hook: Hook) -> Result<()> {
        let table = Arc::clone(self.values.table());
        Arc::make_mut(&mut self.hooks).register(&table, action, column, hook)
    }

    pub fn register_create_hook<F>(&mut self, column: &str, f: F) -> Result<()>
    where
        F: Fn(&mut Values) -> Result<()> + Send + Sync + 'static,
    {
        self.register_hook(HookAction::Create, column, Hook::mutate(f))
    }

    pub fn register_update_hook<F>(&mut self, column: &str, f: F) -> Result<()>
    where
        F: Fn(&mut Values) -> Result<()> + Send + Sync + 'static,
    {
        self.register_hook(HookAction::Update, column, Hook::mutate(f))
    }

    pub fn register_delete_hook<F>(&mut self, column: &str, f: F) -> Result<()>
    where
        F: Fn(&mut Values) -> Result<()> + Send + Sync + 'static,
    {
        self.register_hook(HookAction::Delete, column, Hook::mutate(f))
    }

    pub fn register_read_hook<F>(&mut self, column: &str, f: F) -> Result<()>
    where
        F: Fn() -> Option<Expr> + Send + Sync + 'static,
    {
        self.register_hook(HookAction::Read, column, Hook::filter(f))
    }

    pub fn register_search_hook<F>(&mut self, column: &str, f: F) -> Result<()>
    where
        F: Fn() -> Option<Expr> + Send + Sync + 'static,
    {
        self.register_hook(HookAction::Search, column, Hook::filter(f))
    }

    // ========================================================================
    // Schema
    // ========================================================================

    /// Execute `CREATE TABLE` for this record type.
    pub fn create_table(&self) -> Result<()> {
        let sql = activerecord_schema::create_table_sql(self.table(), self.conn.dialect())?;
        tracing::debug!(table = self.table_name(), sql = %sql, "Creating table");
        self.conn.batch(&[sql])
    }

    /// Execute the foreign key statements for this record type.
    pub fn create_table_constraints(&self) -> Result<()> {
        let statements =
            activerecord_schema::table_constraints(self.table(), self.conn.dialect())?;
        tracing::debug!(
            table = self.table_name(),
            constraints = statements.len(),
            "Creating table constraints"
        );
        self.conn.batch(&statements)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn has_column(&self, name: &str) -> bool {
        self.table().contains(name)
    }

    /// SQL type of a column (inferred for relation columns).
    pub fn column_type(&self, name: &str) -> Result<Option<String>> {
        Ok(self.column(name)?.effective_type().map(str::to_string))
    }

    pub fn column_length(&self, name: &str) -> Result<Option<u32>> {
        Ok(self.column(name)?.length)
    }

    pub fn column_default(&self, name: &str) -> Result<Option<ColumnDefault>> {
        Ok(self.column(name)?.default.clone())
    }

    pub fn has_property(&self, name: &str, property: ColumnProperty) -> Result<bool> {
        Ok(self.column(name)?.has_property(property))
    }

    pub fn has_relation(&self, name: &str) -> Result<bool> {
        Ok(self.column(name)?.is_relation())
    }

    /// Run a column's validator against `value`.
    ///
    /// The outer result fails for unknown columns; the inner one carries
    /// the validator's message.
    pub fn validate_column(
        &self,
        name: &str,
        value: &Value,
    ) -> Result<std::result::Result<(), String>> {
        Ok(self.column(name)?.check(value))
    }

    fn column(&self, name: &str) -> Result<&ColumnDef> {
        self.table().column(name)
    }

    // ========================================================================
    // Persistence without hooks
    // ========================================================================

    /// Insert `staged` (defaults filled) and commit it into this record.
    pub(crate) fn persist_insert(&mut self, mut staged: Values) -> Result<()> {
        staged.fill_defaults();
        let id = Query::new(self.table_name())
            .insert(staged.to_row())
            .execute(self.conn.as_ref())
            .map_err(|e| {
                Error::persistence(
                    format!(
                        "Can not create a new active record entry in the `{}` table.",
                        self.table_name()
                    ),
                    e,
                )
            })?;

        tracing::info!(table = self.table_name(), id, "Created active record entry");
        self.values = staged;
        self.id = Some(id);
        Ok(())
    }

    /// Write `staged` to row `id` and commit it into this record.
    pub(crate) fn persist_update(&mut self, id: i64, staged: Values) -> Result<()> {
        Query::new(self.table_name())
            .update(staged.to_row())
            .filter(Expr::equal(ID_COLUMN, id))
            .execute(self.conn.as_ref())
            .map_err(|e| {
                Error::persistence(
                    format!(
                        "Can not update active record entry {} to the `{}` table.",
                        id,
                        self.table_name()
                    ),
                    e,
                )
            })?;

        tracing::info!(table = self.table_name(), id, "Updated active record entry");
        self.values = staged;
        Ok(())
    }
}

impl<M: Model> Clone for Record<M> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            hooks: Arc::clone(&self.hooks),
            values: self.values.clone(),
            id: self.id,
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Record<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Record");
        s.field("table", &self.table_name()).field("id", &self.id);
        for (column, value) in self.values.iter() {
            s.field(column, value);
        }
        s.finish()
    }
}
