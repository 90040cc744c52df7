//! Record type declarations.
//!
//! A record type implements [`Model`]: it names its table and declares its
//! columns and hooks through a [`TableBuilder`]. Reusable column groups are
//! [`Bundle`]s that contribute through the same builder.

use std::marker::PhantomData;
use std::sync::Arc;

use activerecord_core::{
    ColumnDef, Connection, Error, Relation, RelationTarget, Result, TableDefinition, Values,
    is_plain_identifier,
};
use activerecord_query::Expr;

use crate::hooks::{Hook, HookAction, HookRegistry};
use crate::record::Record;

/// A record type mapped to one table.
///
/// # Example
///
/// ```
/// use activerecord::prelude::*;
///
/// struct User;
///
/// impl Model for User {
///     const TABLE_NAME: &'static str = "users";
///
///     fn define(t: &mut TableBuilder) -> Result<()> {
///         t.column(ColumnDef::new("username").sql_type("VARCHAR").length(255).not_null().unique())?;
///         t.column(ColumnDef::new("email").sql_type("VARCHAR").length(255))?;
///         Ok(())
///     }
/// }
/// ```
pub trait Model: Sized + Send + Sync + 'static {
    /// Name of the backing table.
    const TABLE_NAME: &'static str;

    /// Declare columns and hooks. The `id` column is already present.
    fn define(t: &mut TableBuilder) -> Result<()>;

    /// The table definition and hooks of this type.
    fn schema() -> Result<(TableDefinition, HookRegistry)> {
        let mut builder = TableBuilder::new(Self::TABLE_NAME);
        Self::define(&mut builder)?;
        Ok(builder.finish())
    }
}

/// A reusable group of columns and hooks.
pub trait Bundle {
    fn contribute(&self, t: &mut TableBuilder) -> Result<()>;
}

/// Collects a record type's columns and hooks.
#[derive(Debug)]
pub struct TableBuilder {
    table: TableDefinition,
    hooks: HookRegistry,
}

impl TableBuilder {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table: TableDefinition::new(table_name),
            hooks: HookRegistry::new(),
        }
    }

    pub fn table(&self) -> &TableDefinition {
        &self.table
    }

    /// Declare a column.
    pub fn column(&mut self, column: ColumnDef) -> Result<&mut Self> {
        self.table.extend(column)?;
        Ok(self)
    }

    /// Apply a bundle.
    pub fn bundle(&mut self, bundle: &impl Bundle) -> Result<&mut Self> {
        bundle.contribute(self)?;
        Ok(self)
    }

    /// Register a hook for an already declared column.
    pub fn hook(&mut self, action: HookAction, column: &str, hook: Hook) -> Result<&mut Self> {
        self.hooks.register(&self.table, action, column, hook)?;
        Ok(self)
    }

    pub fn on_create<F>(&mut self, column: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(&mut Values) -> Result<()> + Send + Sync + 'static,
    {
        self.hook(HookAction::Create, column, Hook::mutate(f))
    }

    pub fn on_update<F>(&mut self, column: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(&mut Values) -> Result<()> + Send + Sync + 'static,
    {
        self.hook(HookAction::Update, column, Hook::mutate(f))
    }

    pub fn on_delete<F>(&mut self, column: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(&mut Values) -> Result<()> + Send + Sync + 'static,
    {
        self.hook(HookAction::Delete, column, Hook::mutate(f))
    }

    pub fn on_read<F>(&mut self, column: &str, f: F) -> Result<&mut Self>
    where
        F: Fn() -> Option<Expr> + Send + Sync + 'static,
    {
        self.hook(HookAction::Read, column, Hook::filter(f))
    }

    pub fn on_search<F>(&mut self, column: &str, f: F) -> Result<&mut Self>
    where
        F: Fn() -> Option<Expr> + Send + Sync + 'static,
    {
        self.hook(HookAction::Search, column, Hook::filter(f))
    }

    pub fn finish(self) -> (TableDefinition, HookRegistry) {
        (self.table, self.hooks)
    }
}

/// [`RelationTarget`] backed by a record type.
pub struct RelatedModel<M>(PhantomData<fn() -> M>);

impl<M: Model> RelatedModel<M> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M: Model> Default for RelatedModel<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> RelationTarget for RelatedModel<M> {
    fn table_name(&self) -> Result<String> {
        if !is_plain_identifier(M::TABLE_NAME) {
            return Err(Error::InvalidRelation {
                column: String::new(),
                message: format!(
                    "{} does not name a usable table (`{}`)",
                    std::any::type_name::<M>(),
                    M::TABLE_NAME
                ),
            });
        }
        Ok(M::TABLE_NAME.to_string())
    }

    fn exists(&self, conn: &Arc<dyn Connection>, id: i64) -> Result<bool> {
        let mut record = Record::<M>::new(Arc::clone(conn))?;
        match record.read(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Relation to record type `M`, for [`ColumnDef::relation`].
pub fn belongs_to<M: Model>() -> Relation {
    Relation::new(RelatedModel::<M>::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Author;

    impl Model for Author {
        const TABLE_NAME: &'static str = "authors";

        fn define(t: &mut TableBuilder) -> Result<()> {
            t.column(ColumnDef::new("name").sql_type("VARCHAR").length(64).not_null())?;
            Ok(())
        }
    }

    struct Broken;

    impl Model for Broken {
        const TABLE_NAME: &'static str = "";

        fn define(_t: &mut TableBuilder) -> Result<()> {
            Ok(())
        }
    }

    struct Stamp;

    impl Bundle for Stamp {
        fn contribute(&self, t: &mut TableBuilder) -> Result<()> {
            t.column(ColumnDef::new("stamp").sql_type("TEXT"))?
                .on_create("stamp", |v| v.set("stamp", "now"))?;
            Ok(())
        }
    }

    #[test]
    fn test_schema_collects_columns_and_hooks() {
        let mut t = TableBuilder::new("posts");
        t.column(ColumnDef::new("author").relation(belongs_to::<Author>()))
            .unwrap()
            .bundle(&Stamp)
            .unwrap();
        let (table, hooks) = t.finish();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "author", "stamp"]);
        assert!(hooks.has(HookAction::Create, "stamp"));
    }

    #[test]
    fn test_bundle_applied_twice_fails() {
        let mut t = TableBuilder::new("posts");
        t.bundle(&Stamp).unwrap();
        assert!(matches!(t.bundle(&Stamp), Err(Error::DuplicateColumn { .. })));
    }

    #[test]
    fn test_hook_before_column_is_unknown() {
        let mut t = TableBuilder::new("posts");
        assert!(matches!(
            t.on_search("soft_delete", || None),
            Err(Error::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_relation_table_name() {
        assert_eq!(belongs_to::<Author>().table_name().unwrap(), "authors");
        assert!(matches!(
            belongs_to::<Broken>().table_name(),
            Err(Error::InvalidRelation { .. })
        ));
    }
}
