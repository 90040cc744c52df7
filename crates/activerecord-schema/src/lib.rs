//! DDL generation for ActiveRecord Rust.
//!
//! `activerecord-schema` turns [`TableDefinition`]s into `CREATE TABLE` and
//! foreign key statements.
//!
//! ```
//! use activerecord_core::{ColumnDef, Dialect, TableDefinition};
//! use activerecord_schema::SchemaBuilder;
//!
//! let mut users = TableDefinition::new("users");
//! users.extend(ColumnDef::new("name").sql_type("VARCHAR").length(64).not_null()).unwrap();
//!
//! let statements = SchemaBuilder::new(Dialect::MySql).table(users).build().unwrap();
//! assert_eq!(statements.len(), 1);
//! assert!(statements[0].starts_with("CREATE TABLE `users`"));
//! ```

pub mod ddl;

pub use ddl::{
    DdlGenerator, ForeignKey, MySqlDdlGenerator, SqliteDdlGenerator, column_entry,
    database_type_string, foreign_keys, generator_for, sorted_columns,
};

use activerecord_core::{Dialect, Result, TableDefinition};

/// `CREATE TABLE` for one table.
pub fn create_table_sql(table: &TableDefinition, dialect: Dialect) -> Result<String> {
    generator_for(dialect).create_table(table)
}

/// Foreign key statements for one table (empty for SQLite).
pub fn table_constraints(table: &TableDefinition, dialect: Dialect) -> Result<Vec<String>> {
    generator_for(dialect).constraints(table)
}

/// Collects tables and renders their DDL in dependency-safe order.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    dialect: Dialect,
    tables: Vec<TableDefinition>,
}

impl SchemaBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: Vec::new(),
        }
    }

    /// Add a table.
    pub fn table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    /// Every `CREATE TABLE`, then every constraint.
    ///
    /// All relations are resolved before anything is returned.
    pub fn build(&self) -> Result<Vec<String>> {
        let generator = generator_for(self.dialect);
        let mut creates = Vec::with_capacity(self.tables.len());
        let mut constraints = Vec::new();
        for table in &self.tables {
            creates.push(generator.create_table(table)?);
            constraints.extend(generator.constraints(table)?);
        }
        tracing::debug!(
            dialect = generator.dialect(),
            tables = creates.len(),
            constraints = constraints.len(),
            "Built schema"
        );
        creates.extend(constraints);
        Ok(creates)
    }
}
