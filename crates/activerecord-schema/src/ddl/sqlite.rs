//! SQLite DDL generator.
//!
//! SQLite cannot add constraints to an existing table, so foreign keys are
//! written inline in `CREATE TABLE` and the constraint pass is empty.

use activerecord_core::{ID_COLUMN, Result, TableDefinition, quote_ident};

use super::{DdlGenerator, foreign_keys, render_column, sorted_columns};

/// DDL generator for SQLite.
pub struct SqliteDdlGenerator;

impl DdlGenerator for SqliteDdlGenerator {
    fn dialect(&self) -> &'static str {
        "sqlite"
    }

    fn create_table(&self, table: &TableDefinition) -> Result<String> {
        tracing::debug!(dialect = "sqlite", table = %table.name(), "Generating CREATE TABLE");

        let mut entries = Vec::with_capacity(table.columns().len());
        for column in sorted_columns(table) {
            if column.name == ID_COLUMN {
                // Only INTEGER PRIMARY KEY aliases the rowid.
                entries.push(format!(
                    "{} INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT",
                    quote_ident(ID_COLUMN)
                ));
            } else {
                entries.push(render_column(column, false)?);
            }
        }
        for fk in foreign_keys(table)? {
            entries.push(fk.to_sql());
        }

        Ok(format!(
            "CREATE TABLE {} (\n{}\n)",
            quote_ident(table.name()),
            entries.join(",\n")
        ))
    }

    fn constraints(&self, table: &TableDefinition) -> Result<Vec<String>> {
        // Resolve anyway so a bad relation fails the same way as on MySQL.
        foreign_keys(table)?;
        Ok(Vec::new())
    }
}
