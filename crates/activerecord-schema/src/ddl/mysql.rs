//! MySQL DDL generator.
//!
//! Foreign keys are added with separate `ALTER TABLE` statements once every
//! table exists.

use activerecord_core::{Result, TableDefinition, quote_ident};

use super::{DdlGenerator, column_entry, foreign_keys, sorted_columns};

/// DDL generator for MySQL.
pub struct MySqlDdlGenerator;

impl DdlGenerator for MySqlDdlGenerator {
    fn dialect(&self) -> &'static str {
        "mysql"
    }

    fn create_table(&self, table: &TableDefinition) -> Result<String> {
        tracing::debug!(dialect = "mysql", table = %table.name(), "Generating CREATE TABLE");

        // Relations must resolve before the table exists.
        foreign_keys(table)?;

        let entries = sorted_columns(table)
            .into_iter()
            .map(column_entry)
            .collect::<Result<Vec<_>>>()?;

        Ok(format!(
            "CREATE TABLE {} (\n{}\n) DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci",
            quote_ident(table.name()),
            entries.join(",\n")
        ))
    }

    fn constraints(&self, table: &TableDefinition) -> Result<Vec<String>> {
        let statements: Vec<String> = foreign_keys(table)?
            .iter()
            .map(|fk| {
                format!(
                    "ALTER TABLE {} ADD CONSTRAINT {}",
                    quote_ident(table.name()),
                    fk.to_sql()
                )
            })
            .collect();
        tracing::trace!(
            dialect = "mysql",
            table = %table.name(),
            count = statements.len(),
            "Generated constraints"
        );
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::test_support::{Parent, posts};
    use activerecord_core::{ColumnDef, Error, Relation};

    #[test]
    fn test_create_table() {
        let sql = MySqlDdlGenerator.create_table(&posts()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE `posts` (\n\
             `id` INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,\n\
             `body` TEXT NULL,\n\
             `id_author` INT UNSIGNED NOT NULL,\n\
             `id_editor` INT UNSIGNED NULL,\n\
             `title` VARCHAR(255) NOT NULL UNIQUE\n\
             ) DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci"
        );
    }

    #[test]
    fn test_constraints() {
        let stmts = MySqlDdlGenerator.constraints(&posts()).unwrap();
        assert_eq!(
            stmts,
            vec![
                "ALTER TABLE `posts` ADD CONSTRAINT FOREIGN KEY (`id_author`) REFERENCES `users`(`id`) ON DELETE CASCADE",
                "ALTER TABLE `posts` ADD CONSTRAINT FOREIGN KEY (`id_editor`) REFERENCES `users`(`id`) ON DELETE SET NULL",
            ]
        );
    }

    #[test]
    fn test_unresolved_relation_fails_create_table() {
        let mut table = TableDefinition::new("children");
        table
            .extend(ColumnDef::new("id_ghost").relation(Relation::new(Parent(""))).not_null())
            .unwrap();
        let err = MySqlDdlGenerator.create_table(&table).unwrap_err();
        assert!(matches!(err, Error::InvalidRelation { column, .. } if column == "id_ghost"));
    }

    #[test]
    fn test_varchar_without_length_fails() {
        let mut table = TableDefinition::new("t");
        table.extend(ColumnDef::new("name").sql_type("VARCHAR")).unwrap();
        assert!(MySqlDdlGenerator.create_table(&table).is_err());
    }
}
