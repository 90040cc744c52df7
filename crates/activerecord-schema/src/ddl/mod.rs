//! DDL generators.
//!
//! Column fragments and type strings are shared; each dialect decides how
//! the `id` column is spelled and where foreign keys go.

mod mysql;
mod sqlite;

pub use mysql::MySqlDdlGenerator;
pub use sqlite::SqliteDdlGenerator;

use activerecord_core::{
    ColumnDef, ColumnProperty, Dialect, Error, ID_COLUMN, ReferentialAction, Result,
    TableDefinition, quote_ident,
};

/// Generates DDL for one dialect.
pub trait DdlGenerator {
    /// Dialect name for logging.
    fn dialect(&self) -> &'static str;

    /// `CREATE TABLE` for a table definition.
    fn create_table(&self, table: &TableDefinition) -> Result<String>;

    /// Foreign key statements to run after every table exists.
    fn constraints(&self, table: &TableDefinition) -> Result<Vec<String>>;
}

/// Generator for a dialect.
pub fn generator_for(dialect: Dialect) -> Box<dyn DdlGenerator> {
    match dialect {
        Dialect::MySql => Box::new(MySqlDdlGenerator),
        Dialect::Sqlite => Box::new(SqliteDdlGenerator),
    }
}

/// Resolve the SQL type token for a column.
///
/// `VARCHAR` needs a length; a missing or empty type is rejected; other types
/// pass through, parameterized by length when one is given.
pub fn database_type_string(
    column: &str,
    sql_type: Option<&str>,
    length: Option<u32>,
) -> Result<String> {
    let sql_type = sql_type.map(str::trim).unwrap_or_default();
    match sql_type.to_uppercase().as_str() {
        "" => Err(Error::InvalidColumnType {
            column: column.to_string(),
            message: format!("Column {} has invalid type \"NULL\"", column),
        }),
        "BOOL" | "BOOLEAN" | "DATETIME" | "DATE" | "TIME" | "TEXT" | "INT UNSIGNED" => {
            Ok(sql_type.to_string())
        }
        "VARCHAR" => match length {
            Some(length) => Ok(format!("{}({})", sql_type, length)),
            None => Err(Error::InvalidColumnType {
                column: column.to_string(),
                message: format!(
                    "field type {} requires specified column field \"LENGTH\"",
                    column
                ),
            }),
        },
        _ => Ok(match length {
            Some(length) => format!("{}({})", sql_type, length),
            None => sql_type.to_string(),
        }),
    }
}

/// Column fragment: `` `name` TYPE NOT NULL|NULL [DEFAULT x] [AUTO_INCREMENT] [UNIQUE] [PRIMARY KEY]``.
pub fn column_entry(column: &ColumnDef) -> Result<String> {
    render_column(column, true)
}

pub(crate) fn render_column(column: &ColumnDef, with_auto_increment: bool) -> Result<String> {
    let sql_type = database_type_string(&column.name, column.effective_type(), column.length)?;
    let mut entry = format!("{} {}", quote_ident(&column.name), sql_type);

    if column.has_property(ColumnProperty::NOT_NULL) {
        entry.push_str(" NOT NULL");
    } else {
        entry.push_str(" NULL");
    }
    if let Some(default) = &column.default {
        entry.push_str(" DEFAULT ");
        entry.push_str(&default.to_sql());
    }
    if with_auto_increment && column.has_property(ColumnProperty::AUTO_INCREMENT) {
        entry.push_str(" AUTO_INCREMENT");
    }
    if column.has_property(ColumnProperty::UNIQUE) {
        entry.push_str(" UNIQUE");
    }
    if column.has_property(ColumnProperty::PRIMARY_KEY) {
        entry.push_str(" PRIMARY KEY");
    }
    Ok(entry)
}

/// Columns in DDL order: `id` first, the rest alphabetically.
pub fn sorted_columns(table: &TableDefinition) -> Vec<&ColumnDef> {
    let mut rest: Vec<&ColumnDef> = table
        .columns()
        .iter()
        .filter(|c| c.name != ID_COLUMN)
        .collect();
    rest.sort_by(|a, b| a.name.cmp(&b.name));

    let mut ordered = Vec::with_capacity(rest.len() + 1);
    ordered.extend(table.get(ID_COLUMN));
    ordered.extend(rest);
    ordered
}

/// A resolved foreign key of a relation column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: String,
    pub parent_table: String,
    pub on_delete: ReferentialAction,
}

impl ForeignKey {
    /// `FOREIGN KEY (`col`) REFERENCES `parent`(`id`) ON DELETE ...`
    pub fn to_sql(&self) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE {}",
            quote_ident(&self.column),
            quote_ident(&self.parent_table),
            quote_ident(ID_COLUMN),
            self.on_delete.as_sql()
        )
    }
}

/// Resolve every relation column of a table.
///
/// NOT NULL relations cascade; nullable ones are set to NULL.
pub fn foreign_keys(table: &TableDefinition) -> Result<Vec<ForeignKey>> {
    table
        .columns()
        .iter()
        .filter_map(|column| column.relation.as_ref().map(|relation| (column, relation)))
        .map(|(column, relation)| {
            let parent_table = relation.table_name().map_err(|e| match e {
                Error::InvalidRelation { message, .. } => Error::InvalidRelation {
                    column: column.name.clone(),
                    message,
                },
                other => other,
            })?;
            Ok(ForeignKey {
                column: column.name.clone(),
                parent_table,
                on_delete: ReferentialAction::for_properties(column.properties),
            })
        })
        .collect()
}
