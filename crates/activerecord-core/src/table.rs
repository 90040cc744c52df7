//! Table definitions and per-record value storage.
//!
//! A [`TableDefinition`] is the ordered column model of one record type. It
//! always starts with the reserved `id` column. Runtime values live in
//! [`Values`], one cell per data (non-`id`) column, indexed by the column's
//! position in the definition.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::field::{ColumnDef, ColumnProperty, RELATION_TYPE};
use crate::row::Row;
use crate::value::Value;

/// Name of the reserved primary key column.
pub const ID_COLUMN: &str = "id";

/// The ordered column model of one table.
///
/// # Example
///
/// ```
/// use activerecord_core::{ColumnDef, ColumnProperty, TableDefinition};
///
/// let mut table = TableDefinition::new("users");
/// table.extend(ColumnDef::new("name").sql_type("VARCHAR").length(255).not_null()).unwrap();
///
/// assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
/// assert!(table.get("id").unwrap().has_property(ColumnProperty::PRIMARY_KEY));
/// ```
#[derive(Debug, Clone)]
pub struct TableDefinition {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableDefinition {
    /// Create a definition holding only the `id` column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![id_column()],
        }
    }

    /// Append a column.
    ///
    /// Fails with `DuplicateColumn` for `id` or an already declared name, and
    /// with `InvalidRelation` when a relation column also declares a type.
    pub fn extend(&mut self, column: ColumnDef) -> Result<()> {
        if self.contains(&column.name) {
            return Err(Error::DuplicateColumn {
                column: column.name,
            });
        }
        if column.relation.is_some() && column.sql_type.is_some() {
            return Err(Error::InvalidRelation {
                column: column.name,
                message: "Relationship columns have an automatically inferred type, so type should be omitted"
                    .to_string(),
            });
        }
        tracing::trace!(table = %self.name, column = %column.name, "Extending table definition");
        self.columns.push(column);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns, `id` first, then declaration order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Columns other than `id`, in declaration order.
    pub fn data_columns(&self) -> &[ColumnDef] {
        &self.columns[1..]
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`get`](Self::get), failing with `UnknownColumn`.
    pub fn column(&self, name: &str) -> Result<&ColumnDef> {
        self.get(name).ok_or_else(|| Error::UnknownColumn {
            column: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declaration position (`id` is 0).
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

fn id_column() -> ColumnDef {
    ColumnDef::new(ID_COLUMN).sql_type(RELATION_TYPE).properties(
        ColumnProperty::NOT_NULL
            | ColumnProperty::IMMUTABLE
            | ColumnProperty::AUTO_INCREMENT
            | ColumnProperty::PRIMARY_KEY,
    )
}

/// Runtime values of one record, one cell per data column.
///
/// Cloning copies the cells; the column model is shared.
#[derive(Debug, Clone)]
pub struct Values {
    table: Arc<TableDefinition>,
    cells: Vec<Value>,
}

impl Values {
    /// All cells NULL.
    pub fn new(table: Arc<TableDefinition>) -> Self {
        let cells = vec![Value::Null; table.data_columns().len()];
        Self { table, cells }
    }

    pub fn table(&self) -> &Arc<TableDefinition> {
        &self.table
    }

    /// Current value of a data column (`None` for `id` or unknown names).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index(name).map(|idx| &self.cells[idx])
    }

    /// Overwrite a data column.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self.index(name).ok_or_else(|| Error::UnknownColumn {
            column: name.to_string(),
        })?;
        self.cells[idx] = value.into();
        Ok(())
    }

    /// Reset every cell to NULL.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Value::Null;
        }
    }

    /// Copy every cell from `other` (same table).
    pub fn copy_from(&mut self, other: &Values) {
        self.cells.clone_from(&other.cells);
    }

    /// Give every NULL `NOT NULL` column its default, if it has one.
    pub fn fill_defaults(&mut self) {
        for (column, cell) in self.table.data_columns().iter().zip(self.cells.iter_mut()) {
            if cell.is_null() && column.has_property(ColumnProperty::NOT_NULL) {
                if let Some(default) = &column.default {
                    *cell = default.resolve();
                }
            }
        }
    }

    /// `(column, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.table
            .data_columns()
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.cells.iter())
    }

    /// All data columns as a row (used for INSERT / UPDATE).
    pub fn to_row(&self) -> Row {
        self.iter().map(|(k, v)| (k, v.clone())).collect()
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.table
            .data_columns()
            .iter()
            .position(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Arc<TableDefinition> {
        let mut table = TableDefinition::new("users");
        table
            .extend(ColumnDef::new("username").sql_type("VARCHAR").length(255).not_null())
            .unwrap();
        table
            .extend(ColumnDef::new("score").sql_type("INT").not_null().default(0))
            .unwrap();
        table
            .extend(ColumnDef::new("note").sql_type("TEXT"))
            .unwrap();
        Arc::new(table)
    }

    #[test]
    fn test_id_is_injected_first() {
        let table = users();
        let id = &table.columns()[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.sql_type.as_deref(), Some("INT UNSIGNED"));
        assert!(id.has_property(
            ColumnProperty::NOT_NULL
                | ColumnProperty::IMMUTABLE
                | ColumnProperty::AUTO_INCREMENT
                | ColumnProperty::PRIMARY_KEY
        ));
        assert_eq!(table.data_columns().len(), 3);
    }

    #[test]
    fn test_declaring_id_fails() {
        let mut table = TableDefinition::new("users");
        let err = table.extend(ColumnDef::new("id").sql_type("INT")).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn { column } if column == "id"));
    }

    #[test]
    fn test_duplicate_column_fails() {
        let mut table = TableDefinition::new("users");
        table.extend(ColumnDef::new("a").sql_type("INT")).unwrap();
        assert!(matches!(
            table.extend(ColumnDef::new("a").sql_type("TEXT")),
            Err(Error::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_unknown_column_lookup() {
        let table = users();
        assert!(table.column("username").is_ok());
        assert!(matches!(
            table.column("nope"),
            Err(Error::UnknownColumn { column }) if column == "nope"
        ));
        assert_eq!(table.position("score"), Some(2));
    }

    #[test]
    fn test_values_get_set() {
        let mut values = Values::new(users());
        assert_eq!(values.get("username"), Some(&Value::Null));
        values.set("username", "badger").unwrap();
        assert_eq!(values.get("username"), Some(&Value::from("badger")));
        assert!(values.get("id").is_none());
        assert!(matches!(values.set("id", 1), Err(Error::UnknownColumn { .. })));
        assert!(matches!(values.set("bogus", 1), Err(Error::UnknownColumn { .. })));
    }

    #[test]
    fn test_fill_defaults_only_not_null_nulls() {
        let mut values = Values::new(users());
        values.fill_defaults();
        assert_eq!(values.get("score"), Some(&Value::BigInt(0)));
        assert_eq!(values.get("note"), Some(&Value::Null));

        values.set("score", 7).unwrap();
        values.fill_defaults();
        assert_eq!(values.get("score"), Some(&Value::BigInt(7)));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = Values::new(users());
        a.set("note", "x").unwrap();
        let mut b = a.clone();
        b.set("note", "y").unwrap();
        assert_eq!(a.get("note"), Some(&Value::from("x")));

        b.clear();
        assert!(b.iter().all(|(_, v)| v.is_null()));
        b.copy_from(&a);
        assert_eq!(b.get("note"), Some(&Value::from("x")));
    }

    #[test]
    fn test_to_row_in_declaration_order() {
        let mut values = Values::new(users());
        values.set("username", "a").unwrap();
        let row = values.to_row();
        assert_eq!(
            row.columns().collect::<Vec<_>>(),
            vec!["username", "score", "note"]
        );
    }
}
