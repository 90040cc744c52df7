//! Logical deletion.

use activerecord_core::{ColumnDef, Result, Value};
use activerecord_query::Expr;

use crate::model::{Bundle, Model, TableBuilder};
use crate::record::Record;

pub const SOFT_DELETE: &str = "soft_delete";

/// Adds `soft_delete INT(1) NOT NULL DEFAULT 0` and hides flagged rows from
/// reads and searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftDelete;

impl Bundle for SoftDelete {
    fn contribute(&self, t: &mut TableBuilder) -> Result<()> {
        t.column(
            ColumnDef::new(SOFT_DELETE)
                .sql_type("INT")
                .length(1)
                .not_null()
                .default(0),
        )?
        .on_read(SOFT_DELETE, || Some(Expr::equal(SOFT_DELETE, 0)))?
        .on_search(SOFT_DELETE, || Some(Expr::equal(SOFT_DELETE, 0)))?;
        Ok(())
    }
}

/// Operations for records with the [`SoftDelete`] bundle.
pub trait SoftDeleteExt: Sized {
    /// Flag the row as deleted and persist it.
    fn soft_delete(&mut self) -> Result<&mut Self>;

    /// Clear the flag and persist it.
    fn soft_restore(&mut self) -> Result<&mut Self>;

    fn is_soft_deleted(&self) -> Result<bool>;
}

impl<M: Model> SoftDeleteExt for Record<M> {
    fn soft_delete(&mut self) -> Result<&mut Self> {
        set_flag(self, 1)
    }

    fn soft_restore(&mut self) -> Result<&mut Self> {
        set_flag(self, 0)
    }

    fn is_soft_deleted(&self) -> Result<bool> {
        Ok(self.get(SOFT_DELETE)?.to_i64().unwrap_or(0) != 0)
    }
}

fn set_flag<M: Model>(record: &mut Record<M>, flag: i64) -> Result<&mut Record<M>> {
    let previous = record.get(SOFT_DELETE)?;
    record.set(SOFT_DELETE, flag)?;
    let updated = record.update().map(|_| ());
    if let Err(e) = updated {
        record.set(SOFT_DELETE, previous)?;
        return Err(e);
    }
    tracing::debug!(table = record.table_name(), id = ?record.id(), flag, "Soft delete flag changed");
    Ok(record)
}
