//! Relationship metadata for ActiveRecord Rust.
//!
//! A relation column stores the primary key of another record type. The
//! column only needs two things from that type: its table name (for foreign
//! key DDL) and a way to check that an id exists (for input validation).
//! [`RelationTarget`] captures exactly that, so the core crate stays free of
//! the record engine itself.

use std::fmt;
use std::sync::Arc;

use crate::connection::Connection;
use crate::error::Result;

/// The referenced side of a relation column.
pub trait RelationTarget: Send + Sync {
    /// Table holding the referenced rows.
    ///
    /// Fails with `InvalidRelation` if the target does not resolve to a
    /// concrete table.
    fn table_name(&self) -> Result<String>;

    /// True if a row with this id can be read through the target's read path
    /// (read hooks such as soft-delete filtering apply).
    fn exists(&self, conn: &Arc<dyn Connection>, id: i64) -> Result<bool>;
}

/// A shareable handle to a [`RelationTarget`].
#[derive(Clone)]
pub struct Relation(Arc<dyn RelationTarget>);

impl Relation {
    pub fn new(target: impl RelationTarget + 'static) -> Self {
        Self(Arc::new(target))
    }

    pub fn table_name(&self) -> Result<String> {
        self.0.table_name()
    }

    pub fn exists(&self, conn: &Arc<dyn Connection>, id: i64) -> Result<bool> {
        self.0.exists(conn, id)
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.table_name() {
            Ok(table) => f.debug_tuple("Relation").field(&table).finish(),
            Err(_) => f.write_str("Relation(<unresolved>)"),
        }
    }
}
