//! Join tables between two record types.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use activerecord_core::{ColumnDef, Result};

use crate::model::{Bundle, Model, TableBuilder, belongs_to};

/// Adds two NOT NULL relation columns, `id_<left>` and `id_<right>`.
///
/// When both sides are the same type the columns are `id_<table>_left` and
/// `id_<table>_right`. Both foreign keys cascade on delete.
pub struct ManyToMany<L, R>(PhantomData<fn() -> (L, R)>);

impl<L: Model, R: Model> ManyToMany<L, R> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    fn self_referential() -> bool {
        TypeId::of::<L>() == TypeId::of::<R>()
    }

    /// Column referencing `L`.
    pub fn left_column() -> String {
        if Self::self_referential() {
            format!("id_{}_left", L::TABLE_NAME)
        } else {
            format!("id_{}", L::TABLE_NAME)
        }
    }

    /// Column referencing `R`.
    pub fn right_column() -> String {
        if Self::self_referential() {
            format!("id_{}_right", R::TABLE_NAME)
        } else {
            format!("id_{}", R::TABLE_NAME)
        }
    }
}

impl<L: Model, R: Model> Default for ManyToMany<L, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Model, R: Model> fmt::Debug for ManyToMany<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ManyToMany")
            .field(&L::TABLE_NAME)
            .field(&R::TABLE_NAME)
            .finish()
    }
}

impl<L: Model, R: Model> Bundle for ManyToMany<L, R> {
    fn contribute(&self, t: &mut TableBuilder) -> Result<()> {
        t.column(
            ColumnDef::new(Self::left_column())
                .relation(belongs_to::<L>())
                .not_null(),
        )?;
        t.column(
            ColumnDef::new(Self::right_column())
                .relation(belongs_to::<R>())
                .not_null(),
        )?;
        Ok(())
    }
}
