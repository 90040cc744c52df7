//! Reusable column bundles.
//!
//! Each bundle adds its columns and hooks through [`TableBuilder`] like any
//! other model code, and comes with an extension trait for the operations
//! that go with those columns.
//!
//! ```
//! use activerecord::prelude::*;
//! use activerecord::bundles::{SoftDelete, Timestamps};
//!
//! struct Note;
//!
//! impl Model for Note {
//!     const TABLE_NAME: &'static str = "notes";
//!
//!     fn define(t: &mut TableBuilder) -> Result<()> {
//!         t.column(ColumnDef::new("body").sql_type("TEXT"))?
//!             .bundle(&SoftDelete)?
//!             .bundle(&Timestamps)?;
//!         Ok(())
//!     }
//! }
//! ```
//!
//! [`TableBuilder`]: crate::TableBuilder

mod address;
mod many_to_many;
mod password;
mod soft_delete;
mod timestamps;

pub use address::{
    ADDRESS_ADDRESS, ADDRESS_CITY, ADDRESS_COUNTRY, ADDRESS_ZIPCODE, Address, AddressExt,
};
pub use many_to_many::ManyToMany;
pub use password::{
    PASSWORD, PASSWORD_MIN_LENGTH, PASSWORD_RESET_TOKEN, Password, PasswordExt, hash_password,
};
pub use soft_delete::{SOFT_DELETE, SoftDelete, SoftDeleteExt};
pub use timestamps::{CREATED, LAST_MODIFIED, Timestamps, TimestampsExt};

use activerecord_core::{Result, Value};

use crate::model::Model;
use crate::record::Record;

/// Text value of a column, `None` for NULL.
fn text_column<M: Model>(record: &Record<M>, column: &str) -> Result<Option<String>> {
    Ok(match record.get(column)? {
        Value::Null => None,
        Value::Text(s) => Some(s),
        other => Some(other.to_sql_literal()),
    })
}
