//! ActiveRecord Rust: active record mapping for relational tables.
//!
//! `activerecord` is the **primary user-facing crate**. It ties the column
//! model, query builder, schema generator and driver contract together into
//! a record engine.
//!
//! # Role In The Architecture
//!
//! - **Declaration**: a type implements [`Model`] and declares columns and
//!   hooks through a [`TableBuilder`]; [`bundles`] add reusable column groups.
//! - **Record engine**: [`Record`] runs create/read/update/delete with hooks,
//!   tracks identity, and serializes to whitelisted rows.
//! - **Search**: [`QueryResult`] is a deferred, paginated search.
//! - **API layer**: `api_create`/`api_update`/`api_read`/`api_search` apply
//!   untrusted input atomically and return field errors as data.
//!
//! # Example
//!
//! ```
//! use activerecord::prelude::*;
//!
//! struct User;
//!
//! impl Model for User {
//!     const TABLE_NAME: &'static str = "users";
//!
//!     fn define(t: &mut TableBuilder) -> Result<()> {
//!         t.column(
//!             ColumnDef::new("username")
//!                 .sql_type("VARCHAR")
//!                 .length(255)
//!                 .not_null()
//!                 .unique()
//!                 .validate(validate::not_empty()),
//!         )?;
//!         Ok(())
//!     }
//! }
//!
//! let (table, _hooks) = User::schema().unwrap();
//! let ddl = activerecord::schema::create_table_sql(&table, Dialect::MySql).unwrap();
//! assert!(ddl.starts_with("CREATE TABLE `users` (\n`id` INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,"));
//! ```

pub mod api;
pub mod bundles;
pub mod hooks;
pub mod model;
pub mod record;
pub mod search;

#[cfg(test)]
mod test_support;

pub use activerecord_core::{
    ColumnDef, ColumnDefault, ColumnProperty, Connection, Dialect, Error, FieldValidationError,
    ID_COLUMN, QueryError, QueryErrorKind, ReferentialAction, Relation, RelationTarget, Result,
    Row, TableDefinition, ValidationError, ValidationErrorKind, Value, Values, validate,
};
pub use activerecord_query::{Expr, OrderDirection, Query};
pub use api::{ApiConfig, ApiResult, SearchPage, SearchParams};
pub use hooks::{Hook, HookAction, HookRegistry};
pub use model::{Bundle, Model, RelatedModel, TableBuilder, belongs_to};
pub use record::Record;
pub use search::{QueryResult, Records};

/// Schema generation.
pub mod schema {
    pub use activerecord_schema::{
        DdlGenerator, ForeignKey, SchemaBuilder, create_table_sql, database_type_string,
        generator_for, table_constraints,
    };
}

/// Commonly used items.
pub mod prelude {
    pub use crate::bundles::{AddressExt, PasswordExt, SoftDeleteExt, TimestampsExt};
    pub use crate::{
        ApiConfig, ApiResult, Bundle, ColumnDef, ColumnProperty, Connection, Dialect, Error,
        Expr, HookAction, Model, OrderDirection, QueryResult, Record, Result, Row, SearchParams,
        TableBuilder, ValidationError, ValidationErrorKind, Value, belongs_to, validate,
    };
}
