//! Core types and traits for ActiveRecord Rust.
//!
//! `activerecord-core` is the **foundation layer** for the workspace. It defines the
//! driver contract and the column model every other crate builds on.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: [`Connection`] is implemented by database drivers;
//!   [`RelationTarget`] is implemented by the record engine for foreign keys.
//! - **Data model**: [`Row`] and [`Value`] represent query inputs/outputs and are
//!   shared across query, schema, and driver crates.
//! - **Column model**: [`ColumnDef`], [`ColumnProperty`] and [`TableDefinition`]
//!   describe a table; [`Values`] holds one record's cells.
//!
//! # Who Uses This Crate
//!
//! - `activerecord-query` renders [`Value`] parameters into SQL.
//! - `activerecord-schema` turns a [`TableDefinition`] into DDL.
//! - `activerecord-sqlite` implements [`Connection`].
//! - `activerecord` builds the record engine on all of the above.

pub mod connection;
pub mod error;
pub mod field;
pub mod identifiers;
pub mod relationship;
pub mod row;
pub mod table;
pub mod validate;
pub mod value;

pub use connection::{Connection, Dialect};
pub use error::{
    Error, FieldValidationError, QueryError, QueryErrorKind, Result, ValidationError,
    ValidationErrorKind,
};
pub use field::{
    ColumnDef, ColumnDefault, ColumnProperty, DATETIME_FORMAT, RELATION_TYPE, ReferentialAction,
    Setter, Validator, current_timestamp,
};
pub use identifiers::{is_plain_identifier, quote_ident};
pub use relationship::{Relation, RelationTarget};
pub use row::Row;
pub use table::{ID_COLUMN, TableDefinition, Values};
pub use value::Value;
